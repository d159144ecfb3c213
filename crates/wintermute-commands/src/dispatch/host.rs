//! Host services the dispatch chain calls into.
//!
//! `CommandHost` is the single trait a gateway embedding this crate must
//! implement. It aggregates the externally-owned collaborators (config
//! store, runtime overrides, run runtime, restart mechanics) so the chain
//! itself stays connector-agnostic.

use async_trait::async_trait;

use wintermute_core::overrides::RuntimeOverrides;
use wintermute_core::store::ConfigStore;
use wintermute_runs::{AbortMemory, RunRuntime};

/// Outcome of an external restart attempt.
#[derive(Debug, Clone)]
pub struct RestartOutcome {
    pub ok: bool,
    /// Mechanism that was tried, e.g. `systemd`, `supervisor`, `exec`.
    pub method: String,
    pub detail: Option<String>,
}

/// Process restart mechanics, owned by whoever owns the process.
pub trait RestartBackend: Send + Sync {
    /// Whether an in-process restart listener is registered. When true the
    /// in-process path is preferred over external mechanisms.
    fn has_inprocess_listener(&self) -> bool;

    /// Schedule an in-process restart; returns once scheduled.
    fn schedule_inprocess_restart(&self, reason: &str);

    /// Restart through an external mechanism.
    fn trigger_external_restart(&self) -> RestartOutcome;
}

/// Best-effort provider usage lookup for `/status`. The status handler
/// bounds the call with a timeout and omits the line on any failure.
#[async_trait]
pub trait UsageProbe: Send + Sync {
    async fn fetch_usage_line(&self) -> Option<String>;
}

/// Collaborator access for the dispatch chain.
pub trait CommandHost: Send + Sync {
    fn config_store(&self) -> &ConfigStore;
    fn overrides(&self) -> &RuntimeOverrides;
    fn runs(&self) -> &dyn RunRuntime;
    fn abort_memory(&self) -> &AbortMemory;
    fn restart(&self) -> &dyn RestartBackend;

    fn usage(&self) -> Option<&dyn UsageProbe> {
        None
    }

    /// Depth of the followup queue for a session key.
    fn queue_depth(&self, session_key: &str) -> u64 {
        let _ = session_key;
        0
    }

    /// Label describing the credential in use (`oauth (...)`, `api-key …`).
    fn auth_profile_label(&self) -> Option<String> {
        None
    }

    /// Append a line to the session transcript as a system event.
    fn enqueue_system_event(&self, line: &str, session_key: Option<&str>);
}
