use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters for a session compaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactRequest {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Free-text instructions appended to the compaction prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
    /// Opaque skills state carried over from the session entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_snapshot: Option<Value>,
    /// Allow-listed owners, forwarded so the runtime can address them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<String>,
}

/// Token counts around a compaction, when the runtime reports them.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_before: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_after: Option<u64>,
}

/// Result of a compaction attempt.
///
/// `ok` distinguishes "the runtime ran" from "it refused"; `compacted`
/// distinguishes "it changed the transcript" from "nothing to do".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactOutcome {
    pub ok: bool,
    pub compacted: bool,
    #[serde(default, rename = "result", skip_serializing_if = "Option::is_none")]
    pub stats: Option<CompactStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Surface the command layer uses to talk to the embedded generation
/// runtime. Hosts implement this around a [`crate::RunRegistry`] plus
/// whatever agent actually performs compaction.
#[async_trait]
pub trait RunRuntime: Send + Sync {
    /// Whether a generation run is in flight for `session_id`.
    fn is_active(&self, session_id: &str) -> bool;

    /// Signal cancellation to the run for `session_id`, if any.
    fn abort(&self, session_id: &str) -> bool;

    /// Wait for the run to end, bounded by `timeout`. `true` means ended
    /// (or nothing was running).
    async fn wait_for_end(&self, session_id: &str, timeout: Duration) -> bool;

    /// Compact the session transcript.
    async fn compact(&self, request: CompactRequest) -> CompactOutcome;
}
