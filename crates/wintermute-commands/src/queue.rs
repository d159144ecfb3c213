//! Effective followup-queue settings for a session.
//!
//! The queue itself lives in the connector; the command core only reports
//! settings in `/status` and resolves which values apply. The mode is
//! config-wide; debounce, cap and drop accept per-session overrides.

use wintermute_core::config::WintermuteConfig;
use wintermute_core::types::{QueueDrop, QueueMode};
use wintermute_sessions::SessionEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSettings {
    pub mode: QueueMode,
    pub debounce_ms: u64,
    pub cap: u64,
    pub drop: QueueDrop,
    /// True when any value came from the session entry rather than config.
    pub overridden: bool,
}

pub fn resolve_queue_settings(
    config: &WintermuteConfig,
    entry: Option<&SessionEntry>,
) -> QueueSettings {
    let queue = &config.session.queue;
    let overridden = entry.map(SessionEntry::has_queue_overrides).unwrap_or(false);
    QueueSettings {
        mode: queue.mode,
        debounce_ms: entry
            .and_then(|entry| entry.queue_debounce_ms)
            .unwrap_or(queue.debounce_ms),
        cap: entry.and_then(|entry| entry.queue_cap).unwrap_or(queue.cap),
        drop: entry.and_then(|entry| entry.queue_drop).unwrap_or(queue.drop),
        overridden,
    }
}
