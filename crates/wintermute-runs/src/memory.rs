use dashmap::DashSet;
use tracing::debug;

/// In-memory abort markers for conversations that could not be resolved to
/// a session id or store entry.
///
/// Weaker than the persisted `abortedLastRun` flag: markers are consulted
/// only by a live run loop and vanish on restart. They exist so `/stop`
/// can still do something useful before a session has any durable state.
#[derive(Debug, Default)]
pub struct AbortMemory {
    keys: DashSet<String>,
}

impl AbortMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: &str) {
        self.keys.insert(key.to_string());
        debug!(key = %key, "abort marker set");
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Consume the marker for `key`. Returns whether one was set.
    pub fn take(&self, key: &str) -> bool {
        self.keys.remove(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_marker() {
        let memory = AbortMemory::new();
        memory.set("telegram:42");
        assert!(memory.is_set("telegram:42"));
        assert!(memory.take("telegram:42"));
        assert!(!memory.is_set("telegram:42"));
        assert!(!memory.take("telegram:42"));
    }

    #[test]
    fn keys_are_independent() {
        let memory = AbortMemory::new();
        memory.set("a");
        assert!(!memory.is_set("b"));
    }
}
