use serde::{Deserialize, Serialize};
use serde_json::Value;

use wintermute_core::types::{ChatType, GroupActivation, QueueDrop, SendPolicy};

/// Current time as epoch milliseconds, the timestamp unit used in the store.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// One conversation's persisted state.
///
/// Every field is optional: entries accrete fields as commands touch them,
/// and old store files keep loading as the shape grows. Unknown fields are
/// preserved across a load/save round trip via `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    /// Identifier of the embedded run session bound to this conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_type: Option<ChatType>,
    /// Group activation override set via `/activation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_activation: Option<GroupActivation>,
    /// Set when `/activation` changes the mode; the next turn owes the
    /// model a system intro describing the new behavior.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_activation_needs_system_intro: Option<bool>,
    /// Send policy override set via `/send`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_policy: Option<SendPolicy>,
    /// Marks that the last run for this session was aborted by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted_last_run: Option<bool>,
    /// Epoch milliseconds of the last mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    /// Context window size reported by the last run, for usage percentages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_tokens: Option<u64>,
    /// How many times this session has been compacted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compaction_count: Option<u64>,
    /// Opaque skills state forwarded verbatim to the run runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_snapshot: Option<Value>,
    /// Followup-queue overrides; absent fields fall back to config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_debounce_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_cap: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_drop: Option<QueueDrop>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl SessionEntry {
    /// Stamp the entry as just-mutated.
    pub fn touch(&mut self) {
        self.updated_at = Some(now_ms());
    }

    /// Whether any followup-queue field is overridden on this entry.
    pub fn has_queue_overrides(&self) -> bool {
        self.queue_debounce_ms.is_some() || self.queue_cap.is_some() || self.queue_drop.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn camel_case_and_sparse_serialization() {
        let mut entry = SessionEntry::default();
        entry.session_id = Some("s-1".to_string());
        entry.aborted_last_run = Some(true);
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v, json!({"sessionId": "s-1", "abortedLastRun": true}));
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let raw = json!({"sessionId": "s-2", "legacyDisplayName": "Ally"});
        let entry: SessionEntry = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn touch_sets_updated_at() {
        let mut entry = SessionEntry::default();
        assert!(entry.updated_at.is_none());
        entry.touch();
        assert!(entry.updated_at.unwrap() > 0);
    }
}
