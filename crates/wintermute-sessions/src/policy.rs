use wintermute_core::config::SendPolicyConfig;
use wintermute_core::types::{ChatType, SendPolicy};

use crate::types::SessionEntry;

/// Effective send policy for a conversation.
///
/// Precedence: session-entry override (set via `/send`), then the
/// chat-type-specific config default, then the global default.
pub fn resolve_send_policy(
    config: &SendPolicyConfig,
    chat_type: ChatType,
    entry: Option<&SessionEntry>,
) -> SendPolicy {
    if let Some(policy) = entry.and_then(|e| e.send_policy) {
        return policy;
    }
    let scoped = match chat_type {
        ChatType::Group => config.group,
        ChatType::Direct => config.direct,
    };
    scoped.unwrap_or(config.default)
}
