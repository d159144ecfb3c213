//! Sender authorization for the command surface.
//!
//! Deny-by-default: an empty `commands.allowFrom` list means no one may
//! issue commands. Wildcard `"*"` allows everyone. Entries may include or
//! omit the leading `@` and match either the sender's username or id.

use wintermute_core::config::WintermuteConfig;

use crate::dispatch::MsgContext;

/// Resolved authorization facts for one inbound message.
#[derive(Debug, Clone)]
pub struct CommandAuthorization {
    pub is_authorized_sender: bool,
    pub sender_id: Option<String>,
    pub provider_id: Option<String>,
    /// Allow-list entries minus the wildcard, `@` stripped. Forwarded to
    /// the runtime so compaction knows who the owners are.
    pub owner_list: Vec<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Returns `true` when the sender is permitted to issue commands.
///
/// An empty `allow_from` slice always returns `false`.
pub fn sender_allowed(
    allow_from: &[String],
    username: Option<&str>,
    user_id: Option<&str>,
) -> bool {
    if allow_from.is_empty() {
        return false;
    }
    let username = username.map(|name| name.trim_start_matches('@')).unwrap_or("");
    let user_id = user_id.unwrap_or("");
    allow_from.iter().any(|entry| {
        let entry = entry.trim().trim_start_matches('@');
        entry == "*"
            || (!username.is_empty() && entry == username)
            || (!user_id.is_empty() && entry == user_id)
    })
}

/// Derive the authorization facts for `ctx`.
///
/// A connector that has already decided (`ctx.command_authorized`) wins;
/// otherwise the config allow-list is consulted.
pub fn resolve_command_authorization(
    ctx: &MsgContext,
    config: &WintermuteConfig,
) -> CommandAuthorization {
    let allow_from = &config.commands.allow_from;
    let sender_id = non_empty(ctx.sender_id.as_deref()).or_else(|| non_empty(ctx.from.as_deref()));
    let is_authorized_sender = match ctx.command_authorized {
        Some(decided) => decided,
        None => sender_allowed(
            allow_from,
            ctx.sender_username.as_deref(),
            sender_id.as_deref(),
        ),
    };
    let owner_list = allow_from
        .iter()
        .map(|entry| entry.trim().trim_start_matches('@'))
        .filter(|entry| !entry.is_empty() && *entry != "*")
        .map(str::to_string)
        .collect();
    let provider_id = non_empty(ctx.provider.as_deref())
        .or_else(|| non_empty(ctx.surface.as_deref()))
        .map(|id| id.to_lowercase());

    CommandAuthorization {
        is_authorized_sender,
        sender_id,
        provider_id,
        owner_list,
        from: ctx.from.clone(),
        to: ctx.to.clone(),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
