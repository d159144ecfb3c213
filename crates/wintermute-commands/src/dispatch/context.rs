//! Message context and the per-dispatch command context derived from it.

use wintermute_core::config::WintermuteConfig;
use wintermute_core::types::ChatType;

use crate::auth::resolve_command_authorization;
use crate::mentions::strip_mentions;
use crate::normalize::{normalize_command_body, NormalizeOptions};
use crate::registry::{CommandRegistry, CommandSource};

/// Inbound message as the connector handed it over.
///
/// Everything except `body` and `chat_type` is best-effort: connectors
/// differ in what they know about a message, and the chain degrades
/// gracefully around missing fields.
#[derive(Debug, Clone, Default)]
pub struct MsgContext {
    /// Message text after connector preprocessing.
    pub body: String,
    /// Untouched original text, when the connector kept it separately.
    pub raw_body: Option<String>,
    /// Explicit command text for native menu invocations.
    pub command_body: Option<String>,
    pub surface: Option<String>,
    pub provider: Option<String>,
    pub sender_id: Option<String>,
    pub sender_username: Option<String>,
    pub chat_type: ChatType,
    pub from: Option<String>,
    pub to: Option<String>,
    pub message_thread_id: Option<i64>,
    /// Abort redirection: target a session other than the current one.
    pub command_target_session_key: Option<String>,
    pub command_source: Option<CommandSource>,
    pub bot_username: Option<String>,
    /// Connector-level authorization verdict, when already decided.
    pub command_authorized: Option<bool>,
}

/// Directives recognized inline by upstream parsing rather than as a
/// standalone command body.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDirectives {
    pub has_status_directive: bool,
}

/// Everything a chain handler needs to know about the message, resolved
/// once before the chain runs.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub surface: String,
    pub provider: String,
    pub provider_id: Option<String>,
    pub owner_list: Vec<String>,
    pub is_authorized_sender: bool,
    pub sender_id: Option<String>,
    /// Best-effort key for the in-memory abort marker.
    pub abort_key: Option<String>,
    /// Normalized trigger text with mentions intact.
    pub raw_body_normalized: String,
    /// Normalized trigger text with mentions stripped in groups; the body
    /// the chain matches against.
    pub command_body_normalized: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl CommandContext {
    pub fn sender_label(&self) -> &str {
        self.sender_id.as_deref().unwrap_or("<unknown>")
    }
}

pub fn build_command_context(
    ctx: &MsgContext,
    config: &WintermuteConfig,
    registry: &CommandRegistry,
    session_key: Option<&str>,
) -> CommandContext {
    let auth = resolve_command_authorization(ctx, config);
    let surface = ctx
        .surface
        .as_deref()
        .or(ctx.provider.as_deref())
        .unwrap_or("")
        .trim()
        .to_lowercase();
    let provider = match ctx.provider.as_deref() {
        Some(provider) => provider.trim().to_lowercase(),
        None => surface.clone(),
    };
    let abort_key = session_key
        .map(str::to_string)
        .or_else(|| auth.from.clone().filter(|from| !from.is_empty()))
        .or_else(|| auth.to.clone().filter(|to| !to.is_empty()));

    let trigger_body = ctx.command_body.as_deref().unwrap_or(&ctx.body);
    let raw_body_normalized = normalize_command_body(
        trigger_body,
        registry,
        NormalizeOptions {
            bot_username: ctx.bot_username.as_deref(),
        },
    );
    let command_body_normalized = if ctx.chat_type.is_group() {
        let stripped = strip_mentions(&raw_body_normalized, ctx.bot_username.as_deref());
        normalize_command_body(&stripped, registry, NormalizeOptions::default())
    } else {
        normalize_command_body(&raw_body_normalized, registry, NormalizeOptions::default())
    };

    CommandContext {
        surface,
        provider,
        provider_id: auth.provider_id,
        owner_list: auth.owner_list,
        is_authorized_sender: auth.is_authorized_sender,
        sender_id: auth.sender_id,
        abort_key,
        raw_body_normalized,
        command_body_normalized,
        from: auth.from,
        to: auth.to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_ctx(body: &str) -> MsgContext {
        MsgContext {
            body: body.to_string(),
            chat_type: ChatType::Group,
            bot_username: Some("wintermute".to_string()),
            provider: Some("Telegram".to_string()),
            sender_id: Some("42".to_string()),
            ..MsgContext::default()
        }
    }

    #[test]
    fn mention_stripping_applies_in_groups_only() {
        let registry = CommandRegistry::builtin();
        let config = WintermuteConfig::default();

        let ctx = group_ctx("@wintermute /status");
        let command = build_command_context(&ctx, &config, registry, None);
        assert_eq!(command.command_body_normalized, "/status");

        let direct = MsgContext {
            chat_type: ChatType::Direct,
            ..group_ctx("@wintermute /status")
        };
        let command = build_command_context(&direct, &config, registry, None);
        assert_eq!(command.command_body_normalized, "@wintermute /status");
    }

    #[test]
    fn surface_and_provider_fall_back_to_each_other() {
        let registry = CommandRegistry::builtin();
        let config = WintermuteConfig::default();
        let ctx = group_ctx("/help");
        let command = build_command_context(&ctx, &config, registry, None);
        assert_eq!(command.surface, "telegram");
        assert_eq!(command.provider, "telegram");
    }

    #[test]
    fn abort_key_prefers_session_key() {
        let registry = CommandRegistry::builtin();
        let config = WintermuteConfig::default();

        let mut ctx = group_ctx("/stop");
        ctx.from = Some("chat-7".to_string());
        let command = build_command_context(&ctx, &config, registry, Some("agent:main:tg:7"));
        assert_eq!(command.abort_key.as_deref(), Some("agent:main:tg:7"));

        let command = build_command_context(&ctx, &config, registry, None);
        assert_eq!(command.abort_key.as_deref(), Some("chat-7"));
    }

    #[test]
    fn native_command_body_wins_over_body() {
        let registry = CommandRegistry::builtin();
        let config = WintermuteConfig::default();
        let ctx = MsgContext {
            body: "ignored".to_string(),
            command_body: Some("/Help".to_string()),
            ..MsgContext::default()
        };
        let command = build_command_context(&ctx, &config, registry, None);
        assert_eq!(command.command_body_normalized, "/help");
    }
}
