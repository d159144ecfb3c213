//! The ordered, short-circuiting command dispatch chain.
//!
//! One normalized message body goes in; at most one handler fires. Every
//! handler either declines (falls through), silently drops the message
//! (matched but unauthorized), or produces a terminal reply. A message no
//! handler claims falls out as pass-through so the caller can forward it
//! to the agent. Unauthorized matches never produce an error reply: a
//! sender who is not allowed to use a command should not learn that the
//! command exists.

mod context;
mod host;

pub use context::{build_command_context, CommandContext, InlineDirectives, MsgContext};
pub use host::{CommandHost, RestartBackend, RestartOutcome, UsageProbe};

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use wintermute_core::config::WintermuteConfig;
use wintermute_core::paths::{
    get_value_at_path, parse_config_path, set_value_at_path, unset_value_at_path,
};
use wintermute_core::types::SendPolicy;
use wintermute_core::validate::{validate_config_object, ConfigValidation};
use wintermute_core::{RUN_END_WAIT_MS, USAGE_FETCH_TIMEOUT_MS};
use wintermute_runs::CompactRequest;
use wintermute_sessions::{resolve_send_policy, SessionEntry, SessionStore};

use crate::abort::is_abort_trigger;
use crate::activation::parse_activation_command;
use crate::bash::{extract_bash_invocation, handle_bash_command};
use crate::config_cmd::{parse_config_command, value_label, ConfigAction};
use crate::debug_cmd::{parse_debug_command, DebugAction};
use crate::mentions::{strip_mentions, strip_structural_prefixes};
use crate::normalize::text_commands_allowed;
use crate::queue::resolve_queue_settings;
use crate::registry::CommandRegistry;
use crate::send_policy::parse_send_policy_command;
use crate::status::{
    build_commands_message, build_help_message, build_status_message, format_context_usage_short,
    format_token_count, StatusReport,
};

/// Reply produced by a handler. Delivery is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPayload {
    pub text: String,
}

/// What the chain decided for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub reply: Option<ReplyPayload>,
    /// True only for pass-through: the message is not a command and the
    /// caller should keep processing it.
    pub should_continue: bool,
}

impl DispatchOutcome {
    /// Silent drop: handled, nothing to say.
    fn stop() -> Self {
        Self {
            reply: None,
            should_continue: false,
        }
    }

    fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: Some(ReplyPayload { text: text.into() }),
            should_continue: false,
        }
    }

    fn pass_through() -> Self {
        Self {
            reply: None,
            should_continue: true,
        }
    }
}

/// One dispatch invocation. `store` and `session_key` are optional: a
/// connector without session persistence still gets the full chain, minus
/// the session-mutating side effects.
pub struct DispatchRequest<'a> {
    pub ctx: &'a MsgContext,
    pub config: &'a WintermuteConfig,
    pub registry: &'a CommandRegistry,
    pub store: Option<&'a mut SessionStore>,
    pub session_key: Option<String>,
    pub directives: InlineDirectives,
}

/// Run the chain for one message.
pub async fn dispatch_command(
    request: DispatchRequest<'_>,
    host: &dyn CommandHost,
) -> DispatchOutcome {
    let DispatchRequest {
        ctx,
        config,
        registry,
        mut store,
        session_key,
        directives,
    } = request;
    let is_group = ctx.chat_type.is_group();
    let command = build_command_context(ctx, config, registry, session_key.as_deref());
    let session_entry: Option<SessionEntry> = match (store.as_deref(), session_key.as_deref()) {
        (Some(store), Some(key)) => store.resolve_entry(key).map(|(_, entry)| entry.clone()),
        _ => None,
    };
    let body = command.command_body_normalized.clone();

    // 1. Reset markers: authorization gate only. An authorized /reset or
    // /new falls through; the actual reset happens downstream.
    let reset_requested = body == "/reset" || body == "/new";
    if reset_requested && !command.is_authorized_sender {
        debug!(sender = command.sender_label(), "ignoring /reset from unauthorized sender");
        return DispatchOutcome::stop();
    }

    let activation_command = parse_activation_command(&body);
    let send_policy_command = parse_send_policy_command(&body);
    let allow_text_commands = text_commands_allowed(config, &command.surface, ctx.command_source);

    // 2. Bash. An unauthorized `!` escape falls through as plain text; an
    // unauthorized /bash is a recognized command and drops silently.
    let bash_slash =
        allow_text_commands && (body == "/bash" || body.starts_with("/bash "));
    let bash_bang = allow_text_commands && body.starts_with('!');
    if bash_slash || (bash_bang && command.is_authorized_sender) {
        if !command.is_authorized_sender {
            debug!(sender = command.sender_label(), "ignoring /bash from unauthorized sender");
            return DispatchOutcome::stop();
        }
        let invocation = extract_bash_invocation(&body).unwrap_or("");
        return DispatchOutcome::reply(handle_bash_command(config, invocation).await);
    }

    // 3. Group activation.
    if allow_text_commands && activation_command.has_command {
        if !is_group {
            return DispatchOutcome::reply("⚙️ Group activation only applies to group chats.");
        }
        if !command.is_authorized_sender {
            debug!(
                sender = command.sender_label(),
                "ignoring /activation from unauthorized sender in group"
            );
            return DispatchOutcome::stop();
        }
        let Some(mode) = activation_command.mode else {
            return DispatchOutcome::reply("⚙️ Usage: /activation mention|always");
        };
        if let (Some(store), Some(entry), Some(key)) = (
            store.as_deref_mut(),
            session_entry.clone(),
            session_key.as_deref(),
        ) {
            let mut entry = entry;
            entry.group_activation = Some(mode);
            entry.group_activation_needs_system_intro = Some(true);
            entry.touch();
            persist_entry(store, key, entry).await;
        }
        return DispatchOutcome::reply(format!("⚙️ Group activation set to {mode}."));
    }

    // 4. Send policy.
    if allow_text_commands && send_policy_command.has_command {
        if !command.is_authorized_sender {
            debug!(sender = command.sender_label(), "ignoring /send from unauthorized sender");
            return DispatchOutcome::stop();
        }
        let Some(mode) = send_policy_command.mode else {
            return DispatchOutcome::reply("⚙️ Usage: /send on|off|inherit");
        };
        if let (Some(store), Some(entry), Some(key)) = (
            store.as_deref_mut(),
            session_entry.clone(),
            session_key.as_deref(),
        ) {
            let mut entry = entry;
            entry.send_policy = mode.as_policy();
            entry.touch();
            persist_entry(store, key, entry).await;
        }
        return DispatchOutcome::reply(format!("⚙️ Send policy set to {}.", mode.label()));
    }

    // 5. Restart.
    if allow_text_commands && body == "/restart" {
        if !command.is_authorized_sender {
            debug!(sender = command.sender_label(), "ignoring /restart from unauthorized sender");
            return DispatchOutcome::stop();
        }
        if !config.commands.restart {
            return DispatchOutcome::reply(
                "⚠️ /restart is disabled. Set commands.restart=true to enable.",
            );
        }
        let backend = host.restart();
        if backend.has_inprocess_listener() {
            backend.schedule_inprocess_restart("/restart");
            return DispatchOutcome::reply(
                "⚙️ Restarting the gateway in-process; back in a few seconds.",
            );
        }
        let outcome = backend.trigger_external_restart();
        if !outcome.ok {
            let detail = outcome
                .detail
                .map(|detail| format!(" Details: {detail}"))
                .unwrap_or_default();
            return DispatchOutcome::reply(format!(
                "⚠️ Restart failed ({}).{detail}",
                outcome.method
            ));
        }
        return DispatchOutcome::reply(format!(
            "⚙️ Restarting the gateway via {}; give me a few seconds to come back online.",
            outcome.method
        ));
    }

    // 6. Help and command listing.
    if allow_text_commands && body == "/help" {
        if !command.is_authorized_sender {
            debug!(sender = command.sender_label(), "ignoring /help from unauthorized sender");
            return DispatchOutcome::stop();
        }
        return DispatchOutcome::reply(build_help_message(registry, config));
    }
    if allow_text_commands && body == "/commands" {
        if !command.is_authorized_sender {
            debug!(sender = command.sender_label(), "ignoring /commands from unauthorized sender");
            return DispatchOutcome::stop();
        }
        return DispatchOutcome::reply(build_commands_message(registry, config));
    }

    // 7. Status.
    let status_requested = directives.has_status_directive || body == "/status";
    if allow_text_commands && status_requested {
        if !command.is_authorized_sender {
            debug!(sender = command.sender_label(), "ignoring /status from unauthorized sender");
            return DispatchOutcome::stop();
        }
        let usage_line = match host.usage() {
            Some(probe) => tokio::time::timeout(
                Duration::from_millis(USAGE_FETCH_TIMEOUT_MS),
                probe.fetch_usage_line(),
            )
            .await
            .ok()
            .flatten(),
            None => None,
        };
        let provider = session_entry
            .as_ref()
            .and_then(|entry| entry.provider.clone())
            .or_else(|| (!command.provider.is_empty()).then(|| command.provider.clone()))
            .unwrap_or_else(|| config.agent.provider.clone());
        let queue = resolve_queue_settings(config, session_entry.as_ref());
        let queue_key = session_key
            .as_deref()
            .or_else(|| session_entry.as_ref().and_then(|e| e.session_id.as_deref()));
        let queue_depth = queue_key.map(|key| host.queue_depth(key)).unwrap_or(0);
        let group_activation = is_group.then(|| {
            session_entry
                .as_ref()
                .and_then(|entry| entry.group_activation)
                .unwrap_or(config.session.group_activation)
        });
        let report = StatusReport {
            provider: &provider,
            model: &config.agent.model,
            context_tokens: Some(config.agent.context_tokens),
            entry: session_entry.as_ref(),
            session_key: session_key.as_deref(),
            group_activation,
            queue,
            queue_depth,
            auth_label: host.auth_profile_label(),
            usage_line,
        };
        return DispatchOutcome::reply(build_status_message(&report));
    }

    // 8. Whoami.
    if allow_text_commands && body == "/whoami" {
        if !command.is_authorized_sender {
            debug!(sender = command.sender_label(), "ignoring /whoami from unauthorized sender");
            return DispatchOutcome::stop();
        }
        let sender_id = ctx.sender_id.clone().unwrap_or_default();
        let sender_username = ctx.sender_username.clone().unwrap_or_default();
        let mut lines = vec!["🧭 Identity".to_string(), format!("Provider: {}", command.provider)];
        if !sender_id.is_empty() {
            lines.push(format!("User id: {sender_id}"));
        }
        if !sender_username.is_empty() {
            let handle = if sender_username.starts_with('@') {
                sender_username
            } else {
                format!("@{sender_username}")
            };
            lines.push(format!("Username: {handle}"));
        }
        if is_group {
            if let Some(from) = &ctx.from {
                lines.push(format!("Chat: {from}"));
            }
        }
        if let Some(thread) = ctx.message_thread_id {
            lines.push(format!("Thread: {thread}"));
        }
        if !sender_id.is_empty() {
            lines.push(format!("AllowFrom: {sender_id}"));
        }
        return DispatchOutcome::reply(lines.join("\n"));
    }

    // 9. Config.
    let config_action = allow_text_commands
        .then(|| parse_config_command(&body))
        .flatten();
    if let Some(action) = config_action {
        if !command.is_authorized_sender {
            debug!(sender = command.sender_label(), "ignoring /config from unauthorized sender");
            return DispatchOutcome::stop();
        }
        if !config.commands.config {
            return DispatchOutcome::reply(
                "⚠️ /config is disabled. Set commands.config=true to enable.",
            );
        }
        return handle_config_action(host, action).await;
    }

    // 10. Debug.
    let debug_action = allow_text_commands
        .then(|| parse_debug_command(&body))
        .flatten();
    if let Some(action) = debug_action {
        if !command.is_authorized_sender {
            debug!(sender = command.sender_label(), "ignoring /debug from unauthorized sender");
            return DispatchOutcome::stop();
        }
        if !config.commands.debug {
            return DispatchOutcome::reply(
                "⚠️ /debug is disabled. Set commands.debug=true to enable.",
            );
        }
        return handle_debug_action(host, action);
    }

    // 11. Stop.
    if allow_text_commands && body == "/stop" {
        if !command.is_authorized_sender {
            debug!(sender = command.sender_label(), "ignoring /stop from unauthorized sender");
            return DispatchOutcome::stop();
        }
        apply_abort(
            host,
            ctx,
            &command,
            session_key.as_deref(),
            session_entry.as_ref(),
            store.as_deref_mut(),
        )
        .await;
        return DispatchOutcome::reply("⚙️ Agent was aborted.");
    }

    // 12. Compact. Not gated on the text-command setting: /compact stays
    // reachable on surfaces whose native menu owns the other commands.
    if body == "/compact" || body.starts_with("/compact ") {
        if !command.is_authorized_sender {
            debug!(sender = command.sender_label(), "ignoring /compact from unauthorized sender");
            return DispatchOutcome::stop();
        }
        let session_id = session_entry
            .as_ref()
            .and_then(|entry| entry.session_id.clone());
        let Some(session_id) = session_id else {
            return DispatchOutcome::reply("⚙️ Compaction unavailable (missing session id).");
        };
        let entry = session_entry
            .clone()
            .unwrap_or_default();

        let runs = host.runs();
        if runs.is_active(&session_id) {
            // Compaction must not run concurrently with an active run
            // against the same session. A timed-out wait proceeds anyway.
            runs.abort(&session_id);
            runs
                .wait_for_end(&session_id, Duration::from_millis(RUN_END_WAIT_MS))
                .await;
        }
        let custom_instructions = extract_compact_instructions(ctx);
        let outcome = runs
            .compact(CompactRequest {
                session_id: session_id.clone(),
                session_key: session_key.clone(),
                provider: entry
                    .provider
                    .clone()
                    .or_else(|| (!command.provider.is_empty()).then(|| command.provider.clone())),
                model: Some(config.agent.model.clone()),
                custom_instructions,
                skills_snapshot: entry.skills_snapshot.clone(),
                owners: command.owner_list.clone(),
            })
            .await;

        let total_tokens = entry.total_tokens.unwrap_or(
            entry.input_tokens.unwrap_or(0) + entry.output_tokens.unwrap_or(0),
        );
        let context_summary = format_context_usage_short(
            (total_tokens > 0).then_some(total_tokens),
            Some(config.agent.context_tokens),
        );
        let label = if outcome.ok {
            if outcome.compacted {
                match outcome.stats.and_then(|stats| stats.tokens_before) {
                    Some(before) => format!("Compacted ({} before)", format_token_count(before)),
                    None => "Compacted".to_string(),
                }
            } else {
                "Compaction skipped".to_string()
            }
        } else {
            "Compaction failed".to_string()
        };
        if outcome.ok && outcome.compacted {
            if let (Some(store), Some(key)) = (store.as_deref_mut(), session_key.as_deref()) {
                let mut updated = entry;
                updated.compaction_count = Some(updated.compaction_count.unwrap_or(0) + 1);
                updated.touch();
                persist_entry(store, key, updated).await;
            }
        }
        let reason = outcome
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty());
        let line = match reason {
            Some(reason) => format!("{label}: {reason} • {context_summary}"),
            None => format!("{label} • {context_summary}"),
        };
        host.enqueue_system_event(&line, session_key.as_deref());
        return DispatchOutcome::reply(format!("⚙️ {line}"));
    }

    // 13. Implicit abort phrase. Deliberately not gated on sender
    // authorization: any participant may interrupt a runaway response.
    if allow_text_commands && is_abort_trigger(&command.raw_body_normalized) {
        apply_abort(
            host,
            ctx,
            &command,
            session_key.as_deref(),
            session_entry.as_ref(),
            store.as_deref_mut(),
        )
        .await;
        return DispatchOutcome::reply("⚙️ Agent was aborted.");
    }

    // 14. Fallback: send policy decides between silent drop and
    // pass-through.
    let chat_type = session_entry
        .as_ref()
        .and_then(|entry| entry.chat_type)
        .unwrap_or(ctx.chat_type);
    let policy = resolve_send_policy(&config.session.send_policy, chat_type, session_entry.as_ref());
    if policy == SendPolicy::Deny {
        debug!(session = session_key.as_deref().unwrap_or("<none>"), "send policy deny; dropping");
        return DispatchOutcome::stop();
    }
    DispatchOutcome::pass_through()
}

async fn handle_config_action(host: &dyn CommandHost, action: ConfigAction) -> DispatchOutcome {
    if let ConfigAction::Error { message } = &action {
        return DispatchOutcome::reply(format!("⚠️ {message}"));
    }
    let snapshot = host.config_store().read_snapshot();
    if !snapshot.valid || !snapshot.raw.is_object() {
        return DispatchOutcome::reply("⚠️ Config file is invalid; fix it before using /config.");
    }
    let mut base = snapshot.raw.clone();

    match action {
        ConfigAction::Show { path } => {
            match path.as_deref().map(str::trim).filter(|path| !path.is_empty()) {
                Some(raw_path) => {
                    let parsed = match parse_config_path(raw_path) {
                        Ok(parsed) => parsed,
                        Err(error) => return DispatchOutcome::reply(format!("⚠️ {error}")),
                    };
                    let value = get_value_at_path(&base, &parsed)
                        .cloned()
                        .unwrap_or(Value::Null);
                    DispatchOutcome::reply(format!(
                        "⚙️ Config {raw_path}:\n```json\n{}\n```",
                        pretty_json(&value)
                    ))
                }
                None => DispatchOutcome::reply(format!(
                    "⚙️ Config (raw):\n```json\n{}\n```",
                    pretty_json(&base)
                )),
            }
        }
        ConfigAction::Unset { path } => {
            let parsed = match parse_config_path(&path) {
                Ok(parsed) => parsed,
                Err(error) => return DispatchOutcome::reply(format!("⚠️ {error}")),
            };
            if !unset_value_at_path(&mut base, &parsed) {
                return DispatchOutcome::reply(format!("⚙️ No config value found for {path}."));
            }
            if let ConfigValidation::Invalid(issues) = validate_config_object(&base) {
                if let Some(issue) = issues.first() {
                    return DispatchOutcome::reply(format!(
                        "⚠️ Config invalid after unset ({}: {}).",
                        issue.path, issue.message
                    ));
                }
            }
            if let Err(error) = host.config_store().write(&base).await {
                warn!(error = %error, "config write failed");
                return DispatchOutcome::reply(format!("⚠️ Failed to write config: {error}"));
            }
            DispatchOutcome::reply(format!("⚙️ Config updated: {path} removed."))
        }
        ConfigAction::Set { path, value } => {
            let parsed = match parse_config_path(&path) {
                Ok(parsed) => parsed,
                Err(error) => return DispatchOutcome::reply(format!("⚠️ {error}")),
            };
            set_value_at_path(&mut base, &parsed, value.clone());
            if let ConfigValidation::Invalid(issues) = validate_config_object(&base) {
                if let Some(issue) = issues.first() {
                    return DispatchOutcome::reply(format!(
                        "⚠️ Config invalid after set ({}: {}).",
                        issue.path, issue.message
                    ));
                }
            }
            if let Err(error) = host.config_store().write(&base).await {
                warn!(error = %error, "config write failed");
                return DispatchOutcome::reply(format!("⚠️ Failed to write config: {error}"));
            }
            DispatchOutcome::reply(format!("⚙️ Config updated: {path}={}", value_label(&value)))
        }
        ConfigAction::Error { message } => DispatchOutcome::reply(format!("⚠️ {message}")),
    }
}

fn handle_debug_action(host: &dyn CommandHost, action: DebugAction) -> DispatchOutcome {
    let overrides = host.overrides();
    match action {
        DebugAction::Error { message } => DispatchOutcome::reply(format!("⚠️ {message}")),
        DebugAction::Show => {
            if overrides.is_empty() {
                return DispatchOutcome::reply("⚙️ Debug overrides: (none)");
            }
            DispatchOutcome::reply(format!(
                "⚙️ Debug overrides (memory-only):\n```json\n{}\n```",
                pretty_json(&overrides.snapshot())
            ))
        }
        DebugAction::Reset => {
            overrides.reset();
            DispatchOutcome::reply("⚙️ Debug overrides cleared; using config on disk.")
        }
        DebugAction::Unset { path } => match overrides.unset(&path) {
            Err(error) => DispatchOutcome::reply(format!("⚠️ {error}")),
            Ok(false) => DispatchOutcome::reply(format!("⚙️ No debug override found for {path}.")),
            Ok(true) => DispatchOutcome::reply(format!("⚙️ Debug override removed for {path}.")),
        },
        DebugAction::Set { path, value } => match overrides.set(&path, value.clone()) {
            Err(error) => DispatchOutcome::reply(format!("⚠️ {error}")),
            Ok(()) => DispatchOutcome::reply(format!(
                "⚙️ Debug override set: {path}={}",
                value_label(&value)
            )),
        },
    }
}

struct AbortTarget {
    session_id: Option<String>,
    entry: Option<SessionEntry>,
    key: Option<String>,
}

/// Pick what an abort applies to, trying in order: the per-message target
/// override, the store lookup (with legacy-key fallback), the
/// caller-supplied entry/key pair, and finally just a key for the
/// in-memory marker.
fn resolve_abort_target(
    ctx: &MsgContext,
    session_key: Option<&str>,
    session_entry: Option<&SessionEntry>,
    store: Option<&SessionStore>,
) -> AbortTarget {
    let target_key = ctx
        .command_target_session_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .or(session_key);
    if let (Some(store), Some(key)) = (store, target_key) {
        if let Some((resolved_key, entry)) = store.resolve_entry(key) {
            return AbortTarget {
                session_id: entry.session_id.clone(),
                entry: Some(entry.clone()),
                key: Some(resolved_key),
            };
        }
    }
    if let (Some(entry), Some(key)) = (session_entry, session_key) {
        return AbortTarget {
            session_id: entry.session_id.clone(),
            entry: Some(entry.clone()),
            key: Some(key.to_string()),
        };
    }
    AbortTarget {
        session_id: None,
        entry: None,
        key: target_key.map(str::to_string),
    }
}

/// Abort Protocol shared by `/stop` and the implicit abort phrase.
async fn apply_abort(
    host: &dyn CommandHost,
    ctx: &MsgContext,
    command: &CommandContext,
    session_key: Option<&str>,
    session_entry: Option<&SessionEntry>,
    mut store: Option<&mut SessionStore>,
) {
    let target = resolve_abort_target(ctx, session_key, session_entry, store.as_deref());
    if let Some(session_id) = &target.session_id {
        host.runs().abort(session_id);
    }
    match (target.entry, store.as_deref_mut(), target.key) {
        (Some(mut entry), Some(store), Some(key)) => {
            entry.aborted_last_run = Some(true);
            entry.touch();
            persist_entry(store, &key, entry).await;
        }
        _ => {
            // No persisted session to flag. The in-memory marker is weaker:
            // consulted only by a live run loop, lost across restarts.
            if let Some(abort_key) = &command.abort_key {
                host.abort_memory().set(abort_key);
            }
        }
    }
}

/// `/compact` instructions come from the raw body, not the normalized one:
/// normalization keeps only the first line, and instructions may span
/// several.
fn extract_compact_instructions(ctx: &MsgContext) -> Option<String> {
    let raw = ctx
        .command_body
        .as_deref()
        .or(ctx.raw_body.as_deref())
        .unwrap_or(&ctx.body);
    let raw = strip_structural_prefixes(raw);
    let stripped = if ctx.chat_type.is_group() {
        strip_mentions(&raw, ctx.bot_username.as_deref())
    } else {
        raw
    };
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.to_lowercase().starts_with("/compact") {
        return None;
    }
    let mut rest = trimmed["/compact".len()..].trim_start();
    if let Some(after_colon) = rest.strip_prefix(':') {
        rest = after_colon.trim_start();
    }
    (!rest.is_empty()).then(|| rest.to_string())
}

async fn persist_entry(store: &mut SessionStore, key: &str, entry: SessionEntry) {
    store.insert(key, entry);
    if let Err(error) = store.save().await {
        warn!(path = %store.path().display(), error = %error, "failed to persist session store");
    }
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wintermute_core::types::ChatType;

    #[test]
    fn compact_instructions_from_raw_body() {
        let ctx = MsgContext {
            body: "/compact keep the decisions\nand the open questions".to_string(),
            ..MsgContext::default()
        };
        assert_eq!(
            extract_compact_instructions(&ctx).as_deref(),
            Some("keep the decisions\nand the open questions")
        );
    }

    #[test]
    fn compact_instructions_colon_and_empty() {
        let ctx = MsgContext {
            body: "/compact: focus on the schema".to_string(),
            ..MsgContext::default()
        };
        assert_eq!(
            extract_compact_instructions(&ctx).as_deref(),
            Some("focus on the schema")
        );

        let ctx = MsgContext {
            body: "/compact".to_string(),
            ..MsgContext::default()
        };
        assert_eq!(extract_compact_instructions(&ctx), None);
    }

    #[test]
    fn compact_instructions_strip_mentions_in_groups() {
        let ctx = MsgContext {
            body: "@wintermute /compact keep it short".to_string(),
            chat_type: ChatType::Group,
            bot_username: Some("wintermute".to_string()),
            ..MsgContext::default()
        };
        assert_eq!(
            extract_compact_instructions(&ctx).as_deref(),
            Some("keep it short")
        );
    }

    #[test]
    fn compact_instructions_require_the_alias() {
        let ctx = MsgContext {
            body: "please /compact this".to_string(),
            ..MsgContext::default()
        };
        assert_eq!(extract_compact_instructions(&ctx), None);
    }
}
