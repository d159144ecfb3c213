//! Turning raw message text into a canonical command body.
//!
//! Several syntaxes collapse into one: `/config: set x`, `/Config set x`
//! and `/config@botname set x` all normalize to `/config set x`. The
//! pipeline is pure and idempotent over recognized aliases; unrecognized
//! slash-prefixed text passes through unchanged so downstream resolvers
//! can treat it as "looks like a command, is not one of ours".

use std::sync::OnceLock;

use regex::Regex;

use wintermute_core::config::WintermuteConfig;

use crate::registry::{CommandDefinition, CommandRegistry, CommandSource};

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions<'a> {
    /// Bot handle for `@mention` suffix stripping, without the `@`.
    pub bot_username: Option<&'a str>,
}

fn colon_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/([^\s:]+)\s*:(.*)$").expect("static pattern"))
}

fn mention_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/([^\s@]+)@(\S+)(.*)$").expect("static pattern"))
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/(\S+)(?:\s+(.+))?$").expect("static pattern"))
}

fn token_head_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/([^\s:]+)(?:\s|$)").expect("static pattern"))
}

/// Normalize `raw` into a canonical command body.
///
/// Steps, in order: trim; keep only the first line; rewrite colon syntax;
/// strip a matching `@botname` suffix; exact alias shortcut; token match
/// honoring the alias's argument policy. Trailing text after a no-argument
/// alias deliberately leaves the body unchanged: the extra text invalidates
/// the match rather than being silently dropped.
pub fn normalize_command_body(
    raw: &str,
    registry: &CommandRegistry,
    options: NormalizeOptions<'_>,
) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with('/') {
        return trimmed.to_string();
    }

    let single_line = match trimmed.find('\n') {
        Some(newline) => trimmed[..newline].trim(),
        None => trimmed,
    };

    let normalized = match colon_re().captures(single_line) {
        Some(caps) => {
            let command = &caps[1];
            let rest = caps[2].trim_start();
            if rest.is_empty() {
                format!("/{command}")
            } else {
                format!("/{command} {rest}")
            }
        }
        None => single_line.to_string(),
    };

    let bot_username = options
        .bot_username
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty());
    let command_body = match (&bot_username, mention_re().captures(&normalized)) {
        (Some(bot), Some(caps)) if caps[2].to_lowercase() == *bot => {
            format!("/{}{}", &caps[1], &caps[3])
        }
        _ => normalized,
    };

    let lowered = command_body.to_lowercase();
    if let Some(spec) = registry.alias_index().resolve(&lowered) {
        return spec.canonical.clone();
    }

    let Some(caps) = token_re().captures(&command_body) else {
        return command_body;
    };
    let token_key = format!("/{}", caps[1].to_lowercase());
    let Some(spec) = registry.alias_index().resolve(&token_key) else {
        return command_body;
    };
    let rest = caps.get(2).map(|rest| rest.as_str().trim_start());
    match rest {
        Some(rest) if !rest.is_empty() => {
            if !spec.accepts_args {
                return command_body;
            }
            format!("{} {}", spec.canonical, rest)
        }
        _ => spec.canonical.clone(),
    }
}

/// Whether `raw` normalizes to something slash-prefixed.
pub fn is_command_message(raw: &str, registry: &CommandRegistry) -> bool {
    normalize_command_body(raw, registry, NormalizeOptions::default()).starts_with('/')
}

/// Resolve `raw` to the lowercased alias it invokes, if any.
///
/// Two stages: the detection exact-set and combined pattern validate the
/// *shape* (is trailing content admissible for that alias's argument
/// policy), then the leading-token lookup confirms *identity*.
pub fn resolve_text_alias(raw: &str, registry: &CommandRegistry) -> Option<String> {
    let normalized = normalize_command_body(raw, registry, NormalizeOptions::default());
    let trimmed = normalized.trim();
    if !trimmed.starts_with('/') {
        return None;
    }
    let detection = registry.detection();
    let lowered = trimmed.to_lowercase();
    if detection.is_exact(&lowered) {
        return Some(lowered);
    }
    if !detection.matches_shape(&lowered) {
        return None;
    }
    let caps = token_head_re().captures(&lowered)?;
    let token_key = format!("/{}", &caps[1]);
    registry
        .alias_index()
        .contains(&token_key)
        .then_some(token_key)
}

/// A fully resolved invocation: the owning definition plus trailing args
/// (only for commands that accept them).
#[derive(Debug, Clone)]
pub struct ResolvedCommand<'r> {
    pub command: &'r CommandDefinition,
    pub args: Option<String>,
}

pub fn resolve_text_command<'r>(
    raw: &str,
    registry: &'r CommandRegistry,
) -> Option<ResolvedCommand<'r>> {
    let normalized = normalize_command_body(raw, registry, NormalizeOptions::default());
    let trimmed = normalized.trim();
    let alias = resolve_text_alias(trimmed, registry)?;
    let spec = registry.alias_index().resolve(&alias)?;
    let command = registry
        .definitions()
        .iter()
        .find(|definition| definition.canonical() == spec.canonical)?;
    if !spec.accepts_args {
        return Some(ResolvedCommand {
            command,
            args: None,
        });
    }
    // The lowered alias may differ in byte length from the head token.
    let args = token_re()
        .captures(trimmed)
        .and_then(|caps| caps.get(2))
        .map(|args| args.as_str().trim())
        .unwrap_or_default();
    Some(ResolvedCommand {
        command,
        args: (!args.is_empty()).then(|| args.to_string()),
    })
}

/// Whether text aliases should be honored for this message.
///
/// Native invocations are always honored. Text parsing is on unless
/// `commands.text=false`, in which case it stays available only on
/// surfaces without a native command menu.
pub fn text_commands_allowed(
    config: &WintermuteConfig,
    surface: &str,
    source: Option<CommandSource>,
) -> bool {
    if source == Some(CommandSource::Native) {
        return true;
    }
    if config.commands.text {
        return true;
    }
    !is_native_command_surface(config, surface)
}

/// Whether `surface` registers a native command menu of its own.
pub fn is_native_command_surface(config: &WintermuteConfig, surface: &str) -> bool {
    let trimmed = surface.trim();
    if trimmed.is_empty() {
        return false;
    }
    let lowered = trimmed.to_lowercase();
    config
        .commands
        .native_surfaces
        .iter()
        .any(|candidate| candidate.to_lowercase() == lowered)
}
