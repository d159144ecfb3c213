//! Reply text builders: `/help`, `/commands`, `/status`, token formatting.

use wintermute_core::config::WintermuteConfig;
use wintermute_core::types::GroupActivation;
use wintermute_sessions::SessionEntry;

use crate::queue::QueueSettings;
use crate::registry::CommandRegistry;

/// Compact token formatting: `842`, `1.5k`, `86k`, `1.2M`.
pub fn format_token_count(tokens: u64) -> String {
    if tokens < 1_000 {
        return tokens.to_string();
    }
    if tokens < 1_000_000 {
        let thousands = tokens as f64 / 1_000.0;
        return if thousands < 10.0 {
            format!("{thousands:.1}k")
        } else {
            format!("{thousands:.0}k")
        };
    }
    let millions = tokens as f64 / 1_000_000.0;
    format!("{millions:.1}M")
}

/// One-glance context usage: `86k/200k (43%)`, degrading gracefully when
/// either side is unknown.
pub fn format_context_usage_short(total: Option<u64>, context_window: Option<u64>) -> String {
    match (total.filter(|t| *t > 0), context_window.filter(|c| *c > 0)) {
        (Some(total), Some(window)) => {
            let percent = (total as f64 / window as f64 * 100.0).round() as u64;
            format!(
                "{}/{} ({percent}%)",
                format_token_count(total),
                format_token_count(window)
            )
        }
        (Some(total), None) => format!("{} tokens", format_token_count(total)),
        (None, Some(window)) => format!("0/{}", format_token_count(window)),
        (None, None) => "no usage recorded".to_string(),
    }
}

/// `/help`: enabled commands with their descriptions.
pub fn build_help_message(registry: &CommandRegistry, config: &WintermuteConfig) -> String {
    let mut lines = vec!["🤖 Commands".to_string()];
    for command in registry.list_for_config(config) {
        let Some(alias) = command.text_aliases.first() else {
            continue;
        };
        let suffix = if command.accepts_args { " …" } else { "" };
        lines.push(format!("{alias}{suffix} — {}", command.description));
    }
    lines.join("\n")
}

/// `/commands`: every enabled alias, canonical first.
pub fn build_commands_message(registry: &CommandRegistry, config: &WintermuteConfig) -> String {
    let mut lines = vec!["🤖 Text commands".to_string()];
    for command in registry.list_for_config(config) {
        if command.text_aliases.is_empty() {
            continue;
        }
        let canonical = command.canonical();
        let extra: Vec<&str> = command
            .text_aliases
            .iter()
            .map(String::as_str)
            .filter(|alias| !alias.eq_ignore_ascii_case(&canonical))
            .collect();
        if extra.is_empty() {
            lines.push(canonical);
        } else {
            lines.push(format!("{canonical} (also {})", extra.join(", ")));
        }
    }
    lines.join("\n")
}

/// Inputs for the `/status` snapshot. The usage line is fetched by the
/// caller under its own timeout; `None` omits it.
#[derive(Debug, Clone)]
pub struct StatusReport<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub context_tokens: Option<u64>,
    pub entry: Option<&'a SessionEntry>,
    pub session_key: Option<&'a str>,
    pub group_activation: Option<GroupActivation>,
    pub queue: QueueSettings,
    pub queue_depth: u64,
    pub auth_label: Option<String>,
    pub usage_line: Option<String>,
}

pub fn build_status_message(report: &StatusReport<'_>) -> String {
    let total_tokens = report.entry.and_then(|entry| {
        entry
            .total_tokens
            .or_else(|| match (entry.input_tokens, entry.output_tokens) {
                (None, None) => None,
                (input, output) => Some(input.unwrap_or(0) + output.unwrap_or(0)),
            })
    });
    let context_window = report
        .context_tokens
        .or_else(|| report.entry.and_then(|entry| entry.context_tokens));

    let mut lines = vec![
        format!("🤖 {}/{}", report.provider, report.model),
        format!(
            "Context: {}",
            format_context_usage_short(total_tokens, context_window)
        ),
    ];
    if let Some(auth) = &report.auth_label {
        lines.push(format!("Auth: {auth}"));
    }
    if let Some(key) = report.session_key {
        lines.push(format!("Session: {key}"));
    }
    if let Some(activation) = report.group_activation {
        lines.push(format!("Activation: {activation}"));
    }
    let mut queue_line = format!("Queue: {}, depth {}", report.queue.mode, report.queue_depth);
    if report.queue.overridden {
        queue_line.push_str(&format!(
            " (debounce {}ms, cap {}, drop {})",
            report.queue.debounce_ms, report.queue.cap, report.queue.drop
        ));
    }
    lines.push(queue_line);
    if let Some(count) = report
        .entry
        .and_then(|entry| entry.compaction_count)
        .filter(|count| *count > 0)
    {
        lines.push(format!("Compactions: {count}"));
    }
    if let Some(usage) = &report.usage_line {
        lines.push(usage.clone());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::resolve_queue_settings;
    use wintermute_core::types::QueueDrop;

    #[test]
    fn token_counts_scale() {
        assert_eq!(format_token_count(842), "842");
        assert_eq!(format_token_count(1_500), "1.5k");
        assert_eq!(format_token_count(86_000), "86k");
        assert_eq!(format_token_count(200_000), "200k");
        assert_eq!(format_token_count(1_230_000), "1.2M");
    }

    #[test]
    fn context_usage_degrades_gracefully() {
        assert_eq!(
            format_context_usage_short(Some(86_000), Some(200_000)),
            "86k/200k (43%)"
        );
        assert_eq!(format_context_usage_short(Some(1_500), None), "1.5k tokens");
        assert_eq!(format_context_usage_short(None, Some(200_000)), "0/200k");
        assert_eq!(format_context_usage_short(None, None), "no usage recorded");
        assert_eq!(format_context_usage_short(Some(0), None), "no usage recorded");
    }

    #[test]
    fn help_lists_only_enabled_commands() {
        let registry = CommandRegistry::builtin();
        let config = WintermuteConfig::default();
        let help = build_help_message(registry, &config);
        assert!(help.contains("/help — Show available commands."));
        assert!(help.contains("/status"));
        assert!(!help.contains("/config"));
        assert!(!help.contains("/bash"));

        let mut config = config;
        config.commands.config = true;
        let help = build_help_message(registry, &config);
        assert!(help.contains("/config"));
    }

    #[test]
    fn commands_message_groups_aliases() {
        let registry = CommandRegistry::builtin();
        let config = WintermuteConfig::default();
        let listing = build_commands_message(registry, &config);
        assert!(listing.contains("/status (also /usage)"));
        assert!(listing.contains("/think (also /thinking, /t)"));
    }

    fn base_report<'a>(config: &'a WintermuteConfig, entry: &'a SessionEntry) -> StatusReport<'a> {
        StatusReport {
            provider: "anthropic",
            model: "claude-sonnet-4-6",
            context_tokens: Some(200_000),
            entry: Some(entry),
            session_key: Some("agent:main:telegram:42"),
            group_activation: None,
            queue: resolve_queue_settings(config, Some(entry)),
            queue_depth: 2,
            auth_label: Some("oauth (work)".to_string()),
            usage_line: None,
        }
    }

    #[test]
    fn status_snapshot_includes_core_lines() {
        let config = WintermuteConfig::default();
        let entry = SessionEntry {
            total_tokens: Some(86_000),
            ..SessionEntry::default()
        };
        let text = build_status_message(&base_report(&config, &entry));
        assert!(text.starts_with("🤖 anthropic/claude-sonnet-4-6"));
        assert!(text.contains("Context: 86k/200k (43%)"));
        assert!(text.contains("Auth: oauth (work)"));
        assert!(text.contains("Queue: collect, depth 2"));
        assert!(!text.contains("debounce"));
        assert!(!text.contains("Usage:"));
        assert!(!text.contains("Activation:"));
    }

    #[test]
    fn status_snapshot_shows_overrides_and_usage() {
        let config = WintermuteConfig::default();
        let entry = SessionEntry {
            input_tokens: Some(50_000),
            output_tokens: Some(36_000),
            compaction_count: Some(3),
            queue_cap: Some(4),
            queue_drop: Some(QueueDrop::Newest),
            ..SessionEntry::default()
        };
        let mut report = base_report(&config, &entry);
        report.group_activation = Some(GroupActivation::Mention);
        report.usage_line = Some("📊 Usage: 4h left".to_string());
        let text = build_status_message(&report);
        assert!(text.contains("Context: 86k/200k (43%)"));
        assert!(text.contains("Activation: mention"));
        assert!(text.contains("(debounce 1500ms, cap 4, drop newest)"));
        assert!(text.contains("Compactions: 3"));
        assert!(text.ends_with("📊 Usage: 4h left"));
    }
}
