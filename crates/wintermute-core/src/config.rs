use figment::{
    providers::{Env, Format, Json},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::types::{GroupActivation, QueueDrop, QueueMode, SendPolicy};

/// Bound on the status handler's usage fetch. A slow metrics backend must
/// never stall `/status`; past this the usage line is simply omitted.
pub const USAGE_FETCH_TIMEOUT_MS: u64 = 3_500;
/// How long `/compact` waits for an aborted run to acknowledge completion
/// before proceeding anyway.
pub const RUN_END_WAIT_MS: u64 = 15_000;

/// Top-level config (wintermute.json + WINTERMUTE_* env overrides).
///
/// The same file is the target of the `/config` chat command: reads go
/// through [`crate::store::ConfigStore::read_snapshot`], mutations are
/// validated as a whole via [`crate::validate::validate_config_object`]
/// before any write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WintermuteConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Identity of the embedded agent, surfaced by `/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Context window size used for usage percentages.
    #[serde(default = "default_context_tokens")]
    pub context_tokens: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            context_tokens: default_context_tokens(),
        }
    }
}

/// Gates for the chat command surface.
///
/// `config`, `debug` and `bash` are opt-in: they expose the host's
/// configuration and shell and stay off unless explicitly enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandsConfig {
    #[serde(default)]
    pub config: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub bash: bool,
    #[serde(default)]
    pub restart: bool,
    /// When false, text aliases are ignored on surfaces that register
    /// native command menus (listed in `native_surfaces`).
    #[serde(default = "bool_true")]
    pub text: bool,
    /// Surfaces with a native command menu of their own.
    #[serde(default = "default_native_surfaces")]
    pub native_surfaces: Vec<String>,
    /// Senders allowed to issue commands. Entries match sender id or
    /// username (leading `@` optional); `"*"` allows everyone. Empty
    /// means nobody is authorized.
    #[serde(default)]
    pub allow_from: Vec<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            config: false,
            debug: false,
            bash: false,
            restart: false,
            text: true,
            native_surfaces: default_native_surfaces(),
            allow_from: Vec::new(),
        }
    }
}

/// Session-level defaults: send policy, group activation, followup queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default)]
    pub send_policy: SendPolicyConfig,
    #[serde(default = "default_group_activation")]
    pub group_activation: GroupActivation,
    #[serde(default)]
    pub queue: QueueConfig,
    /// Session store location. `None` means the store lives next to the
    /// config file (`sessions.json`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            send_policy: SendPolicyConfig::default(),
            group_activation: default_group_activation(),
            queue: QueueConfig::default(),
            store: None,
        }
    }
}

/// Send-policy defaults. A session-level override (set via `/send`) takes
/// precedence; otherwise the chat-type default applies, then `default`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendPolicyConfig {
    #[serde(default = "default_send_policy")]
    pub default: SendPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<SendPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct: Option<SendPolicy>,
}

impl Default for SendPolicyConfig {
    fn default() -> Self {
        Self {
            default: default_send_policy(),
            group: None,
            direct: None,
        }
    }
}

/// Followup-queue defaults; sessions may override via `queue*` entry fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    #[serde(default = "default_queue_mode")]
    pub mode: QueueMode,
    #[serde(default = "default_queue_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_queue_cap")]
    pub cap: u64,
    #[serde(default = "default_queue_drop")]
    pub drop: QueueDrop,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            mode: default_queue_mode(),
            debounce_ms: default_queue_debounce_ms(),
            cap: default_queue_cap(),
            drop: default_queue_drop(),
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_provider() -> String {
    "anthropic".to_string()
}
fn default_model() -> String {
    "claude-sonnet-4-6".to_string()
}
fn default_context_tokens() -> u64 {
    200_000
}
fn default_native_surfaces() -> Vec<String> {
    vec!["telegram".to_string(), "discord".to_string()]
}
fn default_group_activation() -> GroupActivation {
    GroupActivation::Mention
}
fn default_send_policy() -> SendPolicy {
    SendPolicy::Allow
}
fn default_queue_mode() -> QueueMode {
    QueueMode::Collect
}
fn default_queue_debounce_ms() -> u64 {
    1_500
}
fn default_queue_cap() -> u64 {
    8
}
fn default_queue_drop() -> QueueDrop {
    QueueDrop::Oldest
}

impl WintermuteConfig {
    /// Load config from a JSON file with WINTERMUTE_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.wintermute/wintermute.json
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: WintermuteConfig = Figment::new()
            .merge(Json::file(&path))
            .merge(Env::prefixed("WINTERMUTE_").split("_"))
            .extract()
            .map_err(|e| crate::error::WintermuteError::Config(e.to_string()))?;

        Ok(config)
    }
}

pub fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.wintermute/wintermute.json", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_closed() {
        let cfg = WintermuteConfig::default();
        assert!(!cfg.commands.config);
        assert!(!cfg.commands.debug);
        assert!(!cfg.commands.bash);
        assert!(!cfg.commands.restart);
        assert!(cfg.commands.text);
        assert!(cfg.commands.allow_from.is_empty());
    }

    #[test]
    fn camel_case_round_trip() {
        let cfg = WintermuteConfig::default();
        let json = serde_json::to_value(&cfg).unwrap();
        assert!(json["commands"]["allowFrom"].is_array());
        assert!(json["session"]["queue"]["debounceMs"].is_u64());
        let back: WintermuteConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back.session.queue.debounce_ms, cfg.session.queue.debounce_ms);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: WintermuteConfig =
            serde_json::from_str(r#"{"commands":{"bash":true}}"#).unwrap();
        assert!(cfg.commands.bash);
        assert!(cfg.commands.text);
        assert_eq!(cfg.agent.context_tokens, 200_000);
    }
}
