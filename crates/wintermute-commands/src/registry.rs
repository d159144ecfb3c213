//! The chat command registry and its derived lookup structures.
//!
//! The registry is built once, validated as a whole, and never changes for
//! the life of the process. Configuration never alters its shape; it only
//! decides which commands are enabled or listed at dispatch time. Alias and
//! detection indexes are derived inside the constructor so that a bad alias
//! table is caught before any message is processed.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wintermute_core::config::WintermuteConfig;

/// Where a command is reachable from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandScope {
    /// Text aliases only; never registered with a platform command menu.
    #[serde(rename = "text")]
    TextOnly,
    /// Platform command menu only; no text aliases.
    #[serde(rename = "native")]
    NativeOnly,
    Both,
}

/// How a command invocation reached us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandSource {
    Text,
    Native,
}

/// One logical command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDefinition {
    /// Stable identifier; `/{key}` is the canonical text form.
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_name: Option<String>,
    pub description: String,
    pub text_aliases: Vec<String>,
    pub accepts_args: bool,
    pub scope: CommandScope,
}

impl CommandDefinition {
    pub fn builder(key: &str, description: &str) -> CommandBuilder {
        CommandBuilder {
            key: key.to_string(),
            native_name: None,
            description: description.to_string(),
            aliases: Vec::new(),
            accepts_args: false,
            scope: None,
        }
    }

    /// Canonical `/{key}` form.
    pub fn canonical(&self) -> String {
        format!("/{}", self.key)
    }
}

/// Builder mirroring how definitions are declared: scope is inferred from
/// what is set (native name and aliases → `Both`, native name alone →
/// `NativeOnly`, otherwise `TextOnly`) unless forced explicitly.
pub struct CommandBuilder {
    key: String,
    native_name: Option<String>,
    description: String,
    aliases: Vec<String>,
    accepts_args: bool,
    scope: Option<CommandScope>,
}

impl CommandBuilder {
    pub fn native_name(mut self, name: &str) -> Self {
        self.native_name = Some(name.to_string());
        self
    }

    pub fn alias(mut self, alias: &str) -> Self {
        let trimmed = alias.trim();
        if trimmed.is_empty() {
            return self;
        }
        let lowered = trimmed.to_lowercase();
        if self
            .aliases
            .iter()
            .any(|existing| existing.to_lowercase() == lowered)
        {
            return self;
        }
        self.aliases.push(trimmed.to_string());
        self
    }

    pub fn accepts_args(mut self) -> Self {
        self.accepts_args = true;
        self
    }

    pub fn scope(mut self, scope: CommandScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn build(self) -> CommandDefinition {
        let scope = self.scope.unwrap_or(match (&self.native_name, self.aliases.is_empty()) {
            (Some(_), false) => CommandScope::Both,
            (Some(_), true) => CommandScope::NativeOnly,
            (None, _) => CommandScope::TextOnly,
        });
        CommandDefinition {
            key: self.key,
            native_name: self.native_name,
            description: self.description,
            text_aliases: self.aliases,
            accepts_args: self.accepts_args,
            scope,
        }
    }
}

/// Shape of a command for platforms that register native menus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCommandSpec {
    pub name: String,
    pub description: String,
    pub accepts_args: bool,
}

/// A registry construction failure. Always fatal: the process must not
/// start with a registry that could mis-route a command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate command key: {0}")]
    DuplicateKey(String),
    #[error("text-only command has native name: {0}")]
    TextOnlyWithNativeName(String),
    #[error("text-only command missing text alias: {0}")]
    TextOnlyWithoutAlias(String),
    #[error("native command missing native name: {0}")]
    MissingNativeName(String),
    #[error("native-only command has text aliases: {0}")]
    NativeOnlyWithAliases(String),
    #[error("duplicate native command: {0}")]
    DuplicateNativeName(String),
    #[error("command alias missing leading '/': {0}")]
    AliasMissingSlash(String),
    #[error("duplicate command alias: {0}")]
    DuplicateAlias(String),
    #[error("detection pattern failed to compile: {0}")]
    Pattern(String),
}

/// Resolution record for one recognized alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSpec {
    /// The `/{key}` form emitted by normalization.
    pub canonical: String,
    pub accepts_args: bool,
}

/// Lowercased alias → canonical form and argument policy.
#[derive(Debug)]
pub struct AliasIndex {
    map: HashMap<String, AliasSpec>,
}

impl AliasIndex {
    fn build(commands: &[CommandDefinition]) -> Self {
        let mut map = HashMap::new();
        for command in commands {
            let spec = AliasSpec {
                canonical: command.canonical(),
                accepts_args: command.accepts_args,
            };
            for alias in &command.text_aliases {
                let lowered = alias.trim().to_lowercase();
                if lowered.is_empty() {
                    continue;
                }
                // First writer wins; construction already rejects collisions.
                map.entry(lowered).or_insert_with(|| spec.clone());
            }
        }
        Self { map }
    }

    pub fn resolve(&self, lowered_alias: &str) -> Option<&AliasSpec> {
        self.map.get(lowered_alias)
    }

    pub fn contains(&self, lowered_alias: &str) -> bool {
        self.map.contains_key(lowered_alias)
    }
}

/// Cheap classifier for "does this text look like a command".
///
/// `exact` short-circuits bare aliases; the pattern validates whether any
/// trailing content is admissible for the matched alias's argument policy.
/// Shape only: a pattern hit still needs an alias lookup to confirm
/// identity.
#[derive(Debug)]
pub struct DetectionIndex {
    exact: HashSet<String>,
    pattern: Option<Regex>,
}

impl DetectionIndex {
    fn build(commands: &[CommandDefinition]) -> Result<Self, RegistryError> {
        let mut exact = HashSet::new();
        let mut alternates = Vec::new();
        for command in commands {
            for alias in &command.text_aliases {
                let lowered = alias.trim().to_lowercase();
                if lowered.is_empty() {
                    continue;
                }
                exact.insert(lowered.clone());
                let escaped = regex::escape(&lowered);
                if command.accepts_args {
                    alternates.push(format!(r"{escaped}(?:\s+.+|\s*:\s*.*)?"));
                } else {
                    alternates.push(format!(r"{escaped}(?:\s*:\s*)?"));
                }
            }
        }
        let pattern = if alternates.is_empty() {
            None
        } else {
            let combined = format!("^(?:{})$", alternates.join("|"));
            let regex = RegexBuilder::new(&combined)
                .case_insensitive(true)
                .build()
                .map_err(|e| RegistryError::Pattern(e.to_string()))?;
            Some(regex)
        };
        Ok(Self { exact, pattern })
    }

    pub fn is_exact(&self, lowered_body: &str) -> bool {
        self.exact.contains(lowered_body)
    }

    pub fn matches_shape(&self, lowered_body: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(lowered_body))
    }
}

/// Immutable, validated command set plus its derived indexes.
#[derive(Debug)]
pub struct CommandRegistry {
    commands: Vec<CommandDefinition>,
    alias_index: AliasIndex,
    detection: DetectionIndex,
}

impl CommandRegistry {
    /// Validate `commands` and build the registry.
    ///
    /// Enforced here, fatally:
    /// - keys unique
    /// - text-only commands have at least one alias and no native name
    /// - native-scoped commands have a native name, unique case-insensitively
    /// - native-only commands have no aliases
    /// - every alias starts with `/` and is unique case-insensitively
    ///   across the whole registry
    pub fn new(commands: Vec<CommandDefinition>) -> Result<Self, RegistryError> {
        let mut keys = HashSet::new();
        let mut native_names = HashSet::new();
        let mut aliases = HashSet::new();
        for command in &commands {
            if !keys.insert(command.key.clone()) {
                return Err(RegistryError::DuplicateKey(command.key.clone()));
            }
            let native_name = command
                .native_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty());
            match command.scope {
                CommandScope::TextOnly => {
                    if native_name.is_some() {
                        return Err(RegistryError::TextOnlyWithNativeName(command.key.clone()));
                    }
                    if command.text_aliases.is_empty() {
                        return Err(RegistryError::TextOnlyWithoutAlias(command.key.clone()));
                    }
                }
                CommandScope::NativeOnly | CommandScope::Both => {
                    let Some(name) = native_name else {
                        return Err(RegistryError::MissingNativeName(command.key.clone()));
                    };
                    if !native_names.insert(name.to_lowercase()) {
                        return Err(RegistryError::DuplicateNativeName(name.to_string()));
                    }
                }
            }
            if command.scope == CommandScope::NativeOnly && !command.text_aliases.is_empty() {
                return Err(RegistryError::NativeOnlyWithAliases(command.key.clone()));
            }
            for alias in &command.text_aliases {
                if !alias.starts_with('/') {
                    return Err(RegistryError::AliasMissingSlash(alias.clone()));
                }
                if !aliases.insert(alias.to_lowercase()) {
                    return Err(RegistryError::DuplicateAlias(alias.clone()));
                }
            }
        }
        let alias_index = AliasIndex::build(&commands);
        let detection = DetectionIndex::build(&commands)?;
        Ok(Self {
            commands,
            alias_index,
            detection,
        })
    }

    /// The built-in command set, constructed and validated once per process.
    pub fn builtin() -> &'static CommandRegistry {
        static REGISTRY: OnceLock<CommandRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            // The definitions below are fixed data; a validation failure is
            // a programming error and must stop the process.
            CommandRegistry::new(builtin_definitions())
                .expect("builtin command registry must validate")
        })
    }

    pub fn definitions(&self) -> &[CommandDefinition] {
        &self.commands
    }

    pub fn alias_index(&self) -> &AliasIndex {
        &self.alias_index
    }

    pub fn detection(&self) -> &DetectionIndex {
        &self.detection
    }

    /// Whether `key` is enabled under `config`. `config`, `debug` and
    /// `bash` are opt-in; everything else is always on.
    pub fn is_enabled(&self, config: &WintermuteConfig, key: &str) -> bool {
        match key {
            "config" => config.commands.config,
            "debug" => config.commands.debug,
            "bash" => config.commands.bash,
            _ => true,
        }
    }

    pub fn list_for_config<'r>(&'r self, config: &WintermuteConfig) -> Vec<&'r CommandDefinition> {
        self.commands
            .iter()
            .filter(|command| self.is_enabled(config, &command.key))
            .collect()
    }

    /// Case-insensitive native-name lookup over native-scoped commands.
    pub fn find_by_native_name(&self, name: &str) -> Option<&CommandDefinition> {
        let lowered = name.trim().to_lowercase();
        self.commands.iter().find(|command| {
            command.scope != CommandScope::TextOnly
                && command
                    .native_name
                    .as_deref()
                    .is_some_and(|native| native.to_lowercase() == lowered)
        })
    }

    pub fn native_specs(&self) -> Vec<NativeCommandSpec> {
        self.commands
            .iter()
            .filter(|command| command.scope != CommandScope::TextOnly)
            .filter_map(|command| {
                command.native_name.as_ref().map(|name| NativeCommandSpec {
                    name: name.clone(),
                    description: command.description.clone(),
                    accepts_args: command.accepts_args,
                })
            })
            .collect()
    }

    pub fn native_specs_for_config(&self, config: &WintermuteConfig) -> Vec<NativeCommandSpec> {
        self.list_for_config(config)
            .into_iter()
            .filter(|command| command.scope != CommandScope::TextOnly)
            .filter_map(|command| {
                command.native_name.as_ref().map(|name| NativeCommandSpec {
                    name: name.clone(),
                    description: command.description.clone(),
                    accepts_args: command.accepts_args,
                })
            })
            .collect()
    }
}

/// Render a native invocation as canonical text, for surfaces that hand us
/// structured command payloads.
pub fn build_command_text(command_name: &str, args: Option<&str>) -> String {
    match args.map(str::trim).filter(|args| !args.is_empty()) {
        Some(args) => format!("/{command_name} {args}"),
        None => format!("/{command_name}"),
    }
}

fn builtin_definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::builder("help", "Show available commands.")
            .native_name("help")
            .alias("/help")
            .build(),
        CommandDefinition::builder("commands", "List all slash commands.")
            .native_name("commands")
            .alias("/commands")
            .build(),
        CommandDefinition::builder("status", "Show current status.")
            .native_name("status")
            .alias("/status")
            .alias("/usage")
            .build(),
        CommandDefinition::builder("whoami", "Show your sender id.")
            .native_name("whoami")
            .alias("/whoami")
            .alias("/id")
            .build(),
        CommandDefinition::builder("config", "Show or set config values.")
            .native_name("config")
            .alias("/config")
            .accepts_args()
            .build(),
        CommandDefinition::builder("debug", "Set runtime debug overrides.")
            .native_name("debug")
            .alias("/debug")
            .accepts_args()
            .build(),
        CommandDefinition::builder("cost", "Toggle per-response usage line.")
            .native_name("cost")
            .alias("/cost")
            .accepts_args()
            .build(),
        CommandDefinition::builder("stop", "Stop the current run.")
            .native_name("stop")
            .alias("/stop")
            .build(),
        CommandDefinition::builder("restart", "Restart the gateway.")
            .native_name("restart")
            .alias("/restart")
            .build(),
        CommandDefinition::builder("activation", "Set group activation mode.")
            .native_name("activation")
            .alias("/activation")
            .accepts_args()
            .build(),
        CommandDefinition::builder("send", "Set send policy.")
            .native_name("send")
            .alias("/send")
            .accepts_args()
            .build(),
        CommandDefinition::builder("reset", "Reset the current session.")
            .native_name("reset")
            .alias("/reset")
            .build(),
        CommandDefinition::builder("new", "Start a new session.")
            .native_name("new")
            .alias("/new")
            .build(),
        CommandDefinition::builder("compact", "Compact the session context.")
            .alias("/compact")
            .accepts_args()
            .scope(CommandScope::TextOnly)
            .build(),
        CommandDefinition::builder("think", "Set thinking level.")
            .native_name("think")
            .alias("/think")
            .alias("/thinking")
            .alias("/t")
            .accepts_args()
            .build(),
        CommandDefinition::builder("verbose", "Toggle verbose mode.")
            .native_name("verbose")
            .alias("/verbose")
            .alias("/v")
            .accepts_args()
            .build(),
        CommandDefinition::builder("reasoning", "Toggle reasoning visibility.")
            .native_name("reasoning")
            .alias("/reasoning")
            .alias("/reason")
            .accepts_args()
            .build(),
        CommandDefinition::builder("elevated", "Toggle elevated mode.")
            .native_name("elevated")
            .alias("/elevated")
            .alias("/elev")
            .accepts_args()
            .build(),
        CommandDefinition::builder("model", "Show or set the model.")
            .native_name("model")
            .alias("/model")
            .alias("/models")
            .accepts_args()
            .build(),
        CommandDefinition::builder("queue", "Adjust queue settings.")
            .native_name("queue")
            .alias("/queue")
            .accepts_args()
            .build(),
        CommandDefinition::builder("bash", "Run host shell commands (host-only).")
            .alias("/bash")
            .accepts_args()
            .scope(CommandScope::TextOnly)
            .build(),
    ]
}
