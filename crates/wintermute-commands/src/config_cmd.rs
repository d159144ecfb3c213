//! `/config` sub-command parsing.
//!
//! The dispatch handler owns the read-validate-write cycle; this module
//! only decides what the sender asked for. Values parse as JSON when they
//! can and fall back to plain strings, so `/config set commands.bash true`
//! sets a boolean while `/config set agent.model claude-opus-4` sets a
//! string without quoting gymnastics.

use serde_json::Value;

use crate::activation::command_rest;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    Show { path: Option<String> },
    Set { path: String, value: Value },
    Unset { path: String },
    Error { message: String },
}

const CONFIG_USAGE: &str =
    "Usage: /config show [path] | /config set <path> <value> | /config unset <path>";

pub fn parse_config_command(body: &str) -> Option<ConfigAction> {
    let rest = command_rest(body, "/config")?.trim();
    if rest.is_empty() {
        return Some(ConfigAction::Show { path: None });
    }
    let (verb, tail) = split_word(rest);
    let action = match verb.to_lowercase().as_str() {
        "show" => ConfigAction::Show {
            path: (!tail.is_empty()).then(|| tail.to_string()),
        },
        "set" => {
            let (path, value_raw) = split_word(tail);
            if path.is_empty() || value_raw.is_empty() {
                ConfigAction::Error {
                    message: "Usage: /config set <path> <value>".to_string(),
                }
            } else {
                ConfigAction::Set {
                    path: path.to_string(),
                    value: parse_value(value_raw),
                }
            }
        }
        "unset" => {
            if tail.is_empty() {
                ConfigAction::Error {
                    message: "Usage: /config unset <path>".to_string(),
                }
            } else {
                ConfigAction::Unset {
                    path: tail.to_string(),
                }
            }
        }
        _ => ConfigAction::Error {
            message: CONFIG_USAGE.to_string(),
        },
    };
    Some(action)
}

/// First whitespace-separated word and the trimmed remainder.
pub(crate) fn split_word(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim_start()),
        None => (text, ""),
    }
}

/// JSON when it parses, string otherwise.
pub(crate) fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Render a value the way confirmations quote it: strings quoted, the rest
/// as compact JSON.
pub(crate) fn value_label(value: &Value) -> String {
    match value {
        Value::String(text) => format!("\"{text}\""),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_config_shows_everything() {
        assert_eq!(
            parse_config_command("/config"),
            Some(ConfigAction::Show { path: None })
        );
    }

    #[test]
    fn show_with_path() {
        assert_eq!(
            parse_config_command("/config show commands.bash"),
            Some(ConfigAction::Show {
                path: Some("commands.bash".to_string())
            })
        );
    }

    #[test]
    fn set_parses_json_values() {
        assert_eq!(
            parse_config_command("/config set commands.bash true"),
            Some(ConfigAction::Set {
                path: "commands.bash".to_string(),
                value: json!(true),
            })
        );
        assert_eq!(
            parse_config_command("/config set session.queue.cap 5"),
            Some(ConfigAction::Set {
                path: "session.queue.cap".to_string(),
                value: json!(5),
            })
        );
    }

    #[test]
    fn set_falls_back_to_string() {
        assert_eq!(
            parse_config_command("/config set agent.model claude-opus-4"),
            Some(ConfigAction::Set {
                path: "agent.model".to_string(),
                value: json!("claude-opus-4"),
            })
        );
    }

    #[test]
    fn multi_word_value_stays_one_string() {
        assert_eq!(
            parse_config_command("/config set agent.model hello world"),
            Some(ConfigAction::Set {
                path: "agent.model".to_string(),
                value: json!("hello world"),
            })
        );
    }

    #[test]
    fn missing_arguments_yield_usage_errors() {
        assert!(matches!(
            parse_config_command("/config set commands.bash"),
            Some(ConfigAction::Error { .. })
        ));
        assert!(matches!(
            parse_config_command("/config unset"),
            Some(ConfigAction::Error { .. })
        ));
        assert!(matches!(
            parse_config_command("/config frobnicate"),
            Some(ConfigAction::Error { .. })
        ));
    }

    #[test]
    fn unrelated_bodies_do_not_match() {
        assert_eq!(parse_config_command("/configure x"), None);
        assert_eq!(parse_config_command("hello"), None);
    }
}
