//! `/debug` sub-command parsing: memory-only override controls.

use serde_json::Value;

use crate::activation::command_rest;
use crate::config_cmd::{parse_value, split_word};

#[derive(Debug, Clone, PartialEq)]
pub enum DebugAction {
    Show,
    Reset,
    Set { path: String, value: Value },
    Unset { path: String },
    Error { message: String },
}

const DEBUG_USAGE: &str =
    "Usage: /debug show | /debug set <path> <value> | /debug unset <path> | /debug reset";

pub fn parse_debug_command(body: &str) -> Option<DebugAction> {
    let rest = command_rest(body, "/debug")?.trim();
    if rest.is_empty() {
        return Some(DebugAction::Show);
    }
    let (verb, tail) = split_word(rest);
    let action = match verb.to_lowercase().as_str() {
        "show" => DebugAction::Show,
        "reset" => DebugAction::Reset,
        "set" => {
            let (path, value_raw) = split_word(tail);
            if path.is_empty() || value_raw.is_empty() {
                DebugAction::Error {
                    message: "Usage: /debug set <path> <value>".to_string(),
                }
            } else {
                DebugAction::Set {
                    path: path.to_string(),
                    value: parse_value(value_raw),
                }
            }
        }
        "unset" => {
            if tail.is_empty() {
                DebugAction::Error {
                    message: "Usage: /debug unset <path>".to_string(),
                }
            } else {
                DebugAction::Unset {
                    path: tail.to_string(),
                }
            }
        }
        _ => DebugAction::Error {
            message: DEBUG_USAGE.to_string(),
        },
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_debug_shows_overrides() {
        assert_eq!(parse_debug_command("/debug"), Some(DebugAction::Show));
        assert_eq!(parse_debug_command("/debug show"), Some(DebugAction::Show));
    }

    #[test]
    fn reset_and_unset() {
        assert_eq!(parse_debug_command("/debug reset"), Some(DebugAction::Reset));
        assert_eq!(
            parse_debug_command("/debug unset agent.model"),
            Some(DebugAction::Unset {
                path: "agent.model".to_string()
            })
        );
    }

    #[test]
    fn set_parses_values() {
        assert_eq!(
            parse_debug_command("/debug set commands.bash true"),
            Some(DebugAction::Set {
                path: "commands.bash".to_string(),
                value: json!(true),
            })
        );
    }

    #[test]
    fn malformed_input_yields_usage() {
        assert!(matches!(
            parse_debug_command("/debug set onlypath"),
            Some(DebugAction::Error { .. })
        ));
        assert!(matches!(
            parse_debug_command("/debug wat"),
            Some(DebugAction::Error { .. })
        ));
    }

    #[test]
    fn unrelated_bodies_do_not_match() {
        assert_eq!(parse_debug_command("/debugger on"), None);
    }
}
