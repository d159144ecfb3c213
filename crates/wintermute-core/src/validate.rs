//! Whole-object validation for the raw config file.
//!
//! `/config set` and `/config unset` mutate a deep copy of the on-disk
//! object and must re-validate the entire result before anything is written
//! back. Validation walks a static schema table so every failure carries the
//! dotted path of the offending key, then finishes with a typed extraction
//! into [`WintermuteConfig`].

use serde_json::Value;

use crate::config::WintermuteConfig;

/// One validation failure: where and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub path: String,
    pub message: String,
}

/// Outcome of validating a raw config object.
#[derive(Debug)]
pub enum ConfigValidation {
    Valid(WintermuteConfig),
    Invalid(Vec<ConfigIssue>),
}

impl ConfigValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, ConfigValidation::Valid(_))
    }
}

enum FieldKind {
    Bool,
    Str,
    OptStr,
    U64 { min: u64 },
    StrList,
    Enum(&'static [&'static str]),
    OptEnum(&'static [&'static str]),
    Object(&'static [FieldSpec]),
}

struct FieldSpec {
    key: &'static str,
    kind: FieldKind,
}

const SEND_POLICY_VALUES: &[&str] = &["allow", "deny"];
const ACTIVATION_VALUES: &[&str] = &["mention", "always"];
const QUEUE_MODE_VALUES: &[&str] = &["collect", "latest", "off"];
const QUEUE_DROP_VALUES: &[&str] = &["oldest", "newest"];

const AGENT_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "provider", kind: FieldKind::Str },
    FieldSpec { key: "model", kind: FieldKind::Str },
    FieldSpec { key: "contextTokens", kind: FieldKind::U64 { min: 1 } },
];

const COMMANDS_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "config", kind: FieldKind::Bool },
    FieldSpec { key: "debug", kind: FieldKind::Bool },
    FieldSpec { key: "bash", kind: FieldKind::Bool },
    FieldSpec { key: "restart", kind: FieldKind::Bool },
    FieldSpec { key: "text", kind: FieldKind::Bool },
    FieldSpec { key: "nativeSurfaces", kind: FieldKind::StrList },
    FieldSpec { key: "allowFrom", kind: FieldKind::StrList },
];

const SEND_POLICY_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "default", kind: FieldKind::Enum(SEND_POLICY_VALUES) },
    FieldSpec { key: "group", kind: FieldKind::OptEnum(SEND_POLICY_VALUES) },
    FieldSpec { key: "direct", kind: FieldKind::OptEnum(SEND_POLICY_VALUES) },
];

const QUEUE_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "mode", kind: FieldKind::Enum(QUEUE_MODE_VALUES) },
    FieldSpec { key: "debounceMs", kind: FieldKind::U64 { min: 0 } },
    FieldSpec { key: "cap", kind: FieldKind::U64 { min: 1 } },
    FieldSpec { key: "drop", kind: FieldKind::Enum(QUEUE_DROP_VALUES) },
];

const SESSION_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "sendPolicy", kind: FieldKind::Object(SEND_POLICY_FIELDS) },
    FieldSpec { key: "groupActivation", kind: FieldKind::Enum(ACTIVATION_VALUES) },
    FieldSpec { key: "queue", kind: FieldKind::Object(QUEUE_FIELDS) },
    FieldSpec { key: "store", kind: FieldKind::OptStr },
];

const ROOT_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "agent", kind: FieldKind::Object(AGENT_FIELDS) },
    FieldSpec { key: "commands", kind: FieldKind::Object(COMMANDS_FIELDS) },
    FieldSpec { key: "session", kind: FieldKind::Object(SESSION_FIELDS) },
];

/// Validate a raw config object as a whole.
///
/// Unknown keys are rejected so a typo in `/config set` cannot silently
/// plant a dead value. An empty issue list also requires the typed
/// extraction to succeed, so `Valid` always carries a usable config.
pub fn validate_config_object(value: &Value) -> ConfigValidation {
    let mut issues = Vec::new();
    check_object(value, ROOT_FIELDS, "", &mut issues);
    if issues.is_empty() {
        match serde_json::from_value::<WintermuteConfig>(value.clone()) {
            Ok(config) => return ConfigValidation::Valid(config),
            Err(e) => issues.push(ConfigIssue {
                path: String::new(),
                message: e.to_string(),
            }),
        }
    }
    ConfigValidation::Invalid(issues)
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn check_object(value: &Value, specs: &[FieldSpec], prefix: &str, issues: &mut Vec<ConfigIssue>) {
    let map = match value {
        Value::Object(map) => map,
        _ => {
            issues.push(ConfigIssue {
                path: prefix.to_string(),
                message: "expected an object".to_string(),
            });
            return;
        }
    };
    for (key, field) in map {
        let path = join_path(prefix, key);
        match specs.iter().find(|spec| spec.key == key) {
            Some(spec) => check_field(field, &spec.kind, &path, issues),
            None => issues.push(ConfigIssue {
                path,
                message: "unknown key".to_string(),
            }),
        }
    }
}

fn check_field(value: &Value, kind: &FieldKind, path: &str, issues: &mut Vec<ConfigIssue>) {
    let mut fail = |message: String| {
        issues.push(ConfigIssue {
            path: path.to_string(),
            message,
        });
    };
    match kind {
        FieldKind::Bool => {
            if !value.is_boolean() {
                fail("expected true or false".to_string());
            }
        }
        FieldKind::Str => {
            if !value.is_string() {
                fail("expected a string".to_string());
            }
        }
        FieldKind::OptStr => {
            if !value.is_null() && !value.is_string() {
                fail("expected a string or null".to_string());
            }
        }
        FieldKind::U64 { min } => match value.as_u64() {
            Some(n) if n >= *min => {}
            Some(_) => fail(format!("expected an integer >= {min}")),
            None => fail("expected a non-negative integer".to_string()),
        },
        FieldKind::StrList => {
            let ok = value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string));
            if !ok {
                fail("expected an array of strings".to_string());
            }
        }
        FieldKind::Enum(options) => {
            let ok = value.as_str().is_some_and(|s| options.contains(&s));
            if !ok {
                fail(format!("expected one of: {}", options.join(", ")));
            }
        }
        FieldKind::OptEnum(options) => {
            let ok = value.is_null() || value.as_str().is_some_and(|s| options.contains(&s));
            if !ok {
                fail(format!("expected one of: {}, or null", options.join(", ")));
            }
        }
        FieldKind::Object(specs) => check_object(value, specs, path, issues),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_is_valid() {
        assert!(validate_config_object(&json!({})).is_valid());
    }

    #[test]
    fn full_object_is_valid() {
        let v = json!({
            "agent": {"provider": "anthropic", "model": "claude-sonnet-4-6", "contextTokens": 200000},
            "commands": {"config": true, "bash": false, "allowFrom": ["*"]},
            "session": {
                "sendPolicy": {"default": "allow", "group": "deny"},
                "groupActivation": "always",
                "queue": {"mode": "collect", "debounceMs": 500, "cap": 4, "drop": "newest"}
            }
        });
        assert!(validate_config_object(&v).is_valid());
    }

    #[test]
    fn wrong_type_reports_dotted_path() {
        let v = json!({"commands": {"bash": "yes"}});
        match validate_config_object(&v) {
            ConfigValidation::Invalid(issues) => {
                assert_eq!(issues[0].path, "commands.bash");
                assert!(issues[0].message.contains("true or false"));
            }
            ConfigValidation::Valid(_) => panic!("expected invalid"),
        }
    }

    #[test]
    fn unknown_key_rejected() {
        let v = json!({"commands": {"shel": true}});
        match validate_config_object(&v) {
            ConfigValidation::Invalid(issues) => {
                assert_eq!(issues[0].path, "commands.shel");
                assert_eq!(issues[0].message, "unknown key");
            }
            ConfigValidation::Valid(_) => panic!("expected invalid"),
        }
    }

    #[test]
    fn bad_enum_lists_options() {
        let v = json!({"session": {"sendPolicy": {"default": "sometimes"}}});
        match validate_config_object(&v) {
            ConfigValidation::Invalid(issues) => {
                assert_eq!(issues[0].path, "session.sendPolicy.default");
                assert!(issues[0].message.contains("allow, deny"));
            }
            ConfigValidation::Valid(_) => panic!("expected invalid"),
        }
    }

    #[test]
    fn zero_cap_rejected() {
        let v = json!({"session": {"queue": {"cap": 0}}});
        match validate_config_object(&v) {
            ConfigValidation::Invalid(issues) => {
                assert_eq!(issues[0].path, "session.queue.cap");
            }
            ConfigValidation::Valid(_) => panic!("expected invalid"),
        }
    }

    #[test]
    fn multiple_issues_collected_in_order() {
        let v = json!({"agent": {"model": 3}, "commands": {"bogus": 1}});
        match validate_config_object(&v) {
            ConfigValidation::Invalid(issues) => assert_eq!(issues.len(), 2),
            ConfigValidation::Valid(_) => panic!("expected invalid"),
        }
    }
}
