//! In-memory config overrides for the `/debug` command.
//!
//! Overrides shadow the config file for the lifetime of the process and are
//! never written to disk. They layer over the file content when the
//! effective config is computed, so `/debug set commands.bash true` takes
//! effect immediately and vanishes on restart.

use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::paths::{parse_config_path, set_value_at_path, unset_value_at_path};

/// Process-wide override object, addressed by dotted config paths.
#[derive(Debug, Default)]
pub struct RuntimeOverrides {
    values: Mutex<Value>,
}

impl RuntimeOverrides {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(Value::Object(Map::new())),
        }
    }

    fn with_values<T>(&self, f: impl FnOnce(&mut Value) -> T) -> T {
        // A poisoned lock still holds a well-formed JSON object.
        let mut guard = self
            .values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !guard.is_object() {
            *guard = Value::Object(Map::new());
        }
        f(&mut guard)
    }

    /// Deep copy of the current override object.
    pub fn snapshot(&self) -> Value {
        self.with_values(|values| values.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.with_values(|values| values.as_object().is_none_or(Map::is_empty))
    }

    pub fn set(&self, path: &str, value: Value) -> Result<()> {
        let segments = parse_config_path(path)?;
        self.with_values(|values| set_value_at_path(values, &segments, value));
        Ok(())
    }

    /// Remove one override. Returns whether anything was removed.
    pub fn unset(&self, path: &str) -> Result<bool> {
        let segments = parse_config_path(path)?;
        Ok(self.with_values(|values| unset_value_at_path(values, &segments)))
    }

    pub fn reset(&self) {
        self.with_values(|values| *values = Value::Object(Map::new()));
    }

    /// `base` with the overrides merged on top.
    pub fn merged_over(&self, base: &Value) -> Value {
        let mut merged = base.clone();
        if !merged.is_object() {
            merged = Value::Object(Map::new());
        }
        self.with_values(|values| deep_merge(&mut merged, values));
        merged
    }
}

/// Recursively overlay `overlay` onto `base`. Objects merge key by key;
/// everything else replaces.
fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_builds_nested_object() {
        let overrides = RuntimeOverrides::new();
        overrides.set("commands.bash", json!(true)).unwrap();
        overrides.set("session.queue.cap", json!(2)).unwrap();
        assert_eq!(
            overrides.snapshot(),
            json!({"commands": {"bash": true}, "session": {"queue": {"cap": 2}}})
        );
    }

    #[test]
    fn unset_reports_presence() {
        let overrides = RuntimeOverrides::new();
        overrides.set("commands.bash", json!(true)).unwrap();
        assert!(overrides.unset("commands.bash").unwrap());
        assert!(!overrides.unset("commands.bash").unwrap());
    }

    #[test]
    fn reset_clears_everything() {
        let overrides = RuntimeOverrides::new();
        overrides.set("commands.debug", json!(true)).unwrap();
        overrides.reset();
        assert!(overrides.is_empty());
    }

    #[test]
    fn bad_path_is_rejected() {
        let overrides = RuntimeOverrides::new();
        assert!(overrides.set("commands..bash", json!(true)).is_err());
        assert!(overrides.is_empty());
    }

    #[test]
    fn merge_overlays_without_dropping_siblings() {
        let overrides = RuntimeOverrides::new();
        overrides.set("commands.bash", json!(true)).unwrap();
        let base = json!({"commands": {"config": true}, "agent": {"model": "m"}});
        assert_eq!(
            overrides.merged_over(&base),
            json!({"commands": {"config": true, "bash": true}, "agent": {"model": "m"}})
        );
    }

    #[test]
    fn merge_replaces_scalar_with_object() {
        let overrides = RuntimeOverrides::new();
        overrides.set("session.queue.mode", json!("off")).unwrap();
        let base = json!({"session": "legacy"});
        assert_eq!(
            overrides.merged_over(&base),
            json!({"session": {"queue": {"mode": "off"}}})
        );
    }
}
