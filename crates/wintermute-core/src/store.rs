//! On-disk access to the config file backing the `/config` command.
//!
//! Reads never fail: a missing file is a valid empty config, an unreadable
//! or malformed one is flagged invalid so the command layer can refuse
//! edits instead of clobbering whatever is there. Writes go through a
//! sibling temp file and a rename so a crash mid-write cannot leave a
//! half-serialized config behind.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::config::{default_config_path, WintermuteConfig};
use crate::error::Result;
use crate::validate::{validate_config_object, ConfigValidation};

/// Handle on the config file location.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

/// Point-in-time view of the config file.
///
/// `raw` is always an object: the parsed file content when it parsed as an
/// object, otherwise empty. `valid` means the content also passes
/// [`validate_config_object`]; edits are only applied on top of a valid
/// snapshot.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub exists: bool,
    pub valid: bool,
    pub raw: Value,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default() -> Self {
        Self::new(default_config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and classify the current file content.
    pub fn read_snapshot(&self) -> ConfigSnapshot {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return ConfigSnapshot {
                    exists: false,
                    valid: true,
                    raw: Value::Object(Default::default()),
                };
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read config file");
                return ConfigSnapshot {
                    exists: true,
                    valid: false,
                    raw: Value::Object(Default::default()),
                };
            }
        };
        let parsed: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "config file is not valid JSON");
                return ConfigSnapshot {
                    exists: true,
                    valid: false,
                    raw: Value::Object(Default::default()),
                };
            }
        };
        if !parsed.is_object() {
            warn!(path = %self.path.display(), "config file root is not an object");
            return ConfigSnapshot {
                exists: true,
                valid: false,
                raw: Value::Object(Default::default()),
            };
        }
        let valid = validate_config_object(&parsed).is_valid();
        ConfigSnapshot {
            exists: true,
            valid,
            raw: parsed,
        }
    }

    /// Typed config from the current snapshot; schema failures fall back to
    /// defaults with a warning rather than taking the process down.
    pub fn load_or_default(&self) -> WintermuteConfig {
        let snapshot = self.read_snapshot();
        match validate_config_object(&snapshot.raw) {
            ConfigValidation::Valid(config) => config,
            ConfigValidation::Invalid(issues) => {
                warn!(
                    path = %self.path.display(),
                    issues = issues.len(),
                    "config file failed validation, using defaults"
                );
                WintermuteConfig::default()
            }
        }
    }

    /// Atomically replace the file content with `raw`.
    pub async fn write(&self, raw: &Value) -> Result<()> {
        let mut text = serde_json::to_string_pretty(raw)?;
        text.push('\n');
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("wintermute.json"))
    }

    #[test]
    fn missing_file_is_valid_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = store_in(&dir).read_snapshot();
        assert!(!snapshot.exists);
        assert!(snapshot.valid);
        assert_eq!(snapshot.raw, json!({}));
    }

    #[test]
    fn malformed_json_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();
        let snapshot = store.read_snapshot();
        assert!(snapshot.exists);
        assert!(!snapshot.valid);
        assert_eq!(snapshot.raw, json!({}));
    }

    #[test]
    fn schema_violation_is_invalid_but_raw_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"commands":{"bash":"yes"}}"#).unwrap();
        let snapshot = store.read_snapshot();
        assert!(!snapshot.valid);
        assert_eq!(snapshot.raw["commands"]["bash"], json!("yes"));
    }

    #[tokio::test]
    async fn write_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let raw = json!({"commands": {"bash": true}});
        store.write(&raw).await.unwrap();
        let snapshot = store.read_snapshot();
        assert!(snapshot.exists);
        assert!(snapshot.valid);
        assert_eq!(snapshot.raw, raw);
    }

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nested/deeper/wintermute.json"));
        store.write(&json!({})).await.unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn invalid_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"agent":{"model":5}}"#).unwrap();
        let config = store.load_or_default();
        assert_eq!(config.agent.model, "claude-sonnet-4-6");
    }
}
