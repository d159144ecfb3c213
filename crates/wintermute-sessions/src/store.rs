use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::key::SessionKey;
use crate::types::SessionEntry;

/// File-backed map of session key to entry.
///
/// The whole store is held in memory and written back as one JSON object.
/// Command handlers mutate entries in place and call [`SessionStore::save`]
/// once per handled message, so a crash loses at most the current message's
/// mutations.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    entries: BTreeMap<String, SessionEntry>,
}

impl SessionStore {
    /// Empty store that will save to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Load the store from `path`. A missing file is an empty store; an
    /// unparsable one is treated as empty with a warning, so a corrupt
    /// store degrades sessions instead of taking the gateway down.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "session store unreadable, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "session store unreadable, starting empty");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), sessions = entries.len(), "session store loaded");
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, key: &str) -> Option<&SessionEntry> {
        self.entries.get(key)
    }

    pub fn entry_mut(&mut self, key: &str) -> Option<&mut SessionEntry> {
        self.entries.get_mut(key)
    }

    /// Entry under `key`, created empty if absent.
    pub fn entry_or_default(&mut self, key: &str) -> &mut SessionEntry {
        self.entries.entry(key.to_string()).or_default()
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: SessionEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Key under which `session_key` actually resolves: the key itself, or
    /// the legacy `rest` form when the structured key misses.
    pub fn resolve_key(&self, session_key: &str) -> Option<String> {
        if self.entries.contains_key(session_key) {
            return Some(session_key.to_string());
        }
        let legacy = SessionKey::parse(session_key).ok()?.rest;
        self.entries.contains_key(&legacy).then_some(legacy)
    }

    /// Entry for `session_key` with legacy fallback, plus the key it was
    /// found under.
    pub fn resolve_entry(&self, session_key: &str) -> Option<(String, &SessionEntry)> {
        let key = self.resolve_key(session_key)?;
        let entry = self.entries.get(&key)?;
        Some((key, entry))
    }

    /// Atomically write the store back to its file.
    pub async fn save(&self) -> Result<()> {
        let mut text = serde_json::to_string_pretty(&self.entries)?;
        text.push('\n');
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), sessions = self.entries.len(), "session store saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("sessions.json")
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::load(store_path(&dir));
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(store_path(&dir), "{ nope").unwrap();
        let store = SessionStore::load(store_path(&dir));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn save_and_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::new(store_path(&dir));
        let mut entry = SessionEntry::default();
        entry.session_id = Some("s-1".to_string());
        store.insert("agent:main:telegram:1", entry);
        store.save().await.unwrap();

        let reloaded = SessionStore::load(store_path(&dir));
        assert_eq!(reloaded.len(), 1);
        assert_eq!(
            reloaded.entry("agent:main:telegram:1").unwrap().session_id,
            Some("s-1".to_string())
        );
    }

    #[test]
    fn resolve_prefers_direct_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::new(store_path(&dir));
        store.insert("agent:main:telegram:1", SessionEntry::default());
        store.insert("telegram:1", SessionEntry::default());
        assert_eq!(
            store.resolve_key("agent:main:telegram:1").as_deref(),
            Some("agent:main:telegram:1")
        );
    }

    #[test]
    fn resolve_falls_back_to_legacy_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::new(store_path(&dir));
        store.insert("telegram:1", SessionEntry::default());
        let (key, _) = store.resolve_entry("agent:main:telegram:1").unwrap();
        assert_eq!(key, "telegram:1");
        assert!(store.resolve_entry("agent:main:telegram:2").is_none());
    }

    #[test]
    fn unstructured_key_has_no_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(store_path(&dir));
        assert!(store.resolve_key("telegram:77").is_none());
    }
}
