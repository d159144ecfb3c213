//! Dotted-path addressing into the raw config object.
//!
//! `/config` and `/debug` address values as `commands.bash` or
//! `session.queue.debounceMs`. Paths are parsed and validated up front so
//! a typo produces one clear error instead of a silent no-op write.

use serde_json::{Map, Value};

use crate::error::{Result, WintermuteError};

/// Split and validate a dotted config path.
///
/// Segments may contain letters, digits, `_` and `-`. Empty paths, empty
/// segments (leading/trailing/doubled dots) and any other character are
/// rejected.
pub fn parse_config_path(raw: &str) -> Result<Vec<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WintermuteError::Path("empty path".to_string()));
    }
    let mut segments = Vec::new();
    for segment in trimmed.split('.') {
        if segment.is_empty() {
            return Err(WintermuteError::Path(format!(
                "empty segment in \"{trimmed}\""
            )));
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(WintermuteError::Path(format!(
                "invalid segment \"{segment}\""
            )));
        }
        segments.push(segment.to_string());
    }
    Ok(segments)
}

/// Read the value at `path`, if present.
///
/// Numeric segments index into arrays; all other segments are object keys.
pub fn get_value_at_path<'v>(root: &'v Value, path: &[String]) -> Option<&'v Value> {
    let mut current = root;
    for segment in path {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let idx: usize = segment.parse().ok()?;
                items.get(idx)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Write `value` at `path`, creating intermediate objects as needed.
///
/// An intermediate that exists but is not an object is replaced by one;
/// the old scalar cannot hold children.
pub fn set_value_at_path(root: &mut Value, path: &[String], value: Value) {
    debug_assert!(!path.is_empty());
    let mut current = root;
    for segment in &path[..path.len() - 1] {
        current = ensure_object(current)
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if let Some(last) = path.last() {
        ensure_object(current).insert(last.clone(), value);
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Remove the value at `path`. Returns whether anything was removed.
/// Emptied intermediate objects are left in place.
pub fn unset_value_at_path(root: &mut Value, path: &[String]) -> bool {
    debug_assert!(!path.is_empty());
    let mut current = root;
    for segment in &path[..path.len() - 1] {
        current = match current {
            Value::Object(map) => match map.get_mut(segment) {
                Some(next) => next,
                None => return false,
            },
            _ => return false,
        };
    }
    match (current.as_object_mut(), path.last()) {
        (Some(map), Some(last)) => map.remove(last).is_some(),
        _ => false,
    }
}
