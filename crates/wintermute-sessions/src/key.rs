use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Structured session key: `agent:{agent_id}:{rest}`.
///
/// The `rest` component is the surface-scoped conversation key
/// (e.g. `telegram:group:-100123`) and may itself contain colons. Stores
/// written before keys carried the agent prefix are keyed by `rest` alone;
/// lookups fall back to that legacy form when the structured key misses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    /// The agent that owns this session (e.g. `"main"`).
    pub agent_id: String,
    /// The surface-scoped conversation key.
    pub rest: String,
}

impl SessionKey {
    pub fn new(agent_id: impl Into<String>, rest: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            rest: rest.into(),
        }
    }

    /// Return the canonical string form: `agent:{agent_id}:{rest}`.
    pub fn format(&self) -> String {
        format!("agent:{}:{}", self.agent_id, self.rest)
    }

    /// Parse a structured key string back into a `SessionKey`.
    ///
    /// `rest` may contain colons; only the first two separators are
    /// structural.
    pub fn parse(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix("agent:")
            .ok_or_else(|| SessionError::InvalidKey(format!("missing 'agent:' prefix: {s}")))?;
        let colon_pos = rest
            .find(':')
            .ok_or_else(|| SessionError::InvalidKey(format!("missing key segment: {s}")))?;
        let agent_id = &rest[..colon_pos];
        let rest = &rest[colon_pos + 1..];
        if agent_id.is_empty() || rest.is_empty() {
            return Err(SessionError::InvalidKey(format!(
                "key components must not be empty: {s}"
            )));
        }
        Ok(Self {
            agent_id: agent_id.to_string(),
            rest: rest.to_string(),
        })
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format())
    }
}
