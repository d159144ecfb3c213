use thiserror::Error;

/// Errors that can occur during session store operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The provided session key string is malformed.
    ///
    /// Expected format: `agent:{agent_id}:{rest}`
    #[error("invalid session key: {0}")]
    InvalidKey(String),

    /// The store file could not be serialized or parsed.
    #[error("session store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing the store file failed.
    #[error("session store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
