use thiserror::Error;

#[derive(Debug, Error)]
pub enum WintermuteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid config path: {0}")]
    Path(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WintermuteError>;
