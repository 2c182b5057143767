use thiserror::Error;

#[derive(Debug, Error)]
pub enum TailError {
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// One message could not be decoded; the stream itself is still in sync.
    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TailError>;
