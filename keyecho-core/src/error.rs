use thiserror::Error;

/// All errors produced by keyecho-core.
#[derive(Debug, Error)]
pub enum EchoError {
    #[error("speech sink rejected sequence: {0}")]
    Speech(String),

    #[error("spelling builder failed: {0}")]
    Spelling(String),

    #[error("handler panicked: {0}")]
    HandlerPanic(String),

    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, EchoError>;
