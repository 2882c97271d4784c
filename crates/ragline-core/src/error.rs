use thiserror::Error;

/// Failure taxonomy shared by every gateway and the orchestrator.
///
/// None of these are retried internally; each one terminates the current
/// ingestion or query call and is surfaced to the caller unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller contract violated (mismatched lengths, `top_k == 0`, wrong dimension).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    #[error("Index service error: {0}")]
    IndexService(String),

    #[error("Generation service error: {0}")]
    GenerationService(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::EmbeddingService(msg.into())
    }

    pub fn index(msg: impl Into<String>) -> Self {
        Self::IndexService(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::GenerationService(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
