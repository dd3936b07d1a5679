use thiserror::Error;

/// Top-level error type for the Ragline system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define their
/// own error types and implement `From<SubsystemError> for RaglineError` so
/// that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RaglineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RaglineError {
    fn from(err: serde_json::Error) -> Self {
        RaglineError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Ragline operations.
pub type Result<T> = std::result::Result<T, RaglineError>;
