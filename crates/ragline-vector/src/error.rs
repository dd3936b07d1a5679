use thiserror::Error;

/// Errors from the embedding and vector store adapters.
#[derive(Debug, Error)]
pub enum VectorError {
    /// The embedding backend could not be reached or rejected the request.
    #[error("Embedding request failed: {0}")]
    Embedding(String),

    /// The vector store could not be reached or rejected the request.
    #[error("Vector store request failed: {0}")]
    Store(String),

    /// A backend answered 2xx but the body was not what we expected.
    #[error("Malformed backend response: {0}")]
    InvalidResponse(String),
}

impl From<VectorError> for ragline_core::RaglineError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::Embedding(msg) => ragline_core::RaglineError::Embedding(msg),
            VectorError::Store(msg) => ragline_core::RaglineError::VectorStore(msg),
            VectorError::InvalidResponse(msg) => ragline_core::RaglineError::VectorStore(msg),
        }
    }
}

/// A specialized `Result` for vector adapter operations.
pub type Result<T> = std::result::Result<T, VectorError>;
