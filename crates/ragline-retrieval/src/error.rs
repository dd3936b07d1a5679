//! Error types for the retrieval pipeline.

use ragline_vector::VectorError;

/// Errors from the retrieval service.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("query cannot be empty")]
    EmptyQuery,
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("vector search failed: {0}")]
    Search(String),
}

impl From<VectorError> for RetrievalError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::Embedding(msg) => RetrievalError::Embedding(msg),
            VectorError::Store(msg) => RetrievalError::Search(msg),
            VectorError::InvalidResponse(msg) => RetrievalError::Search(msg),
        }
    }
}

impl From<RetrievalError> for ragline_core::RaglineError {
    fn from(err: RetrievalError) -> Self {
        ragline_core::RaglineError::Retrieval(err.to_string())
    }
}
