use ragline_vector::VectorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("an ingestion run is already in progress")]
    Busy,

    #[error("chunk overlap {overlap} must be smaller than chunk size {chunk_size}")]
    InvalidChunking { chunk_size: usize, overlap: usize },

    #[error("invalid document filename: {0}")]
    InvalidFilename(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("vector store failed: {0}")]
    Store(String),
}

impl From<VectorError> for IngestError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::Embedding(msg) => IngestError::Embedding(msg),
            VectorError::Store(msg) | VectorError::InvalidResponse(msg) => IngestError::Store(msg),
        }
    }
}

impl From<IngestError> for ragline_core::RaglineError {
    fn from(err: IngestError) -> Self {
        ragline_core::RaglineError::Ingestion(err.to_string())
    }
}
