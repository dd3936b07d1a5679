//! Error types for the generation pipeline.

/// Errors from the generation service.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("query cannot be empty")]
    EmptyQuery,
    #[error("LLM request failed: {0}")]
    Llm(String),
    #[error("malformed LLM response: {0}")]
    InvalidResponse(String),
}

impl From<GenerationError> for ragline_core::RaglineError {
    fn from(err: GenerationError) -> Self {
        ragline_core::RaglineError::Generation(err.to_string())
    }
}
