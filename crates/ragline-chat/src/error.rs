use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

/// Downstream dependency of the chat service, used to tag
/// [`ChatError::Downstream`] with the service that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownstreamService {
    Retrieval,
    Generation,
    Ingestion,
}

impl DownstreamService {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownstreamService::Retrieval => "retrieval",
            DownstreamService::Generation => "generation",
            DownstreamService::Ingestion => "ingestion",
        }
    }
}

impl std::fmt::Display for DownstreamService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,

    #[error("{service} service unavailable: {message}")]
    Downstream {
        service: DownstreamService,
        message: String,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Tags a failed downstream call with the service it was aimed at.
    pub fn downstream(service: DownstreamService, message: impl Into<String>) -> Self {
        ChatError::Downstream {
            service,
            message: message.into(),
        }
    }

    /// Which downstream service failed, if this is a downstream error.
    pub fn failed_service(&self) -> Option<DownstreamService> {
        match self {
            ChatError::Downstream { service, .. } => Some(*service),
            _ => None,
        }
    }
}

impl From<ChatError> for ragline_core::RaglineError {
    fn from(err: ChatError) -> Self {
        ragline_core::RaglineError::Chat(err.to_string())
    }
}
