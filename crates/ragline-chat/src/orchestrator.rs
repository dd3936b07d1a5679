//! Chat pipeline: validate the message, fetch context, generate an answer.
//!
//! The orchestrator is deliberately sequential. It makes exactly one
//! retrieval call and, if that succeeds, exactly one generation call; there
//! is no retry, caching, or fan-out. Dropping the future cancels whichever
//! downstream call is in flight.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::adapters::{GenerationClient, RetrievalClient};
use crate::error::{ChatError, DownstreamService, Result};

pub struct ChatOrchestrator {
    retrieval: Arc<dyn RetrievalClient>,
    generation: Arc<dyn GenerationClient>,
}

impl ChatOrchestrator {
    /// Both dependencies are injected; the orchestrator never constructs
    /// its own clients.
    pub fn new(retrieval: Arc<dyn RetrievalClient>, generation: Arc<dyn GenerationClient>) -> Self {
        Self {
            retrieval,
            generation,
        }
    }

    /// Runs the full pipeline for one user message and returns the
    /// generated answer verbatim.
    ///
    /// A failed retrieval call aborts the pipeline before generation is
    /// attempted. An empty context is not an error: the message is still
    /// sent to generation, which answers without grounding.
    pub async fn process(&self, message: &str) -> Result<String> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        debug!("requesting context from retrieval service");
        let chunks = self.retrieval.retrieve(message).await.map_err(|err| {
            error!(error = %err, "retrieval call failed");
            ChatError::downstream(DownstreamService::Retrieval, err.to_string())
        })?;

        if chunks.is_empty() {
            debug!("no relevant context found, answering without context");
        } else {
            info!(chunks = chunks.len(), "context retrieved");
        }

        let answer = self
            .generation
            .generate(message, &chunks)
            .await
            .map_err(|err| {
                error!(error = %err, "generation call failed");
                ChatError::downstream(DownstreamService::Generation, err.to_string())
            })?;

        Ok(answer)
    }
}
