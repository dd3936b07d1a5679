//! Per-service application state passed to handlers via axum's State
//! extractor.
//!
//! Each of the four services has its own state struct holding exactly the
//! dependencies its handlers need. All fields use `Arc` for cheap cloning
//! across handler tasks, and everything is injected by the caller; no state
//! is constructed from globals.

use std::sync::Arc;

use ragline_chat::{ChatOrchestrator, IngestionClient};
use ragline_generation::GenerationService;
use ragline_ingest::IngestPipeline;
use ragline_retrieval::SearchService;

/// State for the user-facing chat service.
#[derive(Clone)]
pub struct ChatState {
    /// Retrieval + generation pipeline for one message.
    pub orchestrator: Arc<ChatOrchestrator>,
    /// Client used to proxy ingestion status requests.
    pub ingestion: Arc<dyn IngestionClient>,
}

impl ChatState {
    pub fn new(orchestrator: ChatOrchestrator, ingestion: Arc<dyn IngestionClient>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            ingestion,
        }
    }
}

/// State for the retrieval service.
#[derive(Clone)]
pub struct RetrievalState {
    pub search: Arc<SearchService>,
}

impl RetrievalState {
    pub fn new(search: SearchService) -> Self {
        Self {
            search: Arc::new(search),
        }
    }
}

/// State for the generation service.
#[derive(Clone)]
pub struct GenerationState {
    pub generation: Arc<GenerationService>,
}

impl GenerationState {
    pub fn new(generation: GenerationService) -> Self {
        Self {
            generation: Arc::new(generation),
        }
    }
}

/// State for the ingestion service.
#[derive(Clone)]
pub struct IngestionState {
    pub pipeline: Arc<IngestPipeline>,
}

impl IngestionState {
    pub fn new(pipeline: IngestPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}
