use serde::{Deserialize, Serialize};

// =============================================================================
// Chat service wire types
// =============================================================================

/// Incoming chat turn from a client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Opaque caller identity, echoed into logs only.
    pub user_id: String,
    /// The user's message. Must be non-empty after trimming; the HTTP
    /// boundary rejects empty messages before the orchestrator runs.
    pub message: String,
}

/// Final answer for one chat turn.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

// =============================================================================
// Retrieval service wire types
// =============================================================================

/// Query forwarded to the retrieval service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrieveRequest {
    pub query: String,
}

/// Ranked context chunks, best match first.
///
/// The ordering produced by the vector store is preserved end to end: the
/// chat service passes these to generation exactly as received, with no
/// re-ranking or dedup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrieveResponse {
    pub chunks: Vec<String>,
}

// =============================================================================
// Generation service wire types
// =============================================================================

/// Prompt inputs for the generation service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub query: String,
    /// Context chunks in retrieval order. May be empty; the prompt then
    /// renders a "no context" placeholder instead of skipping generation.
    pub context_chunks: Vec<String>,
}

/// Generated answer text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub answer: String,
}

// =============================================================================
// Ingestion service wire types
// =============================================================================

/// Accepted response for a triggered ingestion run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestRunResponse {
    /// "started" when a background run was spawned.
    pub status: String,
    /// Number of candidate documents found in the source directory.
    pub documents_found: usize,
    pub message: String,
}

/// Snapshot of the ingestion job state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IngestStatusResponse {
    /// True while a run is active.
    pub ingesting: bool,
    /// Counters from the most recently completed run.
    pub documents_processed: usize,
    pub chunks_added: usize,
    pub errors: Vec<String>,
}

/// Plain-text document uploaded for ingestion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadDocumentRequest {
    /// Bare file name; path components are rejected at the boundary.
    pub filename: String,
    pub content: String,
}

// =============================================================================
// Shared wire types
// =============================================================================

/// Liveness response returned by every service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
