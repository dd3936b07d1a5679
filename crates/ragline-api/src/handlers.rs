//! Route handler functions for all four service APIs.
//!
//! Each handler extracts the JSON request body via axum extractors, calls
//! into the service held by its state struct, and returns a JSON response.
//! Error conversion into HTTP status codes lives in [`crate::error`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use ragline_chat::{ChatError, DownstreamService};
use ragline_core::types::{
    ChatRequest, ChatResponse, GenerateRequest, GenerateResponse, HealthResponse,
    IngestRunResponse, IngestStatusResponse, RetrieveRequest, RetrieveResponse,
    UploadDocumentRequest,
};
use ragline_ingest::sanitize_filename;

use crate::error::ApiError;
use crate::state::{ChatState, GenerationState, IngestionState, RetrievalState};

// =============================================================================
// Shared handlers
// =============================================================================

/// GET /health - liveness probe, identical on every service.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

// =============================================================================
// Chat service handlers
// =============================================================================

/// POST /chat - answer one user message through the retrieval + generation
/// pipeline.
pub async fn chat(
    State(state): State<ChatState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if body.message.trim().is_empty() {
        return Err(ApiError::UnprocessableEntity(
            "'message' must not be empty".to_string(),
        ));
    }

    info!(user_id = %body.user_id, "Chat request received");
    let response = state.orchestrator.process(&body.message).await?;

    Ok(Json(ChatResponse { response }))
}

/// GET /ingestion/status - proxy the ingestion service's status.
///
/// Any failure to reach the ingestion service is reported as 503, so a chat
/// client never sees a raw transport error.
pub async fn ingestion_status(
    State(state): State<ChatState>,
) -> Result<Json<IngestStatusResponse>, ApiError> {
    let status = state
        .ingestion
        .status()
        .await
        .map_err(|e| ChatError::downstream(DownstreamService::Ingestion, e.to_string()))?;

    Ok(Json(status))
}

// =============================================================================
// Retrieval service handlers
// =============================================================================

/// POST /retrieve - return the chunks most relevant to a query.
pub async fn retrieve(
    State(state): State<RetrievalState>,
    Json(body): Json<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>, ApiError> {
    let chunks = state.search.search(&body.query).await?;
    Ok(Json(RetrieveResponse { chunks }))
}

// =============================================================================
// Generation service handlers
// =============================================================================

/// POST /generate - produce an answer for a query and its context chunks.
pub async fn generate(
    State(state): State<GenerationState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let answer = state
        .generation
        .generate(&body.query, &body.context_chunks)
        .await?;
    Ok(Json(GenerateResponse { answer }))
}

// =============================================================================
// Ingestion service handlers
// =============================================================================

/// POST /ingest/run - start a background ingestion run.
///
/// Returns 202 immediately; progress is visible via GET /ingest/status.
/// A second run while one is active is rejected with 409.
pub async fn run_ingestion(
    State(state): State<IngestionState>,
) -> Result<(StatusCode, Json<IngestRunResponse>), ApiError> {
    let documents = state.pipeline.scan_documents().await?;
    state.pipeline.job().try_begin().await?;

    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        pipeline.run().await;
    });

    info!(documents = documents.len(), "Ingestion run started");
    Ok((
        StatusCode::ACCEPTED,
        Json(IngestRunResponse {
            status: "started".to_string(),
            documents_found: documents.len(),
            message: format!(
                "Ingestion started for {} candidate document(s)",
                documents.len()
            ),
        }),
    ))
}

/// GET /ingest/status - current or last run counters.
pub async fn ingest_status(State(state): State<IngestionState>) -> Json<IngestStatusResponse> {
    Json(state.pipeline.job().status().await)
}

/// POST /documents - upload one document and ingest it in the background.
///
/// The file lands in the source directory, so later runs also see it.
pub async fn upload_document(
    State(state): State<IngestionState>,
    Json(body): Json<UploadDocumentRequest>,
) -> Result<(StatusCode, Json<IngestRunResponse>), ApiError> {
    // Validate the name before claiming the job, so a bad upload never
    // blocks a concurrent run.
    sanitize_filename(&body.filename)?;

    state.pipeline.job().try_begin().await?;
    if let Err(e) = state
        .pipeline
        .save_document(&body.filename, &body.content)
        .await
    {
        state.pipeline.job().finish().await;
        return Err(e.into());
    }

    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        pipeline.run().await;
    });

    info!(filename = %body.filename, "Uploaded document queued for ingestion");
    Ok((
        StatusCode::ACCEPTED,
        Json(IngestRunResponse {
            status: "started".to_string(),
            documents_found: 1,
            message: format!("Ingestion started for '{}'", body.filename),
        }),
    ))
}
