//! Router setup for the four services, plus the shared server loop.
//!
//! Every router carries the same middleware stack: a 1MB body limit,
//! response compression, request tracing, and permissive CORS. The services
//! call each other over plain HTTP, and the chat API is consumed by browser
//! frontends, so cross-origin requests are allowed everywhere.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ragline_core::{RaglineError, Result};

use crate::handlers;
use crate::state::{ChatState, GenerationState, IngestionState, RetrievalState};

fn with_middleware(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    router
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB global limit
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Router for the user-facing chat service.
pub fn chat_router(state: ChatState) -> Router {
    with_middleware(
        Router::new()
            .route("/chat", post(handlers::chat))
            .route("/ingestion/status", get(handlers::ingestion_status))
            .route("/health", get(handlers::health))
            .with_state(state),
    )
}

/// Router for the retrieval service.
pub fn retrieval_router(state: RetrievalState) -> Router {
    with_middleware(
        Router::new()
            .route("/retrieve", post(handlers::retrieve))
            .route("/health", get(handlers::health))
            .with_state(state),
    )
}

/// Router for the generation service.
pub fn generation_router(state: GenerationState) -> Router {
    with_middleware(
        Router::new()
            .route("/generate", post(handlers::generate))
            .route("/health", get(handlers::health))
            .with_state(state),
    )
}

/// Router for the ingestion service.
pub fn ingestion_router(state: IngestionState) -> Router {
    with_middleware(
        Router::new()
            .route("/ingest/run", post(handlers::run_ingestion))
            .route("/ingest/status", get(handlers::ingest_status))
            .route("/documents", post(handlers::upload_document))
            .route("/health", get(handlers::health))
            .with_state(state),
    )
}

/// Start an HTTP server for the given router.
///
/// Binds to 127.0.0.1 (localhost only) on the given port and serves until
/// the process exits.
pub async fn start_server(router: Router, port: u16) -> Result<()> {
    let addr = format!("127.0.0.1:{}", port);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RaglineError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| RaglineError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
