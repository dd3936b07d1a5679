//! HTTP layer for the four services: axum routers, handlers, and error
//! mapping.
//!
//! Each service (chat, retrieval, generation, ingestion) gets its own
//! router constructor and state struct; the JSON error format and the
//! middleware stack are shared.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{
    chat_router, generation_router, ingestion_router, retrieval_router, start_server,
};
pub use state::{ChatState, GenerationState, IngestionState, RetrievalState};
