//! Client adapters for the services the chat orchestrator depends on.
//!
//! The orchestrator only sees the [`RetrievalClient`] and
//! [`GenerationClient`] traits; the HTTP implementations here talk to the
//! standalone retrieval and generation services over their JSON APIs. Tests
//! substitute in-memory stubs instead.

use async_trait::async_trait;
use ragline_core::types::{
    GenerateRequest, GenerateResponse, IngestStatusResponse, RetrieveRequest, RetrieveResponse,
};
use thiserror::Error;

/// Failure of a single downstream call, carrying only a human-readable
/// description. The orchestrator decides which service to blame based on
/// which call it made, so adapters do not tag themselves.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct AdapterError(pub String);

impl AdapterError {
    fn transport(err: reqwest::Error) -> Self {
        AdapterError(format!("request failed: {err}"))
    }

    fn status(status: reqwest::StatusCode, body: &str) -> Self {
        AdapterError(format!("HTTP {}: {}", status.as_u16(), error_detail(body)))
    }

    fn decode(err: reqwest::Error) -> Self {
        AdapterError(format!("invalid response body: {err}"))
    }
}

/// Extracts the message from a `{"error": ..., "message": ...}` body,
/// falling back to the raw text.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "<empty body>".to_string()
    } else {
        trimmed.to_string()
    }
}

// ============================================================
// Traits
// ============================================================

/// Fetches context chunks relevant to a query.
#[async_trait]
pub trait RetrievalClient: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<String>, AdapterError>;
}

/// Produces an answer for a query given its context chunks.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        query: &str,
        context_chunks: &[String],
    ) -> Result<String, AdapterError>;
}

/// Reports the state of the ingestion service, for the status proxy
/// endpoint the chat service exposes.
#[async_trait]
pub trait IngestionClient: Send + Sync {
    async fn status(&self) -> Result<IngestStatusResponse, AdapterError>;
}

// ============================================================
// HTTP implementations
// ============================================================

/// Calls the retrieval service's `POST /retrieve` endpoint.
pub struct HttpRetrievalClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRetrievalClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }
}

#[async_trait]
impl RetrievalClient for HttpRetrievalClient {
    async fn retrieve(&self, query: &str) -> Result<Vec<String>, AdapterError> {
        let url = format!("{}/retrieve", self.base_url);
        let request = RetrieveRequest {
            query: query.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(AdapterError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::status(status, &body));
        }

        let parsed: RetrieveResponse = response.json().await.map_err(AdapterError::decode)?;
        Ok(parsed.chunks)
    }
}

/// Calls the generation service's `POST /generate` endpoint.
pub struct HttpGenerationClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGenerationClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(
        &self,
        query: &str,
        context_chunks: &[String],
    ) -> Result<String, AdapterError> {
        let url = format!("{}/generate", self.base_url);
        let request = GenerateRequest {
            query: query.to_string(),
            context_chunks: context_chunks.to_vec(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(AdapterError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::status(status, &body));
        }

        let parsed: GenerateResponse = response.json().await.map_err(AdapterError::decode)?;
        Ok(parsed.answer)
    }
}

/// Calls the ingestion service's `GET /ingest/status` endpoint.
pub struct HttpIngestionClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIngestionClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }
}

#[async_trait]
impl IngestionClient for HttpIngestionClient {
    async fn status(&self) -> Result<IngestStatusResponse, AdapterError> {
        let url = format!("{}/ingest/status", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(AdapterError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::status(status, &body));
        }

        response.json().await.map_err(AdapterError::decode)
    }
}
