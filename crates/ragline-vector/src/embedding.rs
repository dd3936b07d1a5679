//! Embedding service trait and implementations.
//!
//! - `HttpEmbeddingClient` calls an Ollama-compatible embedding endpoint over
//!   HTTP. This is the production embedding backend; the heavy model runs in
//!   that external process, never in ours.
//! - `MockEmbedding` provides deterministic hash-based vectors for testing.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VectorError};

/// Service for generating text embeddings.
///
/// Implementations convert text into fixed-dimensional vectors. Used for both
/// ingestion (indexing chunks) and retrieval (embedding the query). Vector
/// dimensionality is discovered from the returned data, not declared up
/// front: the store sizes its collection from the first vector it sees.
pub trait EmbeddingService: Send + Sync {
    /// Generate an embedding vector for the given text.
    fn embed(&self, text: &str) -> impl std::future::Future<Output = Result<Vec<f32>>> + Send;
}

/// Object-safe version of [`EmbeddingService`] for dynamic dispatch.
///
/// Because `EmbeddingService::embed` returns `impl Future` it is not
/// object-safe. This trait uses a boxed future instead, allowing
/// `Arc<dyn DynEmbeddingService>` to be stored in structs without generics.
///
/// A blanket implementation is provided so that every `EmbeddingService`
/// automatically implements `DynEmbeddingService`.
pub trait DynEmbeddingService: Send + Sync {
    /// Generate an embedding vector for the given text (boxed future).
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>>> + Send + 'a>>;
}

/// Blanket impl: any `EmbeddingService` automatically implements `DynEmbeddingService`.
impl<T: EmbeddingService> DynEmbeddingService for T {
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>>> + Send + 'a>> {
        Box::pin(self.embed(text))
    }
}

// ---------------------------------------------------------------------------
// HttpEmbeddingClient - remote embedding backend over HTTP
// ---------------------------------------------------------------------------

/// HTTP client for an Ollama-compatible embedding endpoint.
///
/// Newer backends expose `POST /api/embed`; older releases only understand
/// `POST /api/embeddings`. The modern route is tried first with a fallback to
/// the legacy route, so either backend generation works unmodified.
#[derive(Clone)]
pub struct HttpEmbeddingClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for HttpEmbeddingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbeddingClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl HttpEmbeddingClient {
    /// The reqwest client is injected so one pool (and one timeout) is shared
    /// process-wide.
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    async fn post_embed(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct EmbedReq<'a> {
            model: &'a str,
            input: &'a str,
        }

        #[derive(Deserialize)]
        struct EmbedResp {
            embeddings: Vec<Vec<f32>>,
        }

        let url = format!("{}/api/embed", self.base_url);
        let response = self
            .client
            .post(url)
            .json(&EmbedReq {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| VectorError::Embedding(format!("embed call failed: {}", e)))?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VectorError::Embedding(format!(
                "embed endpoint returned {}: {}",
                status,
                error_detail(&body)
            )));
        }

        let parsed = response
            .json::<EmbedResp>()
            .await
            .map_err(|e| VectorError::InvalidResponse(format!("embed response: {}", e)))?;

        parsed.embeddings.into_iter().next().ok_or_else(|| {
            VectorError::InvalidResponse("embed endpoint returned no embeddings".to_string())
        })
    }

    async fn post_embeddings_legacy(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct LegacyReq<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct LegacyResp {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(url)
            .json(&LegacyReq {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| VectorError::Embedding(format!("legacy embed call failed: {}", e)))?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VectorError::Embedding(format!(
                "legacy embed endpoint returned {}: {}",
                status,
                error_detail(&body)
            )));
        }

        let parsed = response
            .json::<LegacyResp>()
            .await
            .map_err(|e| VectorError::InvalidResponse(format!("legacy embed response: {}", e)))?;

        Ok(parsed.embedding)
    }
}

impl EmbeddingService for HttpEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = text.trim();
        if input.is_empty() {
            return Err(VectorError::Embedding(
                "cannot embed empty text".to_string(),
            ));
        }

        match self.post_embed(input).await {
            Ok(vector) => Ok(vector),
            Err(modern_err) => {
                debug!("Modern embed route failed, trying legacy: {}", modern_err);
                self.post_embeddings_legacy(input).await.map_err(|legacy_err| {
                    VectorError::Embedding(format!(
                        "both embed routes failed; modern: {}; legacy: {}",
                        modern_err, legacy_err
                    ))
                })
            }
        }
    }
}

/// Pulls the `error` field out of a JSON error body when present.
fn error_detail(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(err) = json.get("error").and_then(|v| v.as_str()) {
            return err.to_string();
        }
    }

    trimmed.to_string()
}

// ---------------------------------------------------------------------------
// MockEmbedding - deterministic hash-based vectors for testing
// ---------------------------------------------------------------------------

/// Mock embedding service that returns deterministic 384-dimensional vectors.
///
/// The output is derived from a hash of the input text, so identical inputs
/// always produce identical outputs. This allows exercising the retrieval and
/// ingestion pipelines without a live embedding backend.
#[derive(Debug, Clone, Default)]
pub struct MockEmbedding;

impl MockEmbedding {
    pub fn new() -> Self {
        Self
    }

    fn hash_to_vector(text: &str) -> Vec<f32> {
        let mut result = Vec::with_capacity(384);
        for i in 0..384 {
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            i.hash(&mut hasher);
            let h = hasher.finish();
            let val = ((h as f64) / (u64::MAX as f64)) * 2.0 - 1.0;
            result.push(val as f32);
        }

        // L2-normalize so mock vectors behave like real unit embeddings
        // under cosine distance.
        let norm: f32 = result.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut result {
                *val /= norm;
            }
        }

        result
    }
}

impl EmbeddingService for MockEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(VectorError::Embedding(
                "cannot embed empty text".to_string(),
            ));
        }
        Ok(Self::hash_to_vector(text))
    }
}
