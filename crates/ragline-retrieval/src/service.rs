//! Retrieval pipeline: embed the query, search the vector store, and return
//! the chunk texts in ranking order.

use std::sync::Arc;

use tracing::{debug, info, warn};

use ragline_vector::{DynEmbeddingService, ScoredPoint, VectorStoreClient};

use crate::error::RetrievalError;

/// Vector search over the document collection.
///
/// Both collaborators are injected at construction: the embedding backend as
/// a trait object, the store as a concrete REST client. One instance is built
/// at process start and shared by every request.
pub struct SearchService {
    embedder: Arc<dyn DynEmbeddingService>,
    store: VectorStoreClient,
    top_k: usize,
}

impl SearchService {
    pub fn new(
        embedder: Arc<dyn DynEmbeddingService>,
        store: VectorStoreClient,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Embed `query` and return the texts of the `top_k` closest chunks,
    /// best match first.
    pub async fn search(&self, query: &str) -> Result<Vec<String>, RetrievalError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }

        debug!("Embedding query: '{}'", preview(query));
        let vector = self.embedder.embed_boxed(query).await?;

        debug!(
            collection = %self.store.collection(),
            top_k = self.top_k,
            "Searching vector store"
        );
        let hits = self.store.search(&vector, self.top_k).await?;

        let chunks = collect_chunk_texts(hits);
        info!("Retrieved {} chunks", chunks.len());
        Ok(chunks)
    }
}

/// Pull the text out of each hit, preserving the store's ranking order.
///
/// Filter policy: a hit whose payload is missing or has no `text` field is
/// dropped and logged at warn level. One malformed point must not fail the
/// whole query; the warn makes the data-quality problem visible instead of
/// hiding it.
fn collect_chunk_texts(hits: Vec<ScoredPoint>) -> Vec<String> {
    hits.into_iter()
        .filter_map(|hit| match hit.payload.and_then(|p| p.text) {
            Some(text) => Some(text),
            None => {
                warn!(id = %hit.id, score = hit.score, "Dropping hit without text payload");
                None
            }
        })
        .collect()
}

/// First 50 characters of a query for log lines.
fn preview(text: &str) -> String {
    if text.chars().count() <= 50 {
        text.to_string()
    } else {
        let capped: String = text.chars().take(50).collect();
        format!("{}...", capped)
    }
}
