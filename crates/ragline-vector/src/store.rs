//! REST client for a Qdrant-compatible vector store.
//!
//! Collections hold one point per document chunk. Point payloads carry the
//! chunk text plus the source file it came from; retrieval reads `text`,
//! ingestion reads `source` to skip documents that are already indexed.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{Result, VectorError};

/// Payload stored alongside each vector.
///
/// `text` is optional on the read path: a point written by a foreign tool may
/// lack it, and the retrieval layer decides what to do with such hits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Source document file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A point to upsert: id + vector + payload.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

/// One search hit, in store ranking order.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub id: serde_json::Value,
    pub score: f32,
    pub payload: Option<ChunkPayload>,
}

/// HTTP client for one collection of a Qdrant-compatible store.
#[derive(Clone)]
pub struct VectorStoreClient {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    // Cache of the collection's vector size once it is known to exist, so
    // upsert batches do not re-issue the create call.
    known_vector_size: Arc<RwLock<Option<usize>>>,
}

impl VectorStoreClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            collection: collection.into(),
            known_vector_size: Arc::new(RwLock::new(None)),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Drop the collection, losing all points. Deleting a collection that
    /// does not exist is fine. The size cache is invalidated so the next
    /// upsert recreates the collection.
    pub async fn delete_collection(&self) -> Result<()> {
        let url = format!("{}/collections/{}", self.base_url, self.collection);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| VectorError::Store(format!("delete collection call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(VectorError::Store(format!(
                "delete collection rejected: {}",
                status
            )));
        }

        *self.known_vector_size.write().await = None;
        info!(collection = %self.collection, "Deleted vector collection");
        Ok(())
    }

    /// Create the collection if this client has not seen it yet.
    ///
    /// The store treats a PUT for an existing collection as a no-op error or
    /// success depending on version, so the size cache keeps us from issuing
    /// it more than once per process.
    pub async fn ensure_collection(&self, vector_size: usize) -> Result<()> {
        {
            let known = self.known_vector_size.read().await;
            if let Some(existing) = *known {
                if existing == vector_size {
                    return Ok(());
                }
            }
        }

        let create_url = format!("{}/collections/{}", self.base_url, self.collection);
        let payload = json!({
            "vectors": {
                "size": vector_size,
                "distance": "Cosine"
            }
        });

        self.client
            .put(create_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| VectorError::Store(format!("create collection call failed: {}", e)))?
            .error_for_status()
            .map_err(|e| VectorError::Store(format!("create collection rejected: {}", e)))?;

        *self.known_vector_size.write().await = Some(vector_size);
        Ok(())
    }

    /// Upsert a batch of points, waiting for the write to be applied.
    pub async fn upsert(&self, points: &[ChunkPoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        self.ensure_collection(points[0].vector.len()).await?;

        let upsert_url = format!(
            "{}/collections/{}/points?wait=true",
            self.base_url, self.collection
        );
        let body = json!({ "points": points });

        self.client
            .put(upsert_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| VectorError::Store(format!("upsert call failed: {}", e)))?
            .error_for_status()
            .map_err(|e| VectorError::Store(format!("upsert rejected: {}", e)))?;

        Ok(())
    }

    /// Nearest-neighbour search. Hits come back in the store's ranking order
    /// (best first) and that order is preserved.
    pub async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>> {
        if vector.is_empty() {
            return Ok(vec![]);
        }

        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        );
        let body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| VectorError::Store(format!("search call failed: {}", e)))?
            .error_for_status()
            .map_err(|e| VectorError::Store(format!("search rejected: {}", e)))?
            .json::<SearchResponse>()
            .await
            .map_err(|e| VectorError::InvalidResponse(format!("search response: {}", e)))?;

        Ok(response
            .result
            .into_iter()
            .map(|point| ScoredPoint {
                id: point.id,
                score: point.score,
                payload: point.payload,
            })
            .collect())
    }

    /// Collect the distinct `source` payload values of every point, paging
    /// through the scroll API. Used by ingestion to skip documents that are
    /// already in the collection.
    pub async fn known_sources(&self) -> Result<HashSet<String>> {
        let url = format!(
            "{}/collections/{}/points/scroll",
            self.base_url, self.collection
        );

        let mut sources = HashSet::new();
        let mut offset: Option<serde_json::Value> = None;

        loop {
            let mut body = json!({
                "limit": 256,
                "with_payload": true,
            });
            if let Some(ref next) = offset {
                body["offset"] = next.clone();
            }

            let response = self.client.post(&url).json(&body).send().await;

            let response = match response {
                Ok(resp) => resp,
                Err(e) => {
                    return Err(VectorError::Store(format!("scroll call failed: {}", e)));
                }
            };

            // A missing collection just means nothing is ingested yet.
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(sources);
            }

            let page = response
                .error_for_status()
                .map_err(|e| VectorError::Store(format!("scroll rejected: {}", e)))?
                .json::<ScrollResponse>()
                .await
                .map_err(|e| VectorError::InvalidResponse(format!("scroll response: {}", e)))?;

            for point in page.result.points {
                if let Some(source) = point.payload.and_then(|p| p.source) {
                    sources.insert(source);
                }
            }

            match page.result.next_page_offset {
                Some(next) if !next.is_null() => offset = Some(next),
                _ => break,
            }
        }

        Ok(sources)
    }
}

impl std::fmt::Debug for VectorStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStoreClient")
            .field("base_url", &self.base_url)
            .field("collection", &self.collection)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ResultPoint>,
}

#[derive(Debug, Deserialize)]
struct ResultPoint {
    #[serde(default)]
    id: serde_json::Value,
    score: f32,
    payload: Option<ChunkPayload>,
}

#[derive(Debug, Deserialize)]
struct ScrollResponse {
    result: ScrollPage,
}

#[derive(Debug, Deserialize)]
struct ScrollPage {
    points: Vec<ScrollPoint>,
    #[serde(default)]
    next_page_offset: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ScrollPoint {
    payload: Option<ChunkPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn store_for(server: &MockServer) -> VectorStoreClient {
        VectorStoreClient::new(reqwest::Client::new(), server.base_url(), "support_docs")
    }

    #[tokio::test]
    async fn ensure_collection_sends_cosine_config_once() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/collections/support_docs")
                    .json_body_includes(r#"{"vectors": {"size": 3, "distance": "Cosine"}}"#);
                then.status(200).json_body(serde_json::json!({"result": true}));
            })
            .await;

        let store = store_for(&server);
        store.ensure_collection(3).await.unwrap();
        store.ensure_collection(3).await.unwrap();

        // Second call is served from the size cache.
        assert_eq!(create.hits_async().await, 1);
    }

    #[tokio::test]
    async fn delete_collection_invalidates_size_cache() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(PUT).path("/collections/support_docs");
                then.status(200).json_body(serde_json::json!({"result": true}));
            })
            .await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/collections/support_docs");
                then.status(200).json_body(serde_json::json!({"result": true}));
            })
            .await;

        let store = store_for(&server);
        store.ensure_collection(3).await.unwrap();
        store.delete_collection().await.unwrap();
        store.ensure_collection(3).await.unwrap();

        assert_eq!(delete.hits_async().await, 1);
        assert_eq!(create.hits_async().await, 2);
    }

    #[tokio::test]
    async fn delete_collection_tolerates_missing_collection() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/collections/support_docs");
                then.status(404);
            })
            .await;

        let store = store_for(&server);
        store.delete_collection().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_waits_and_sends_points() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/collections/support_docs");
                then.status(200).json_body(serde_json::json!({"result": true}));
            })
            .await;
        let upsert = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/collections/support_docs/points")
                    .query_param("wait", "true");
                then.status(200).json_body(serde_json::json!({"result": {"status": "completed"}}));
            })
            .await;

        let store = store_for(&server);
        let points = vec![ChunkPoint {
            id: "p1".to_string(),
            vector: vec![0.1, 0.2],
            payload: ChunkPayload {
                text: Some("chunk text".to_string()),
                source: Some("manual.txt".to_string()),
            },
        }];
        store.upsert(&points).await.unwrap();

        upsert.assert_async().await;
    }

    #[tokio::test]
    async fn upsert_empty_batch_is_a_no_op() {
        let server = MockServer::start_async().await;
        let any = server
            .mock_async(|when, then| {
                when.path("/collections/support_docs/points");
                then.status(200);
            })
            .await;

        let store = store_for(&server);
        store.upsert(&[]).await.unwrap();
        assert_eq!(any.hits_async().await, 0);
    }

    #[tokio::test]
    async fn search_preserves_hit_order_and_payloads() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/collections/support_docs/points/search");
                then.status(200).json_body(serde_json::json!({
                    "result": [
                        {"id": 1, "score": 0.9, "payload": {"text": "first", "source": "a.txt"}},
                        {"id": 2, "score": 0.5, "payload": null},
                        {"id": 3, "score": 0.4, "payload": {"text": "third", "source": "b.txt"}}
                    ]
                }));
            })
            .await;

        let store = store_for(&server);
        let hits = store.search(&[0.1, 0.2], 5).await.unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].payload.as_ref().unwrap().text.as_deref(), Some("first"));
        assert!(hits[1].payload.is_none());
        assert_eq!(hits[2].payload.as_ref().unwrap().text.as_deref(), Some("third"));
    }

    #[tokio::test]
    async fn search_with_empty_vector_short_circuits() {
        let server = MockServer::start_async().await;
        let search = server
            .mock_async(|when, then| {
                when.method(POST).path("/collections/support_docs/points/search");
                then.status(200).json_body(serde_json::json!({"result": []}));
            })
            .await;

        let store = store_for(&server);
        let hits = store.search(&[], 5).await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(search.hits_async().await, 0);
    }

    #[tokio::test]
    async fn search_propagates_store_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/collections/support_docs/points/search");
                then.status(500);
            })
            .await;

        let store = store_for(&server);
        let err = store.search(&[0.1], 5).await.unwrap_err();
        assert!(matches!(err, VectorError::Store(_)));
    }

    #[tokio::test]
    async fn known_sources_collects_distinct_source_names() {
        let server = MockServer::start_async().await;
        let scroll = server
            .mock_async(|when, then| {
                when.method(POST).path("/collections/support_docs/points/scroll");
                then.status(200).json_body(serde_json::json!({
                    "result": {
                        "points": [
                            {"payload": {"text": "t1", "source": "a.txt"}},
                            {"payload": {"text": "t2", "source": "a.txt"}},
                            {"payload": {"text": "t3", "source": "b.txt"}},
                            {"payload": null}
                        ],
                        "next_page_offset": null
                    }
                }));
            })
            .await;

        let store = store_for(&server);
        let sources = store.known_sources().await.unwrap();

        assert_eq!(scroll.hits_async().await, 1);
        assert_eq!(sources.len(), 2);
        assert!(sources.contains("a.txt"));
        assert!(sources.contains("b.txt"));
    }

    #[tokio::test]
    async fn known_sources_treats_missing_collection_as_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/collections/support_docs/points/scroll");
                then.status(404);
            })
            .await;

        let store = store_for(&server);
        let sources = store.known_sources().await.unwrap();
        assert!(sources.is_empty());
    }
}
