//! Document ingestion pipeline: scan, chunk, embed, upsert.
//!
//! A run walks the source directory for `.txt` and `.md` documents, skips
//! those whose file name already appears as a `source` payload in the vector
//! store, and indexes the rest. Failures are per-document: one unreadable
//! file is recorded as an error and the run moves on.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ragline_core::config::IngestionConfig;
use ragline_core::types::IngestStatusResponse;
use ragline_vector::{ChunkPayload, ChunkPoint, DynEmbeddingService, VectorStoreClient};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::chunker::{normalize_text, TextChunker};
use crate::error::{IngestError, Result};
use crate::job::IngestJob;

/// Points per upsert request. Keeps request bodies bounded for large
/// documents.
const UPSERT_BATCH: usize = 64;

/// Checks that an uploaded file name is a bare `.txt`/`.md` name.
///
/// Anything that could escape the source directory (separators, parent
/// references) is rejected, as are unsupported extensions.
pub fn sanitize_filename(filename: &str) -> Result<&str> {
    let name = filename.trim();
    if name.is_empty() {
        return Err(IngestError::InvalidFilename("file name is empty".into()));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(IngestError::InvalidFilename(format!(
            "{name} contains path components"
        )));
    }
    if !has_supported_extension(Path::new(name)) {
        return Err(IngestError::InvalidFilename(format!(
            "{name} is not a .txt or .md document"
        )));
    }
    Ok(name)
}

fn has_supported_extension(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("txt") | Some("md")
    )
}

pub struct IngestPipeline {
    embedder: Arc<dyn DynEmbeddingService>,
    store: VectorStoreClient,
    job: Arc<IngestJob>,
    chunker: TextChunker,
    source_directory: PathBuf,
    clean_before_ingest: bool,
}

impl IngestPipeline {
    pub fn new(
        embedder: Arc<dyn DynEmbeddingService>,
        store: VectorStoreClient,
        job: Arc<IngestJob>,
        config: &IngestionConfig,
    ) -> Result<Self> {
        let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap)?;
        Ok(Self {
            embedder,
            store,
            job,
            chunker,
            source_directory: PathBuf::from(&config.source_directory),
            clean_before_ingest: config.clean_before_ingest,
        })
    }

    pub fn source_directory(&self) -> &Path {
        &self.source_directory
    }

    pub fn job(&self) -> &Arc<IngestJob> {
        &self.job
    }

    /// Lists the ingestable documents currently in the source directory, in
    /// file-name order. Creates the directory if it does not exist yet.
    pub async fn scan_documents(&self) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(&self.source_directory).await?;

        let mut documents = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.source_directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && has_supported_extension(&path) {
                documents.push(path);
            }
        }
        documents.sort();
        Ok(documents)
    }

    /// Writes an uploaded document into the source directory so the next
    /// run picks it up.
    pub async fn save_document(&self, filename: &str, content: &str) -> Result<PathBuf> {
        let name = sanitize_filename(filename)?;
        tokio::fs::create_dir_all(&self.source_directory).await?;

        let path = self.source_directory.join(name);
        tokio::fs::write(&path, content).await?;
        info!(filename = name, bytes = content.len(), "Saved uploaded document");
        Ok(path)
    }

    /// Executes one full run. The caller must already hold the job claim
    /// from [`IngestJob::try_begin`]; this method records progress into the
    /// job and releases the claim when done, returning the final counters.
    pub async fn run(&self) -> IngestStatusResponse {
        if let Err(err) = self.run_inner().await {
            error!(error = %err, "Ingestion run aborted");
            self.job.record_error(err.to_string()).await;
        }
        let outcome = self.job.finish().await;
        info!(
            documents = outcome.documents_processed,
            chunks = outcome.chunks_added,
            errors = outcome.errors.len(),
            "Ingestion run finished"
        );
        outcome
    }

    async fn run_inner(&self) -> Result<()> {
        let documents = self.scan_documents().await?;
        info!(
            documents = documents.len(),
            directory = %self.source_directory.display(),
            "Starting ingestion run"
        );

        let known = if self.clean_before_ingest {
            self.store.delete_collection().await?;
            HashSet::new()
        } else {
            self.store.known_sources().await?
        };

        for path in documents {
            let source = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            if known.contains(&source) {
                debug!(source, "Document already indexed, skipping");
                continue;
            }

            match self.ingest_file(&path, &source).await {
                Ok(added) => {
                    self.job.record_document(added).await;
                    info!(source, chunks = added, "Document ingested");
                }
                Err(err) => {
                    warn!(source, error = %err, "Failed to ingest document");
                    self.job.record_error(format!("{source}: {err}")).await;
                }
            }
        }

        Ok(())
    }

    async fn ingest_file(&self, path: &Path, source: &str) -> Result<usize> {
        let raw = tokio::fs::read_to_string(path).await?;
        let chunks = self.chunker.split(&normalize_text(&raw));
        if chunks.is_empty() {
            debug!(source, "Document has no usable text");
            return Ok(0);
        }

        let mut added = 0;
        for batch in chunks.chunks(UPSERT_BATCH) {
            let mut points = Vec::with_capacity(batch.len());
            for chunk in batch {
                let vector = self.embedder.embed_boxed(chunk).await?;
                points.push(ChunkPoint {
                    id: Uuid::new_v4().to_string(),
                    vector,
                    payload: ChunkPayload {
                        text: Some(chunk.clone()),
                        source: Some(source.to_string()),
                    },
                });
            }
            self.store.upsert(&points).await?;
            added += points.len();
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use ragline_vector::MockEmbedding;
    use serde_json::json;

    // ---- sanitize_filename ----

    #[test]
    fn test_sanitize_accepts_bare_supported_names() {
        assert_eq!(sanitize_filename("manual.txt").unwrap(), "manual.txt");
        assert_eq!(sanitize_filename("  notes.md  ").unwrap(), "notes.md");
        assert_eq!(sanitize_filename("GUIDE.TXT").unwrap(), "GUIDE.TXT");
    }

    #[test]
    fn test_sanitize_rejects_path_components() {
        for name in ["../evil.txt", "a/b.txt", "a\\b.txt", "..", "dir/../x.md"] {
            assert!(
                matches!(sanitize_filename(name), Err(IngestError::InvalidFilename(_))),
                "expected rejection for {name}"
            );
        }
    }

    #[test]
    fn test_sanitize_rejects_unsupported_extensions() {
        for name in ["report.pdf", "binary", "script.sh", ""] {
            assert!(matches!(
                sanitize_filename(name),
                Err(IngestError::InvalidFilename(_))
            ));
        }
    }

    // ---- pipeline ----

    fn pipeline_for(
        server: &MockServer,
        dir: &Path,
        clean_before_ingest: bool,
    ) -> IngestPipeline {
        let config = IngestionConfig {
            source_directory: dir.to_string_lossy().into_owned(),
            chunk_size: 1000,
            chunk_overlap: 150,
            clean_before_ingest,
            ..IngestionConfig::default()
        };
        let store = VectorStoreClient::new(reqwest::Client::new(), server.base_url(), "support_docs");
        IngestPipeline::new(
            Arc::new(MockEmbedding::new()),
            store,
            Arc::new(IngestJob::new()),
            &config,
        )
        .unwrap()
    }

    async fn mock_empty_scroll(server: &MockServer) {
        server
            .mock_async(|when, then| {
                when.method(POST).path("/collections/support_docs/points/scroll");
                then.status(200).json_body(json!({
                    "result": {"points": [], "next_page_offset": null}
                }));
            })
            .await;
    }

    async fn mock_collection_create(server: &MockServer) {
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/collections/support_docs");
                then.status(200).json_body(json!({"result": true}));
            })
            .await;
    }

    #[tokio::test]
    async fn test_run_ingests_supported_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha document body").unwrap();
        std::fs::write(dir.path().join("b.md"), "# beta\n\nsecond document").unwrap();
        std::fs::write(dir.path().join("c.pdf"), "ignored").unwrap();

        let server = MockServer::start_async().await;
        mock_empty_scroll(&server).await;
        mock_collection_create(&server).await;
        let upsert = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/collections/support_docs/points")
                    .query_param("wait", "true");
                then.status(200).json_body(json!({"result": {"status": "completed"}}));
            })
            .await;

        let pipeline = pipeline_for(&server, dir.path(), false);
        pipeline.job().try_begin().await.unwrap();
        let outcome = pipeline.run().await;

        assert!(!outcome.ingesting);
        assert_eq!(outcome.documents_processed, 2);
        assert_eq!(outcome.chunks_added, 2);
        assert!(outcome.errors.is_empty());
        // One upsert batch per document.
        assert_eq!(upsert.hits_async().await, 2);
    }

    #[tokio::test]
    async fn test_run_skips_documents_already_in_store() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "already indexed").unwrap();
        std::fs::write(dir.path().join("b.txt"), "new document").unwrap();

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/collections/support_docs/points/scroll");
                then.status(200).json_body(json!({
                    "result": {
                        "points": [{"payload": {"text": "t", "source": "a.txt"}}],
                        "next_page_offset": null
                    }
                }));
            })
            .await;
        mock_collection_create(&server).await;
        let upsert = server
            .mock_async(|when, then| {
                when.method(PUT).path("/collections/support_docs/points");
                then.status(200).json_body(json!({"result": {"status": "completed"}}));
            })
            .await;

        let pipeline = pipeline_for(&server, dir.path(), false);
        pipeline.job().try_begin().await.unwrap();
        let outcome = pipeline.run().await;

        assert_eq!(outcome.documents_processed, 1);
        assert_eq!(upsert.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_clean_run_drops_collection_instead_of_scrolling() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "fresh start").unwrap();

        let server = MockServer::start_async().await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/collections/support_docs");
                then.status(200).json_body(json!({"result": true}));
            })
            .await;
        let scroll = server
            .mock_async(|when, then| {
                when.method(POST).path("/collections/support_docs/points/scroll");
                then.status(200).json_body(json!({
                    "result": {"points": [], "next_page_offset": null}
                }));
            })
            .await;
        mock_collection_create(&server).await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/collections/support_docs/points");
                then.status(200).json_body(json!({"result": {"status": "completed"}}));
            })
            .await;

        let pipeline = pipeline_for(&server, dir.path(), true);
        pipeline.job().try_begin().await.unwrap();
        let outcome = pipeline.run().await;

        assert_eq!(outcome.documents_processed, 1);
        assert_eq!(delete.hits_async().await, 1);
        assert_eq!(scroll.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_store_failures_are_recorded_per_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "first").unwrap();
        std::fs::write(dir.path().join("b.txt"), "second").unwrap();

        let server = MockServer::start_async().await;
        mock_empty_scroll(&server).await;
        mock_collection_create(&server).await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/collections/support_docs/points");
                then.status(500);
            })
            .await;

        let pipeline = pipeline_for(&server, dir.path(), false);
        pipeline.job().try_begin().await.unwrap();
        let outcome = pipeline.run().await;

        assert_eq!(outcome.documents_processed, 0);
        assert_eq!(outcome.chunks_added, 0);
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome.errors[0].starts_with("a.txt:"));
        assert!(outcome.errors[1].starts_with("b.txt:"));
    }

    #[tokio::test]
    async fn test_save_document_writes_into_source_directory() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start_async().await;
        let pipeline = pipeline_for(&server, &dir.path().join("nested"), false);

        let path = pipeline
            .save_document("uploaded.txt", "uploaded body")
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "uploaded body");
        assert_eq!(path.file_name().unwrap(), "uploaded.txt");

        let err = pipeline.save_document("../escape.txt", "x").await.unwrap_err();
        assert!(matches!(err, IngestError::InvalidFilename(_)));
    }

    #[tokio::test]
    async fn test_scan_lists_documents_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("z.txt"), "z").unwrap();
        std::fs::write(dir.path().join("a.md"), "a").unwrap();
        std::fs::write(dir.path().join("m.rst"), "ignored").unwrap();

        let server = MockServer::start_async().await;
        let pipeline = pipeline_for(&server, dir.path(), false);

        let documents = pipeline.scan_documents().await.unwrap();
        let names: Vec<_> = documents
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.md", "z.txt"]);
    }
}
