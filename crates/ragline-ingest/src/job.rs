//! Single-flight guard and progress tracker for ingestion runs.
//!
//! At most one ingestion run is active per process. The job records live
//! progress counters while a run executes so the status endpoint can report
//! them, and keeps the counters of the last run after it finishes.

use ragline_core::types::IngestStatusResponse;
use tokio::sync::Mutex;

use crate::error::{IngestError, Result};

#[derive(Debug, Default)]
struct JobState {
    ingesting: bool,
    documents_processed: usize,
    chunks_added: usize,
    errors: Vec<String>,
}

impl JobState {
    fn snapshot(&self) -> IngestStatusResponse {
        IngestStatusResponse {
            ingesting: self.ingesting,
            documents_processed: self.documents_processed,
            chunks_added: self.chunks_added,
            errors: self.errors.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct IngestJob {
    state: Mutex<JobState>,
}

impl IngestJob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the job for a new run, resetting the counters. Fails with
    /// [`IngestError::Busy`] while another run holds the claim.
    pub async fn try_begin(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.ingesting {
            return Err(IngestError::Busy);
        }
        state.ingesting = true;
        state.documents_processed = 0;
        state.chunks_added = 0;
        state.errors.clear();
        Ok(())
    }

    /// Records one successfully processed document and its chunk count.
    pub async fn record_document(&self, chunks_added: usize) {
        let mut state = self.state.lock().await;
        state.documents_processed += 1;
        state.chunks_added += chunks_added;
    }

    pub async fn record_error(&self, message: impl Into<String>) {
        self.state.lock().await.errors.push(message.into());
    }

    /// Releases the claim and returns the final counters of the run.
    pub async fn finish(&self) -> IngestStatusResponse {
        let mut state = self.state.lock().await;
        state.ingesting = false;
        state.snapshot()
    }

    pub async fn status(&self) -> IngestStatusResponse {
        self.state.lock().await.snapshot()
    }
}
