pub mod adapters;
pub mod error;
pub mod orchestrator;

pub use adapters::{
    AdapterError, GenerationClient, HttpGenerationClient, HttpIngestionClient, HttpRetrievalClient,
    IngestionClient, RetrievalClient,
};
pub use error::{ChatError, DownstreamService, Result};
pub use orchestrator::ChatOrchestrator;
