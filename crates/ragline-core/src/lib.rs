pub mod config;
pub mod error;
pub mod types;

pub use config::{
    ChatConfig, EmbeddingConfig, GenerationConfig, IngestionConfig, RetrievalConfig,
    VectorStoreConfig,
};
pub use error::{RaglineError, Result};
pub use types::*;
