pub mod embedding;
pub mod error;
pub mod store;

pub use embedding::{DynEmbeddingService, EmbeddingService, HttpEmbeddingClient, MockEmbedding};
pub use error::{Result, VectorError};
pub use store::{ChunkPayload, ChunkPoint, ScoredPoint, VectorStoreClient};
