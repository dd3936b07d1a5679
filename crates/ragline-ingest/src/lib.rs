pub mod chunker;
pub mod error;
pub mod job;
pub mod processor;

pub use chunker::{normalize_text, TextChunker};
pub use error::{IngestError, Result};
pub use job::IngestJob;
pub use processor::{sanitize_filename, IngestPipeline};
