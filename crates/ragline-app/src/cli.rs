//! CLI argument definitions for the ragline binary.
//!
//! Uses `clap` with derive macros. One binary hosts all four services; the
//! subcommand picks which service this process runs. Ports and URLs come
//! from environment variables, with `--port` as a per-process override.

use clap::{Parser, Subcommand};

/// Ragline — retrieval-augmented chat over your own documents.
#[derive(Parser, Debug)]
#[command(name = "ragline", version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub service: Service,
}

/// Which service this process runs.
#[derive(Subcommand, Debug)]
pub enum Service {
    /// User-facing chat API (retrieval + generation orchestration).
    Chat {
        /// Listen port (overrides CHAT_PORT).
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
    },
    /// Semantic chunk retrieval over the vector store.
    Retrieval {
        /// Listen port (overrides RETRIEVAL_PORT).
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
    },
    /// Answer generation through the LLM backend.
    Generation {
        /// Listen port (overrides GENERATION_PORT).
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
    },
    /// Document ingestion (chunk, embed, index).
    Ingestion {
        /// Listen port (overrides INGESTION_PORT).
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
    },
}
