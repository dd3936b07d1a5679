//! Ragline service binary - composition root.
//!
//! Ties the ragline crates together into a single executable. A subcommand
//! picks which of the four services this process runs:
//! 1. Load configuration from environment variables (a local `.env` works)
//! 2. Build one HTTP client with the service-wide timeout
//! 3. Wire the service's clients and state together
//! 4. Start the axum REST API server

mod cli;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use ragline_api::{
    chat_router, generation_router, ingestion_router, retrieval_router, start_server, ChatState,
    GenerationState, IngestionState, RetrievalState,
};
use ragline_chat::{
    ChatOrchestrator, HttpGenerationClient, HttpIngestionClient, HttpRetrievalClient,
};
use ragline_core::config::{ChatConfig, GenerationConfig, IngestionConfig, RetrievalConfig};
use ragline_generation::{GenerationService, HttpLlmClient};
use ragline_ingest::{IngestJob, IngestPipeline};
use ragline_retrieval::SearchService;
use ragline_vector::{HttpEmbeddingClient, VectorStoreClient};

use cli::{CliArgs, Service};

type AppResult = Result<(), Box<dyn std::error::Error>>;

/// One pooled HTTP client per process; the timeout covers every downstream
/// call the service makes.
fn http_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

async fn run_chat(port_override: Option<u16>) -> AppResult {
    let config = ChatConfig::from_env();
    let port = port_override.unwrap_or(config.port);
    let client = http_client(config.http_timeout_secs)?;

    let retrieval = Arc::new(HttpRetrievalClient::new(
        client.clone(),
        config.retrieval_url.clone(),
    ));
    let generation = Arc::new(HttpGenerationClient::new(
        client.clone(),
        config.generation_url.clone(),
    ));
    let ingestion = Arc::new(HttpIngestionClient::new(
        client,
        config.ingestion_url.clone(),
    ));

    tracing::info!(
        retrieval = %config.retrieval_url,
        generation = %config.generation_url,
        "Chat service wired"
    );

    let state = ChatState::new(ChatOrchestrator::new(retrieval, generation), ingestion);
    start_server(chat_router(state), port).await?;
    Ok(())
}

async fn run_retrieval(port_override: Option<u16>) -> AppResult {
    let config = RetrievalConfig::from_env();
    let port = port_override.unwrap_or(config.port);
    let client = http_client(config.http_timeout_secs)?;

    let embedder = Arc::new(HttpEmbeddingClient::new(
        client.clone(),
        config.embedding.service_url.clone(),
        config.embedding.model.clone(),
    ));
    let store = VectorStoreClient::new(
        client,
        config.store.url.clone(),
        config.store.collection.clone(),
    );

    tracing::info!(
        store = %config.store.url,
        collection = %config.store.collection,
        top_k = config.top_k,
        "Retrieval service wired"
    );

    let state = RetrievalState::new(SearchService::new(embedder, store, config.top_k));
    start_server(retrieval_router(state), port).await?;
    Ok(())
}

async fn run_generation(port_override: Option<u16>) -> AppResult {
    let config = GenerationConfig::from_env();
    let port = port_override.unwrap_or(config.port);
    let client = http_client(config.http_timeout_secs)?;

    let llm = Arc::new(HttpLlmClient::new(
        client,
        config.llm_url.clone(),
        config.model.clone(),
        config.max_tokens,
        config.temperature,
    ));

    tracing::info!(llm = %config.llm_url, model = %config.model, "Generation service wired");

    let state = GenerationState::new(GenerationService::new(llm));
    start_server(generation_router(state), port).await?;
    Ok(())
}

async fn run_ingestion(port_override: Option<u16>) -> AppResult {
    let config = IngestionConfig::from_env();
    let port = port_override.unwrap_or(config.port);
    let client = http_client(config.http_timeout_secs)?;

    let embedder = Arc::new(HttpEmbeddingClient::new(
        client.clone(),
        config.embedding.service_url.clone(),
        config.embedding.model.clone(),
    ));
    let store = VectorStoreClient::new(
        client,
        config.store.url.clone(),
        config.store.collection.clone(),
    );
    let pipeline = IngestPipeline::new(embedder, store, Arc::new(IngestJob::new()), &config)?;

    tracing::info!(
        source_directory = %config.source_directory,
        collection = %config.store.collection,
        "Ingestion service wired"
    );

    let state = IngestionState::new(pipeline);
    start_server(ingestion_router(state), port).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> AppResult {
    // Load .env before reading any configuration.
    let _ = dotenvy::dotenv();

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    tracing::info!("Starting ragline v{}", env!("CARGO_PKG_VERSION"));

    match args.service {
        Service::Chat { port } => run_chat(port).await,
        Service::Retrieval { port } => run_retrieval(port).await,
        Service::Generation { port } => run_generation(port).await,
        Service::Ingestion { port } => run_ingestion(port).await,
    }
}
