use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::warn;

/// Reads a string variable, falling back to `default` when unset.
fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses an optional raw value, falling back to `default` when absent or
/// unparseable. Bad values are logged, never fatal: a typo in an optional
/// variable must not keep a service from starting.
fn parse_or<T: FromStr + Display + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(value) => match value.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "Ignoring unparseable value {:?} for {}, using default {}",
                    value, key, default
                );
                default
            }
        },
    }
}

fn env_parse_or<T: FromStr + Display + Copy>(key: &str, default: T) -> T {
    parse_or(key, env::var(key).ok(), default)
}

// =============================================================================
// Shared sections
// =============================================================================

/// Embedding backend settings, shared by retrieval and ingestion.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding HTTP service.
    pub service_url: String,
    /// Model name passed through to the embedding endpoint.
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:11434".to_string(),
            model: "all-minilm".to_string(),
        }
    }
}

impl EmbeddingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            service_url: env_or("EMBEDDING_SERVICE_URL", &defaults.service_url),
            model: env_or("EMBEDDING_MODEL", &defaults.model),
        }
    }
}

/// Vector store settings, shared by retrieval and ingestion.
#[derive(Debug, Clone)]
pub struct VectorStoreConfig {
    /// Base URL of the vector store REST API.
    pub url: String,
    /// Collection holding the document chunks.
    pub collection: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:6333".to_string(),
            collection: "support_docs".to_string(),
        }
    }
}

impl VectorStoreConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env_or("VECTOR_STORE_URL", &defaults.url),
            collection: env_or("VECTOR_COLLECTION", &defaults.collection),
        }
    }
}

// =============================================================================
// Per-service configuration
// =============================================================================

/// Chat (gateway) service configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub port: u16,
    /// Base URL of the retrieval service.
    pub retrieval_url: String,
    /// Base URL of the generation service.
    pub generation_url: String,
    /// Base URL of the ingestion service (status proxy only).
    pub ingestion_url: String,
    /// Single client-wide timeout applied to every downstream call.
    pub http_timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            retrieval_url: "http://127.0.0.1:8001".to_string(),
            generation_url: "http://127.0.0.1:8002".to_string(),
            ingestion_url: "http://127.0.0.1:8003".to_string(),
            http_timeout_secs: 10,
        }
    }
}

impl ChatConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse_or("CHAT_PORT", defaults.port),
            retrieval_url: env_or("RETRIEVAL_SERVICE_URL", &defaults.retrieval_url),
            generation_url: env_or("GENERATION_SERVICE_URL", &defaults.generation_url),
            ingestion_url: env_or("INGESTION_SERVICE_URL", &defaults.ingestion_url),
            http_timeout_secs: env_parse_or("HTTP_CLIENT_TIMEOUT_SECS", defaults.http_timeout_secs),
        }
    }
}

/// Retrieval service configuration.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub port: u16,
    pub embedding: EmbeddingConfig,
    pub store: VectorStoreConfig,
    /// Number of chunks returned per query.
    pub top_k: usize,
    pub http_timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            port: 8001,
            embedding: EmbeddingConfig::default(),
            store: VectorStoreConfig::default(),
            top_k: 5,
            http_timeout_secs: 10,
        }
    }
}

impl RetrievalConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse_or("RETRIEVAL_PORT", defaults.port),
            embedding: EmbeddingConfig::from_env(),
            store: VectorStoreConfig::from_env(),
            top_k: env_parse_or("TOP_K_RESULTS", defaults.top_k),
            http_timeout_secs: env_parse_or("HTTP_CLIENT_TIMEOUT_SECS", defaults.http_timeout_secs),
        }
    }
}

/// Generation service configuration.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub port: u16,
    /// Base URL of the LLM HTTP service.
    pub llm_url: String,
    pub model: String,
    pub temperature: f64,
    /// Upper bound on generated tokens per answer.
    pub max_tokens: u32,
    pub http_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            port: 8002,
            llm_url: "http://127.0.0.1:11434".to_string(),
            model: "llama3.1".to_string(),
            temperature: 0.3,
            max_tokens: 500,
            http_timeout_secs: 30,
        }
    }
}

impl GenerationConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse_or("GENERATION_PORT", defaults.port),
            llm_url: env_or("LLM_SERVICE_URL", &defaults.llm_url),
            model: env_or("LLM_MODEL", &defaults.model),
            temperature: env_parse_or("LLM_TEMPERATURE", defaults.temperature),
            max_tokens: env_parse_or("LLM_MAX_TOKENS", defaults.max_tokens),
            http_timeout_secs: env_parse_or("HTTP_CLIENT_TIMEOUT_SECS", defaults.http_timeout_secs),
        }
    }
}

/// Ingestion service configuration.
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    pub port: u16,
    /// Directory scanned for `.txt`/`.md` documents; uploads land here too.
    pub source_directory: String,
    /// Chunk window size in characters.
    pub chunk_size: usize,
    /// Character overlap between consecutive chunks. Must stay below
    /// `chunk_size`; out-of-range values fall back to the default pair.
    pub chunk_overlap: usize,
    /// Recreate the collection before ingesting (drops existing points).
    pub clean_before_ingest: bool,
    pub embedding: EmbeddingConfig,
    pub store: VectorStoreConfig,
    pub http_timeout_secs: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            port: 8003,
            source_directory: "./documents_to_ingest".to_string(),
            chunk_size: 1000,
            chunk_overlap: 150,
            clean_before_ingest: false,
            embedding: EmbeddingConfig::default(),
            store: VectorStoreConfig::default(),
            http_timeout_secs: 30,
        }
    }
}

impl IngestionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let chunk_size = env_parse_or("CHUNK_SIZE", defaults.chunk_size);
        let chunk_overlap = env_parse_or("CHUNK_OVERLAP", defaults.chunk_overlap);

        // The chunker requires overlap < size; a bad pair reverts to the
        // defaults rather than aborting startup.
        let (chunk_size, chunk_overlap) = if chunk_overlap >= chunk_size || chunk_size == 0 {
            warn!(
                "CHUNK_OVERLAP {} must be smaller than CHUNK_SIZE {}, using defaults {}/{}",
                chunk_overlap, chunk_size, defaults.chunk_size, defaults.chunk_overlap
            );
            (defaults.chunk_size, defaults.chunk_overlap)
        } else {
            (chunk_size, chunk_overlap)
        };

        Self {
            port: env_parse_or("INGESTION_PORT", defaults.port),
            source_directory: env_or("SOURCE_DIRECTORY", &defaults.source_directory),
            chunk_size,
            chunk_overlap,
            clean_before_ingest: env_parse_or("CLEAN_BEFORE_INGEST", defaults.clean_before_ingest),
            embedding: EmbeddingConfig::from_env(),
            store: VectorStoreConfig::from_env(),
            http_timeout_secs: env_parse_or("HTTP_CLIENT_TIMEOUT_SECS", defaults.http_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_uses_default_when_absent() {
        assert_eq!(parse_or("TOP_K_RESULTS", None, 5usize), 5);
    }

    #[test]
    fn parse_or_accepts_valid_value() {
        assert_eq!(parse_or("TOP_K_RESULTS", Some("9".to_string()), 5usize), 9);
    }

    #[test]
    fn parse_or_falls_back_on_garbage() {
        assert_eq!(
            parse_or("TOP_K_RESULTS", Some("many".to_string()), 5usize),
            5
        );
    }

    #[test]
    fn parse_or_handles_bool_and_float() {
        assert!(parse_or("CLEAN_BEFORE_INGEST", Some("true".to_string()), false));
        assert_eq!(
            parse_or("LLM_TEMPERATURE", Some("0.7".to_string()), 0.3f64),
            0.7
        );
    }

    #[test]
    fn chat_defaults_point_at_sibling_services() {
        let config = ChatConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.retrieval_url, "http://127.0.0.1:8001");
        assert_eq!(config.generation_url, "http://127.0.0.1:8002");
        assert_eq!(config.ingestion_url, "http://127.0.0.1:8003");
        assert_eq!(config.http_timeout_secs, 10);
    }

    #[test]
    fn retrieval_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.store.collection, "support_docs");
        assert_eq!(config.embedding.model, "all-minilm");
    }

    #[test]
    fn generation_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.model, "llama3.1");
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.max_tokens, 500);
    }

    #[test]
    fn ingestion_defaults_keep_overlap_below_size() {
        let config = IngestionConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 150);
        assert!(config.chunk_overlap < config.chunk_size);
        assert!(!config.clean_before_ingest);
    }
}
