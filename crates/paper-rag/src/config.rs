//! Configuration for the RAG pipeline

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Generation configuration
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Vector index configuration
    #[serde(default)]
    pub index: IndexConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file, falling back to defaults when no
    /// file is given or `paper-rag.toml` is absent. Environment overrides are
    /// applied after the file is read, so deployment keys never need to live
    /// on disk.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                toml::from_str(&text).map_err(|e| {
                    Error::Config(format!("Failed to parse {}: {}", path.display(), e))
                })?
            }
            None => {
                let default_path = Path::new("paper-rag.toml");
                if default_path.exists() {
                    let text = std::fs::read_to_string(default_path)
                        .map_err(|e| Error::Config(format!("Failed to read paper-rag.toml: {}", e)))?;
                    toml::from_str(&text)
                        .map_err(|e| Error::Config(format!("Failed to parse paper-rag.toml: {}", e)))?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.embedding.api_key = Some(key.clone());
            self.generation.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.generation.model = model;
        }
        if let Ok(url) = std::env::var("QDRANT_URL") {
            self.index.url = url;
        }
        if let Ok(key) = std::env::var("QDRANT_API_KEY") {
            self.index.api_key = Some(key);
        }
        if let Ok(collection) = std::env::var("QDRANT_COLLECTION") {
            self.index.collection = collection;
        }
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size <= self.chunking.chunk_overlap {
            return Err(Error::Config(format!(
                "chunk_size ({}) must be greater than chunk_overlap ({})",
                self.chunking.chunk_size, self.chunking.chunk_overlap
            )));
        }
        if self.embedding.dimensions == 0 {
            return Err(Error::Config("embedding dimensions must be positive".to_string()));
        }
        if self.retrieval.default_top_k == 0 {
            return Err(Error::Config("default_top_k must be at least 1".to_string()));
        }
        if self.generation.max_context_chars == 0 {
            return Err(Error::Config("max_context_chars must be positive".to_string()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number
    #[serde(default = "default_port")]
    pub port: u16,
    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_enable_cors() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: default_enable_cors(),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    100
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Embedding dimensions (truncated server-side, normalized client-side)
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    /// Gemini API base URL
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    /// API key (usually set via GEMINI_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_embed_timeout")]
    pub timeout_secs: u64,
    /// Texts per batch embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Concurrent embedding requests during indexing (default: CPU count, max 4)
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}
fn default_dimensions() -> usize {
    256
}
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_embed_timeout() -> u64 {
    20
}
fn default_batch_size() -> usize {
    16
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            base_url: default_gemini_base_url(),
            api_key: None,
            timeout_secs: default_embed_timeout(),
            batch_size: default_batch_size(),
            max_concurrency: None, // Auto-detect from CPU count
        }
    }
}

impl EmbeddingConfig {
    /// Effective concurrency for indexing work
    pub fn concurrency(&self) -> usize {
        self.max_concurrency
            .unwrap_or_else(|| num_cpus::get().min(4))
            .max(1)
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunks returned when the query does not specify top_k
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
}

fn default_top_k() -> usize {
    2
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
        }
    }
}

/// Generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Generation model name
    #[serde(default = "default_generation_model")]
    pub model: String,
    /// Gemini API base URL
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    /// API key (usually set via GEMINI_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens in the generated answer
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    #[serde(default = "default_generate_timeout")]
    pub timeout_secs: u64,
    /// Retries after an overloaded response before degrading
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff between overload retries in milliseconds (doubles per attempt)
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Character budget for context excerpts in the prompt
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

fn default_generation_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_max_output_tokens() -> u32 {
    2048
}
fn default_generate_timeout() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_backoff_ms() -> u64 {
    500
}
fn default_max_context_chars() -> usize {
    12000
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_generation_model(),
            base_url: default_gemini_base_url(),
            api_key: None,
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_generate_timeout(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index backend (qdrant or memory)
    #[serde(default)]
    pub backend: IndexBackend,
    /// Qdrant base URL
    #[serde(default = "default_qdrant_url")]
    pub url: String,
    /// Qdrant API key (usually set via QDRANT_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Collection name
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Request timeout in seconds
    #[serde(default = "default_index_timeout")]
    pub timeout_secs: u64,
}

fn default_qdrant_url() -> String {
    "http://localhost:6333".to_string()
}
fn default_collection() -> String {
    "paper_chunks".to_string()
}
fn default_index_timeout() -> u64 {
    20
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::default(),
            url: default_qdrant_url(),
            api_key: None,
            collection: default_collection(),
            timeout_secs: default_index_timeout(),
        }
    }
}

/// Vector index backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// Qdrant over HTTP
    #[default]
    Qdrant,
    /// In-process index, useful for tests and local development
    Memory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RagConfig::default();
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 100);
        assert_eq!(config.embedding.dimensions, 256);
        assert_eq!(config.embedding.model, "text-embedding-004");
        assert_eq!(config.retrieval.default_top_k, 2);
        assert_eq!(config.generation.model, "gemini-2.5-flash");
        assert_eq!(config.generation.max_retries, 2);
        assert_eq!(config.index.backend, IndexBackend::Qdrant);
        assert_eq!(config.index.collection, "paper_chunks");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: RagConfig = toml::from_str(
            r#"
            [chunking]
            chunk_size = 500

            [index]
            backend = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 100);
        assert_eq!(config.index.backend, IndexBackend::Memory);
        assert_eq!(config.embedding.dimensions, 256);
    }

    #[test]
    fn test_validate_rejects_overlap_not_smaller() {
        let mut config = RagConfig::default();
        config.chunking.chunk_size = 100;
        config.chunking.chunk_overlap = 100;
        assert!(config.validate().is_err());

        config.chunking.chunk_overlap = 150;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_concurrency_floor() {
        let mut config = EmbeddingConfig::default();
        config.max_concurrency = Some(0);
        assert_eq!(config.concurrency(), 1);

        config.max_concurrency = Some(8);
        assert_eq!(config.concurrency(), 8);
    }
}
