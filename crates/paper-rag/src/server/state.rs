//! Application state for the RAG server

use std::sync::Arc;

use crate::config::{IndexBackend, RagConfig};
use crate::error::Result;
use crate::providers::{
    gemini::{GeminiEmbedder, GeminiGenerator},
    memory::InMemoryIndex,
    qdrant::QdrantIndex,
    EmbeddingProvider, GenerationProvider, VectorIndexProvider,
};
use crate::service::RagService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// The assembled RAG pipeline
    service: Arc<RagService>,
}

impl AppState {
    /// Create new application state
    ///
    /// Builds the providers for the configured backend, wires them into a
    /// [`RagService`], and verifies the vector index is reachable and
    /// dimension-compatible before the server accepts traffic.
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!(
            "Initializing RAG application state (index backend: {:?})...",
            config.index.backend
        );

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(GeminiEmbedder::new(&config.embedding)?);
        tracing::info!(
            "Embedding provider initialized ({}, {} dimensions)",
            config.embedding.model,
            config.embedding.dimensions
        );

        let generator: Arc<dyn GenerationProvider> =
            Arc::new(GeminiGenerator::new(&config.generation)?);
        tracing::info!("Generation provider initialized ({})", config.generation.model);

        let index: Arc<dyn VectorIndexProvider> = match config.index.backend {
            IndexBackend::Qdrant => {
                tracing::info!(
                    "Using Qdrant index at {} (collection: {})",
                    config.index.url,
                    config.index.collection
                );
                Arc::new(QdrantIndex::new(&config.index)?)
            }
            IndexBackend::Memory => {
                tracing::info!("Using in-memory index (data is lost on restart)");
                Arc::new(InMemoryIndex::new(config.embedding.dimensions))
            }
        };

        let service = Arc::new(RagService::new(
            Arc::clone(&embedder),
            Arc::clone(&index),
            generator,
            &config,
        )?);

        service.ensure_ready().await?;
        tracing::info!(
            "Vector index ready ({} dimensions)",
            service.embedding_dimensions()
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { config, service }),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the RAG service
    pub fn service(&self) -> &RagService {
        &self.inner.service
    }
}
