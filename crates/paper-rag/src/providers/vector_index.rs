//! Vector index provider trait for storing and searching embeddings

use async_trait::async_trait;

use crate::error::Result;
use crate::retrieval::Filter;
use crate::types::{VectorHit, VectorRecord};

/// Trait for vector storage and filtered similarity search
///
/// Implementations:
/// - `QdrantIndex`: Qdrant collection over HTTP
/// - `InMemoryIndex`: In-process index for tests and local development
#[async_trait]
pub trait VectorIndexProvider: Send + Sync {
    /// Make sure the index exists and matches the expected dimensionality.
    /// Idempotent and safe to call from concurrent requests.
    async fn ensure_ready(&self, dimensions: usize) -> Result<()>;

    /// Write records, overwriting any existing record with the same ID.
    /// Returns the number of records written.
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize>;

    /// Return up to `top_k` records matching `filter`, most similar first
    async fn query(&self, vector: &[f32], filter: &Filter, top_k: usize)
        -> Result<Vec<VectorHit>>;

    /// Remove every record matching `filter`
    async fn delete_by_filter(&self, filter: &Filter) -> Result<()>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
