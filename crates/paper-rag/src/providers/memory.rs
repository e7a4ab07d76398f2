//! In-process vector index for tests and local development
//!
//! Stores normalized vectors in a concurrent map and scores them with a
//! dot product, which equals cosine similarity for unit vectors.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::vector_index::VectorIndexProvider;
use crate::retrieval::Filter;
use crate::types::{ChunkPayload, VectorHit, VectorRecord};

struct StoredRecord {
    vector: Vec<f32>,
    payload: ChunkPayload,
}

/// In-memory vector index
pub struct InMemoryIndex {
    dimensions: usize,
    records: DashMap<Uuid, StoredRecord>,
}

impl InMemoryIndex {
    /// Create an empty index with a fixed dimensionality
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            records: DashMap::new(),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[async_trait]
impl VectorIndexProvider for InMemoryIndex {
    async fn ensure_ready(&self, dimensions: usize) -> Result<()> {
        if dimensions != self.dimensions {
            return Err(Error::Config(format!(
                "Index dimensionality is {}, embedder produces {}",
                self.dimensions, dimensions
            )));
        }
        Ok(())
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        for record in records {
            if record.vector.len() != self.dimensions {
                return Err(Error::Retrieval(format!(
                    "Vector for {} has {} dimensions, index expects {}",
                    record.id,
                    record.vector.len(),
                    self.dimensions
                )));
            }
        }

        for record in records {
            self.records.insert(
                record.id,
                StoredRecord {
                    vector: record.vector.clone(),
                    payload: record.payload.clone(),
                },
            );
        }
        Ok(records.len())
    }

    async fn query(
        &self,
        vector: &[f32],
        filter: &Filter,
        top_k: usize,
    ) -> Result<Vec<VectorHit>> {
        if vector.len() != self.dimensions {
            return Err(Error::Retrieval(format!(
                "Query vector has {} dimensions, index expects {}",
                vector.len(),
                self.dimensions
            )));
        }

        let mut hits: Vec<VectorHit> = self
            .records
            .iter()
            .filter(|entry| filter.matches(&entry.payload))
            .map(|entry| VectorHit {
                similarity: dot(vector, &entry.vector),
                payload: entry.payload.clone(),
            })
            .collect();

        // Total order so equal scores never shuffle between runs
        hits.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.payload.document_id.cmp(&b.payload.document_id))
                .then_with(|| a.payload.chunk_index.cmp(&b.payload.chunk_index))
        });
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn delete_by_filter(&self, filter: &Filter) -> Result<()> {
        self.records.retain(|_, record| !filter.matches(&record.payload));
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
