//! Embeds the question, searches the index, and ranks the hits

use std::sync::Arc;

use crate::error::Result;
use crate::providers::{EmbeddingProvider, VectorIndexProvider};
use crate::retrieval::FilterBuilder;
use crate::types::RetrievedChunk;

/// Retrieves the chunks most similar to a question within an owner's scope
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndexProvider>,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndexProvider>) -> Self {
        Self { embedder, index }
    }

    /// Retrieve up to `top_k` chunks for `question`, restricted to
    /// `owner_id` and optionally to specific documents.
    ///
    /// Results are ordered by descending similarity; equal similarities
    /// tie-break on ascending chunk index so ranks never depend on index
    /// iteration order. Ranks are 1-based.
    pub async fn retrieve(
        &self,
        question: &str,
        owner_id: &str,
        document_ids: Option<&[String]>,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let filter = FilterBuilder::scope(owner_id, document_ids)?;
        let vector = self.embedder.embed(question).await?;

        let mut hits = self.index.query(&vector, &filter, top_k).await?;

        hits.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.payload.chunk_index.cmp(&b.payload.chunk_index))
        });
        hits.truncate(top_k);

        tracing::debug!(
            "Retrieved {} chunks for owner '{}' (top_k={})",
            hits.len(),
            owner_id,
            top_k
        );

        Ok(hits
            .into_iter()
            .enumerate()
            .map(|(i, hit)| RetrievedChunk {
                rank: (i + 1) as u32,
                similarity: hit.similarity,
                text: hit.payload.text,
                owner_id: hit.payload.owner_id,
                document_id: hit.payload.document_id,
                chunk_index: hit.payload.chunk_index,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::error::Error;
    use crate::retrieval::Filter;
    use crate::types::{ChunkPayload, VectorHit, VectorRecord};

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> crate::error::Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct StaticIndex {
        hits: Vec<VectorHit>,
        seen_filter: Mutex<Option<Filter>>,
    }

    impl StaticIndex {
        fn with_hits(hits: Vec<VectorHit>) -> Self {
            Self {
                hits,
                seen_filter: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl VectorIndexProvider for StaticIndex {
        async fn ensure_ready(&self, _dimensions: usize) -> crate::error::Result<()> {
            Ok(())
        }

        async fn upsert(&self, records: &[VectorRecord]) -> crate::error::Result<usize> {
            Ok(records.len())
        }

        async fn query(
            &self,
            _vector: &[f32],
            filter: &Filter,
            _top_k: usize,
        ) -> crate::error::Result<Vec<VectorHit>> {
            *self.seen_filter.lock().map_err(|_| Error::retrieval("lock poisoned"))? =
                Some(filter.clone());
            Ok(self.hits.clone())
        }

        async fn delete_by_filter(&self, _filter: &Filter) -> crate::error::Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    fn hit(similarity: f32, doc: &str, chunk_index: u32) -> VectorHit {
        VectorHit {
            similarity,
            payload: ChunkPayload {
                owner_id: "alice".to_string(),
                document_id: doc.to_string(),
                chunk_index,
                text: format!("{} chunk {}", doc, chunk_index),
            },
        }
    }

    #[tokio::test]
    async fn test_ranks_by_similarity_then_chunk_index() {
        let index = Arc::new(StaticIndex::with_hits(vec![
            hit(0.5, "paper-1", 2),
            hit(0.9, "paper-1", 7),
            hit(0.9, "paper-1", 1),
        ]));
        let retriever = Retriever::new(Arc::new(FixedEmbedder), index);

        let chunks = retriever.retrieve("question", "alice", None, 10).await.unwrap();

        let order: Vec<(u32, u32)> = chunks.iter().map(|c| (c.rank, c.chunk_index)).collect();
        assert_eq!(order, vec![(1, 1), (2, 7), (3, 2)]);
    }

    #[tokio::test]
    async fn test_truncates_to_top_k() {
        let index = Arc::new(StaticIndex::with_hits(vec![
            hit(0.9, "paper-1", 0),
            hit(0.8, "paper-1", 1),
            hit(0.7, "paper-1", 2),
        ]));
        let retriever = Retriever::new(Arc::new(FixedEmbedder), index);

        let chunks = retriever.retrieve("question", "alice", None, 2).await.unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].rank, 2);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let index = Arc::new(StaticIndex::with_hits(Vec::new()));
        let retriever = Retriever::new(Arc::new(FixedEmbedder), index);

        let chunks = retriever.retrieve("question", "alice", None, 5).await.unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_scope_filter_reaches_index() {
        let index = Arc::new(StaticIndex::with_hits(Vec::new()));
        let retriever = Retriever::new(Arc::new(FixedEmbedder), index.clone());

        let docs = vec!["paper-1".to_string()];
        retriever
            .retrieve("question", "alice", Some(&docs), 5)
            .await
            .unwrap();

        let seen = index.seen_filter.lock().unwrap().clone().unwrap();
        assert_eq!(
            seen,
            Filter::and(vec![
                Filter::eq("owner_id", "alice"),
                Filter::any_of("document_id", docs),
            ])
        );
    }

    #[tokio::test]
    async fn test_blank_owner_rejected_before_embedding() {
        let index = Arc::new(StaticIndex::with_hits(Vec::new()));
        let retriever = Retriever::new(Arc::new(FixedEmbedder), index);

        let result = retriever.retrieve("question", "  ", None, 5).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
