//! Pipeline orchestration: indexing documents and answering questions

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures_util::future::join_all;
use tokio::sync::Semaphore;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::{Generator, PromptBuilder};
use crate::ingestion::TextChunker;
use crate::providers::{EmbeddingProvider, GenerationProvider, VectorIndexProvider};
use crate::retrieval::{FilterBuilder, Retriever};
use crate::types::{IndexRequest, IndexResponse, QueryRequest, QueryResponse, VectorRecord};

/// The full retrieval-and-generation pipeline behind the API
pub struct RagService {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndexProvider>,
    chunker: TextChunker,
    retriever: Retriever,
    prompt_builder: PromptBuilder,
    generator: Generator,
    batch_size: usize,
    concurrency: usize,
    default_top_k: usize,
}

impl RagService {
    /// Wire up the pipeline from providers and configuration
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndexProvider>,
        generation: Arc<dyn GenerationProvider>,
        config: &RagConfig,
    ) -> Result<Self> {
        let chunker = TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;
        let retriever = Retriever::new(Arc::clone(&embedder), Arc::clone(&index));
        let prompt_builder = PromptBuilder::new(config.generation.max_context_chars);
        let generator = Generator::new(
            generation,
            config.generation.max_retries,
            config.generation.backoff_ms,
        );

        Ok(Self {
            embedder,
            index,
            chunker,
            retriever,
            prompt_builder,
            generator,
            batch_size: config.embedding.batch_size.max(1),
            concurrency: config.embedding.concurrency(),
            default_top_k: config.retrieval.default_top_k,
        })
    }

    /// Create the vector index if needed and verify its dimensionality.
    /// Called once at startup; safe to call again at any time.
    pub async fn ensure_ready(&self) -> Result<()> {
        self.index.ensure_ready(self.embedder.dimensions()).await
    }

    /// Chunk, embed, and store a document.
    ///
    /// Every chunk is embedded before anything is written, so an embedding
    /// failure leaves the index untouched. Records carry IDs derived from
    /// (owner, document, chunk index), making a re-run of the same request
    /// overwrite instead of duplicate.
    pub async fn index_document(&self, request: &IndexRequest) -> Result<IndexResponse> {
        let start = Instant::now();

        let owner_id = validate_id(&request.owner_id, "owner_id")?;
        let document_id = validate_id(&request.document_id, "document_id")?;

        let chunks = self.chunker.chunk(owner_id, document_id, &request.text)?;
        let num_chunks = chunks.len();
        let text_length = request.text.chars().count();

        tracing::info!(
            "Indexing document '{}' for owner '{}': {} chars, {} chunks",
            document_id,
            owner_id,
            text_length,
            num_chunks
        );

        // Embed all chunks up front. Batches run concurrently under a
        // semaphore; join_all keeps results in input order.
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let batch_futures: Vec<_> = chunks
            .chunks(self.batch_size)
            .map(|batch| {
                let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
                let embedder = Arc::clone(&self.embedder);
                let semaphore = Arc::clone(&semaphore);
                async move {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .map_err(|e| Error::Embedding(format!("Embedding worker stopped: {}", e)))?;
                    embedder.embed_batch(&texts).await
                }
            })
            .collect();

        let mut vectors = Vec::with_capacity(num_chunks);
        for batch_result in join_all(batch_futures).await {
            vectors.extend(batch_result?);
        }
        if vectors.len() != num_chunks {
            return Err(Error::Embedding(format!(
                "Embedded {} of {} chunks",
                vectors.len(),
                num_chunks
            )));
        }

        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| chunk.into_record(vector))
            .collect();

        // Drop whatever an earlier version of this document left behind,
        // then write. A shorter re-index must not leave stale tail chunks.
        let document_scope =
            FilterBuilder::scope(owner_id, Some(&[document_id.to_string()]))?;
        self.index.delete_by_filter(&document_scope).await?;
        let vectors_written = self.index.upsert(&records).await?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Indexed '{}': {} vectors written in {}ms",
            document_id,
            vectors_written,
            processing_time_ms
        );

        Ok(IndexResponse {
            message: "Text loaded, chunked, embedded, and stored successfully".to_string(),
            owner_id: owner_id.to_string(),
            document_id: document_id.to_string(),
            text_length,
            num_chunks,
            embedding_dim: self.embedder.dimensions(),
            vectors_written,
            indexed_at: Utc::now(),
            processing_time_ms,
        })
    }

    /// Retrieve relevant chunks for a question and, when requested, a
    /// grounded answer.
    ///
    /// When retrieval comes back empty, the model is never invoked; the
    /// response carries a fixed no-context answer instead.
    pub async fn answer_question(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let start = Instant::now();

        let question = request.question.trim();
        if question.is_empty() {
            return Err(Error::validation("question must not be empty"));
        }
        let top_k = request.top_k.unwrap_or(self.default_top_k);
        if top_k == 0 {
            return Err(Error::validation("top_k must be at least 1"));
        }

        let chunks = self
            .retriever
            .retrieve(
                question,
                &request.owner_id,
                request.document_ids.as_deref(),
                top_k,
            )
            .await?;

        if chunks.is_empty() {
            tracing::info!("No chunks matched for owner '{}'", request.owner_id);
            return Ok(QueryResponse::no_context(
                question.to_string(),
                start.elapsed().as_millis() as u64,
            ));
        }

        if !request.generate {
            return Ok(QueryResponse {
                question: question.to_string(),
                chunks,
                answer: None,
                used_chunks: 0,
                processing_time_ms: start.elapsed().as_millis() as u64,
            });
        }

        let prompt = self.prompt_builder.build(question, &chunks)?;
        let answer = self.generator.generate(&prompt.text).await?;

        Ok(QueryResponse {
            question: question.to_string(),
            chunks,
            answer: Some(answer),
            used_chunks: prompt.used_chunks,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Embedding dimensionality of the configured provider
    pub fn embedding_dimensions(&self) -> usize {
        self.embedder.dimensions()
    }
}

/// IDs are trimmed, non-empty, and free of ':' so composite vector keys
/// stay unambiguous.
fn validate_id<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{} must not be empty", field)));
    }
    if value.contains(':') {
        return Err(Error::validation(format!("{} must not contain ':'", field)));
    }
    Ok(value)
}
