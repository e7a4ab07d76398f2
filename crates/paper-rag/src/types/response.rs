//! Response types for indexing and querying

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response from indexing a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    /// Human-readable status message
    pub message: String,
    /// Owner of the document
    pub owner_id: String,
    /// Document identifier
    pub document_id: String,
    /// Length of the submitted text in characters
    pub text_length: usize,
    /// Number of chunks produced
    pub num_chunks: usize,
    /// Embedding dimensionality
    pub embedding_dim: usize,
    /// Number of vectors written to the index
    pub vectors_written: usize,
    /// Indexing timestamp
    pub indexed_at: DateTime<Utc>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// A retrieved chunk with its similarity and display rank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// 1-based rank, densest match first
    pub rank: u32,
    /// Cosine similarity to the question
    pub similarity: f32,
    /// Chunk text
    pub text: String,
    /// Owner of the source document
    pub owner_id: String,
    /// Source document
    pub document_id: String,
    /// Position of the chunk within its document
    pub chunk_index: u32,
}

/// Response from a question over indexed documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The question that was asked
    pub question: String,
    /// Retrieved chunks in rank order
    pub chunks: Vec<RetrievedChunk>,
    /// Generated answer, absent when generation was not requested
    pub answer: Option<String>,
    /// Number of chunks that fit the prompt context budget
    pub used_chunks: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl QueryResponse {
    /// Response when retrieval found nothing. The model is never invoked in
    /// this case.
    pub fn no_context(question: String, processing_time_ms: u64) -> Self {
        Self {
            question,
            chunks: Vec::new(),
            answer: Some(
                "I couldn't find relevant information in the documents to answer this question."
                    .to_string(),
            ),
            used_chunks: 0,
            processing_time_ms,
        }
    }
}
