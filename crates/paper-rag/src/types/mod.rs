//! Core types for the RAG pipeline

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ChunkPayload, VectorHit, VectorRecord};
pub use query::{IndexRequest, QueryRequest};
pub use response::{IndexResponse, QueryResponse, RetrievedChunk};
