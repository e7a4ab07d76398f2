//! paper-rag: Retrieval-augmented question answering over research papers
//!
//! This crate provides a complete RAG (Retrieval-Augmented Generation) pipeline:
//! documents are chunked, embedded with Gemini, and stored in a vector index
//! (Qdrant or in-memory); questions are answered from the retrieved chunks with
//! a Gemini model, scoped per owner so tenants never see each other's papers.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod service;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use service::RagService;
pub use types::{
    document::{Chunk, ChunkPayload, VectorHit, VectorRecord},
    query::{IndexRequest, QueryRequest},
    response::{IndexResponse, QueryResponse, RetrievedChunk},
};
