//! Provider abstractions for embeddings, generation, and vector indexing
//!
//! Trait-based seams so the pipeline can run against Gemini and Qdrant in
//! production or an in-process index in tests.

pub mod embedding;
pub mod generation;
pub mod vector_index;

pub mod gemini;
pub mod memory;
pub mod qdrant;

pub use embedding::EmbeddingProvider;
pub use generation::GenerationProvider;
pub use vector_index::VectorIndexProvider;
