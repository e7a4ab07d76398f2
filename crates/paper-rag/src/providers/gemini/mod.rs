//! Gemini API providers for embeddings and answer generation
//!
//! Both clients speak the Generative Language REST API and authenticate
//! with an API key passed as a query parameter.

pub mod embedder;
pub mod generator;

pub use embedder::GeminiEmbedder;
pub use generator::GeminiGenerator;
