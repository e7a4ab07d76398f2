//! Document ingestion: chunking text for embedding and indexing

pub mod chunker;

pub use chunker::TextChunker;
