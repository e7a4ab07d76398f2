//! Retrieval: scope filters, vector search, and ranking

pub mod filter;
pub mod retriever;

pub use filter::{Filter, FilterBuilder};
pub use retriever::Retriever;
