//! API routes for the RAG server

pub mod index;
pub mod query;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Indexing
        .route("/index", post(index::index_document))
        // Query
        .route("/query", post(query::answer_question))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    Json(serde_json::json!({
        "name": "paper-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Retrieval-augmented question answering over research papers",
        "models": {
            "embedding": config.embedding.model,
            "generation": config.generation.model,
        },
        "index": {
            "backend": config.index.backend,
            "collection": config.index.collection,
        },
        "endpoints": {
            "POST /api/index": "Chunk, embed, and store a document",
            "POST /api/query": "Answer a question from indexed documents",
            "GET /api/info": "Service metadata"
        }
    }))
}
