//! Document indexing endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{IndexRequest, IndexResponse};

/// POST /api/index - Chunk, embed, and store a document
pub async fn index_document(
    State(state): State<AppState>,
    Json(request): Json<IndexRequest>,
) -> Result<Json<IndexResponse>> {
    let response = state.service().index_document(&request).await?;
    Ok(Json(response))
}
