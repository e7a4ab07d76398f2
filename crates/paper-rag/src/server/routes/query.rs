//! Question answering endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse};

/// POST /api/query - Answer a question from the owner's indexed documents
pub async fn answer_question(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    tracing::info!(
        "Query from owner '{}': \"{}\"",
        request.owner_id,
        request.question
    );

    let response = state.service().answer_question(&request).await?;
    Ok(Json(response))
}
