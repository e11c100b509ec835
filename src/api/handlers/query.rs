//! Query endpoint

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, QueryRequest};
use crate::domain::QueryOutcome;

/// POST /api/query
pub async fn run_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryOutcome>, ApiError> {
    debug!(provider = ?request.llm_provider, "Running query");

    let outcome = state
        .hierarchy
        .query(&request.query, request.llm_provider.as_deref())
        .await?;

    Ok(Json(outcome))
}
