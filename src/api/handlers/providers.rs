//! Generation provider listing

use axum::extract::State;

use crate::api::state::AppState;
use crate::api::types::{Json, ProvidersResponse};

/// GET /api/providers
pub async fn list_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    let gateway = state.hierarchy.gateway();

    Json(ProvidersResponse {
        providers: gateway.list_providers().await,
        default: gateway.default_provider().map(str::to_string),
    })
}
