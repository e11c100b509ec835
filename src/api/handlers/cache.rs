//! Cache management and hierarchy health

use axum::extract::{Query, State};

use crate::api::health::HealthStatus;
use crate::api::state::AppState;
use crate::api::types::{
    ApiError, ClearCacheParams, ClearCacheResponse, HealthComponents, HierarchyHealthResponse,
    Json,
};
use crate::domain::LayerKind;

/// DELETE /api/cache?layer=0|1|2
pub async fn clear_cache(
    State(state): State<AppState>,
    Query(params): Query<ClearCacheParams>,
) -> Result<Json<ClearCacheResponse>, ApiError> {
    let layer = params
        .layer
        .as_deref()
        .map(str::parse::<LayerKind>)
        .transpose()?;

    let report = state.hierarchy.clear_cache(layer).await?;

    let message = match layer {
        Some(kind) => format!("Cleared {}", kind),
        None => "Cleared all cache layers".to_string(),
    };

    Ok(Json(ClearCacheResponse {
        cleared: report.cleared,
        message,
    }))
}

/// GET /api/health
pub async fn hierarchy_health(State(state): State<AppState>) -> Json<HierarchyHealthResponse> {
    let health = state.hierarchy.health().await;

    Json(HierarchyHealthResponse {
        status: if health.all_layers_up() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        components: HealthComponents {
            exact_cache: up_or_down(health.exact),
            semantic_cache: up_or_down(health.semantic),
            rag_cache: up_or_down(health.retrieval),
        },
        providers: health.providers,
        write_back_failures: health.write_back_failures,
    })
}

fn up_or_down(up: bool) -> &'static str {
    if up { "up" } else { "down" }
}
