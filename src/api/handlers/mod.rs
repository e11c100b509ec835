//! Cache hierarchy endpoints mounted under `/api`

pub mod cache;
pub mod documents;
pub mod providers;
pub mod query;

use axum::{
    Router,
    routing::{delete, get, post},
};

use super::state::AppState;

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::run_query))
        .route("/documents", post(documents::add_document))
        .route("/documents/batch", post(documents::add_documents_batch))
        .route("/cache", delete(cache::clear_cache))
        .route("/health", get(cache::hierarchy_health))
        .route("/providers", get(providers::list_providers))
}
