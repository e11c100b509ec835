//! Document ingestion endpoints

use axum::extract::State;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{
    AddDocumentResponse, ApiError, BatchDocumentsRequest, BatchDocumentsResponse, Json,
};
use crate::domain::NewDocument;

/// POST /api/documents
pub async fn add_document(
    State(state): State<AppState>,
    Json(document): Json<NewDocument>,
) -> Result<Json<AddDocumentResponse>, ApiError> {
    let document_id = state.hierarchy.add_document(document).await?;
    info!(document_id = %document_id, "Document added");

    Ok(Json(AddDocumentResponse {
        document_id,
        message: "Document added to RAG cache".to_string(),
    }))
}

/// POST /api/documents/batch
pub async fn add_documents_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchDocumentsRequest>,
) -> Result<Json<BatchDocumentsResponse>, ApiError> {
    let document_ids = state
        .hierarchy
        .add_documents_batch(request.documents)
        .await?;
    let count = document_ids.len();

    Ok(Json(BatchDocumentsResponse {
        document_ids,
        count,
        message: format!("Added {} documents to RAG cache", count),
    }))
}
