//! Query, document and cache management payloads

use serde::{Deserialize, Serialize};

use super::json::Validate;
use crate::api::health::HealthStatus;
use crate::domain::{DomainError, LayerKind, NewDocument, ProviderInfo, Query};

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub llm_provider: Option<String>,
}

impl Validate for QueryRequest {
    fn validate(&self) -> Result<(), DomainError> {
        Query::new(self.query.as_str()).map(|_| ())
    }
}

impl Validate for NewDocument {
    fn validate(&self) -> Result<(), DomainError> {
        if self.is_blank() {
            return Err(DomainError::validation("Document content cannot be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AddDocumentResponse {
    pub document_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchDocumentsRequest {
    pub documents: Vec<NewDocument>,
}

/// Blank documents in a batch are skipped at ingest, not rejected
impl Validate for BatchDocumentsRequest {
    fn validate(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchDocumentsResponse {
    pub document_ids: Vec<String>,
    pub count: usize,
    pub message: String,
}

/// `?layer=0|1|2`; absent clears every layer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearCacheParams {
    #[serde(default)]
    pub layer: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheResponse {
    pub cleared: Vec<LayerKind>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthComponents {
    pub exact_cache: &'static str,
    pub semantic_cache: &'static str,
    pub rag_cache: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HierarchyHealthResponse {
    pub status: HealthStatus,
    pub components: HealthComponents,
    pub providers: Vec<String>,
    pub write_back_failures: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderInfo>,
    pub default: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub layers: Vec<String>,
    pub endpoints: Vec<&'static str>,
}
