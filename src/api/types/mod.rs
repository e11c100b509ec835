//! Request and response types for the HTTP API

pub mod error;
pub mod json;
pub mod query;

pub use error::{ApiError, ApiErrorResponse};
pub use json::{Json, Validate};
pub use query::{
    AddDocumentResponse, BatchDocumentsRequest, BatchDocumentsResponse, ClearCacheParams,
    ClearCacheResponse, HealthComponents, HierarchyHealthResponse, ProvidersResponse,
    QueryRequest, ServiceInfo,
};
