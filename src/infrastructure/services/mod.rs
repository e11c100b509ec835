//! Infrastructure services: the three cache layers, generation and the coordinator

mod collection_state;
mod exact_cache_service;
mod generation_gateway;
mod hierarchy_service;
mod retrieval_service;
mod semantic_cache_service;
mod store_timeout;

pub use exact_cache_service::{ExactCacheConfig, ExactCacheService};
pub use generation_gateway::GenerationGateway;
pub use hierarchy_service::HierarchyService;
pub use retrieval_service::{RetrievalConfig, RetrievalService};
pub use semantic_cache_service::SemanticCacheService;
