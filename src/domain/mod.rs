//! Domain layer - Core types, capabilities and errors

pub mod cache;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod hierarchy;
pub mod llm;
pub mod query;
pub mod retrieval;
pub mod semantic_cache;
pub mod vector_store;

pub use cache::{
    AnswerCache, CacheLayer, DocumentIngest, ExactLayer, KvStore, LayerKind, RetrievalLayer,
    SemanticHit, SemanticLayer,
};
pub use embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, cosine_similarity};
pub use error::DomainError;
pub use generation::{GenerationResult, ProviderInfo, ProviderKind};
pub use hierarchy::{ClearReport, HierarchyHealth, QueryOutcome};
pub use llm::{FinishReason, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole, Usage};
pub use query::Query;
pub use retrieval::{ChunkingConfig, NewDocument, RetrievalResult};
pub use vector_store::{DistanceMetric, ScoredPoint, VectorPoint, VectorStore};
