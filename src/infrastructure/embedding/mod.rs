//! Embedding provider implementations

mod factory;
mod hashing;
mod local;
mod openai;

pub use factory::{
    EmbeddingBackend, EmbeddingSettings, create_embedding_provider, resolve_dimension,
};
pub use hashing::{DEFAULT_HASHING_DIMENSIONS, HashingEmbeddingProvider};
pub use local::{DEFAULT_LOCAL_MODEL, FastEmbedProvider, LocalModel};
pub use openai::OpenAiEmbeddingProvider;

// Re-export HTTP client for use by embedding providers
pub use super::llm::{HttpClient, HttpClientTrait};
