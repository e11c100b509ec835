//! Embedding provider domain models and traits

mod provider;
mod request;

pub use provider::EmbeddingProvider;
pub use request::{EmbeddingRequest, EmbeddingResponse, cosine_similarity};

#[cfg(test)]
pub use provider::mock::StaticEmbeddingProvider;
