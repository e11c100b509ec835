//! Vector store factory for runtime backend selection

use std::sync::Arc;
use std::time::Duration;

use super::{InMemoryVectorStore, QdrantConfig, QdrantVectorStore};
use crate::domain::{DomainError, VectorStore};
use crate::infrastructure::llm::HttpClient;

/// Supported vector backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VectorBackend {
    #[default]
    Qdrant,
    InMemory,
}

impl std::fmt::Display for VectorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Qdrant => write!(f, "qdrant"),
            Self::InMemory => write!(f, "in_memory"),
        }
    }
}

impl std::str::FromStr for VectorBackend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qdrant" => Ok(Self::Qdrant),
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            _ => Err(DomainError::configuration(format!(
                "Unknown vector backend: {}. Valid backends: qdrant, in_memory",
                s
            ))),
        }
    }
}

/// Configuration for the vector store factory
#[derive(Debug, Clone)]
pub struct VectorStoreConfig {
    pub backend: VectorBackend,
    pub qdrant: QdrantConfig,
    pub request_timeout: Duration,
}

impl VectorStoreConfig {
    pub fn in_memory() -> Self {
        Self {
            backend: VectorBackend::InMemory,
            qdrant: QdrantConfig::new("http://localhost:6333"),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn qdrant(config: QdrantConfig) -> Self {
        Self {
            backend: VectorBackend::Qdrant,
            qdrant: config,
            request_timeout: Duration::from_secs(10),
        }
    }
}

pub fn create_vector_store(config: &VectorStoreConfig) -> Result<Arc<dyn VectorStore>, DomainError> {
    match config.backend {
        VectorBackend::InMemory => Ok(Arc::new(InMemoryVectorStore::new())),
        VectorBackend::Qdrant => {
            let client = HttpClient::with_timeout(config.request_timeout)?;
            Ok(Arc::new(QdrantVectorStore::new(client, config.qdrant.clone())))
        }
    }
}
