//! Key-value store factory for runtime backend selection

use std::sync::Arc;
use std::time::Duration;

use crate::domain::DomainError;
use crate::domain::cache::KvStore;

use super::in_memory::{InMemoryKvStore, InMemoryStoreConfig};
use super::redis::{RedisKvStore, RedisStoreConfig};

/// Supported key-value backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KvBackend {
    /// Redis server
    #[default]
    Redis,
    /// Process-local moka cache
    InMemory,
}

impl std::fmt::Display for KvBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KvBackend::Redis => write!(f, "redis"),
            KvBackend::InMemory => write!(f, "in_memory"),
        }
    }
}

impl std::str::FromStr for KvBackend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(KvBackend::Redis),
            "in_memory" | "inmemory" | "memory" => Ok(KvBackend::InMemory),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache backend: {}. Valid backends: redis, in_memory",
                s
            ))),
        }
    }
}

/// Configuration for the key-value store factory
#[derive(Debug, Clone)]
pub struct KvStoreConfig {
    pub backend: KvBackend,
    /// Redis URL (required for the Redis backend)
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
    /// Connection timeout (Redis only)
    pub connection_timeout: Duration,
    /// Maximum entries (in-memory only)
    pub max_capacity: u64,
}

impl Default for KvStoreConfig {
    fn default() -> Self {
        Self {
            backend: KvBackend::InMemory,
            redis_url: None,
            key_prefix: None,
            connection_timeout: Duration::from_secs(2),
            max_capacity: 10_000,
        }
    }
}

impl KvStoreConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: KvBackend::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Creates a key-value store for the configured backend
pub fn create_kv_store(config: &KvStoreConfig) -> Result<Arc<dyn KvStore>, DomainError> {
    match config.backend {
        KvBackend::InMemory => {
            let store_config = InMemoryStoreConfig::default().with_max_capacity(config.max_capacity);
            Ok(Arc::new(InMemoryKvStore::with_config(store_config)))
        }
        KvBackend::Redis => {
            let url = config.redis_url.clone().ok_or_else(|| {
                DomainError::configuration("Redis URL is required for the redis cache backend")
            })?;

            let mut redis_config =
                RedisStoreConfig::new(url).with_connection_timeout(config.connection_timeout);

            if let Some(prefix) = &config.key_prefix {
                redis_config = redis_config.with_key_prefix(prefix.clone());
            }

            Ok(Arc::new(RedisKvStore::new(redis_config)?))
        }
    }
}
