//! Exact-match answer cache over a key-value store

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::store_timeout::with_store_timeout;
use crate::domain::cache::{CacheKeyGenerator, ExactKeyGenerator};
use crate::domain::{AnswerCache, CacheLayer, DomainError, ExactLayer, KvStore, LayerKind, Query};

/// Configuration for the exact layer
#[derive(Debug, Clone)]
pub struct ExactCacheConfig {
    /// TTL applied by `set`
    pub default_ttl: Duration,
    /// Upper bound on every store call
    pub store_timeout: Duration,
}

impl Default for ExactCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(3600),
            store_timeout: Duration::from_millis(2000),
        }
    }
}

impl ExactCacheConfig {
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }
}

/// Layer 0: answers keyed by the SHA-256 of the normalized query
#[derive(Debug)]
pub struct ExactCacheService {
    store: Arc<dyn KvStore>,
    keys: ExactKeyGenerator,
    config: ExactCacheConfig,
}

impl ExactCacheService {
    pub fn new(store: Arc<dyn KvStore>, config: ExactCacheConfig) -> Self {
        Self {
            store,
            keys: ExactKeyGenerator::new(),
            config,
        }
    }

    pub fn config(&self) -> &ExactCacheConfig {
        &self.config
    }

    fn backend(&self) -> &'static str {
        self.store.backend_name()
    }
}

#[async_trait]
impl CacheLayer for ExactCacheService {
    type Hit = String;

    fn kind(&self) -> LayerKind {
        LayerKind::Exact
    }

    async fn get(&self, query: &Query) -> Option<String> {
        let key = self.keys.generate_with_namespace(query);

        let bytes = match with_store_timeout(
            self.backend(),
            self.config.store_timeout,
            self.store.get(&key),
        )
        .await
        {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!(layer = %self.kind(), error = %e, "Exact cache lookup failed, treating as miss");
                return None;
            }
        };

        match String::from_utf8(bytes) {
            Ok(response) => {
                debug!(key = %key, "Exact cache hit");
                Some(response)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Exact cache entry is not valid UTF-8");
                None
            }
        }
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let prefix = self.keys.scan_prefix();
        let keys = with_store_timeout(
            self.backend(),
            self.config.store_timeout,
            self.store.scan_by_prefix(&prefix),
        )
        .await?;

        for key in &keys {
            with_store_timeout(self.backend(), self.config.store_timeout, self.store.delete(key))
                .await?;
        }

        debug!(deleted = keys.len(), "Cleared exact cache");
        Ok(())
    }

    async fn healthy(&self) -> bool {
        with_store_timeout(self.backend(), self.config.store_timeout, self.store.ping())
            .await
            .is_ok()
    }
}

#[async_trait]
impl AnswerCache for ExactCacheService {
    async fn set(&self, query: &Query, response: &str) -> Result<(), DomainError> {
        self.set_with_ttl(query, response, self.config.default_ttl).await
    }
}

#[async_trait]
impl ExactLayer for ExactCacheService {
    async fn set_with_ttl(
        &self,
        query: &Query,
        response: &str,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let key = self.keys.generate_with_namespace(query);

        with_store_timeout(
            self.backend(),
            self.config.store_timeout,
            self.store.set_with_ttl(&key, response.as_bytes(), ttl),
        )
        .await
    }

    async fn delete(&self, query: &Query) -> Result<bool, DomainError> {
        let key = self.keys.generate_with_namespace(query);

        with_store_timeout(self.backend(), self.config.store_timeout, self.store.delete(&key)).await
    }
}
