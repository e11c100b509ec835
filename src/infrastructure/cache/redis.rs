//! Redis key-value store

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client};
use tokio::sync::OnceCell;
use tracing::info;

use crate::domain::DomainError;
use crate::domain::cache::KvStore;

/// Configuration for the Redis store
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379/0")
    pub url: String,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
    /// Keys fetched per SCAN round trip
    pub scan_count: usize,
    /// Timeout for establishing a connection
    pub connection_timeout: Duration,
    /// Reconnect attempts before a call reports the store unavailable
    pub connection_retries: usize,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/0".to_string(),
            key_prefix: None,
            scan_count: 100,
            connection_timeout: Duration::from_secs(2),
            connection_retries: 2,
        }
    }
}

impl RedisStoreConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_scan_count(mut self, count: usize) -> Self {
        self.scan_count = count.max(1);
        self
    }

    /// Sets the connection timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn with_connection_retries(mut self, retries: usize) -> Self {
        self.connection_retries = retries;
        self
    }
}

/// Redis key-value store.
///
/// The connection is opened on first use, so the service starts while Redis is
/// down and the exact layer simply misses until it comes back. After that the
/// `ConnectionManager` reconnects on its own.
pub struct RedisKvStore {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    config: RedisStoreConfig,
}

impl fmt::Debug for RedisKvStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisKvStore")
            .field("config", &self.config)
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

impl RedisKvStore {
    pub fn new(config: RedisStoreConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            DomainError::configuration(format!("Invalid Redis URL '{}': {}", config.url, e))
        })?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            config,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, DomainError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let manager_config = ConnectionManagerConfig::new()
                    .set_connection_timeout(self.config.connection_timeout)
                    .set_number_of_retries(self.config.connection_retries);

                let manager = ConnectionManager::new_with_config(self.client.clone(), manager_config)
                    .await
                    .map_err(|e| {
                        DomainError::store_unavailable(
                            "redis",
                            format!("Failed to connect to Redis: {}", e),
                        )
                    })?;
                info!(url = %self.config.url, "Connected to Redis");
                Ok::<_, DomainError>(manager)
            })
            .await?;

        Ok(manager.clone())
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    fn strip_prefix(&self, key: String) -> String {
        match &self.config.key_prefix {
            Some(prefix) => key
                .strip_prefix(&format!("{}:", prefix))
                .map(str::to_string)
                .unwrap_or(key),
            None => key,
        }
    }
}

fn unavailable(action: &str, e: redis::RedisError) -> DomainError {
    DomainError::store_unavailable("redis", format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl KvStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let mut conn = self.connection().await?;

        conn.get(self.prefix_key(key))
            .await
            .map_err(|e| unavailable(&format!("get key '{}'", key), e))
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let mut conn = self.connection().await?;
        let ttl_secs = ttl.as_secs().max(1);

        let _: () = conn
            .set_ex(self.prefix_key(key), value, ttl_secs)
            .await
            .map_err(|e| unavailable(&format!("set key '{}'", key), e))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection().await?;

        let deleted: i32 = conn
            .del(self.prefix_key(key))
            .await
            .map_err(|e| unavailable(&format!("delete key '{}'", key), e))?;

        Ok(deleted > 0)
    }

    async fn scan_by_prefix(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        let mut conn = self.connection().await?;
        let pattern = format!("{}*", self.prefix_key(prefix));

        // SCAN rather than KEYS to avoid blocking the server
        let mut cursor = 0u64;
        let mut found = Vec::new();

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(self.config.scan_count)
                .query_async(&mut conn)
                .await
                .map_err(|e| unavailable(&format!("scan prefix '{}'", prefix), e))?;

            found.extend(keys.into_iter().map(|k| self.strip_prefix(k)));
            cursor = next_cursor;

            if cursor == 0 {
                break;
            }
        }

        Ok(found)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.connection().await?;

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| unavailable("ping", e))?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = RedisStoreConfig::new("redis://localhost:6380/1")
            .with_key_prefix("app")
            .with_scan_count(0);

        assert_eq!(config.url, "redis://localhost:6380/1");
        assert_eq!(config.key_prefix, Some("app".to_string()));
        assert_eq!(config.scan_count, 1);
    }

    #[test]
    fn test_invalid_url_is_configuration_error() {
        let result = RedisKvStore::new(RedisStoreConfig::new("not-a-url"));
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_prefix_round_trip() {
        let store =
            RedisKvStore::new(RedisStoreConfig::default().with_key_prefix("app")).unwrap();

        assert_eq!(store.prefix_key("exact_cache:abc"), "app:exact_cache:abc");
        assert_eq!(
            store.strip_prefix("app:exact_cache:abc".to_string()),
            "exact_cache:abc"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_unavailable() {
        let config = RedisStoreConfig::new("redis://127.0.0.1:1/0")
            .with_connection_timeout(Duration::from_millis(200))
            .with_connection_retries(0);
        let store = RedisKvStore::new(config).unwrap();

        let result = store.ping().await;
        assert!(matches!(result, Err(DomainError::StoreUnavailable { .. })));
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_set_get_scan_delete() {
        let store = RedisKvStore::new(RedisStoreConfig::default().with_key_prefix("test")).unwrap();

        store
            .set_with_ttl("exact_cache:k1", b"v1", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            store.get("exact_cache:k1").await.unwrap(),
            Some(b"v1".to_vec())
        );

        let keys = store.scan_by_prefix("exact_cache:").await.unwrap();
        assert!(keys.contains(&"exact_cache:k1".to_string()));

        assert!(store.delete("exact_cache:k1").await.unwrap());
        assert_eq!(store.get("exact_cache:k1").await.unwrap(), None);
    }
}
