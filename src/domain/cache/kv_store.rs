//! Key-value store boundary used by the exact layer

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Key-value store with TTL support.
///
/// Implementations own their concurrency control and expiry. Values are raw
/// bytes; callers decide the encoding.
#[async_trait]
pub trait KvStore: Send + Sync + Debug {
    /// Gets the value stored under a key
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError>;

    /// Sets a value, overwriting any previous one and resetting its TTL
    async fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration)
    -> Result<(), DomainError>;

    /// Deletes a key, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Lists every key that starts with the prefix
    async fn scan_by_prefix(&self, prefix: &str) -> Result<Vec<String>, DomainError>;

    /// Checks connectivity
    async fn ping(&self) -> Result<(), DomainError>;

    /// Backend name used in logs and health output
    fn backend_name(&self) -> &'static str;
}
