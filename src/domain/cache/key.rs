//! Cache key generation for the exact layer

use std::fmt::Debug;

use sha2::{Digest, Sha256};

use crate::domain::Query;

/// Namespace for exact-match keys in the key-value store
pub const EXACT_CACHE_NAMESPACE: &str = "exact_cache";

/// Trait for generating store keys from queries
pub trait CacheKeyGenerator: Send + Sync + Debug {
    /// Generates the namespace-free key for a query
    fn generate(&self, query: &Query) -> String;

    /// Namespace prepended to every generated key
    fn namespace(&self) -> &str;

    /// Generates a key with the namespace prefix
    fn generate_with_namespace(&self, query: &Query) -> String {
        format!("{}:{}", self.namespace(), self.generate(query))
    }

    /// Prefix matching every key this generator produces
    fn scan_prefix(&self) -> String {
        format!("{}:", self.namespace())
    }
}

/// SHA-256 key generator over the normalized query text.
///
/// 256-bit digests make accidental collisions negligible, so two different
/// queries never share an exact entry.
#[derive(Debug, Clone)]
pub struct ExactKeyGenerator {
    namespace: String,
}

impl ExactKeyGenerator {
    pub fn new() -> Self {
        Self::with_namespace(EXACT_CACHE_NAMESPACE)
    }

    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl Default for ExactKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheKeyGenerator for ExactKeyGenerator {
    fn generate(&self, query: &Query) -> String {
        let digest = Sha256::digest(query.normalized().as_bytes());
        hex::encode(digest)
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}
