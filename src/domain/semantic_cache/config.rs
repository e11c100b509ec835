//! Semantic cache configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the semantic layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticCacheConfig {
    /// Vector collection holding cached answers
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Similarity threshold for cache hits (0.0 to 1.0), inclusive
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Skip inserts that would duplicate an identical stored answer
    #[serde(default = "default_true")]
    pub dedupe_on_insert: bool,

    /// Minimum similarity for an existing point to count as a duplicate
    #[serde(default = "default_dedupe_similarity")]
    pub dedupe_similarity: f32,

    /// Embedding model to use
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Upper bound on every vector store call
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

fn default_collection() -> String {
    "semantic_cache".to_string()
}

fn default_similarity_threshold() -> f32 {
    0.85
}

fn default_true() -> bool {
    true
}

fn default_dedupe_similarity() -> f32 {
    0.999
}

fn default_embedding_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_store_timeout_ms() -> u64 {
    2000
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            similarity_threshold: default_similarity_threshold(),
            dedupe_on_insert: default_true(),
            dedupe_similarity: default_dedupe_similarity(),
            embedding_model: default_embedding_model(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl SemanticCacheConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Set the similarity threshold
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_dedupe_on_insert(mut self, dedupe: bool) -> Self {
        self.dedupe_on_insert = dedupe;
        self
    }

    pub fn with_dedupe_similarity(mut self, similarity: f32) -> Self {
        self.dedupe_similarity = similarity.clamp(0.0, 1.0);
        self
    }

    /// Set the embedding model
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout_ms = timeout.as_millis() as u64;
        self
    }
}
