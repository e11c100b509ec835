//! Vector store trait and point types

use std::fmt::{self, Debug};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::DomainError;

/// Payload attached to a stored vector
pub type Payload = Map<String, Value>;

/// Distance metric of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Dot,
    Euclid,
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cosine => write!(f, "Cosine"),
            Self::Dot => write!(f, "Dot"),
            Self::Euclid => write!(f, "Euclid"),
        }
    }
}

/// A point to upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Payload,
}

impl VectorPoint {
    pub fn new(id: impl Into<String>, vector: Vec<f32>, payload: Payload) -> Self {
        Self {
            id: id.into(),
            vector,
            payload,
        }
    }
}

/// A search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub payload: Payload,
}

impl ScoredPoint {
    /// Reads a string field from the payload
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}

/// Vector-similarity store.
///
/// Every collection has a fixed dimension. Writing or searching with a vector
/// of another length fails with `DimensionMismatch`.
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Creates the collection if absent; verifies the dimension if present
    async fn ensure_collection(
        &self,
        name: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<(), DomainError>;

    async fn collection_exists(&self, name: &str) -> Result<bool, DomainError>;

    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<(), DomainError>;

    /// Returns up to `limit` points with score >= `score_threshold`, best first
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        score_threshold: Option<f32>,
    ) -> Result<Vec<ScoredPoint>, DomainError>;

    async fn drop_collection(&self, name: &str) -> Result<(), DomainError>;

    async fn list_collections(&self) -> Result<Vec<String>, DomainError>;

    async fn ping(&self) -> Result<(), DomainError>;

    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_str() {
        let mut payload = Payload::new();
        payload.insert("query".to_string(), json!("What is Rust?"));
        payload.insert("count".to_string(), json!(3));

        let point = ScoredPoint {
            id: "p1".to_string(),
            score: 0.9,
            payload,
        };

        assert_eq!(point.payload_str("query"), Some("What is Rust?"));
        assert_eq!(point.payload_str("count"), None);
        assert_eq!(point.payload_str("missing"), None);
    }

    #[test]
    fn test_distance_metric_display() {
        assert_eq!(DistanceMetric::Cosine.to_string(), "Cosine");
        assert_eq!(DistanceMetric::default(), DistanceMetric::Cosine);
    }
}
