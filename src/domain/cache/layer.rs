//! Cache layer capabilities shared by the exact, semantic and retrieval layers

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::retrieval::{NewDocument, RetrievalResult};
use crate::domain::{DomainError, Query};

/// Position of a layer in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Exact,
    Semantic,
    Retrieval,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [LayerKind::Exact, LayerKind::Semantic, LayerKind::Retrieval];

    /// Zero-based depth in the lookup order
    pub fn level(&self) -> u8 {
        match self {
            Self::Exact => 0,
            Self::Semantic => 1,
            Self::Retrieval => 2,
        }
    }

    /// Short label used in metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Semantic => "semantic",
            Self::Retrieval => "retrieval",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "Layer 0 (Exact Cache)"),
            Self::Semantic => write!(f, "Layer 1 (Semantic Cache)"),
            Self::Retrieval => write!(f, "Layer 2 (RAG Cache)"),
        }
    }
}

impl FromStr for LayerKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "exact" => Ok(Self::Exact),
            "1" | "semantic" => Ok(Self::Semantic),
            "2" | "retrieval" | "rag" => Ok(Self::Retrieval),
            other => Err(DomainError::validation(format!(
                "Unknown cache layer: {}. Valid layers: 0, 1, 2",
                other
            ))),
        }
    }
}

/// Base capability every layer provides.
///
/// `get` is fail-open: store outages, timeouts and embedding failures are
/// reported as `None` and only become visible through `healthy`.
#[async_trait]
pub trait CacheLayer: Send + Sync + fmt::Debug {
    type Hit: Send;

    fn kind(&self) -> LayerKind;

    async fn get(&self, query: &Query) -> Option<Self::Hit>;

    async fn clear(&self) -> Result<(), DomainError>;

    async fn healthy(&self) -> bool;
}

/// Layers that store final answers
#[async_trait]
pub trait AnswerCache: CacheLayer {
    async fn set(&self, query: &Query, response: &str) -> Result<(), DomainError>;
}

/// Exact-match extensions
#[async_trait]
pub trait ExactLayer: AnswerCache<Hit = String> {
    async fn set_with_ttl(
        &self,
        query: &Query,
        response: &str,
        ttl: Duration,
    ) -> Result<(), DomainError>;

    async fn delete(&self, query: &Query) -> Result<bool, DomainError>;
}

/// A semantic cache hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticHit {
    pub response: String,
    pub score: f32,
    pub matched_query: String,
}

/// Similarity-match extensions
#[async_trait]
pub trait SemanticLayer: AnswerCache<Hit = SemanticHit> {
    async fn get_with_threshold(&self, query: &Query, threshold: f32) -> Option<SemanticHit>;
}

/// Document ingestion capability
#[async_trait]
pub trait DocumentIngest: Send + Sync {
    async fn add_document(&self, document: NewDocument) -> Result<String, DomainError>;

    async fn add_documents_batch(
        &self,
        documents: Vec<NewDocument>,
    ) -> Result<Vec<String>, DomainError>;
}

/// Retrieval extensions; `get` uses the configured default top-k
#[async_trait]
pub trait RetrievalLayer: CacheLayer<Hit = Vec<RetrievalResult>> + DocumentIngest {
    async fn search(&self, query: &Query, top_k: usize) -> Vec<RetrievalResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_kind_display() {
        assert_eq!(LayerKind::Exact.to_string(), "Layer 0 (Exact Cache)");
        assert_eq!(LayerKind::Semantic.to_string(), "Layer 1 (Semantic Cache)");
        assert_eq!(LayerKind::Retrieval.to_string(), "Layer 2 (RAG Cache)");
    }

    #[test]
    fn test_layer_kind_from_str() {
        assert_eq!("0".parse::<LayerKind>().unwrap(), LayerKind::Exact);
        assert_eq!("semantic".parse::<LayerKind>().unwrap(), LayerKind::Semantic);
        assert_eq!("RAG".parse::<LayerKind>().unwrap(), LayerKind::Retrieval);
        assert_eq!("2".parse::<LayerKind>().unwrap(), LayerKind::Retrieval);
    }

    #[test]
    fn test_layer_kind_from_str_invalid() {
        let err = "3".parse::<LayerKind>().unwrap_err();
        assert!(err.to_string().contains("Valid layers: 0, 1, 2"));
    }

    #[test]
    fn test_layer_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&LayerKind::Retrieval).unwrap(),
            "\"retrieval\""
        );
    }

    #[test]
    fn test_layer_levels_are_ordered() {
        let levels: Vec<u8> = LayerKind::ALL.iter().map(|k| k.level()).collect();
        assert_eq!(levels, vec![0, 1, 2]);
    }
}
