//! Results reported by the hierarchy coordinator

use serde::{Deserialize, Serialize};

use crate::domain::cache::LayerKind;
use crate::domain::retrieval::RetrievalResult;

/// Terminal result of one query through the hierarchy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub query: String,
    pub response: String,
    /// Layer that produced the hit; `None` on a full miss
    pub cache_layer: Option<LayerKind>,
    pub cache_hit: bool,
    pub llm_called: bool,
    pub llm_provider: Option<String>,
    /// Supporting chunk count on the retrieval path
    pub rag_documents: Option<usize>,
    /// Best match score on a semantic hit
    pub similarity: Option<f32>,
    /// Wall-clock seconds spent on the query
    pub elapsed_time: f64,
}

impl QueryOutcome {
    pub fn exact_hit(query: &str, response: String) -> Self {
        Self {
            query: query.to_string(),
            response,
            cache_layer: Some(LayerKind::Exact),
            cache_hit: true,
            llm_called: false,
            llm_provider: None,
            rag_documents: None,
            similarity: None,
            elapsed_time: 0.0,
        }
    }

    pub fn semantic_hit(query: &str, response: String, score: f32) -> Self {
        Self {
            cache_layer: Some(LayerKind::Semantic),
            similarity: Some(score),
            ..Self::exact_hit(query, response)
        }
    }

    pub fn retrieval_hit(query: &str, response: String, provider: String, documents: usize) -> Self {
        Self {
            cache_layer: Some(LayerKind::Retrieval),
            llm_called: true,
            llm_provider: Some(provider),
            rag_documents: Some(documents),
            ..Self::exact_hit(query, response)
        }
    }

    pub fn miss(query: &str, response: String, provider: String) -> Self {
        Self {
            cache_layer: None,
            cache_hit: false,
            llm_called: true,
            llm_provider: Some(provider),
            ..Self::exact_hit(query, response)
        }
    }

    pub fn with_elapsed(mut self, seconds: f64) -> Self {
        self.elapsed_time = seconds;
        self
    }

    /// Label used for metrics; full misses report as "generation"
    pub fn source_label(&self) -> &'static str {
        self.cache_layer.map(|k| k.as_str()).unwrap_or("generation")
    }
}

/// Builds the grounding context handed to generation.
///
/// Results keep their descending score order and are numbered from 1.
pub fn build_context(results: &[RetrievalResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("Document {} (Relevance: {:.2}):\n{}", i + 1, r.score, r.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Layers removed by a clear request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearReport {
    pub cleared: Vec<LayerKind>,
}

/// Health of each layer plus generation providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyHealth {
    pub exact: bool,
    pub semantic: bool,
    pub retrieval: bool,
    pub providers: Vec<String>,
    pub write_back_failures: u64,
}

impl HierarchyHealth {
    /// All three layers reachable
    pub fn all_layers_up(&self) -> bool {
        self.exact && self.semantic && self.retrieval
    }
}
