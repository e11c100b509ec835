//! Hierarchy coordinator
//!
//! Lookup order per query: exact -> semantic -> retrieval -> generation.
//! Hits in a lower layer are written back into the layers above it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, info, warn};

use super::GenerationGateway;
use crate::domain::hierarchy::build_context;
use crate::domain::{
    AnswerCache, CacheLayer, ClearReport, DocumentIngest, DomainError, ExactLayer, HierarchyHealth, LayerKind, NewDocument, Query,
    QueryOutcome, RetrievalLayer, SemanticLayer,
};

/// Runs queries through the cache layers and generation
#[derive(Debug)]
pub struct HierarchyService {
    exact: Arc<dyn ExactLayer>,
    semantic: Arc<dyn SemanticLayer>,
    retrieval: Arc<dyn RetrievalLayer>,
    gateway: Arc<GenerationGateway>,
    rag_top_k: usize,
    write_back_failures: AtomicU64,
}

impl HierarchyService {
    pub fn new(
        exact: Arc<dyn ExactLayer>,
        semantic: Arc<dyn SemanticLayer>,
        retrieval: Arc<dyn RetrievalLayer>,
        gateway: Arc<GenerationGateway>,
        rag_top_k: usize,
    ) -> Self {
        Self {
            exact,
            semantic,
            retrieval,
            gateway,
            rag_top_k,
            write_back_failures: AtomicU64::new(0),
        }
    }

    pub fn gateway(&self) -> &Arc<GenerationGateway> {
        &self.gateway
    }

    pub fn write_back_failures(&self) -> u64 {
        self.write_back_failures.load(Ordering::Relaxed)
    }

    /// Answers a query from the first layer that can, generating on a full miss
    pub async fn query(&self, text: &str, provider: Option<&str>) -> Result<QueryOutcome, DomainError> {
        let started = Instant::now();
        let query = Query::new(text)?;

        let outcome = self.run(&query, provider).await?;
        let elapsed = started.elapsed().as_secs_f64();

        histogram!("query_duration_seconds", "layer" => outcome.source_label()).record(elapsed);
        info!(
            source = outcome.source_label(),
            cache_hit = outcome.cache_hit,
            llm_called = outcome.llm_called,
            elapsed_ms = elapsed * 1000.0,
            "Query answered"
        );

        Ok(outcome.with_elapsed(elapsed))
    }

    async fn run(&self, query: &Query, provider: Option<&str>) -> Result<QueryOutcome, DomainError> {
        let raw = query.raw();

        if let Some(response) = self.exact.get(query).await {
            record_lookup(LayerKind::Exact, true);
            return Ok(QueryOutcome::exact_hit(raw, response));
        }
        record_lookup(LayerKind::Exact, false);

        if let Some(hit) = self.semantic.get(query).await {
            record_lookup(LayerKind::Semantic, true);
            debug!(score = hit.score, matched = %hit.matched_query, "Promoting semantic hit");

            self.note_write_back(LayerKind::Exact, self.exact.set(query, &hit.response).await);
            return Ok(QueryOutcome::semantic_hit(raw, hit.response, hit.score));
        }
        record_lookup(LayerKind::Semantic, false);

        let results = self.retrieval.search(query, self.rag_top_k).await;

        if !results.is_empty() {
            record_lookup(LayerKind::Retrieval, true);
            let context = build_context(&results);

            let generated = self
                .gateway
                .generate(query.normalized(), Some(&context), provider)
                .await?;

            self.note_write_back(LayerKind::Semantic, self.semantic.set(query, &generated.text).await);
            self.note_write_back(LayerKind::Exact, self.exact.set(query, &generated.text).await);

            return Ok(QueryOutcome::retrieval_hit(
                raw,
                generated.text,
                generated.provider,
                results.len(),
            ));
        }
        record_lookup(LayerKind::Retrieval, false);

        let generated = self.gateway.generate(query.normalized(), None, provider).await?;

        self.note_write_back(LayerKind::Exact, self.exact.set(query, &generated.text).await);
        self.note_write_back(LayerKind::Semantic, self.semantic.set(query, &generated.text).await);

        Ok(QueryOutcome::miss(raw, generated.text, generated.provider))
    }

    fn note_write_back(&self, layer: LayerKind, result: Result<(), DomainError>) {
        if let Err(e) = result {
            self.write_back_failures.fetch_add(1, Ordering::Relaxed);
            counter!("cache_write_back_failures_total", "layer" => layer.as_str()).increment(1);
            warn!(layer = %layer, error = %e, "Cache write-back failed");
        }
    }

    /// Clears one layer, or every layer when `layer` is `None`
    pub async fn clear_cache(&self, layer: Option<LayerKind>) -> Result<ClearReport, DomainError> {
        let layers = match layer {
            Some(layer) => vec![layer],
            None => LayerKind::ALL.to_vec(),
        };

        for layer in &layers {
            match layer {
                LayerKind::Exact => self.exact.clear().await?,
                LayerKind::Semantic => self.semantic.clear().await?,
                LayerKind::Retrieval => self.retrieval.clear().await?,
            }
            info!(layer = %layer, "Cleared cache layer");
        }

        Ok(ClearReport { cleared: layers })
    }

    pub async fn health(&self) -> HierarchyHealth {
        let (exact, semantic, retrieval) = tokio::join!(
            self.exact.healthy(),
            self.semantic.healthy(),
            self.retrieval.healthy()
        );

        HierarchyHealth {
            exact,
            semantic,
            retrieval,
            providers: self.gateway.provider_names().await,
            write_back_failures: self.write_back_failures(),
        }
    }

    pub async fn add_document(&self, document: NewDocument) -> Result<String, DomainError> {
        self.retrieval.add_document(document).await
    }

    pub async fn add_documents_batch(&self, documents: Vec<NewDocument>) -> Result<Vec<String>, DomainError> {
        self.retrieval.add_documents_batch(documents).await
    }
}

fn record_lookup(layer: LayerKind, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("cache_lookups_total", "layer" => layer.as_str(), "result" => result).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use crate::domain::cache::MockKvStore;
    use crate::domain::embedding::StaticEmbeddingProvider;
    use crate::domain::semantic_cache::SemanticCacheConfig;
    use crate::domain::{ChunkingConfig, EmbeddingProvider, KvStore};
    use crate::infrastructure::embedding::HashingEmbeddingProvider;
    use crate::infrastructure::generation::{CustomBinding, ProviderBinding};
    use crate::infrastructure::ingestion::{WordTokenCounter, create_chunker};
    use crate::infrastructure::cache::InMemoryKvStore;
    use crate::infrastructure::services::{
        ExactCacheConfig, ExactCacheService, RetrievalConfig, RetrievalService,
        SemanticCacheService,
    };
    use crate::infrastructure::vector_store::InMemoryVectorStore;

    struct Harness {
        service: HierarchyService,
        exact: Arc<ExactCacheService>,
        calls: Arc<AtomicUsize>,
    }

    async fn harness_with(
        kv: Arc<dyn KvStore>,
        retrieval_embeddings: Arc<dyn EmbeddingProvider>,
    ) -> Harness {
        let vectors = Arc::new(InMemoryVectorStore::new());
        let exact = Arc::new(ExactCacheService::new(kv, ExactCacheConfig::default()));
        let semantic = Arc::new(SemanticCacheService::new(
            vectors.clone(),
            Arc::new(HashingEmbeddingProvider::new(384).unwrap()),
            384,
            SemanticCacheConfig::default(),
        ));
        let dimension = retrieval_embeddings.dimensions("any").unwrap_or(384);
        let chunking = ChunkingConfig::default();
        let retrieval = Arc::new(RetrievalService::new(
            vectors,
            retrieval_embeddings,
            create_chunker(chunking.strategy, Arc::new(WordTokenCounter::new())),
            chunking,
            dimension,
            RetrievalConfig::default(),
        ));

        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let gateway = Arc::new(GenerationGateway::new(Some("counting".to_string())));
        let binding = ProviderBinding::custom(CustomBinding::function(move |query, context| {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok(match context {
                Some(context) => format!("Grounded answer to '{}' using {} chars", query, context.len()),
                None => format!("Answer to '{}'", query),
            })
        }));

        gateway.register("counting", binding).await;
        let service = HierarchyService::new(exact.clone(), semantic, retrieval, gateway, 3);

        Harness {
            service,
            exact,
            calls,
        }
    }

    async fn harness() -> Harness {
        harness_with(
            Arc::new(InMemoryKvStore::new()),
            Arc::new(HashingEmbeddingProvider::new(384).unwrap()),
        )
        .await
    }

    #[tokio::test]
    async fn test_end_to_end_miss_then_exact_hit() {
        let h = harness().await;

        let first = h.service.query("What is Python?", None).await.unwrap();
        assert!(!first.cache_hit);
        assert!(first.llm_called);
        assert_eq!(first.cache_layer, None);
        assert_eq!(first.llm_provider.as_deref(), Some("counting"));
        assert_eq!(first.response, "Answer to 'What is Python?'");

        let second = h.service.query("What is Python?", None).await.unwrap();
        assert!(second.cache_hit);
        assert!(!second.llm_called);
        assert_eq!(second.cache_layer, Some(LayerKind::Exact));
        assert_eq!(second.response, first.response);
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_miss_populates_exact_and_semantic() {
        let h = harness().await;

        let first = h.service.query("What is Python?", None).await.unwrap();

        let exact = h.exact.get(&Query::new("What is Python?").unwrap()).await;
        assert_eq!(exact.as_deref(), Some(first.response.as_str()));

        let paraphrase = h.service.query("what is python", None).await.unwrap();
        assert_eq!(paraphrase.cache_layer, Some(LayerKind::Semantic));
        assert!(paraphrase.similarity.unwrap() >= 0.85);
        assert!(!paraphrase.llm_called);
        assert_eq!(paraphrase.response, first.response);
    }

    #[tokio::test]
    async fn test_semantic_hit_is_promoted_to_exact() {
        let h = harness().await;

        h.service.query("What is Python?", None).await.unwrap();
        let semantic = h.service.query("WHAT IS PYTHON", None).await.unwrap();
        assert_eq!(semantic.cache_layer, Some(LayerKind::Semantic));

        let promoted = h.service.query("WHAT IS PYTHON", None).await.unwrap();
        assert_eq!(promoted.cache_layer, Some(LayerKind::Exact));
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retrieval_path_grounds_generation() {
        let embeddings = StaticEmbeddingProvider::new(384)
            .with_vector("Python was created by Guido van Rossum.", axis(0))
            .with_vector("Who created Python?", axis(0));
        let h = harness_with(Arc::new(InMemoryKvStore::new()), Arc::new(embeddings)).await;

        h.service
            .add_document(NewDocument::new("Python was created by Guido van Rossum."))
            .await
            .unwrap();

        let outcome = h.service.query("Who created Python?", None).await.unwrap();

        assert_eq!(outcome.cache_layer, Some(LayerKind::Retrieval));
        assert!(outcome.cache_hit);
        assert!(outcome.llm_called);
        assert_eq!(outcome.rag_documents, Some(1));
        assert!(outcome.response.starts_with("Grounded answer"));

        let again = h.service.query("Who created Python?", None).await.unwrap();
        assert_eq!(again.cache_layer, Some(LayerKind::Exact));
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_write_back_failure_is_not_fatal() {
        let kv = Arc::new(MockKvStore::new().with_error("redis down"));
        let h = harness_with(kv, Arc::new(HashingEmbeddingProvider::new(384).unwrap())).await;

        let outcome = h.service.query("What is Python?", None).await.unwrap();

        assert_eq!(outcome.response, "Answer to 'What is Python?'");
        assert_eq!(h.service.write_back_failures(), 1);

        let health = h.service.health().await;
        assert!(!health.exact);
        assert!(health.semantic);
        assert_eq!(health.write_back_failures, 1);
        assert!(!health.all_layers_up());
    }

    #[tokio::test]
    async fn test_failed_promotion_after_semantic_hit_is_not_fatal() {
        let kv = Arc::new(MockKvStore::new());
        let h = harness_with(kv.clone(), Arc::new(HashingEmbeddingProvider::new(384).unwrap())).await;

        let first = h.service.query("What is Python?", None).await.unwrap();
        assert_eq!(h.service.write_back_failures(), 0);

        kv.set_error(Some("redis down"));
        let outcome = h.service.query("what is python", None).await.unwrap();

        assert!(outcome.cache_hit);
        assert!(!outcome.llm_called);
        assert_eq!(outcome.cache_layer, Some(LayerKind::Semantic));
        assert_eq!(outcome.response, first.response);
        assert_eq!(h.service.write_back_failures(), 1);
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_provider_propagates() {
        let h = harness().await;

        let err = h.service.query("What is Python?", Some("gpt")).await.unwrap_err();

        assert!(matches!(err, DomainError::ProviderNotFound { .. }));
        assert_eq!(h.service.write_back_failures(), 0);
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let h = harness().await;

        assert!(matches!(
            h.service.query("   ", None).await,
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_clear_single_and_all_layers() {
        let h = harness().await;
        h.service.query("What is Python?", None).await.unwrap();

        let report = h.service.clear_cache(Some(LayerKind::Exact)).await.unwrap();
        assert_eq!(report.cleared, vec![LayerKind::Exact]);

        let after_exact_clear = h.service.query("What is Python?", None).await.unwrap();
        assert_eq!(after_exact_clear.cache_layer, Some(LayerKind::Semantic));

        let report = h.service.clear_cache(None).await.unwrap();
        assert_eq!(report.cleared, LayerKind::ALL.to_vec());

        let after_full_clear = h.service.query("What is Python?", None).await.unwrap();
        assert!(!after_full_clear.cache_hit);
        assert_eq!(h.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_health_lists_providers() {
        let h = harness().await;

        let health = h.service.health().await;

        assert!(health.all_layers_up());
        assert_eq!(health.providers, vec!["counting"]);
        assert_eq!(health.write_back_failures, 0);
    }

    #[tokio::test]
    async fn test_batch_ingest_delegates() {
        let h = harness().await;

        let ids = h
            .service
            .add_documents_batch(vec![NewDocument::new("a"), NewDocument::new(" "), NewDocument::new("b")])
            .await
            .unwrap();

        assert_eq!(ids.len(), 2);
    }

    fn axis(i: usize) -> Vec<f32> {
        let mut v = vec![0.0; 384];
        v[i] = 1.0;
        v
    }
}
