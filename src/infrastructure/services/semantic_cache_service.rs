//! Semantic answer cache
//!
//! Answers are stored under the embedding of the query that produced them, so
//! paraphrased questions can be answered without calling a model.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::collection_state::CollectionState;
use super::store_timeout::with_store_timeout;
use crate::domain::semantic_cache::{CachedAnswer, SemanticCacheConfig};
use crate::domain::{
    AnswerCache, CacheLayer, DistanceMetric, DomainError, EmbeddingProvider, EmbeddingRequest,
    LayerKind, Query, SemanticHit, SemanticLayer, VectorPoint, VectorStore,
};

/// Layer 1: nearest cached answer by cosine similarity
#[derive(Debug)]
pub struct SemanticCacheService {
    store: Arc<dyn VectorStore>,
    embeddings: Arc<dyn EmbeddingProvider>,
    config: SemanticCacheConfig,
    dimension: usize,
    collection: CollectionState,
}

impl SemanticCacheService {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embeddings: Arc<dyn EmbeddingProvider>,
        dimension: usize,
        config: SemanticCacheConfig,
    ) -> Self {
        Self {
            store,
            embeddings,
            config,
            dimension,
            collection: CollectionState::new(),
        }
    }

    pub fn config(&self) -> &SemanticCacheConfig {
        &self.config
    }

    /// Creates the collection on first use, and again after a drop
    async fn ensure_collection(&self) -> Result<(), DomainError> {
        if self.collection.is_ready() {
            return Ok(());
        }

        self.create_collection().await?;
        self.collection.mark_ready();
        info!(collection = %self.config.collection, "Semantic cache collection ready");
        Ok(())
    }

    async fn create_collection(&self) -> Result<(), DomainError> {
        with_store_timeout(
            self.store.backend_name(),
            self.config.store_timeout(),
            self.store
                .ensure_collection(&self.config.collection, self.dimension, DistanceMetric::Cosine),
        )
        .await
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let request = EmbeddingRequest::single(&self.config.embedding_model, text);
        let response = self.embeddings.embed(request).await?;

        response
            .into_vectors()
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::embedding("No embedding returned"))
    }

    /// Best stored answer at or above `threshold`
    async fn nearest(&self, vector: &[f32], threshold: f32) -> Result<Option<(CachedAnswer, f32)>, DomainError> {
        self.ensure_collection().await?;

        let points = with_store_timeout(
            self.store.backend_name(),
            self.config.store_timeout(),
            self.store
                .search(&self.config.collection, vector, 1, Some(threshold)),
        )
        .await?;

        Ok(points
            .first()
            .filter(|p| p.score >= threshold)
            .and_then(|p| CachedAnswer::from_point(p).map(|answer| (answer, p.score))))
    }
}

#[async_trait]
impl CacheLayer for SemanticCacheService {
    type Hit = SemanticHit;

    fn kind(&self) -> LayerKind {
        LayerKind::Semantic
    }

    async fn get(&self, query: &Query) -> Option<SemanticHit> {
        self.get_with_threshold(query, self.config.similarity_threshold)
            .await
    }

    async fn clear(&self) -> Result<(), DomainError> {
        with_store_timeout(
            self.store.backend_name(),
            self.config.store_timeout(),
            self.store.drop_collection(&self.config.collection),
        )
        .await?;

        self.collection.reset();
        self.ensure_collection().await?;
        info!(collection = %self.config.collection, "Cleared semantic cache");
        Ok(())
    }

    async fn healthy(&self) -> bool {
        with_store_timeout(
            self.store.backend_name(),
            self.config.store_timeout(),
            self.store.ping(),
        )
        .await
        .is_ok()
    }
}

#[async_trait]
impl AnswerCache for SemanticCacheService {
    async fn set(&self, query: &Query, response: &str) -> Result<(), DomainError> {
        let vector = self.embed(query.normalized()).await?;

        if self.config.dedupe_on_insert {
            if let Some((existing, score)) = self.nearest(&vector, self.config.dedupe_similarity).await? {
                if existing.response() == response {
                    debug!(score, "Identical answer already cached, skipping insert");
                    return Ok(());
                }
            }
        } else {
            self.ensure_collection().await?;
        }

        let answer = CachedAnswer::new(query.normalized(), response);
        let point = VectorPoint::new(Uuid::new_v4().to_string(), vector, answer.to_payload());

        with_store_timeout(
            self.store.backend_name(),
            self.config.store_timeout(),
            self.store.upsert(&self.config.collection, vec![point]),
        )
        .await
    }
}

#[async_trait]
impl SemanticLayer for SemanticCacheService {
    async fn get_with_threshold(&self, query: &Query, threshold: f32) -> Option<SemanticHit> {
        let vector = match self.embed(query.normalized()).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "Failed to embed query for semantic lookup");
                return None;
            }
        };

        match self.nearest(&vector, threshold).await {
            Ok(Some((answer, score))) => {
                debug!(layer = %self.kind(), score, "Semantic cache hit");
                Some(SemanticHit {
                    response: answer.response().to_string(),
                    score,
                    matched_query: answer.query().to_string(),
                })
            }
            Ok(None) => None,
            Err(e) => {
                warn!(layer = %self.kind(), error = %e, "Semantic cache lookup failed, treating as miss");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::StaticEmbeddingProvider;
    use crate::infrastructure::embedding::HashingEmbeddingProvider;
    use crate::infrastructure::vector_store::{FlakyVectorStore, InMemoryVectorStore};

    const COLLECTION: &str = "semantic_cache";

    fn query(text: &str) -> Query {
        Query::new(text).unwrap()
    }

    fn static_service(
        store: Arc<InMemoryVectorStore>,
        embeddings: Arc<StaticEmbeddingProvider>,
    ) -> SemanticCacheService {
        SemanticCacheService::new(store, embeddings, 3, SemanticCacheConfig::default())
    }

    fn paraphrase_embeddings() -> StaticEmbeddingProvider {
        StaticEmbeddingProvider::new(3)
            .with_vector("What is Rust?", vec![1.0, 0.0, 0.0])
            .with_vector("Tell me about Rust", vec![0.9, 0.1, 0.0])
            .with_vector("Best pizza in town", vec![0.0, 1.0, 0.0])
    }

    #[tokio::test]
    async fn test_set_then_get_same_query() {
        let store = Arc::new(InMemoryVectorStore::new());
        let cache = static_service(store, Arc::new(paraphrase_embeddings()));

        cache.set(&query("What is Rust?"), "A language.").await.unwrap();
        let hit = cache.get(&query("What is Rust?")).await.unwrap();

        assert_eq!(hit.response, "A language.");
        assert_eq!(hit.matched_query, "What is Rust?");
        assert!((hit.score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_paraphrase_hits_and_unrelated_misses() {
        let store = Arc::new(InMemoryVectorStore::new());
        let cache = static_service(store, Arc::new(paraphrase_embeddings()));

        cache.set(&query("What is Rust?"), "A language.").await.unwrap();

        let hit = cache.get(&query("Tell me about Rust")).await.unwrap();
        assert_eq!(hit.response, "A language.");
        assert!(hit.score >= 0.85);

        assert!(cache.get(&query("Best pizza in town")).await.is_none());
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let store = Arc::new(InMemoryVectorStore::new());
        let cache = static_service(store, Arc::new(paraphrase_embeddings()));
        let paraphrase = query("Tell me about Rust");

        cache.set(&query("What is Rust?"), "A language.").await.unwrap();
        let score = cache.get_with_threshold(&paraphrase, 0.0).await.unwrap().score;

        assert!(cache.get_with_threshold(&paraphrase, score).await.is_some());
        assert!(cache.get_with_threshold(&paraphrase, score + 1e-4).await.is_none());
    }

    #[tokio::test]
    async fn test_dedupe_skips_identical_answer() {
        let store = Arc::new(InMemoryVectorStore::new());
        let cache = static_service(store.clone(), Arc::new(paraphrase_embeddings()));
        let q = query("What is Rust?");

        cache.set(&q, "A language.").await.unwrap();
        cache.set(&q, "A language.").await.unwrap();
        assert_eq!(store.point_count(COLLECTION), Some(1));

        cache.set(&q, "A systems language.").await.unwrap();
        assert_eq!(store.point_count(COLLECTION), Some(2));
    }

    #[tokio::test]
    async fn test_duplicates_kept_when_dedupe_disabled() {
        let store = Arc::new(InMemoryVectorStore::new());
        let cache = SemanticCacheService::new(
            store.clone(),
            Arc::new(paraphrase_embeddings()),
            3,
            SemanticCacheConfig::default().with_dedupe_on_insert(false),
        );
        let q = query("What is Rust?");

        cache.set(&q, "A language.").await.unwrap();
        cache.set(&q, "A language.").await.unwrap();

        assert_eq!(store.point_count(COLLECTION), Some(2));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_miss_on_read_and_error_on_write() {
        let store = Arc::new(InMemoryVectorStore::new());
        let embeddings = Arc::new(paraphrase_embeddings().with_error("model offline"));
        let cache = static_service(store, embeddings.clone());
        let q = query("What is Rust?");

        assert!(cache.get(&q).await.is_none());
        assert!(matches!(
            cache.set(&q, "r").await,
            Err(DomainError::Embedding { .. })
        ));

        embeddings.set_error(None);
        cache.set(&q, "r").await.unwrap();
        assert!(cache.get(&q).await.is_some());
    }

    #[tokio::test]
    async fn test_collection_created_lazily_once() {
        let store = Arc::new(InMemoryVectorStore::new());
        let cache = static_service(store.clone(), Arc::new(paraphrase_embeddings()));

        assert!(store.list_collections().await.unwrap().is_empty());

        cache.get(&query("What is Rust?")).await;
        cache.get(&query("What is Rust?")).await;

        assert_eq!(store.list_collections().await.unwrap(), vec![COLLECTION]);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_retried_after_fix() {
        let store = Arc::new(InMemoryVectorStore::new());
        store
            .ensure_collection(COLLECTION, 5, DistanceMetric::Cosine)
            .await
            .unwrap();
        let cache = static_service(store.clone(), Arc::new(paraphrase_embeddings()));
        let q = query("What is Rust?");

        assert!(cache.get(&q).await.is_none());
        assert!(matches!(
            cache.set(&q, "r").await,
            Err(DomainError::DimensionMismatch { .. })
        ));

        store.drop_collection(COLLECTION).await.unwrap();
        cache.set(&q, "r").await.unwrap();
        assert!(cache.get(&q).await.is_some());
    }

    #[tokio::test]
    async fn test_clear_drops_and_recreates() {
        let store = Arc::new(InMemoryVectorStore::new());
        let cache = static_service(store.clone(), Arc::new(paraphrase_embeddings()));
        let q = query("What is Rust?");

        cache.set(&q, "A language.").await.unwrap();
        cache.clear().await.unwrap();

        assert!(cache.get(&q).await.is_none());
        assert_eq!(store.point_count(COLLECTION), Some(0));
        assert!(cache.healthy().await);
    }

    #[tokio::test]
    async fn test_failed_recreate_after_clear_is_retried() {
        let store = Arc::new(FlakyVectorStore::new());
        let cache = SemanticCacheService::new(
            store.clone(),
            Arc::new(paraphrase_embeddings()),
            3,
            SemanticCacheConfig::default(),
        );
        let q = query("What is Rust?");

        cache.set(&q, "A language.").await.unwrap();

        store.fail_next_ensures(1);
        assert!(cache.clear().await.is_err());

        cache.set(&q, "A language.").await.unwrap();
        assert_eq!(store.point_count(COLLECTION), Some(1));
        assert_eq!(cache.get(&q).await.unwrap().response, "A language.");
    }

    #[tokio::test]
    async fn test_hashing_embeddings_match_case_and_punctuation_variants() {
        let store = Arc::new(InMemoryVectorStore::new());
        let cache = SemanticCacheService::new(
            store,
            Arc::new(HashingEmbeddingProvider::new(384).unwrap()),
            384,
            SemanticCacheConfig::default(),
        );

        cache
            .set(&query("What is Python?"), "A programming language.")
            .await
            .unwrap();

        let hit = cache.get(&query("what is python")).await.unwrap();
        assert_eq!(hit.response, "A programming language.");
    }
}
