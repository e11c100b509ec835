//! Retrieval layer: chunked documents searched for grounding context

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::collection_state::CollectionState;
use super::store_timeout::with_store_timeout;
use crate::domain::retrieval::{ChunkingStrategy, DocumentChunk};
use crate::domain::{
    CacheLayer, ChunkingConfig, DistanceMetric, DocumentIngest, DomainError, EmbeddingProvider,
    EmbeddingRequest, LayerKind, NewDocument, Query, RetrievalLayer, RetrievalResult, VectorPoint,
    VectorStore,
};

/// Configuration for the retrieval layer
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub collection: String,
    /// Minimum chunk score, inclusive
    pub similarity_threshold: f32,
    /// Results returned by `get`
    pub top_k: usize,
    pub embedding_model: String,
    pub store_timeout: Duration,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            collection: "rag_cache".to_string(),
            similarity_threshold: 0.75,
            top_k: 3,
            embedding_model: "all-MiniLM-L6-v2".to_string(),
            store_timeout: Duration::from_millis(2000),
        }
    }
}

impl RetrievalConfig {
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }
}

/// Layer 2: ranks document chunks by similarity to the query
#[derive(Debug)]
pub struct RetrievalService {
    store: Arc<dyn VectorStore>,
    embeddings: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn ChunkingStrategy>,
    chunking: ChunkingConfig,
    config: RetrievalConfig,
    dimension: usize,
    collection: CollectionState,
}

impl RetrievalService {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embeddings: Arc<dyn EmbeddingProvider>,
        chunker: Arc<dyn ChunkingStrategy>,
        chunking: ChunkingConfig,
        dimension: usize,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            embeddings,
            chunker,
            chunking,
            config,
            dimension,
            collection: CollectionState::new(),
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Creates the collection on first use, and again after a drop
    async fn ensure_collection(&self) -> Result<(), DomainError> {
        if self.collection.is_ready() {
            return Ok(());
        }

        self.create_collection().await?;
        self.collection.mark_ready();
        info!(collection = %self.config.collection, "Retrieval collection ready");
        Ok(())
    }

    async fn create_collection(&self) -> Result<(), DomainError> {
        with_store_timeout(
            self.store.backend_name(),
            self.config.store_timeout,
            self.store
                .ensure_collection(&self.config.collection, self.dimension, DistanceMetric::Cosine),
        )
        .await
    }

    /// Chunk texts for one document; the whole content when chunking is off
    fn split(&self, content: &str) -> Result<Vec<String>, DomainError> {
        if !self.chunking.enabled {
            return Ok(vec![content.to_string()]);
        }

        let parts = self.chunker.split(content, &self.chunking)?;

        if parts.is_empty() {
            Ok(vec![content.trim().to_string()])
        } else {
            Ok(parts)
        }
    }

    async fn embed_all(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, DomainError> {
        let expected = texts.len();
        let request = EmbeddingRequest::batch(&self.config.embedding_model, texts);
        let vectors = self.embeddings.embed(request).await?.into_vectors();

        if vectors.len() != expected {
            return Err(DomainError::embedding(format!(
                "Expected {} embeddings, got {}",
                expected,
                vectors.len()
            )));
        }

        Ok(vectors)
    }

    async fn try_search(&self, query: &Query, top_k: usize) -> Result<Vec<RetrievalResult>, DomainError> {
        let request = EmbeddingRequest::single(&self.config.embedding_model, query.normalized());
        let vector = self
            .embeddings
            .embed(request)
            .await?
            .into_vectors()
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::embedding("No embedding returned"))?;

        self.ensure_collection().await?;

        let points = with_store_timeout(
            self.store.backend_name(),
            self.config.store_timeout,
            self.store.search(
                &self.config.collection,
                &vector,
                top_k,
                Some(self.config.similarity_threshold),
            ),
        )
        .await?;

        Ok(points
            .into_iter()
            .filter(|p| p.score >= self.config.similarity_threshold)
            .filter_map(RetrievalResult::from_point)
            .take(top_k)
            .collect())
    }
}

#[async_trait]
impl CacheLayer for RetrievalService {
    type Hit = Vec<RetrievalResult>;

    fn kind(&self) -> LayerKind {
        LayerKind::Retrieval
    }

    /// Returns `None` when nothing relevant is stored
    async fn get(&self, query: &Query) -> Option<Vec<RetrievalResult>> {
        let results = self.search(query, self.config.top_k).await;
        (!results.is_empty()).then_some(results)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        with_store_timeout(
            self.store.backend_name(),
            self.config.store_timeout,
            self.store.drop_collection(&self.config.collection),
        )
        .await?;

        self.collection.reset();
        self.ensure_collection().await?;
        info!(collection = %self.config.collection, "Cleared retrieval documents");
        Ok(())
    }

    async fn healthy(&self) -> bool {
        with_store_timeout(self.store.backend_name(), self.config.store_timeout, self.store.ping())
            .await
            .is_ok()
    }
}

#[async_trait]
impl DocumentIngest for RetrievalService {
    async fn add_document(&self, document: NewDocument) -> Result<String, DomainError> {
        if document.is_blank() {
            return Err(DomainError::validation("Document content cannot be empty"));
        }

        self.add_documents_batch(vec![document])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::internal("No document id returned"))
    }

    async fn add_documents_batch(&self, documents: Vec<NewDocument>) -> Result<Vec<String>, DomainError> {
        let mut ids = Vec::new();
        let mut chunks = Vec::new();

        for document in documents.iter().filter(|d| !d.is_blank()) {
            let id = Uuid::new_v4().to_string();
            let parts = self.split(&document.content)?;

            chunks.extend(DocumentChunk::from_parts(&id, parts, &document.metadata));
            ids.push(id);
        }

        let skipped = documents.len() - ids.len();
        if skipped > 0 {
            debug!(skipped, "Skipped blank documents");
        }

        if chunks.is_empty() {
            return Ok(ids);
        }

        let texts = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embed_all(texts).await?;

        let points = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| VectorPoint::new(chunk.id.clone(), vector, chunk.to_payload()))
            .collect::<Vec<_>>();

        self.ensure_collection().await?;

        with_store_timeout(
            self.store.backend_name(),
            self.config.store_timeout,
            self.store.upsert(&self.config.collection, points),
        )
        .await?;

        info!(documents = ids.len(), chunks = chunks.len(), "Ingested documents");
        Ok(ids)
    }
}

#[async_trait]
impl RetrievalLayer for RetrievalService {
    async fn search(&self, query: &Query, top_k: usize) -> Vec<RetrievalResult> {
        match self.try_search(query, top_k).await {
            Ok(results) => {
                debug!(layer = %self.kind(), results = results.len(), "Retrieval search finished");
                results
            }
            Err(e) => {
                warn!(layer = %self.kind(), error = %e, "Retrieval search failed, returning no context");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::StaticEmbeddingProvider;
    use crate::domain::retrieval::ChunkingStrategyKind;
    use crate::infrastructure::ingestion::{WordTokenCounter, create_chunker};
    use crate::infrastructure::vector_store::{FlakyVectorStore, InMemoryVectorStore};
    use serde_json::json;

    const COLLECTION: &str = "rag_cache";

    fn service_with(
        store: Arc<InMemoryVectorStore>,
        embeddings: Arc<StaticEmbeddingProvider>,
        chunking: ChunkingConfig,
    ) -> RetrievalService {
        let chunker = create_chunker(chunking.strategy, Arc::new(WordTokenCounter::new()));
        RetrievalService::new(store, embeddings, chunker, chunking, 3, RetrievalConfig::default())
    }

    fn query(text: &str) -> Query {
        Query::new(text).unwrap()
    }

    fn embeddings() -> StaticEmbeddingProvider {
        StaticEmbeddingProvider::new(3)
            .with_vector("Python was created by Guido van Rossum.", vec![1.0, 0.0, 0.0])
            .with_vector("Python emphasizes readability.", vec![0.8, 0.6, 0.0])
            .with_vector("Paris is the capital of France.", vec![0.0, 1.0, 0.0])
            .with_vector("Who created Python?", vec![1.0, 0.0, 0.0])
    }

    #[tokio::test]
    async fn test_short_document_is_one_unchunked_chunk() {
        let store = Arc::new(InMemoryVectorStore::new());
        let service = service_with(store.clone(), Arc::new(embeddings()), ChunkingConfig::default());

        let id = service
            .add_document(NewDocument::new("Python was created by Guido van Rossum."))
            .await
            .unwrap();

        let results = service.search(&query("Who created Python?"), 3).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].parent_doc_id(), Some(id.as_str()));
        assert_eq!(results[0].metadata["is_chunked"], false);
        assert_eq!(results[0].metadata["total_chunks"], 1);
        assert_eq!(store.point_count(COLLECTION), Some(1));
    }

    #[tokio::test]
    async fn test_long_document_chunks_share_parent() {
        let store = Arc::new(InMemoryVectorStore::new());
        let embeddings = Arc::new(StaticEmbeddingProvider::new(3));
        let service = service_with(store.clone(), embeddings.clone(), ChunkingConfig::new(8, 2));
        let content = (0..10)
            .map(|i| format!("Paragraph {} describes one caching detail.", i))
            .collect::<Vec<_>>()
            .join("\n\n");

        let id = service
            .add_document(NewDocument::new(content).with_metadata("source", "manual"))
            .await
            .unwrap();

        let total = store.point_count(COLLECTION).unwrap();
        assert!(total > 1);

        // every unknown text embeds onto the same axis, so any query sees all chunks
        let results = service.search(&query("anything"), 100).await;
        assert_eq!(results.len(), total);
        for result in &results {
            assert_eq!(result.parent_doc_id(), Some(id.as_str()));
            assert_eq!(result.metadata["total_chunks"], json!(total));
            assert_eq!(result.metadata["is_chunked"], true);
            assert_eq!(result.metadata["source"], "manual");
        }
    }

    #[tokio::test]
    async fn test_chunking_disabled_keeps_full_content() {
        let store = Arc::new(InMemoryVectorStore::new());
        let service = service_with(
            store.clone(),
            Arc::new(StaticEmbeddingProvider::new(3)),
            ChunkingConfig::new(2, 0).with_enabled(false),
        );

        service
            .add_document(NewDocument::new("one two three four five"))
            .await
            .unwrap();

        let results = service.search(&query("anything"), 5).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "one two three four five");
    }

    #[tokio::test]
    async fn test_batch_uses_one_embedding_call_and_skips_blank() {
        let store = Arc::new(InMemoryVectorStore::new());
        let embeddings = Arc::new(embeddings());
        let service = service_with(store.clone(), embeddings.clone(), ChunkingConfig::default());

        let ids = service
            .add_documents_batch(vec![
                NewDocument::new("Python was created by Guido van Rossum."),
                NewDocument::new("   \n"),
                NewDocument::new("Paris is the capital of France."),
            ])
            .await
            .unwrap();

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(embeddings.calls(), 1);
        assert_eq!(store.point_count(COLLECTION), Some(2));
    }

    #[tokio::test]
    async fn test_blank_batch_writes_nothing() {
        let store = Arc::new(InMemoryVectorStore::new());
        let embeddings = Arc::new(embeddings());
        let service = service_with(store.clone(), embeddings.clone(), ChunkingConfig::default());

        let ids = service
            .add_documents_batch(vec![NewDocument::new(""), NewDocument::new(" ")])
            .await
            .unwrap();

        assert!(ids.is_empty());
        assert_eq!(embeddings.calls(), 0);
        assert!(store.list_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_single_document_is_rejected() {
        let service = service_with(
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(embeddings()),
            ChunkingConfig::default(),
        );

        assert!(matches!(
            service.add_document(NewDocument::new("  ")).await,
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_ranking_and_threshold() {
        let store = Arc::new(InMemoryVectorStore::new());
        let service = service_with(store, Arc::new(embeddings()), ChunkingConfig::default());

        service
            .add_documents_batch(vec![
                NewDocument::new("Python emphasizes readability."),
                NewDocument::new("Python was created by Guido van Rossum."),
                NewDocument::new("Paris is the capital of France."),
            ])
            .await
            .unwrap();

        let results = service.get(&query("Who created Python?")).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "Python was created by Guido van Rossum.");
        assert_eq!(results[1].content, "Python emphasizes readability.");
        assert!(results[0].score > results[1].score);
        assert!(results[1].score >= 0.75);
    }

    #[tokio::test]
    async fn test_empty_collection_and_failures_give_no_results() {
        let store = Arc::new(InMemoryVectorStore::new());
        let embeddings = Arc::new(embeddings());
        let service = service_with(store, embeddings.clone(), ChunkingConfig::default());

        assert!(service.get(&query("Who created Python?")).await.is_none());

        embeddings.set_error(Some("offline"));
        assert!(service.search(&query("Who created Python?"), 3).await.is_empty());
        assert!(
            service
                .add_document(NewDocument::new("Python was created by Guido van Rossum."))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_clear_removes_documents() {
        let store = Arc::new(InMemoryVectorStore::new());
        let service = service_with(store.clone(), Arc::new(embeddings()), ChunkingConfig::default());

        service
            .add_document(NewDocument::new("Python was created by Guido van Rossum."))
            .await
            .unwrap();
        service.clear().await.unwrap();

        assert_eq!(store.point_count(COLLECTION), Some(0));
        assert!(service.get(&query("Who created Python?")).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_recreate_after_clear_is_retried() {
        let store = Arc::new(FlakyVectorStore::new());
        let chunking = ChunkingConfig::default();
        let chunker = create_chunker(chunking.strategy, Arc::new(WordTokenCounter::new()));
        let service = RetrievalService::new(
            store.clone(),
            Arc::new(embeddings()),
            chunker,
            chunking,
            3,
            RetrievalConfig::default(),
        );

        store.fail_next_ensures(1);
        assert!(service.clear().await.is_err());

        service
            .add_document(NewDocument::new("Python was created by Guido van Rossum."))
            .await
            .unwrap();

        assert_eq!(store.point_count(COLLECTION), Some(1));
        let results = service.get(&query("Who created Python?")).await.unwrap();
        assert_eq!(results[0].content, "Python was created by Guido van Rossum.");
    }

    #[tokio::test]
    async fn test_fixed_strategy() {
        let store = Arc::new(InMemoryVectorStore::new());
        let service = service_with(
            store.clone(),
            Arc::new(StaticEmbeddingProvider::new(3)),
            ChunkingConfig::new(3, 0).with_strategy(ChunkingStrategyKind::Fixed),
        );

        service
            .add_document(NewDocument::new("a b c\nd e f\ng"))
            .await
            .unwrap();

        assert_eq!(store.point_count(COLLECTION), Some(3));
    }
}
