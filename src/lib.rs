//! PMP Cache Hierarchy
//!
//! Answers natural-language queries through an ordered hierarchy of caches:
//! - Layer 0: exact match on the normalized query (Redis or in-memory)
//! - Layer 1: embedding-similarity match on past answers (Qdrant or in-memory)
//! - Layer 2: retrieval-augmented generation over ingested documents
//!
//! Full misses fall through to a pluggable generation gateway and the answer
//! is written back into the faster layers.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use api::state::AppState;
use domain::semantic_cache::SemanticCacheConfig;
use domain::{DomainError, EmbeddingProvider, VectorStore};
use infrastructure::{
    cache::{KvBackend, KvStoreConfig, create_kv_store},
    embedding::{EmbeddingSettings, create_embedding_provider, resolve_dimension},
    ingestion::{BpeTokenCounter, create_chunker},
    services::{
        ExactCacheConfig, ExactCacheService, GenerationGateway, HierarchyService, RetrievalConfig,
        RetrievalService, SemanticCacheService,
    },
    vector_store::{QdrantConfig, VectorBackend, VectorStoreConfig, create_vector_store},
};

/// Create the application state from configuration
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let hierarchy = build_hierarchy(config)?;

    Ok(AppState::new(Arc::new(hierarchy), config.clone()))
}

/// Wires stores, embeddings, chunking and providers into the coordinator
pub fn build_hierarchy(config: &AppConfig) -> Result<HierarchyService, DomainError> {
    let kv_store = create_kv_store(&kv_store_config(config)?)?;
    info!(backend = %config.cache.backend, "Exact cache store ready");

    let vector_store = create_vector_store(&vector_store_config(config)?)?;
    info!(backend = vector_store.backend_name(), "Vector store ready");

    let embeddings = create_embedding_provider(&embedding_settings(config)?)?;
    let model = config
        .embedding
        .model
        .clone()
        .unwrap_or_else(|| embeddings.default_model().to_string());
    let dimension = resolve_dimension(embeddings.as_ref(), &model, config.embedding.dimensions)?;
    info!(
        provider = embeddings.provider_name(),
        model = %model,
        dimension,
        "Embedding provider ready"
    );

    let exact = ExactCacheService::new(
        kv_store,
        ExactCacheConfig::default()
            .with_default_ttl(config.cache.ttl())
            .with_store_timeout(config.cache.store_timeout()),
    );

    let semantic = build_semantic_layer(
        config,
        vector_store.clone(),
        embeddings.clone(),
        &model,
        dimension,
    );

    let counter = Arc::new(BpeTokenCounter::cl100k()?);
    info!(encoding = counter.encoding(), "Token counter ready");
    let chunker = create_chunker(config.chunking.strategy, counter);
    let retrieval = RetrievalService::new(
        vector_store,
        embeddings,
        chunker,
        config.chunking.clone(),
        dimension,
        RetrievalConfig::default()
            .with_collection(&config.retrieval.collection)
            .with_similarity_threshold(config.cache.rag_similarity_threshold)
            .with_top_k(config.cache.rag_top_k)
            .with_embedding_model(&model)
            .with_store_timeout(config.cache.store_timeout()),
    );

    let gateway = GenerationGateway::from_config(&config.llm);

    Ok(HierarchyService::new(
        Arc::new(exact),
        Arc::new(semantic),
        Arc::new(retrieval),
        Arc::new(gateway),
        config.cache.rag_top_k,
    ))
}

fn build_semantic_layer(
    config: &AppConfig,
    store: Arc<dyn VectorStore>,
    embeddings: Arc<dyn EmbeddingProvider>,
    model: &str,
    dimension: usize,
) -> SemanticCacheService {
    let semantic_config = SemanticCacheConfig::new()
        .with_collection(&config.semantic.collection)
        .with_similarity_threshold(config.cache.semantic_similarity_threshold)
        .with_dedupe_on_insert(config.semantic.dedupe_on_insert)
        .with_dedupe_similarity(config.semantic.dedupe_similarity)
        .with_embedding_model(model)
        .with_store_timeout(config.cache.store_timeout());

    SemanticCacheService::new(store, embeddings, dimension, semantic_config)
}

fn kv_store_config(config: &AppConfig) -> Result<KvStoreConfig, DomainError> {
    let kv_config = match config.cache.backend.parse::<KvBackend>()? {
        KvBackend::Redis => KvStoreConfig::redis(&config.redis.url).with_connection_timeout(
            Duration::from_secs(config.redis.connection_timeout_secs),
        ),
        KvBackend::InMemory => KvStoreConfig::in_memory(),
    };

    let kv_config = kv_config.with_max_capacity(config.cache.max_capacity);

    Ok(match &config.redis.key_prefix {
        Some(prefix) => kv_config.with_key_prefix(prefix),
        None => kv_config,
    })
}

fn vector_store_config(config: &AppConfig) -> Result<VectorStoreConfig, DomainError> {
    let mut store_config = match config.cache.vector_backend.parse::<VectorBackend>()? {
        VectorBackend::Qdrant => {
            let qdrant = QdrantConfig::new(&config.qdrant.url);
            let qdrant = match &config.qdrant.api_key {
                Some(key) => qdrant.with_api_key(key),
                None => qdrant,
            };
            VectorStoreConfig::qdrant(qdrant)
        }
        VectorBackend::InMemory => VectorStoreConfig::in_memory(),
    };

    store_config.request_timeout = Duration::from_secs(config.qdrant.request_timeout_secs);
    Ok(store_config)
}

fn embedding_settings(config: &AppConfig) -> Result<EmbeddingSettings, DomainError> {
    Ok(EmbeddingSettings {
        backend: config.embedding.provider.parse()?,
        model: config.embedding.model.clone(),
        dimensions: config.embedding.dimensions,
        api_key: config.embedding.api_key.clone(),
        base_url: config.embedding.base_url.clone(),
        request_timeout: Duration::from_secs(config.embedding.request_timeout_secs),
        cache_dir: config.embedding.cache_dir.clone(),
    })
}
