//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheConfig, CustomEndpointConfig, EmbeddingConfig, LlmConfig, LogFormat,
    LoggingConfig, MetricsConfig, QdrantSettings, RedisConfig, RetrievalSettings, SemanticConfig,
    ServerConfig,
};
