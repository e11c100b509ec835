use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::ChunkingConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub redis: RedisConfig,
    pub qdrant: QdrantSettings,
    pub cache: CacheConfig,
    pub semantic: SemanticConfig,
    pub retrieval: RetrievalSettings,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    /// Prefix prepended to every key, e.g. `"app:"`
    pub key_prefix: Option<String>,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QdrantSettings {
    pub url: String,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

/// Shared cache settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Exact layer store: `redis` or `in_memory`
    pub backend: String,
    /// Semantic and retrieval store: `qdrant` or `in_memory`
    pub vector_backend: String,
    pub ttl_secs: u64,
    pub semantic_similarity_threshold: f32,
    pub rag_similarity_threshold: f32,
    pub rag_top_k: usize,
    pub store_timeout_ms: u64,
    /// Entry bound for the in-memory key-value store
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    pub collection: String,
    pub dedupe_on_insert: bool,
    pub dedupe_similarity: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// `local`, `hashing` or `openai`
    pub provider: String,
    pub model: Option<String>,
    pub dimensions: Option<usize>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout_secs: u64,
    /// Download cache for local model files
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub default_provider: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub anthropic_base_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: Option<String>,
    pub enable_dummy_provider: bool,
    pub request_timeout_secs: u64,
    pub custom_endpoints: Vec<CustomEndpointConfig>,
}

/// A home-grown completion endpoint registered under `name`
#[derive(Debug, Clone, Deserialize)]
pub struct CustomEndpointConfig {
    pub name: String,
    pub url: String,
    /// Label shown in provider listings; defaults to `name`
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Extra body fields sent with every request
    #[serde(default)]
    pub extra: Map<String, Value>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_temperature() -> f64 {
    0.7
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379/0".to_string(),
            key_prefix: None,
            connection_timeout_secs: 5,
        }
    }
}

impl Default for QdrantSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            api_key: None,
            request_timeout_secs: 10,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: "redis".to_string(),
            vector_backend: "qdrant".to_string(),
            ttl_secs: 3600,
            semantic_similarity_threshold: 0.85,
            rag_similarity_threshold: 0.75,
            rag_top_k: 3,
            store_timeout_ms: 2000,
            max_capacity: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            collection: "semantic_cache".to_string(),
            dedupe_on_insert: true,
            dedupe_similarity: 0.999,
        }
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            collection: "rag_cache".to_string(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            model: None,
            dimensions: Some(384),
            api_key: None,
            base_url: None,
            request_timeout_secs: 30,
            cache_dir: None,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_provider: Some("openai".to_string()),
            openai_api_key: None,
            openai_model: "gpt-3.5-turbo".to_string(),
            openai_base_url: None,
            anthropic_api_key: None,
            anthropic_model: "claude-3-haiku-20240307".to_string(),
            anthropic_base_url: None,
            gemini_api_key: None,
            gemini_model: "gemini-pro".to_string(),
            gemini_base_url: None,
            enable_dummy_provider: false,
            request_timeout_secs: 60,
            custom_endpoints: Vec::new(),
        }
    }
}

impl LlmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `.env`, then `config/default`, `config/local` and `APP__*` variables
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Fully offline setup: in-memory stores, hashing embeddings, dummy provider
    pub fn offline() -> Self {
        Self::default().into_offline()
    }

    /// Keeps thresholds and chunking but swaps every external dependency for a local one
    pub fn into_offline(mut self) -> Self {
        self.cache.backend = "in_memory".to_string();
        self.cache.vector_backend = "in_memory".to_string();
        self.embedding.provider = "hashing".to_string();
        self.embedding.model = None;
        self.llm.enable_dummy_provider = true;
        self.llm.default_provider = Some("dummy".to_string());
        self
    }
}
