//! Local sentence embeddings running on ONNX Runtime via fastembed
//!
//! Model weights are downloaded on first use and cached on disk, so the
//! provider can be built without network access.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::OnceCell;
use tracing::info;

use crate::domain::DomainError;
use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};

pub const DEFAULT_LOCAL_MODEL: &str = "all-MiniLM-L6-v2";

/// Sentence-transformer models available locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalModel {
    #[default]
    AllMiniLmL6V2,
    BgeSmallEnV15,
    BgeBaseEnV15,
    MultilingualE5Small,
}

impl LocalModel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AllMiniLmL6V2 => "all-MiniLM-L6-v2",
            Self::BgeSmallEnV15 => "bge-small-en-v1.5",
            Self::BgeBaseEnV15 => "bge-base-en-v1.5",
            Self::MultilingualE5Small => "multilingual-e5-small",
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            Self::AllMiniLmL6V2 | Self::BgeSmallEnV15 | Self::MultilingualE5Small => 384,
            Self::BgeBaseEnV15 => 768,
        }
    }

    fn embedding_model(&self) -> EmbeddingModel {
        match self {
            Self::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
            Self::BgeSmallEnV15 => EmbeddingModel::BGESmallENV15,
            Self::BgeBaseEnV15 => EmbeddingModel::BGEBaseENV15,
            Self::MultilingualE5Small => EmbeddingModel::MultilingualE5Small,
        }
    }
}

impl std::str::FromStr for LocalModel {
    type Err = DomainError;

    /// Accepts bare names and `sentence-transformers/`-style prefixes
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.rsplit('/').next().unwrap_or(s).to_lowercase();

        match name.as_str() {
            "all-minilm-l6-v2" => Ok(Self::AllMiniLmL6V2),
            "bge-small-en-v1.5" => Ok(Self::BgeSmallEnV15),
            "bge-base-en-v1.5" => Ok(Self::BgeBaseEnV15),
            "multilingual-e5-small" => Ok(Self::MultilingualE5Small),
            _ => Err(DomainError::configuration(format!(
                "Unknown local embedding model: {}. Valid models: all-MiniLM-L6-v2, \
                 bge-small-en-v1.5, bge-base-en-v1.5, multilingual-e5-small",
                s
            ))),
        }
    }
}

/// Embeds text with a local transformer model
pub struct FastEmbedProvider {
    model: LocalModel,
    cache_dir: Option<PathBuf>,
    engine: OnceCell<Arc<TextEmbedding>>,
}

impl FastEmbedProvider {
    pub fn new(model: LocalModel) -> Self {
        Self {
            model,
            cache_dir: None,
            engine: OnceCell::new(),
        }
    }

    /// Where downloaded model files are kept
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn model(&self) -> LocalModel {
        self.model
    }

    /// Loads the model once; a failed load is retried on the next call
    async fn engine(&self) -> Result<Arc<TextEmbedding>, DomainError> {
        self.engine
            .get_or_try_init(|| async {
                let model = self.model;
                let cache_dir = self.cache_dir.clone();
                info!(model = model.name(), "Loading local embedding model");

                let engine = tokio::task::spawn_blocking(move || {
                    let mut options = InitOptions::default();
                    options.model_name = model.embedding_model();
                    options.show_download_progress = false;
                    if let Some(dir) = cache_dir {
                        options.cache_dir = dir;
                    }
                    TextEmbedding::try_new(options)
                })
                .await
                .map_err(|e| DomainError::embedding(format!("Embedding model loader failed: {}", e)))?
                .map_err(|e| {
                    DomainError::embedding(format!("Failed to load {}: {}", model.name(), e))
                })?;

                Ok::<_, DomainError>(Arc::new(engine))
            })
            .await
            .cloned()
    }
}

impl fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("model", &self.model.name())
            .field("cache_dir", &self.cache_dir)
            .field("loaded", &self.engine.initialized())
            .finish()
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        if request.is_empty() {
            return Ok(EmbeddingResponse::new(self.model.name(), Vec::new()));
        }

        let engine = self.engine().await?;
        let texts = request.inputs().to_vec();

        let vectors = tokio::task::spawn_blocking(move || engine.embed(texts, None))
            .await
            .map_err(|e| DomainError::embedding(format!("Embedding task failed: {}", e)))?
            .map_err(|e| DomainError::embedding(format!("Local embedding failed: {}", e)))?;

        Ok(EmbeddingResponse::new(self.model.name(), vectors))
    }

    fn provider_name(&self) -> &'static str {
        "local"
    }

    fn default_model(&self) -> &str {
        self.model.name()
    }

    fn dimensions(&self, _model: &str) -> Option<usize> {
        Some(self.model.dimension())
    }
}
