//! Embedding provider selection

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{
    FastEmbedProvider, HashingEmbeddingProvider, HttpClient, LocalModel, OpenAiEmbeddingProvider,
};
use crate::domain::{DomainError, EmbeddingProvider};

/// Supported embedding backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingBackend {
    /// Transformer model run in-process
    #[default]
    Local,
    /// Feature hashing; no model files, only matches shared words
    Hashing,
    OpenAi,
}

impl std::fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Hashing => write!(f, "hashing"),
            Self::OpenAi => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for EmbeddingBackend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "fastembed" => Ok(Self::Local),
            "hashing" => Ok(Self::Hashing),
            "openai" => Ok(Self::OpenAi),
            _ => Err(DomainError::configuration(format!(
                "Unknown embedding provider: {}. Valid providers: local, hashing, openai",
                s
            ))),
        }
    }
}

/// Settings for building the embedding provider
#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    pub model: Option<String>,
    /// Used when the provider does not declare a dimension for its model
    pub dimensions: Option<usize>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout: Duration,
    /// Model file cache for the local backend
    pub cache_dir: Option<PathBuf>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Local,
            model: None,
            dimensions: Some(super::DEFAULT_HASHING_DIMENSIONS),
            api_key: None,
            base_url: None,
            request_timeout: Duration::from_secs(30),
            cache_dir: None,
        }
    }
}

pub fn create_embedding_provider(
    settings: &EmbeddingSettings,
) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
    match settings.backend {
        EmbeddingBackend::Local => {
            let model = match &settings.model {
                Some(name) => name.parse::<LocalModel>()?,
                None => LocalModel::default(),
            };

            let provider = FastEmbedProvider::new(model);
            let provider = match &settings.cache_dir {
                Some(dir) => provider.with_cache_dir(dir.clone()),
                None => provider,
            };

            Ok(Arc::new(provider))
        }
        EmbeddingBackend::Hashing => {
            let dimensions = settings
                .dimensions
                .unwrap_or(super::DEFAULT_HASHING_DIMENSIONS);
            Ok(Arc::new(HashingEmbeddingProvider::new(dimensions)?))
        }
        EmbeddingBackend::OpenAi => {
            let api_key = settings
                .api_key
                .as_deref()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| {
                    DomainError::configuration("embedding.api_key is required for openai embeddings")
                })?;

            let client = HttpClient::with_timeout(settings.request_timeout)?;
            let provider = match &settings.base_url {
                Some(url) => OpenAiEmbeddingProvider::with_base_url(client, api_key, url),
                None => OpenAiEmbeddingProvider::new(client, api_key),
            };

            let provider = match &settings.model {
                Some(model) => provider.with_model(model),
                None => provider,
            };

            Ok(Arc::new(provider))
        }
    }
}

/// Resolves the vector dimension shared by both vector layers.
///
/// Provider-declared dimension first, then the configured value.
pub fn resolve_dimension(
    provider: &dyn EmbeddingProvider,
    model: &str,
    configured: Option<usize>,
) -> Result<usize, DomainError> {
    provider
        .dimensions(model)
        .or(configured)
        .filter(|d| *d > 0)
        .ok_or_else(|| {
            DomainError::configuration(format!(
                "Unknown embedding dimension for model '{}'; set embedding.dimensions",
                model
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("local".parse::<EmbeddingBackend>().unwrap(), EmbeddingBackend::Local);
        assert_eq!("hashing".parse::<EmbeddingBackend>().unwrap(), EmbeddingBackend::Hashing);
        assert_eq!("OpenAI".parse::<EmbeddingBackend>().unwrap(), EmbeddingBackend::OpenAi);
        assert!("cohere".parse::<EmbeddingBackend>().is_err());
    }

    #[test]
    fn test_default_is_local_minilm() {
        let provider = create_embedding_provider(&EmbeddingSettings::default()).unwrap();

        assert_eq!(provider.provider_name(), "local");
        assert_eq!(provider.default_model(), "all-MiniLM-L6-v2");
        assert_eq!(
            resolve_dimension(provider.as_ref(), provider.default_model(), None).unwrap(),
            384
        );
    }

    #[test]
    fn test_local_model_from_settings() {
        let settings = EmbeddingSettings {
            model: Some("bge-base-en-v1.5".into()),
            ..Default::default()
        };
        let provider = create_embedding_provider(&settings).unwrap();
        assert_eq!(provider.dimensions("bge-base-en-v1.5"), Some(768));

        let settings = EmbeddingSettings {
            model: Some("text-embedding-3-small".into()),
            ..Default::default()
        };
        assert!(matches!(
            create_embedding_provider(&settings),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_create_hashing_provider() {
        let settings = EmbeddingSettings {
            backend: EmbeddingBackend::Hashing,
            dimensions: Some(128),
            ..Default::default()
        };
        let provider = create_embedding_provider(&settings).unwrap();

        assert_eq!(provider.provider_name(), "hashing");
        assert_eq!(provider.default_model(), "hashing-128");
    }

    #[test]
    fn test_openai_requires_key() {
        let settings = EmbeddingSettings {
            backend: EmbeddingBackend::OpenAi,
            ..Default::default()
        };

        assert!(matches!(
            create_embedding_provider(&settings),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_resolve_dimension_prefers_provider() {
        let settings = EmbeddingSettings {
            backend: EmbeddingBackend::OpenAi,
            api_key: Some("sk-test".into()),
            ..Default::default()
        };
        let provider = create_embedding_provider(&settings).unwrap();
        let model = provider.default_model().to_string();

        assert_eq!(resolve_dimension(provider.as_ref(), &model, Some(384)).unwrap(), 1536);
        assert_eq!(resolve_dimension(provider.as_ref(), "custom-model", Some(384)).unwrap(), 384);
        assert!(resolve_dimension(provider.as_ref(), "custom-model", None).is_err());
    }
}
