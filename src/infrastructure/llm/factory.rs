use std::sync::Arc;
use std::time::Duration;

use super::http_client::HttpClient;
use super::{AnthropicProvider, GeminiProvider, OpenAiProvider};
use crate::domain::{DomainError, LlmProvider, ProviderKind};

/// Settings for building one managed chat provider
#[derive(Debug, Clone)]
pub struct LlmProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub base_url: Option<String>,
    pub request_timeout: Duration,
}

impl LlmProviderConfig {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            base_url: None,
            request_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Factory for creating chat providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create a managed chat provider; failures are `ProviderInit`
    pub fn create(config: &LlmProviderConfig) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let name = config.kind.to_string();

        if config.api_key.trim().is_empty() {
            return Err(DomainError::provider_init(name, "API key is empty"));
        }

        let http_client = HttpClient::with_timeout(config.request_timeout)
            .map_err(|e| DomainError::provider_init(&name, e.to_string()))?;

        let provider: Arc<dyn LlmProvider> = match (config.kind, &config.base_url) {
            (ProviderKind::OpenAi, None) => {
                Arc::new(OpenAiProvider::new(http_client, &config.api_key))
            }
            (ProviderKind::OpenAi, Some(url)) => Arc::new(OpenAiProvider::with_base_url(
                http_client,
                &config.api_key,
                url,
            )),
            (ProviderKind::Anthropic, None) => {
                Arc::new(AnthropicProvider::new(http_client, &config.api_key))
            }
            (ProviderKind::Anthropic, Some(url)) => Arc::new(AnthropicProvider::with_base_url(
                http_client,
                &config.api_key,
                url,
            )),
            (ProviderKind::Gemini, None) => {
                Arc::new(GeminiProvider::new(http_client, &config.api_key))
            }
            (ProviderKind::Gemini, Some(url)) => Arc::new(GeminiProvider::with_base_url(
                http_client,
                &config.api_key,
                url,
            )),
            (ProviderKind::Custom, _) => {
                return Err(DomainError::provider_init(
                    name,
                    "Custom providers are registered as bindings, not managed providers",
                ));
            }
        };

        Ok(provider)
    }
}
