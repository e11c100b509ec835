//! Named registry of generation backends

use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::domain::generation::{GenerationResult, ProviderInfo, ProviderKind};
use crate::domain::DomainError;
use crate::infrastructure::generation::{
    CustomBinding, DUMMY_PROVIDER_LABEL, DUMMY_PROVIDER_NAME, EndpointBinding, ProviderBinding,
    dummy_binding,
};
use crate::infrastructure::llm::{HttpClient, LlmProviderConfig, LlmProviderFactory};

/// Resolves provider names to bindings and runs generation
#[derive(Debug)]
pub struct GenerationGateway {
    providers: RwLock<HashMap<String, ProviderBinding>>,
    default_provider: Option<String>,
}

impl GenerationGateway {
    pub fn new(default_provider: Option<String>) -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
            default_provider,
        }
    }

    /// Builds every provider the configuration has credentials for.
    ///
    /// A provider that fails to build is logged and skipped; the others are
    /// still registered.
    pub fn from_config(config: &LlmConfig) -> Self {
        let mut providers = HashMap::new();

        let managed = [
            (
                ProviderKind::OpenAi,
                &config.openai_api_key,
                &config.openai_model,
                &config.openai_base_url,
            ),
            (
                ProviderKind::Anthropic,
                &config.anthropic_api_key,
                &config.anthropic_model,
                &config.anthropic_base_url,
            ),
            (
                ProviderKind::Gemini,
                &config.gemini_api_key,
                &config.gemini_model,
                &config.gemini_base_url,
            ),
        ];

        for (kind, api_key, model, base_url) in managed {
            let Some(api_key) = api_key.as_deref().filter(|k| !k.is_empty()) else {
                debug!(provider = %kind, "No credentials configured, skipping provider");
                continue;
            };

            let mut provider_config = LlmProviderConfig::new(kind, api_key)
                .with_request_timeout(config.request_timeout());
            if let Some(url) = base_url {
                provider_config = provider_config.with_base_url(url);
            }

            match LlmProviderFactory::create(&provider_config) {
                Ok(provider) => {
                    info!(provider = %kind, model = %model, "Registered generation provider");
                    providers.insert(kind.to_string(), ProviderBinding::managed(kind, provider, model));
                }
                Err(e) => warn!(provider = %kind, error = %e, "Failed to initialize provider, skipping"),
            }
        }

        for endpoint in &config.custom_endpoints {
            let client = match HttpClient::with_timeout(config.request_timeout()) {
                Ok(client) => client,
                Err(e) => {
                    warn!(provider = %endpoint.name, error = %e, "Failed to initialize custom endpoint, skipping");
                    continue;
                }
            };

            let mut binding = EndpointBinding::new(&endpoint.url, Arc::new(client))
                .with_temperature(endpoint.temperature)
                .with_extra(endpoint.extra.clone());
            if let Some(ref key) = endpoint.api_key {
                binding = binding.with_api_key(key);
            }
            for (name, value) in &endpoint.headers {
                binding = binding.with_header(name, value);
            }

            info!(provider = %endpoint.name, url = %endpoint.url, "Registered custom endpoint");
            let binding = ProviderBinding::custom(CustomBinding::Endpoint(binding));
            let binding = match &endpoint.model_name {
                Some(label) => binding.with_label(label),
                None => binding,
            };
            providers.insert(endpoint.name.clone(), binding);
        }

        if config.enable_dummy_provider {
            info!("Registered offline dummy provider");
            providers.insert(
                DUMMY_PROVIDER_NAME.to_string(),
                ProviderBinding::custom(dummy_binding()).with_label(DUMMY_PROVIDER_LABEL),
            );
        }

        Self {
            providers: RwLock::new(providers),
            default_provider: config.default_provider.clone(),
        }
    }

    pub fn default_provider(&self) -> Option<&str> {
        self.default_provider.as_deref()
    }

    /// Registers a binding, replacing any binding with the same name
    pub async fn register(&self, name: impl Into<String>, binding: ProviderBinding) {
        let name = name.into();
        let previous = self.providers.write().await.insert(name.clone(), binding);

        if previous.is_some() {
            info!(provider = %name, "Replaced generation provider");
        } else {
            info!(provider = %name, "Registered generation provider");
        }
    }

    /// Removes a binding, returning whether it existed
    pub async fn unregister(&self, name: &str) -> bool {
        self.providers.write().await.remove(name).is_some()
    }

    /// Registered names, sorted
    pub async fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn list_providers(&self) -> Vec<ProviderInfo> {
        let providers = self.providers.read().await;
        let mut infos: Vec<ProviderInfo> = providers
            .iter()
            .map(|(name, binding)| ProviderInfo {
                name: name.clone(),
                display_name: binding.display_name(name),
                kind: binding.kind(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Looks up a binding by name, falling back to the configured default
    pub async fn resolve(&self, name: Option<&str>) -> Result<(String, ProviderBinding), DomainError> {
        let providers = self.providers.read().await;
        let requested = name.or(self.default_provider.as_deref());

        match requested.and_then(|n| providers.get(n).map(|b| (n, b))) {
            Some((name, binding)) => Ok((name.to_string(), binding.clone())),
            None => Err(DomainError::provider_not_found(
                requested.unwrap_or("<none>"),
                providers.keys().cloned().collect(),
            )),
        }
    }

    /// Generates an answer with the named (or default) provider
    pub async fn generate(
        &self,
        query: &str,
        context: Option<&str>,
        provider: Option<&str>,
    ) -> Result<GenerationResult, DomainError> {
        let (name, binding) = self.resolve(provider).await?;
        let variant = binding.variant();

        debug!(provider = %name, variant, with_context = context.is_some(), "Generating answer");

        match binding.generate(query, context).await {
            Ok(text) => {
                counter!("generation_requests_total", "provider" => name.clone(), "variant" => variant, "status" => "success")
                    .increment(1);
                Ok(GenerationResult {
                    text,
                    provider: name,
                })
            }
            Err(e) => {
                counter!("generation_requests_total", "provider" => name.clone(), "variant" => variant, "status" => "error")
                    .increment(1);
                warn!(provider = %name, error = %e, "Generation failed");
                Err(DomainError::generation(name, e.to_string()))
            }
        }
    }
}
