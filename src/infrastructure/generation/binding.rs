//! Generation bindings resolved at registration time

use std::fmt;
use std::sync::Arc;

use super::EndpointBinding;
use crate::domain::generation::{GenerateFn, ProviderKind, chat_request};
use crate::domain::{DomainError, LlmProvider};

/// User-supplied generation backends
#[derive(Clone)]
pub enum CustomBinding {
    /// Pre-built chat model driven with the chat prompt
    ChatModel {
        provider: Arc<dyn LlmProvider>,
        model: String,
    },
    /// Completion endpoint reached over HTTP
    Endpoint(EndpointBinding),
    /// Plain in-process function
    Function(GenerateFn),
}

impl CustomBinding {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> Result<String, DomainError> + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }
}

impl fmt::Debug for CustomBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChatModel { provider, model } => f
                .debug_struct("ChatModel")
                .field("provider", &provider.provider_name())
                .field("model", model)
                .finish(),
            Self::Endpoint(endpoint) => f.debug_tuple("Endpoint").field(endpoint).finish(),
            Self::Function(_) => f.write_str("Function"),
        }
    }
}

/// A registered generation backend
#[derive(Debug, Clone)]
pub enum ProviderBinding {
    /// Built-in chat adapter (openai, anthropic, gemini)
    Managed {
        kind: ProviderKind,
        provider: Arc<dyn LlmProvider>,
        model: String,
    },
    /// User-supplied backend; `label` names it in listings instead of the registry name
    Custom {
        binding: CustomBinding,
        label: Option<String>,
    },
}

impl ProviderBinding {
    pub fn managed(kind: ProviderKind, provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self::Managed {
            kind,
            provider,
            model: model.into(),
        }
    }

    pub fn custom(binding: CustomBinding) -> Self {
        Self::Custom {
            binding,
            label: None,
        }
    }

    /// Display label for custom bindings; managed bindings keep their model name
    pub fn with_label(self, label: impl Into<String>) -> Self {
        match self {
            Self::Custom { binding, .. } => Self::Custom {
                binding,
                label: Some(label.into()),
            },
            managed => managed,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Managed { kind, .. } => *kind,
            Self::Custom { .. } => ProviderKind::Custom,
        }
    }

    /// Label shown in provider listings, e.g. `OpenAI (gpt-3.5-turbo)`
    pub fn display_name(&self, name: &str) -> String {
        match self {
            Self::Managed { kind, model, .. } => kind.display_name(model),
            Self::Custom { label, .. } => {
                ProviderKind::Custom.display_name(label.as_deref().unwrap_or(name))
            }
        }
    }

    /// Metric label for the binding style
    pub fn variant(&self) -> &'static str {
        match self {
            Self::Managed { .. } => "managed",
            Self::Custom { binding, .. } => match binding {
                CustomBinding::ChatModel { .. } => "chat_model",
                CustomBinding::Endpoint(_) => "endpoint",
                CustomBinding::Function(_) => "function",
            },
        }
    }

    /// Generate an answer; backend errors are returned untouched
    pub async fn generate(&self, query: &str, context: Option<&str>) -> Result<String, DomainError> {
        match self {
            Self::Managed {
                provider, model, ..
            }
            | Self::Custom {
                binding: CustomBinding::ChatModel { provider, model },
                ..
            } => {
                let response = provider.chat(model, chat_request(query, context)).await?;
                Ok(response.content().to_string())
            }
            Self::Custom {
                binding: CustomBinding::Endpoint(endpoint),
                ..
            } => endpoint.generate(query, context).await,
            Self::Custom {
                binding: CustomBinding::Function(f),
                ..
            } => f(query, context),
        }
    }
}
