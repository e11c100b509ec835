use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Store unavailable: {store} - {message}")]
    StoreUnavailable { store: String, message: String },

    #[error(
        "Provider '{requested}' not available. Available providers: {}",
        .available.join(", ")
    )]
    ProviderNotFound {
        requested: String,
        available: Vec<String>,
    },

    #[error("Provider initialization failed: {provider} - {message}")]
    ProviderInit { provider: String, message: String },

    #[error("Generation failed: {provider} - {message}")]
    Generation { provider: String, message: String },

    #[error("Embedding error: {message}")]
    Embedding { message: String },

    #[error(
        "Dimension mismatch in collection '{collection}': expected {expected}, got {actual}"
    )]
    DimensionMismatch {
        collection: String,
        expected: usize,
        actual: usize,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn store_unavailable(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Build a not-found error listing the registered names in a stable order
    pub fn provider_not_found(requested: impl Into<String>, mut available: Vec<String>) -> Self {
        available.sort();

        Self::ProviderNotFound {
            requested: requested.into(),
            available,
        }
    }

    pub fn provider_init(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderInit {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    pub fn dimension_mismatch(collection: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            collection: collection.into(),
            expected,
            actual,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True when a vector store rejected a create because the collection exists
    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::Provider { message, .. } | Self::StoreUnavailable { message, .. } => {
                message.contains("already exists") || message.contains("HTTP 409")
            }
            _ => false,
        }
    }
}
