//! Generation gateway value types

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Plain function binding: `(query, context) -> answer`
pub type GenerateFn = Arc<dyn Fn(&str, Option<&str>) -> Result<String, DomainError> + Send + Sync>;

/// Family of a registered provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
    Custom,
}

impl ProviderKind {
    /// Human-readable label combined with the model or binding name
    pub fn display_name(&self, detail: &str) -> String {
        match self {
            Self::OpenAi => format!("OpenAI ({})", detail),
            Self::Anthropic => format!("Anthropic ({})", detail),
            Self::Gemini => format!("Google Gemini ({})", detail),
            Self::Custom => format!("Custom ({})", detail),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::Gemini => write!(f, "gemini"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            "custom" => Ok(Self::Custom),
            _ => Err(DomainError::configuration(format!(
                "Unknown provider kind: {}. Valid kinds: openai, anthropic, gemini, custom",
                s
            ))),
        }
    }
}

/// Registry listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    pub name: String,
    pub display_name: String,
    pub kind: ProviderKind,
}

/// Generated text plus the provider that served it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub text: String,
    pub provider: String,
}
