//! Chat model provider implementations

mod anthropic;
mod factory;
mod gemini;
mod http_client;
mod openai;

pub use anthropic::AnthropicProvider;
pub use factory::{LlmProviderConfig, LlmProviderFactory};
pub use gemini::GeminiProvider;
pub use http_client::{HttpClient, HttpClientTrait, HttpMethod, is_status};
pub use openai::OpenAiProvider;

#[cfg(test)]
pub use http_client::mock::{MockHttpClient, RecordedRequest};
