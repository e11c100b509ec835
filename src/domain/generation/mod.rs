//! Generation domain - provider kinds, prompts and results

mod prompt;
mod types;

pub use prompt::{CONTEXT_SYSTEM_PREFIX, chat_request, completion_prompt};
pub use types::{GenerateFn, GenerationResult, ProviderInfo, ProviderKind};
