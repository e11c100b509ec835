//! Semantic cache domain - answers keyed by query embeddings

mod config;
mod entry;

pub use config::SemanticCacheConfig;
pub use entry::CachedAnswer;
