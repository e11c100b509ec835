//! Cache domain - layer capabilities and the key-value store boundary

mod key;
mod kv_store;
mod layer;

pub use key::{CacheKeyGenerator, EXACT_CACHE_NAMESPACE, ExactKeyGenerator};
pub use kv_store::KvStore;
pub use layer::{
    AnswerCache, CacheLayer, DocumentIngest, ExactLayer, LayerKind, RetrievalLayer, SemanticHit,
    SemanticLayer,
};

#[cfg(test)]
pub use kv_store::mock::MockKvStore;
