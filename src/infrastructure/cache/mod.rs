//! Key-value store implementations backing the exact layer

mod factory;
mod in_memory;
mod redis;

pub use factory::{KvBackend, KvStoreConfig, create_kv_store};
pub use in_memory::{InMemoryKvStore, InMemoryStoreConfig};
pub use redis::{RedisKvStore, RedisStoreConfig};
