//! Vector store implementations backing the semantic and retrieval layers

mod factory;
mod in_memory;
mod qdrant;

pub use factory::{VectorBackend, VectorStoreConfig, create_vector_store};
pub use in_memory::InMemoryVectorStore;
pub use qdrant::{QdrantConfig, QdrantVectorStore, point_id};

#[cfg(test)]
pub use in_memory::flaky::FlakyVectorStore;
