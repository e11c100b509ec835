//! Retrieval domain - documents, chunking and ranked results

mod chunker;
mod document;

pub use chunker::{ChunkingConfig, ChunkingStrategy, ChunkingStrategyKind, TokenCounter};
pub use document::{ChunkMetadata, DocumentChunk, NewDocument, RetrievalResult, chunk_id};
