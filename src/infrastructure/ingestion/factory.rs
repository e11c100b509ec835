//! Factory for chunking strategies

use std::sync::Arc;

use super::chunkers::{FixedSizeChunker, RecursiveChunker};
use crate::domain::retrieval::{ChunkingStrategy, ChunkingStrategyKind, TokenCounter};

/// Create a chunking strategy of the given kind sharing one token counter
pub fn create_chunker(
    kind: ChunkingStrategyKind,
    counter: Arc<dyn TokenCounter>,
) -> Arc<dyn ChunkingStrategy> {
    match kind {
        ChunkingStrategyKind::Fixed => Arc::new(FixedSizeChunker::new(counter)),
        ChunkingStrategyKind::Recursive => Arc::new(RecursiveChunker::new(counter)),
    }
}
