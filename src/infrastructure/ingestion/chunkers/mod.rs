//! Chunking strategy implementations

mod fixed_size;
mod merge;
mod recursive;

pub use fixed_size::FixedSizeChunker;
pub use recursive::{DEFAULT_SEPARATORS, RecursiveChunker};
