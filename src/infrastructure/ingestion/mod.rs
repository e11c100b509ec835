//! Document ingestion infrastructure: token counting and chunking

pub mod chunkers;
pub mod factory;
mod token_counter;

pub use chunkers::{FixedSizeChunker, RecursiveChunker};
pub use factory::create_chunker;
pub use token_counter::{BpeTokenCounter, WordTokenCounter};
