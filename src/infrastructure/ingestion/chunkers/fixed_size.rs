//! Fixed-size chunking strategy

use std::sync::Arc;

use super::merge::{merge_splits, split_on};
use crate::domain::DomainError;
use crate::domain::retrieval::{ChunkingConfig, ChunkingStrategy, TokenCounter};

/// Chunking strategy that splits on one separator and packs pieces up to the budget
///
/// Pieces larger than the budget are kept whole.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    counter: Arc<dyn TokenCounter>,
    separator: String,
}

impl FixedSizeChunker {
    pub fn new(counter: Arc<dyn TokenCounter>) -> Self {
        Self {
            counter,
            separator: "\n".to_string(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl ChunkingStrategy for FixedSizeChunker {
    fn split(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<String>, DomainError> {
        config.validate()?;

        let content = content.trim();

        if content.is_empty() {
            return Ok(vec![]);
        }

        let pieces = split_on(content, &self.separator);
        Ok(merge_splits(&pieces, &self.separator, config, self.counter.as_ref()))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
