//! Recursive chunking strategy

use std::sync::Arc;

use super::merge::{merge_splits, split_on};
use crate::domain::DomainError;
use crate::domain::retrieval::{ChunkingConfig, ChunkingStrategy, TokenCounter};

/// Separators from coarsest to finest; the empty separator splits graphemes
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Chunking strategy that recursively splits text hierarchically
///
/// Splitting order: paragraphs -> lines -> sentences -> words -> characters
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    counter: Arc<dyn TokenCounter>,
    separators: Vec<String>,
}

impl RecursiveChunker {
    pub fn new(counter: Arc<dyn TokenCounter>) -> Self {
        Self {
            counter,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }

    fn split_recursive(&self, text: &str, separators: &[String], config: &ChunkingConfig) -> Vec<String> {
        // First separator present in the text; the finer ones handle oversize pieces
        let position = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
            .unwrap_or(separators.len().saturating_sub(1));

        let Some(separator) = separators.get(position) else {
            return vec![text.to_string()];
        };
        let finer = &separators[position + 1..];

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in split_on(text, separator) {
            if self.counter.token_length(piece) <= config.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(merge_splits(&fitting, separator, config, self.counter.as_ref()));
                fitting.clear();
            }

            if finer.is_empty() {
                chunks.push(piece.trim().to_string());
            } else {
                chunks.extend(self.split_recursive(piece, finer, config));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(merge_splits(&fitting, separator, config, self.counter.as_ref()));
        }

        chunks
    }
}

impl ChunkingStrategy for RecursiveChunker {
    fn split(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<String>, DomainError> {
        config.validate()?;

        let content = content.trim();

        if content.is_empty() {
            return Ok(vec![]);
        }

        if self.counter.token_length(content) <= config.chunk_size {
            return Ok(vec![content.to_string()]);
        }

        Ok(self
            .split_recursive(content, &self.separators, config)
            .into_iter()
            .filter(|c| !c.is_empty())
            .collect())
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ingestion::{BpeTokenCounter, WordTokenCounter};

    fn chunker() -> RecursiveChunker {
        RecursiveChunker::new(Arc::new(WordTokenCounter::new()))
    }

    #[test]
    fn test_empty_content() {
        let chunks = chunker().split("  \n ", &ChunkingConfig::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_small_content_is_one_chunk() {
        let chunks = chunker()
            .split("  Small content  ", &ChunkingConfig::default())
            .unwrap();

        assert_eq!(chunks, vec!["Small content"]);
    }

    #[test]
    fn test_invalid_config() {
        assert!(chunker().split("text", &ChunkingConfig::new(10, 10)).is_err());
    }

    #[test]
    fn test_split_by_paragraphs() {
        let config = ChunkingConfig::new(4, 0);
        let content = "First paragraph here.\n\nSecond paragraph here.\n\nThird paragraph here.";

        let chunks = chunker().split(content, &config).unwrap();

        assert_eq!(
            chunks,
            vec![
                "First paragraph here.",
                "Second paragraph here.",
                "Third paragraph here."
            ]
        );
    }

    #[test]
    fn test_falls_back_to_sentences_then_words() {
        let config = ChunkingConfig::new(4, 0);
        let content = "Rust is fast. Rust is safe and productive for systems work.";

        let chunks = chunker().split(content, &config).unwrap();
        let counter = WordTokenCounter::new();

        assert!(chunks.len() >= 3);
        assert_eq!(chunks[0], "Rust is fast");
        for chunk in &chunks {
            assert!(counter.token_length(chunk) <= 4, "oversize chunk: {chunk}");
        }
    }

    #[test]
    fn test_overlap_between_adjacent_chunks() {
        let config = ChunkingConfig::new(4, 2);
        let content = "alpha beta gamma delta epsilon zeta eta theta";

        let chunks = chunker().split(content, &config).unwrap();

        assert_eq!(chunks[0], "alpha beta gamma delta");
        assert_eq!(chunks[1], "gamma delta epsilon zeta");
        assert_eq!(chunks[2], "epsilon zeta eta theta");
    }

    #[test]
    fn test_long_document_keeps_all_text() {
        let config = ChunkingConfig::new(20, 0);
        let content = (0..50)
            .map(|i| format!("Sentence number {i} talks about caching."))
            .collect::<Vec<_>>()
            .join(" ");

        let chunks = chunker().split(&content, &config).unwrap();

        assert!(chunks.len() > 1);
        assert!(chunks[0].starts_with("Sentence number 0"));
        assert!(chunks.last().unwrap().contains("49"));
    }

    #[test]
    fn test_bpe_budget_is_respected() {
        let counter = Arc::new(BpeTokenCounter::cl100k().unwrap());
        let chunker = RecursiveChunker::new(counter.clone());
        let config = ChunkingConfig::new(20, 5);
        let content = (0..30)
            .map(|i| format!("Sentence number {i} talks about tokenization and caching."))
            .collect::<Vec<_>>()
            .join(" ");

        let chunks = chunker.split(&content, &config).unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(counter.token_length(chunk) <= 20, "oversize chunk: {chunk}");
        }
    }

    #[test]
    fn test_name() {
        assert_eq!(chunker().name(), "recursive");
    }
}
