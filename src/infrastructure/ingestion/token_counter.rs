//! Token counting for chunk budgets

use std::fmt;

use tiktoken_rs::CoreBPE;
use unicode_segmentation::UnicodeSegmentation;

use crate::domain::DomainError;
use crate::domain::retrieval::TokenCounter;

/// Counts tokens with an OpenAI BPE vocabulary
pub struct BpeTokenCounter {
    bpe: CoreBPE,
    encoding: &'static str,
}

impl BpeTokenCounter {
    /// The `cl100k_base` encoding used by GPT-3.5/GPT-4 and OpenAI embeddings
    pub fn cl100k() -> Result<Self, DomainError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| {
            DomainError::configuration(format!("Failed to load cl100k_base encoding: {}", e))
        })?;

        Ok(Self {
            bpe,
            encoding: "cl100k_base",
        })
    }

    pub fn encoding(&self) -> &'static str {
        self.encoding
    }
}

impl fmt::Debug for BpeTokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BpeTokenCounter")
            .field("encoding", &self.encoding)
            .finish()
    }
}

impl TokenCounter for BpeTokenCounter {
    fn token_length(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

/// Counts unicode word-bound segments that are not whitespace.
///
/// Vocabulary-free approximation for tests; undercounts BPE tokens on
/// rare words.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenCounter;

impl WordTokenCounter {
    pub fn new() -> Self {
        Self
    }
}

impl TokenCounter for WordTokenCounter {
    fn token_length(&self, text: &str) -> usize {
        text.split_word_bounds()
            .filter(|segment| !segment.trim().is_empty())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cl100k_counts() {
        let counter = BpeTokenCounter::cl100k().unwrap();

        assert_eq!(counter.encoding(), "cl100k_base");
        assert_eq!(counter.token_length(""), 0);
        assert_eq!(counter.token_length("hello world"), 2);
        assert_eq!(counter.token_length("Hello, world!"), 4);
    }

    #[test]
    fn test_cl100k_counts_subwords_that_words_miss() {
        let bpe = BpeTokenCounter::cl100k().unwrap();
        let words = WordTokenCounter::new();
        let text = "Supercalifragilisticexpialidocious antidisestablishmentarianism";

        assert_eq!(words.token_length(text), 2);
        assert!(bpe.token_length(text) > words.token_length(text));
    }

    #[test]
    fn test_counts_words_and_punctuation() {
        let counter = WordTokenCounter::new();

        assert_eq!(counter.token_length("Hello, world!"), 4);
        assert_eq!(counter.token_length("What is Python?"), 4);
    }

    #[test]
    fn test_whitespace_is_free() {
        let counter = WordTokenCounter::new();

        assert_eq!(counter.token_length(""), 0);
        assert_eq!(counter.token_length(" \n\n\t"), 0);
        assert_eq!(counter.token_length("a  \n b"), 2);
    }

    #[test]
    fn test_contractions_and_numbers() {
        let counter = WordTokenCounter::new();

        assert_eq!(counter.token_length("can't"), 1);
        assert_eq!(counter.token_length("3.14 apples"), 2);
    }
}
