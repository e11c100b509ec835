//! Greedy merging of split pieces into overlapping chunks

use std::collections::VecDeque;

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::retrieval::{ChunkingConfig, TokenCounter};

/// Splits on a separator; the empty separator splits into graphemes
pub(super) fn split_on<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        text.graphemes(true).collect()
    } else {
        text.split(separator).filter(|s| !s.is_empty()).collect()
    }
}

/// Joins pieces with `separator` into chunks of at most `chunk_size` tokens.
///
/// When a chunk is emitted, leading pieces are dropped until at most
/// `chunk_overlap` tokens remain; those trailing pieces start the next chunk.
/// A single piece larger than the budget becomes its own oversize chunk.
pub(super) fn merge_splits(
    pieces: &[&str],
    separator: &str,
    config: &ChunkingConfig,
    counter: &dyn TokenCounter,
) -> Vec<String> {
    let separator_len = counter.token_length(separator);
    let mut chunks = Vec::new();
    let mut current: VecDeque<(&str, usize)> = VecDeque::new();
    let mut total = 0usize;

    for piece in pieces {
        let len = counter.token_length(piece);
        let joiner = if current.is_empty() { 0 } else { separator_len };

        if total + len + joiner > config.chunk_size && !current.is_empty() {
            push_chunk(&mut chunks, &current, separator);

            while total > config.chunk_overlap
                || (total > 0 && total + len + separator_len > config.chunk_size)
            {
                let Some((_, front_len)) = current.pop_front() else {
                    break;
                };
                total -= front_len;
                if !current.is_empty() {
                    total = total.saturating_sub(separator_len);
                }
            }
        }

        if !current.is_empty() {
            total += separator_len;
        }
        current.push_back((piece, len));
        total += len;
    }

    push_chunk(&mut chunks, &current, separator);
    chunks
}

fn push_chunk(chunks: &mut Vec<String>, current: &VecDeque<(&str, usize)>, separator: &str) {
    let joined = current
        .iter()
        .map(|(piece, _)| *piece)
        .collect::<Vec<_>>()
        .join(separator);
    let trimmed = joined.trim();

    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
