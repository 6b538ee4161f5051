//! Deterministic text chunking
//!
//! Splits cleaned text into overlapping windows for embedding and retrieval.
//! Boundaries prefer sentence ends near the window limit, are UTF-8 safe,
//! and are fully determined by the input text and configuration, so the
//! same page always yields the same chunk count, boundaries, and order.

use crate::config::ChunkConfig;
use blake3::Hasher;

/// A bounded contiguous slice of resolved text used as a retrieval unit
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    /// The chunk text (trimmed)
    pub text: String,

    /// Chunk index (0-based, ordered)
    pub index: usize,

    /// Character start position in the source text
    pub start: usize,

    /// Character end position in the source text
    pub end: usize,

    /// Blake3 hash of the chunk text
    pub hash: String,
}

/// How far back from the window limit to search for a sentence end
const SENTENCE_SEARCH_WINDOW: usize = 200;

/// Split text into overlapping chunks.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<TextChunk> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if text.len() <= config.max_chars {
        return vec![TextChunk {
            text: text.to_string(),
            index: 0,
            start: 0,
            end: text.len(),
            hash: compute_text_hash(text),
        }];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while start < text.len() {
        start = ensure_char_boundary(text, start);
        let mut end = ensure_char_boundary(text, (start + config.max_chars).min(text.len()));

        // Prefer ending at a sentence boundary within the tail of the window.
        if end < text.len() {
            let search_start =
                ensure_char_boundary(text, start.max(end.saturating_sub(SENTENCE_SEARCH_WINDOW)));
            if let Some(pos) = text[search_start..end].rfind('.') {
                let candidate = search_start + pos + 1;
                if candidate > search_start && text.is_char_boundary(candidate) {
                    end = candidate;
                }
            }
        }

        let chunk_text = text[start..end].trim();
        if !chunk_text.is_empty() {
            chunks.push(TextChunk {
                text: chunk_text.to_string(),
                index,
                start,
                end,
                hash: compute_text_hash(chunk_text),
            });
            index += 1;
        }

        if end >= text.len() {
            break;
        }

        // Advance with overlap. Rounding the next start UP keeps strict
        // forward progress even when the sentence break pulled `end` back
        // near `start` and the chunk opens with a multibyte character;
        // rounding down there would re-yield the same window forever.
        let mut next = next_char_boundary(
            text,
            (start + 1).max(end.saturating_sub(config.overlap_chars)),
        );
        if next <= start {
            next = end;
        }
        start = next;
    }

    chunks
}

/// Compute a stable hash for a chunk of text
pub fn compute_text_hash(text: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(text.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Round a position up to the next UTF-8 character boundary
fn next_char_boundary(text: &str, pos: usize) -> usize {
    let mut adjusted = pos;
    while adjusted < text.len() && !text.is_char_boundary(adjusted) {
        adjusted += 1;
    }
    adjusted
}

/// Round a position down to a valid UTF-8 character boundary
fn ensure_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut adjusted = pos;
    while adjusted > 0 && !text.is_char_boundary(adjusted) {
        adjusted -= 1;
    }
    adjusted
}
