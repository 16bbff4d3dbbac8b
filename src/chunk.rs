//! Overlapping word-window chunker.
//!
//! Splits document text into windows of up to `chunk_size` whitespace-
//! separated words. Each window starts `chunk_size - overlap` words after
//! the previous one, so a span of text near a window boundary appears
//! intact in at least one chunk.
//!
//! Each chunk receives a stable 0-based `id` (its position in the output)
//! and a `start_word` offset into the source word sequence.

use crate::error::{DocChatError, Result};
use crate::models::Chunk;

/// Split text into overlapping word windows.
///
/// Precondition: `chunk_size > overlap`. A violating combination would make
/// the step size zero and the loop non-terminating, so it is rejected with
/// [`DocChatError::InvalidParameter`].
///
/// Empty or all-whitespace input yields an empty chunk list. A document
/// shorter than `chunk_size` words yields exactly one chunk. Deterministic
/// for identical input.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    if chunk_size == 0 || overlap >= chunk_size {
        return Err(DocChatError::InvalidParameter(format!(
            "chunk_size ({chunk_size}) must be greater than overlap ({overlap})"
        )));
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Vec::new());
    }

    let stride = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        let window = words[start..end].join(" ");
        if !window.trim().is_empty() {
            chunks.push(Chunk {
                id: chunks.len(),
                text: window,
                start_word: start,
            });
        }
        start += stride;
    }

    Ok(chunks)
}
