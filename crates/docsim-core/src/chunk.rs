//! Fixed-stride character chunker.
//!
//! Splits normalized text into consecutive slices of at most `max_chars`
//! characters. Slicing ignores word boundaries, so a chunk may end in the
//! middle of a word. Characters are Unicode scalar values, never bytes, so
//! a slice never lands inside a multi-byte sequence.
//!
//! # Example
//!
//! ```rust
//! use docsim_core::chunk::split_chunks;
//!
//! assert_eq!(split_chunks("abcdefg", 3), vec!["abc", "def", "g"]);
//! assert_eq!(split_chunks("", 3), vec![""]);
//! ```

/// Maximum number of characters per chunk sent to the embedder.
pub const CHUNK_CHARS: usize = 512;

/// Split `text` into ordered, non-overlapping chunks of at most `max_chars`
/// characters.
///
/// # Guarantees
///
/// - `ceil(len / max_chars)` chunks for non-empty text.
/// - Exactly one empty chunk for empty text.
/// - Concatenating the chunks reproduces `text`.
///
/// A `max_chars` of zero is treated as one.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    if text.is_empty() {
        return vec![""];
    }

    let mut chunks = Vec::with_capacity(text.len() / max_chars + 1);
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&text[start..]);

    chunks
}
