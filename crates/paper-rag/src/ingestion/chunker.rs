//! Sliding-window text chunking
//!
//! Chunk boundaries are a pure function of the text and the configured
//! size and overlap, so re-indexing an unchanged document reproduces the
//! exact same chunks.

use crate::error::{Error, Result};
use crate::types::Chunk;

/// Text chunker with fixed size and overlap, measured in characters
pub struct TextChunker {
    /// Chunk size in characters
    chunk_size: usize,
    /// Overlap between consecutive chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. The overlap must be strictly smaller than the
    /// chunk size or the window could never advance.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::validation("chunk_size must be positive"));
        }
        if overlap >= chunk_size {
            return Err(Error::validation(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Split `text` into overlapping chunks for the given document.
    ///
    /// Chunk `i` starts at character `i * (chunk_size - overlap)`. Every
    /// chunk is `chunk_size` characters except possibly the last, which
    /// runs to the end of the text.
    pub fn chunk(&self, owner_id: &str, document_id: &str, text: &str) -> Result<Vec<Chunk>> {
        if text.is_empty() {
            return Err(Error::validation("text must not be empty"));
        }

        // Byte offset of each character, so slices always land on char
        // boundaries.
        let offsets: Vec<usize> = text.char_indices().map(|(pos, _)| pos).collect();
        let total_chars = offsets.len();
        let stride = self.chunk_size - self.overlap;

        let mut chunks = Vec::with_capacity(total_chars / stride + 1);
        let mut start = 0usize;
        let mut index = 0u32;

        while start < total_chars {
            let end = (start + self.chunk_size).min(total_chars);
            let byte_start = offsets[start];
            let byte_end = if end == total_chars {
                text.len()
            } else {
                offsets[end]
            };

            chunks.push(Chunk {
                owner_id: owner_id.to_string(),
                document_id: document_id.to_string(),
                index,
                text: text[byte_start..byte_end].to_string(),
            });

            if end == total_chars {
                break;
            }
            start += stride;
            index += 1;
        }

        Ok(chunks)
    }

    /// Chunk size in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap between consecutive chunks
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_stride_positions() {
        let chunker = TextChunker::new(10, 3).unwrap();
        let chunks = chunker
            .chunk("alice", "paper-1", "abcdefghijklmnopqrst")
            .unwrap();

        assert_eq!(
            texts(&chunks),
            vec!["abcdefghij", "hijklmnopq", "opqrst"]
        );
        let indices: Vec<u32> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_consecutive_chunks_share_overlap() {
        let chunker = TextChunker::new(10, 3).unwrap();
        let chunks = chunker
            .chunk("alice", "paper-1", "abcdefghijklmnopqrstuvwxyz")
            .unwrap();

        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let tail: String = prev[prev.len() - 3..].iter().collect();
            let head: String = pair[1].text.chars().take(3).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunker = TextChunker::new(100, 10).unwrap();
        let chunks = chunker.chunk("alice", "paper-1", "short text").unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short text");
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn test_exact_size_single_chunk() {
        let chunker = TextChunker::new(5, 2).unwrap();
        let chunks = chunker.chunk("alice", "paper-1", "abcde").unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "abcde");
    }

    #[test]
    fn test_multibyte_characters_counted_not_bytes() {
        let chunker = TextChunker::new(4, 1).unwrap();
        let chunks = chunker.chunk("alice", "paper-1", "αβγδεζηθικ").unwrap();

        assert_eq!(texts(&chunks), vec!["αβγδ", "δεζη", "ηθικ"]);
    }

    #[test]
    fn test_deterministic() {
        let chunker = TextChunker::new(50, 10).unwrap();
        let text = "The transformer architecture relies entirely on attention \
                    mechanisms to draw global dependencies between input and output.";
        let first = chunker.chunk("alice", "paper-1", text).unwrap();
        let second = chunker.chunk("alice", "paper-1", text).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_text_rejected() {
        let chunker = TextChunker::new(10, 3).unwrap();
        assert!(chunker.chunk("alice", "paper-1", "").is_err());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        assert!(TextChunker::new(10, 10).is_err());
        assert!(TextChunker::new(10, 15).is_err());
        assert!(TextChunker::new(0, 0).is_err());
        assert!(TextChunker::new(10, 9).is_ok());
    }

    #[test]
    fn test_chunks_reassemble_original_text() {
        let chunker = TextChunker::new(10, 3).unwrap();
        let text = "abcdefghijklmnopqrstuvwx";
        let chunks = chunker.chunk("alice", "paper-1", text).unwrap();

        // Dropping each chunk's leading overlap (after the first) must
        // rebuild the input exactly.
        let mut rebuilt = chunks[0].text.clone();
        for chunk in &chunks[1..] {
            let rest: String = chunk.text.chars().skip(3).collect();
            rebuilt.push_str(&rest);
        }
        assert_eq!(rebuilt, text);
    }
}
