//! Character-window text chunking.
//!
//! Documents are split into fixed-size character windows with a configurable
//! overlap so that sentences cut at a window boundary still appear whole in
//! the neighbouring chunk. Chunk boundaries are character-based, not
//! byte-based, so multi-byte text never splits inside a code point.

use crate::error::{IngestError, Result};

/// Collapses noisy whitespace before chunking: every line is trimmed, runs
/// of blank lines become a single paragraph break, and leading/trailing
/// blank space is dropped.
pub fn normalize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_blank = false;
    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !last_blank && !out.is_empty() {
                out.push('\n');
            }
            last_blank = true;
        } else {
            out.push_str(trimmed);
            out.push('\n');
            last_blank = false;
        }
    }
    out.trim_end().to_string()
}

/// Sliding character window over a document.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// The overlap must be strictly smaller than the window, otherwise the
    /// window could never advance.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(IngestError::InvalidChunking {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Splits `text` into overlapping windows. Windows that trim down to
    /// nothing are not emitted, so the result never contains empty chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        // Strictly positive because overlap < chunk_size.
        let step = self.chunk_size - self.overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let window: String = chars[start..end].iter().collect();
            let trimmed = window.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}
