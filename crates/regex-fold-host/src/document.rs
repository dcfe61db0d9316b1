//! Rope-backed document text.
//!
//! Line access is O(log N) through `ropey`. Lines are separated by `\n` only.

use ropey::Rope;
use std::ops::Range;

/// Document text with line indexing.
#[derive(Debug, Clone, Default)]
pub struct Document {
    rope: Rope,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Complete text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Total character count.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Total line count (an empty document has 1 line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Char range of a line, excluding its `\n`.
    pub fn line_range(&self, line: usize) -> Option<Range<usize>> {
        if line >= self.rope.len_lines() {
            return None;
        }

        let start = self.rope.line_to_char(line);
        let end = if line + 1 < self.rope.len_lines() {
            self.rope.line_to_char(line + 1) - 1
        } else {
            self.rope.len_chars()
        };
        Some(start..end)
    }

    /// Text of a line, excluding its `\n`.
    pub fn line_text(&self, line: usize) -> Option<String> {
        let range = self.line_range(line)?;
        Some(self.rope.slice(range).to_string())
    }

    /// Text of a char range (clamped to the document).
    pub fn slice(&self, range: Range<usize>) -> String {
        let len = self.rope.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        self.rope.slice(start..end).to_string()
    }

    /// Insert text at a char offset (clamped). Returns the inserted char count.
    pub fn insert(&mut self, offset: usize, text: &str) -> usize {
        let offset = offset.min(self.rope.len_chars());
        self.rope.insert(offset, text);
        text.chars().count()
    }

    /// Delete `len` chars starting at `start` (clamped). Returns the deleted char count.
    pub fn delete(&mut self, start: usize, len: usize) -> usize {
        let start = start.min(self.rope.len_chars());
        let end = (start + len).min(self.rope.len_chars());
        if start < end {
            self.rope.remove(start..end);
        }
        end - start
    }
}
