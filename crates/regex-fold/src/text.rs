//! Char/byte offset translation.
//!
//! The regex engine reports byte offsets into UTF-8 text while every public offset in this crate
//! is a **character offset**. [`OffsetMap`] translates byte offsets for one text snapshot.

#[derive(Debug)]
pub(crate) struct OffsetMap {
    /// `char_starts[i]` is the byte offset of char `i`; the last entry is `text.len()`.
    char_starts: Vec<usize>,
    byte_len: usize,
    ascii: bool,
}

impl OffsetMap {
    pub(crate) fn new(text: &str) -> Self {
        let ascii = text.is_ascii();
        let char_starts = if ascii {
            Vec::new()
        } else {
            let mut starts: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
            starts.push(text.len());
            starts
        };
        Self {
            char_starts,
            byte_len: text.len(),
            ascii,
        }
    }

    pub(crate) fn to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.byte_len);
        if self.ascii {
            return clamped;
        }
        match self.char_starts.binary_search(&clamped) {
            Ok(idx) | Err(idx) => idx,
        }
    }
}
