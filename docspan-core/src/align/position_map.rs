//! Offset translation between normalized and original text
//!
//!     Normalization only ever keeps, drops or collapses characters of the original; it never
//!     reorders them. Every byte of the normalized string therefore has exactly one originating
//!     byte in the original, and those originating bytes increase strictly with the normalized
//!     index. A [`PositionMap`] stores that originating byte for each normalized byte plus one
//!     trailing sentinel, which makes both directions of the mapping cheap:
//!
//!     - normalized -> original is a direct lookup,
//!     - original -> normalized is a binary search over the monotonic table.
//!
//!     The helpers at the bottom of this file measure the fixed windows the locator uses
//!     (80/200/400 characters) in characters while returning byte offsets.

use std::ops::Range;

/// Maps every normalized byte index to the original byte index that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionMap {
    /// `to_original[i]` is the original byte for normalized byte `i`; the last entry is the
    /// sentinel for `i == normalized.len()`.
    to_original: Vec<usize>,
    original_len: usize,
}

impl PositionMap {
    pub(crate) fn with_capacity(original_len: usize, capacity: usize) -> Self {
        Self {
            to_original: Vec::with_capacity(capacity + 1),
            original_len,
        }
    }

    /// Identity mapping for text that needed no normalization.
    pub fn identity(text: &str) -> Self {
        let mut map = Self::with_capacity(text.len(), text.len());
        map.to_original.extend(0..text.len());
        map.finish(text.len());
        map
    }

    /// Record an original character copied verbatim into the normalized text.
    pub(crate) fn push_char(&mut self, original_start: usize, len_utf8: usize) {
        self.to_original
            .extend(original_start..original_start + len_utf8);
    }

    /// Record a single separator standing in for a collapsed run that began at `run_start`.
    pub(crate) fn push_collapsed(&mut self, run_start: usize) {
        self.to_original.push(run_start);
    }

    /// Close the table; `original_end` is where the last emitted character ends.
    pub(crate) fn finish(&mut self, original_end: usize) {
        self.to_original.push(original_end);
    }

    /// Length of the normalized text this map was built for.
    pub fn len(&self) -> usize {
        self.to_original.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Original byte offset for a normalized byte offset. Offsets past the end clamp to the
    /// sentinel.
    pub fn to_original(&self, normalized: usize) -> usize {
        match self.to_original.get(normalized) {
            Some(&original) => original,
            None => self.to_original.last().copied().unwrap_or(0),
        }
    }

    /// First normalized byte whose originating byte is at or after `original`.
    pub fn to_normalized(&self, original: usize) -> usize {
        self.to_original[..self.len()].partition_point(|&o| o < original)
    }

    /// Translate a normalized byte range into the original range covering the same
    /// characters, rounded outwards to `char` boundaries of `original_text`.
    pub fn original_range(&self, original_text: &str, normalized: Range<usize>) -> Range<usize> {
        let start = self.to_original(normalized.start);
        if normalized.end <= normalized.start {
            return start..start;
        }
        let last = self.to_original(normalized.end - 1);
        let end = ceil_char_boundary(original_text, (last + 1).min(original_text.len()));
        start..end.max(start)
    }
}

/// Largest char boundary at or before `index`.
pub fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut index = index;
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Smallest char boundary at or after `index`.
pub fn ceil_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut index = index;
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// The first `max_chars` characters of `text`.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

/// Byte offset `chars` characters after `from`, clipped to the end of `text`.
pub fn advance_chars(text: &str, from: usize, chars: usize) -> usize {
    let from = floor_char_boundary(text, from);
    match text[from..].char_indices().nth(chars) {
        Some((byte, _)) => from + byte,
        None => text.len(),
    }
}

/// Byte offset `chars` characters before `from`, clipped to the start of `text`.
pub fn retreat_chars(text: &str, from: usize, chars: usize) -> usize {
    let from = floor_char_boundary(text, from);
    if chars == 0 {
        return from;
    }
    match text[..from].char_indices().rev().nth(chars - 1) {
        Some((byte, _)) => byte,
        None => 0,
    }
}
