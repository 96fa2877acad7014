//! Selection Management
//!
//! Normalized character-offset selections over a text, optionally grown to
//! whole-line boundaries.

use ropey::str_utils::{byte_to_char_idx, char_to_byte_idx};
use tracing::{trace, warn};

/// How a selection was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Raw offsets as reported by the surface
    Character,
    /// Grown outward to the enclosing line boundaries
    Line,
}

/// A text selection range in `char` offsets
///
/// `start <= end` always holds for selections produced by this module.
/// Transforms move `start`/`end` in place to describe the post-edit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
    pub mode: SelectionMode,
}

impl Selection {
    /// Create a normalized selection from two offsets in either order
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
            mode: SelectionMode::Character,
        }
    }

    /// Create an empty selection at a position
    pub fn caret(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    /// Compute a selection over `text` from raw surface offsets
    ///
    /// Offsets past the end of `text` are clamped. With `extend`, the range
    /// grows backward to the character after the preceding `'\n'` (or 0) and
    /// forward to the next `'\n'` (or the end of the text).
    pub fn compute(text: &str, raw_start: usize, raw_end: usize, extend: bool) -> Self {
        let len = char_len(text);
        if raw_start > len || raw_end > len {
            warn!(
                raw_start,
                raw_end, len, "selection offsets out of range, clamping"
            );
        }

        let selection = Self::new(raw_start.min(len), raw_end.min(len));
        if extend {
            selection.extended_to_lines(text)
        } else {
            selection
        }
    }

    /// Grow this selection to the enclosing line boundaries
    pub fn extended_to_lines(&self, text: &str) -> Self {
        let start = line_start(text, self.start);
        let end = line_end(text, self.end.max(self.start));
        trace!(
            from_start = self.start,
            from_end = self.end,
            start,
            end,
            "extended selection to lines"
        );
        Self {
            start,
            end,
            mode: SelectionMode::Line,
        }
    }

    /// Check if the selection is empty (a bare caret)
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// The selected substring of `text`
    pub fn value<'t>(&self, text: &'t str) -> &'t str {
        let start = char_to_byte_idx(text, self.start);
        let end = char_to_byte_idx(text, self.end).max(start);
        &text[start..end]
    }

    /// Number of lines the selected text spans
    pub fn line_count(&self, text: &str) -> usize {
        self.value(text).matches('\n').count() + 1
    }

    /// Check that the selection is a valid range over `text`
    pub fn fits(&self, text: &str) -> bool {
        self.start <= self.end && self.end <= char_len(text)
    }
}

/// Compute a selection over `text`; see [`Selection::compute`]
pub fn compute_selection(text: &str, raw_start: usize, raw_end: usize, extend: bool) -> Selection {
    Selection::compute(text, raw_start, raw_end, extend)
}

/// Length of `text` in chars
pub(crate) fn char_len(text: &str) -> usize {
    byte_to_char_idx(text, text.len())
}

fn line_start(text: &str, char_idx: usize) -> usize {
    let byte = char_to_byte_idx(text, char_idx);
    match text[..byte].rfind('\n') {
        Some(newline) => byte_to_char_idx(text, newline + 1),
        None => 0,
    }
}

fn line_end(text: &str, char_idx: usize) -> usize {
    let byte = char_to_byte_idx(text, char_idx);
    match text[byte..].find('\n') {
        Some(offset) => byte_to_char_idx(text, byte + offset),
        None => char_len(text),
    }
}
