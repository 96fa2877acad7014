//! Text Surface
//!
//! In-memory [`Surface`] backed by a rope, for headless hosts and tests.

use amend_core::Surface;
use ropey::Rope;

/// Rope-backed text surface with a char-offset selection
#[derive(Debug, Clone, Default)]
pub struct TextSurface {
    /// The rope containing the text
    rope: Rope,
    /// Selection anchor
    selection_start: usize,
    /// Selection active end
    selection_end: usize,
}

impl TextSurface {
    /// Create a new empty surface
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a surface from a string, caret at the start
    pub fn from_str(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            selection_start: 0,
            selection_end: 0,
        }
    }

    /// Set the selection, builder style
    pub fn with_selection(mut self, start: usize, end: usize) -> Self {
        self.set_selection_range(start, end);
        self
    }

    /// Get the total character count
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Number of `'\n'`-separated lines
    pub fn line_count(&self) -> usize {
        self.rope.chars().filter(|c| *c == '\n').count() + 1
    }

    /// Check if the surface is empty
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Get selected text
    pub fn selected_text(&self) -> String {
        let start = self.selection_start.min(self.selection_end);
        let end = self.selection_start.max(self.selection_end);
        self.rope.slice(start..end).to_string()
    }
}

impl Surface for TextSurface {
    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        let len = self.rope.len_chars();
        self.selection_start = self.selection_start.min(len);
        self.selection_end = self.selection_end.min(len);
    }

    fn selection_start(&self) -> usize {
        self.selection_start
    }

    fn selection_end(&self) -> usize {
        self.selection_end
    }

    fn set_selection_range(&mut self, start: usize, end: usize) {
        let len = self.rope.len_chars();
        self.selection_start = start.min(len);
        self.selection_end = end.min(len);
    }
}
