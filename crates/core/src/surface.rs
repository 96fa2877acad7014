//! Host surface abstraction
//!
//! The text-entry widget whose content and selection Amend rewrites.

/// A text-entry surface exposing its content and a character-offset selection
///
/// Offsets count `char`s, not bytes. Implementations should report offsets
/// within `0..=text().chars().count()`; the selection model clamps anything
/// outside that range.
pub trait Surface {
    /// Current text content
    fn text(&self) -> String;

    /// Replace the whole text content
    fn set_text(&mut self, text: &str);

    /// Selection anchor offset (may be greater than the end)
    fn selection_start(&self) -> usize;

    /// Selection active offset
    fn selection_end(&self) -> usize;

    /// Set the selection range
    fn set_selection_range(&mut self, start: usize, end: usize);
}
