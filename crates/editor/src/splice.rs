//! Text Splice
//!
//! Replace the selected range of a text. Callers own the post-edit selection.

use ropey::str_utils::char_to_byte_idx;

use crate::selection::Selection;

/// Return `text` with the range covered by `selection` replaced by `replacement`
///
/// Offsets past the end of `text` are clamped, so this never panics.
pub fn insert(text: &str, replacement: &str, selection: &Selection) -> String {
    let start = char_to_byte_idx(text, selection.start);
    let end = char_to_byte_idx(text, selection.end).max(start);

    let mut out = String::with_capacity(text.len() - (end - start) + replacement.len());
    out.push_str(&text[..start]);
    out.push_str(replacement);
    out.push_str(&text[end..]);
    out
}
