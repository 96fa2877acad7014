//! Amend - rule-driven keyboard augmentation for text-entry surfaces
//!
//! Amend intercepts key events on a text surface and rewrites its text and
//! selection according to an ordered table of rules. Out of the box it turns
//! Tab and Shift+Tab into indent and outdent, over the caret or over every
//! line touched by a selection.
//!
//! ## Architecture
//!
//! - `amend-core`: key events, the `Surface` contract, configuration, logging, errors
//! - `amend-editor`: selection model, text splice, rule table, dispatcher, `Editor`

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export main components for library usage
pub use amend_core as core;
pub use amend_editor as editor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use amend_core::{
        AmendConfig, AmendError, KeyEvent, KeyEventBus, KeyEventType, KeySource, Surface,
        TAB_KEY_CODE,
    };
    pub use amend_editor::{
        compute_selection, insert, DispatchOutcome, Editor, Rule, RuleTable, Selection,
        TextSurface,
    };
}
