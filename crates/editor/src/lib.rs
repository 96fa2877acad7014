//! Amend Editor
//!
//! Rule-driven rewriting of a text surface in response to key events:
//! - Selection model with line extension
//! - Text splice
//! - Ordered rule table with the built-in Tab / Shift+Tab indentation rules
//! - Dispatcher and the `Editor` facade that wires it to a key source

pub mod buffer;
pub mod dispatcher;
pub mod editor;
pub mod indent;
pub mod rules;
pub mod selection;
pub mod splice;

pub use buffer::TextSurface;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use editor::Editor;
pub use rules::{Rule, RuleBuilder, RuleTable, Transform};
pub use selection::{compute_selection, Selection, SelectionMode};
pub use splice::insert;
