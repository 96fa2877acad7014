//! Indentation
//!
//! The built-in Tab / Shift+Tab bindings and the transforms behind them.

use std::sync::Arc;

use amend_core::{IndentConfig, KeyEventType, OutdentEndPolicy};

use crate::rules::Rule;
use crate::selection::{char_len, Selection};
use crate::splice;

pub const INDENT_SELECTION: &str = "indent-selection";
pub const OUTDENT_SELECTION: &str = "outdent-selection";
pub const INDENT_CARET: &str = "indent-caret";
pub const OUTDENT_CARET: &str = "outdent-caret";

/// Prefix every line of the (line-extended) selection with `unit`
///
/// The selection end moves to the end of the indented block.
pub fn indent_lines(text: &str, selection: &mut Selection, unit: &str) -> String {
    let block = selection.value(text);
    let indented = format!("{}{}", unit, block.replace('\n', &format!("\n{}", unit)));

    let out = splice::insert(text, &indented, selection);
    selection.end = selection.start + char_len(&indented);
    out
}

/// Remove one leading `unit` from each line of the selection that has one
pub fn outdent_lines(
    text: &str,
    selection: &mut Selection,
    unit: &str,
    end_policy: OutdentEndPolicy,
) -> String {
    let block = selection.value(text);
    let outdented = block
        .split('\n')
        .map(|line| line.strip_prefix(unit).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n");

    let new_end = match end_policy {
        OutdentEndPolicy::Actual => selection.start + char_len(&outdented),
        OutdentEndPolicy::Legacy => {
            let assumed = selection.line_count(text) * char_len(unit);
            selection.start + selection.len().saturating_sub(assumed)
        }
    };

    let out = splice::insert(text, &outdented, selection);
    selection.end = new_end;
    out
}

/// Insert `unit` at the caret and move the caret past it
pub fn indent_caret(text: &str, selection: &mut Selection, unit: &str) -> String {
    let out = splice::insert(text, unit, selection);
    let width = char_len(unit);
    selection.start += width;
    selection.end += width;
    out
}

/// Strip one leading `unit` from the (line-extended) caret line
pub fn outdent_caret(text: &str, selection: &mut Selection, unit: &str) -> String {
    match selection.value(text).strip_prefix(unit) {
        Some(rest) => {
            let out = splice::insert(text, rest, selection);
            selection.end -= char_len(unit);
            out
        }
        None => text.to_string(),
    }
}

/// Build the four Tab bindings for a configuration
pub fn indentation_rules(config: &IndentConfig, end_policy: OutdentEndPolicy) -> Vec<Rule> {
    let unit: Arc<str> = Arc::from(config.unit.as_str());

    let indent_selection = {
        let unit = Arc::clone(&unit);
        Rule::builder(INDENT_SELECTION, KeyEventType::KeyDown)
            .key_code(config.key_code)
            .requires_selection(true)
            .extend_to_lines(true)
            .transform(move |event, text, selection| {
                event.prevent_default();
                Ok(indent_lines(text, selection, &unit))
            })
    };

    let outdent_selection = {
        let unit = Arc::clone(&unit);
        Rule::builder(OUTDENT_SELECTION, KeyEventType::KeyDown)
            .key_code(config.key_code)
            .requires_selection(true)
            .requires_shift(true)
            .extend_to_lines(true)
            .transform(move |event, text, selection| {
                event.prevent_default();
                Ok(outdent_lines(text, selection, &unit, end_policy))
            })
    };

    let indent_at_caret = {
        let unit = Arc::clone(&unit);
        Rule::builder(INDENT_CARET, KeyEventType::KeyDown)
            .key_code(config.key_code)
            .transform(move |event, text, selection| {
                event.prevent_default();
                Ok(indent_caret(text, selection, &unit))
            })
    };

    let outdent_at_caret = Rule::builder(OUTDENT_CARET, KeyEventType::KeyDown)
        .key_code(config.key_code)
        .requires_shift(true)
        .extend_to_lines(true)
        .transform(move |event, text, selection| {
            event.prevent_default();
            Ok(outdent_caret(text, selection, &unit))
        });

    vec![
        indent_selection,
        outdent_selection,
        indent_at_caret,
        outdent_at_caret,
    ]
}
