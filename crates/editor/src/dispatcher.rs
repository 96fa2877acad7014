//! Event Dispatcher
//!
//! Matches a key event against the rule table and applies every matching
//! rule to the surface. One synchronous cycle per event:
//! matching, then applying, then back to idle.

use std::sync::Arc;

use amend_core::{AmendError, KeyEvent, Surface};
use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::rules::{Rule, RuleTable};
use crate::selection::{char_len, Selection};

/// What happened to a dispatched event
#[derive(Debug)]
pub enum DispatchOutcome {
    /// No rule matched; the host's default handling applies
    Unhandled,
    /// This many rules fired and the surface was updated
    Applied { rules: usize },
    /// A rule failed; the surface and the event's default-prevented flag
    /// were left as they were before the event
    Dropped { rule: String, error: AmendError },
}

impl DispatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DispatchOutcome::Applied { .. })
    }
}

/// Rule matcher and applier
///
/// Holds no state between events beyond the rule table.
pub struct Dispatcher {
    rules: Arc<RwLock<RuleTable>>,
}

impl Dispatcher {
    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules: Arc::new(RwLock::new(rules)),
        }
    }

    /// Shared handle to the rule table
    ///
    /// Mutate it only between dispatch cycles.
    pub fn rules(&self) -> &Arc<RwLock<RuleTable>> {
        &self.rules
    }

    /// Run one event against the surface
    ///
    /// Every matching rule sees a selection recomputed from the original
    /// surface offsets, extended to lines if it asks for that, over the text
    /// left by the previous rule. Text, selection and any `prevent_default`
    /// made by the rules are written back only if every rule succeeds.
    pub fn dispatch<S: Surface + ?Sized>(&self, surface: &mut S, event: &mut KeyEvent) -> DispatchOutcome {
        let text = surface.text();
        let raw_start = surface.selection_start();
        let raw_end = surface.selection_end();
        let base = Selection::compute(&text, raw_start, raw_end, false);

        // Snapshot so transforms never run under the table lock
        let matched: Vec<Rule> = self
            .rules
            .read()
            .matching(event, !base.is_empty())
            .cloned()
            .collect();

        if matched.is_empty() {
            trace!(
                key_code = event.key_code,
                event_type = ?event.event_type,
                "no rule matched"
            );
            return DispatchOutcome::Unhandled;
        }

        let mut scratch = event.clone();
        let mut current = text;
        let mut selection = base;
        for rule in &matched {
            let mut next = Selection::compute(&current, raw_start, raw_end, rule.extend_to_lines());
            debug!(
                rule = rule.name(),
                start = next.start,
                end = next.end,
                "applying rule"
            );

            let result = rule.apply(&mut scratch, &current, &mut next).and_then(|new_text| {
                if next.fits(&new_text) {
                    Ok(new_text)
                } else {
                    Err(AmendError::InvalidSelection {
                        start: next.start,
                        end: next.end,
                        len: char_len(&new_text),
                    })
                }
            });

            match result {
                Ok(new_text) => {
                    current = new_text;
                    selection = next;
                }
                Err(error) => {
                    warn!(rule = rule.name(), %error, "rule failed, dropping event");
                    return DispatchOutcome::Dropped {
                        rule: rule.name().to_string(),
                        error,
                    };
                }
            }
        }

        surface.set_text(&current);
        surface.set_selection_range(selection.start, selection.end);
        *event = scratch;

        DispatchOutcome::Applied {
            rules: matched.len(),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(RuleTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextSurface;
    use amend_core::{KeyEventType, TAB_KEY_CODE};

    fn tab() -> KeyEvent {
        KeyEvent::key_down(TAB_KEY_CODE)
    }

    fn shift_tab() -> KeyEvent {
        KeyEvent::key_down(TAB_KEY_CODE).with_shift(true)
    }

    fn state(surface: &TextSurface) -> (String, usize, usize) {
        (
            surface.text(),
            surface.selection_start(),
            surface.selection_end(),
        )
    }

    #[test]
    fn test_indent_selection() {
        let dispatcher = Dispatcher::default();
        let mut surface = TextSurface::from_str("a\nb\nc").with_selection(0, 5);
        let mut event = tab();

        assert!(dispatcher.dispatch(&mut surface, &mut event).is_applied());
        assert!(event.is_default_prevented());
        assert_eq!(state(&surface), ("\ta\n\tb\n\tc".to_string(), 0, 8));
    }

    #[test]
    fn test_backward_selection_is_normalized() {
        let dispatcher = Dispatcher::default();
        let mut surface = TextSurface::from_str("a\nb\nc").with_selection(3, 1);

        dispatcher.dispatch(&mut surface, &mut tab());
        assert_eq!(state(&surface), ("\ta\n\tb\nc".to_string(), 0, 5));
    }

    #[test]
    fn test_outdent_selection_twice() {
        let dispatcher = Dispatcher::default();
        let mut surface = TextSurface::from_str("\ta\n\tb").with_selection(0, 5);

        dispatcher.dispatch(&mut surface, &mut shift_tab());
        assert_eq!(state(&surface), ("a\nb".to_string(), 0, 3));

        let mut event = shift_tab();
        assert!(dispatcher.dispatch(&mut surface, &mut event).is_applied());
        assert!(event.is_default_prevented());
        assert_eq!(state(&surface), ("a\nb".to_string(), 0, 3));
    }

    #[test]
    fn test_caret_indent_then_outdent() {
        let dispatcher = Dispatcher::default();
        let mut surface = TextSurface::from_str("abc");

        dispatcher.dispatch(&mut surface, &mut tab());
        assert_eq!(state(&surface), ("\tabc".to_string(), 1, 1));

        dispatcher.dispatch(&mut surface, &mut shift_tab());
        assert_eq!(state(&surface), ("abc".to_string(), 0, 3));
    }

    #[test]
    fn test_unmatched_event_passes_through() {
        let dispatcher = Dispatcher::default();
        let mut surface = TextSurface::from_str("a\nb").with_selection(0, 3);

        for mut event in [
            KeyEvent::key_down(13),
            KeyEvent::key_up(TAB_KEY_CODE),
            tab().with_meta(true),
        ] {
            let outcome = dispatcher.dispatch(&mut surface, &mut event);
            assert!(matches!(outcome, DispatchOutcome::Unhandled));
            assert!(!event.is_default_prevented());
            assert_eq!(state(&surface), ("a\nb".to_string(), 0, 3));
        }
    }

    #[test]
    fn test_all_matching_rules_fire_in_order() {
        let mut rules = RuleTable::empty();
        rules.push(
            Rule::builder("wrap", KeyEventType::KeyDown)
                .key_code(13)
                .transform(|_, text, sel| {
                    sel.end = text.chars().count() + 2;
                    Ok(format!("[{}]", text))
                }),
        );
        rules.push(
            Rule::builder("line", KeyEventType::KeyDown)
                .key_code(13)
                .extend_to_lines(true)
                .transform(|_, text, sel| {
                    // Recomputed from the original caret over the wrapped text
                    assert_eq!((sel.start, sel.end), (0, text.chars().count()));
                    sel.start = 0;
                    sel.end = 1;
                    Ok(format!("{}!", text))
                }),
        );

        let dispatcher = Dispatcher::new(rules);
        let mut surface = TextSurface::from_str("xy").with_selection(1, 1);
        let outcome = dispatcher.dispatch(&mut surface, &mut KeyEvent::key_down(13));

        assert!(matches!(outcome, DispatchOutcome::Applied { rules: 2 }));
        assert_eq!(state(&surface), ("[xy]!".to_string(), 0, 1));
    }

    #[test]
    fn test_failing_rule_leaves_surface_untouched() {
        let mut rules = RuleTable::empty();
        rules.push(
            Rule::builder("first", KeyEventType::KeyDown)
                .key_code(13)
                .transform(|_, text, _| Ok(format!("{}\n", text))),
        );
        rules.push(
            Rule::builder("broken", KeyEventType::KeyDown)
                .key_code(13)
                .transform(|_, _, _| Err(AmendError::rule("broken", "nope"))),
        );

        let dispatcher = Dispatcher::new(rules);
        let mut surface = TextSurface::from_str("abc").with_selection(2, 2);
        let outcome = dispatcher.dispatch(&mut surface, &mut KeyEvent::key_down(13));

        match outcome {
            DispatchOutcome::Dropped { rule, error } => {
                assert_eq!(rule, "broken");
                assert!(error.is_recoverable());
            }
            other => panic!("expected dropped, got {:?}", other),
        }
        assert_eq!(state(&surface), ("abc".to_string(), 2, 2));
    }

    #[test]
    fn test_out_of_bounds_selection_is_rejected() {
        let mut rules = RuleTable::empty();
        rules.push(
            Rule::builder("overshoot", KeyEventType::KeyDown)
                .key_code(13)
                .transform(|_, text, sel| {
                    sel.end = 100;
                    Ok(text.to_string())
                }),
        );

        let dispatcher = Dispatcher::new(rules);
        let mut surface = TextSurface::from_str("abc");
        let outcome = dispatcher.dispatch(&mut surface, &mut KeyEvent::key_down(13));

        assert!(matches!(
            outcome,
            DispatchOutcome::Dropped {
                error: AmendError::InvalidSelection { end: 100, len: 3, .. },
                ..
            }
        ));
        assert_eq!(state(&surface), ("abc".to_string(), 0, 0));
    }

    #[test]
    fn test_dropped_event_keeps_default_action() {
        let mut rules = RuleTable::default();
        rules.push(
            Rule::builder("broken-tab", KeyEventType::KeyDown)
                .key_code(TAB_KEY_CODE)
                .transform(|_, _, _| Err(AmendError::rule("broken-tab", "nope"))),
        );

        let dispatcher = Dispatcher::new(rules);
        let mut surface = TextSurface::from_str("abc").with_selection(1, 1);
        let mut event = KeyEvent::key_down(TAB_KEY_CODE);
        let outcome = dispatcher.dispatch(&mut surface, &mut event);

        assert!(matches!(outcome, DispatchOutcome::Dropped { ref rule, .. } if rule == "broken-tab"));
        assert!(!event.is_default_prevented());
        assert_eq!(state(&surface), ("abc".to_string(), 1, 1));

        let mut event = KeyEvent::key_down(TAB_KEY_CODE);
        event.prevent_default();
        dispatcher.dispatch(&mut surface, &mut event);
        assert!(event.is_default_prevented());
    }

    #[test]
    fn test_applied_event_is_default_prevented() {
        let dispatcher = Dispatcher::default();
        let mut surface = TextSurface::from_str("abc").with_selection(1, 1);
        let mut event = KeyEvent::key_down(TAB_KEY_CODE);

        assert!(dispatcher.dispatch(&mut surface, &mut event).is_applied());
        assert!(event.is_default_prevented());
        assert_eq!(state(&surface), ("a\tbc".to_string(), 2, 2));
    }
}
