//! Rule Table
//!
//! Declarative key bindings: a predicate over the key event and selection,
//! plus a transform that rewrites the text and moves the selection.

use std::fmt;
use std::sync::Arc;

use amend_core::{AmendConfig, IndentConfig, KeyEvent, KeyEventType, OutdentEndPolicy, Result};
use once_cell::sync::Lazy;

use crate::indent;
use crate::selection::Selection;

/// Rewrites `text` for an event, moving `selection` in place to the new range
pub type Transform =
    Arc<dyn Fn(&mut KeyEvent, &str, &mut Selection) -> Result<String> + Send + Sync>;

/// A key binding. Immutable once built; cloning shares only the transform.
#[derive(Clone)]
pub struct Rule {
    name: String,
    event_type: KeyEventType,
    key_codes: Vec<u32>,
    requires_selection: bool,
    requires_meta: bool,
    requires_shift: bool,
    extend_to_lines: bool,
    transform: Transform,
}

impl Rule {
    /// Start building a rule
    pub fn builder(name: impl Into<String>, event_type: KeyEventType) -> RuleBuilder {
        RuleBuilder::new(name, event_type)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn event_type(&self) -> KeyEventType {
        self.event_type
    }

    pub fn key_codes(&self) -> &[u32] {
        &self.key_codes
    }

    pub fn requires_selection(&self) -> bool {
        self.requires_selection
    }

    pub fn requires_meta(&self) -> bool {
        self.requires_meta
    }

    pub fn requires_shift(&self) -> bool {
        self.requires_shift
    }

    /// Whether the transform sees a selection grown to whole lines
    pub fn extend_to_lines(&self) -> bool {
        self.extend_to_lines
    }

    /// Check the event signature against this rule
    ///
    /// `has_selection` is whether the unextended selection is non-empty.
    pub fn matches(&self, event: &KeyEvent, has_selection: bool) -> bool {
        self.event_type == event.event_type
            && self.key_codes.contains(&event.key_code)
            && self.requires_selection == has_selection
            && self.requires_meta == event.meta_key
            && self.requires_shift == event.shift_key
    }

    /// Run the transform
    pub fn apply(&self, event: &mut KeyEvent, text: &str, selection: &mut Selection) -> Result<String> {
        (self.transform)(event, text, selection)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("event_type", &self.event_type)
            .field("key_codes", &self.key_codes)
            .field("requires_selection", &self.requires_selection)
            .field("requires_meta", &self.requires_meta)
            .field("requires_shift", &self.requires_shift)
            .field("extend_to_lines", &self.extend_to_lines)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Rule`]. Every predicate defaults to `false`.
pub struct RuleBuilder {
    name: String,
    event_type: KeyEventType,
    key_codes: Vec<u32>,
    requires_selection: bool,
    requires_meta: bool,
    requires_shift: bool,
    extend_to_lines: bool,
}

impl RuleBuilder {
    pub fn new(name: impl Into<String>, event_type: KeyEventType) -> Self {
        Self {
            name: name.into(),
            event_type,
            key_codes: Vec::new(),
            requires_selection: false,
            requires_meta: false,
            requires_shift: false,
            extend_to_lines: false,
        }
    }

    pub fn key_code(mut self, key_code: u32) -> Self {
        if !self.key_codes.contains(&key_code) {
            self.key_codes.push(key_code);
        }
        self
    }

    pub fn key_codes(self, key_codes: impl IntoIterator<Item = u32>) -> Self {
        key_codes.into_iter().fold(self, |b, code| b.key_code(code))
    }

    pub fn requires_selection(mut self, yes: bool) -> Self {
        self.requires_selection = yes;
        self
    }

    pub fn requires_meta(mut self, yes: bool) -> Self {
        self.requires_meta = yes;
        self
    }

    pub fn requires_shift(mut self, yes: bool) -> Self {
        self.requires_shift = yes;
        self
    }

    pub fn extend_to_lines(mut self, yes: bool) -> Self {
        self.extend_to_lines = yes;
        self
    }

    /// Finish the rule with its transform
    pub fn transform<F>(self, transform: F) -> Rule
    where
        F: Fn(&mut KeyEvent, &str, &mut Selection) -> Result<String> + Send + Sync + 'static,
    {
        Rule {
            name: self.name,
            event_type: self.event_type,
            key_codes: self.key_codes,
            requires_selection: self.requires_selection,
            requires_meta: self.requires_meta,
            requires_shift: self.requires_shift,
            extend_to_lines: self.extend_to_lines,
            transform: Arc::new(transform),
        }
    }
}

static DEFAULT_RULES: Lazy<RuleTable> = Lazy::new(|| RuleTable {
    rules: indent::indentation_rules(&IndentConfig::default(), OutdentEndPolicy::default()),
});

/// Ordered rule collection. All matching rules fire, in table order.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Create an empty table
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create the built-in indentation table for a configuration
    ///
    /// Fails with [`amend_core::AmendError::Config`] if the configuration
    /// does not validate.
    pub fn with_config(config: &AmendConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rules: indent::indentation_rules(&config.indent, config.outdent.end_policy),
        })
    }

    /// Append a rule
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Insert a rule at a position, clamped to the table length
    pub fn insert(&mut self, index: usize, rule: Rule) {
        let index = index.min(self.rules.len());
        self.rules.insert(index, rule);
    }

    /// Replace the first rule with the given name, keeping its position
    ///
    /// Returns the replaced rule, or `None` (and appends) if none matched.
    pub fn replace(&mut self, name: &str, rule: Rule) -> Option<Rule> {
        match self.rules.iter().position(|r| r.name == name) {
            Some(index) => Some(std::mem::replace(&mut self.rules[index], rule)),
            None => {
                self.rules.push(rule);
                None
            }
        }
    }

    /// Remove every rule with the given name. Returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.rules.len();
        self.rules.retain(|r| r.name != name);
        before - self.rules.len()
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Rules matching an event, in table order
    pub fn matching<'a>(
        &'a self,
        event: &'a KeyEvent,
        has_selection: bool,
    ) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |r| r.matches(event, has_selection))
    }
}

impl Default for RuleTable {
    /// A private copy of the built-in indentation rules
    fn default() -> Self {
        DEFAULT_RULES.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amend_core::{AmendError, TAB_KEY_CODE};

    fn noop(name: &str) -> Rule {
        Rule::builder(name, KeyEventType::KeyDown)
            .key_code(13)
            .transform(|_, text, _| Ok(text.to_string()))
    }

    #[test]
    fn test_builder_defaults() {
        let rule = noop("enter");
        assert_eq!(rule.key_codes(), &[13]);
        assert!(!rule.requires_selection());
        assert!(!rule.requires_meta());
        assert!(!rule.requires_shift());
        assert!(!rule.extend_to_lines());
    }

    #[test]
    fn test_matches_all_predicates() {
        let rule = Rule::builder("cmd-shift-k", KeyEventType::KeyUp)
            .key_codes([75, 107])
            .requires_meta(true)
            .requires_shift(true)
            .requires_selection(true)
            .transform(|_, text, _| Ok(text.to_string()));

        let event = KeyEvent::key_up(107).with_meta(true).with_shift(true);
        assert!(rule.matches(&event, true));
        assert!(!rule.matches(&event, false));
        assert!(!rule.matches(&KeyEvent::key_down(107).with_meta(true).with_shift(true), true));
        assert!(!rule.matches(&KeyEvent::key_up(107).with_shift(true), true));
        assert!(!rule.matches(&KeyEvent::key_up(107).with_meta(true), true));
        assert!(!rule.matches(&KeyEvent::key_up(9).with_meta(true).with_shift(true), true));
    }

    #[test]
    fn test_default_table_has_one_match_per_signature() {
        let table = RuleTable::default();
        assert_eq!(table.len(), 4);

        for shift in [false, true] {
            for has_selection in [false, true] {
                let event = KeyEvent::key_down(TAB_KEY_CODE).with_shift(shift);
                assert_eq!(table.matching(&event, has_selection).count(), 1);
            }
        }

        let meta_tab = KeyEvent::key_down(TAB_KEY_CODE).with_meta(true);
        assert_eq!(table.matching(&meta_tab, false).count(), 0);
        assert_eq!(table.matching(&KeyEvent::key_up(TAB_KEY_CODE), false).count(), 0);
    }

    #[test]
    fn test_default_copies_are_independent() {
        let mut first = RuleTable::default();
        first.clear();
        first.push(noop("enter"));

        let second = RuleTable::default();
        assert_eq!(second.len(), 4);
        assert!(second.get("enter").is_none());
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut table = RuleTable::empty();
        table.push(noop("a"));
        table.push(noop("b"));

        let old = table.replace("a", noop("c"));
        assert_eq!(old.map(|r| r.name().to_string()), Some("a".to_string()));
        let names: Vec<_> = table.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["c", "b"]);

        assert!(table.replace("missing", noop("d")).is_none());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut table = RuleTable::empty();
        table.push(noop("a"));
        table.insert(0, noop("first"));
        table.insert(99, noop("last"));

        let names: Vec<_> = table.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["first", "a", "last"]);

        assert_eq!(table.remove("a"), 1);
        assert_eq!(table.remove("a"), 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_with_config_rejects_invalid_unit() {
        let mut config = AmendConfig::default();
        config.indent.unit = String::new();
        assert!(matches!(RuleTable::with_config(&config), Err(AmendError::Config(_))));

        config.indent.unit = "\t\n".to_string();
        assert!(matches!(RuleTable::with_config(&config), Err(AmendError::Config(_))));

        config.indent.unit = "  ".to_string();
        assert_eq!(RuleTable::with_config(&config).map(|t| t.len()).ok(), Some(4));
    }
}
