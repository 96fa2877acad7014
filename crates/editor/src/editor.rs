//! Editor
//!
//! Binds a dispatcher to a host surface and its key event source.
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use amend_core::{KeyEvent, KeyEventBus, Surface, TAB_KEY_CODE};
//! use amend_editor::{Editor, TextSurface};
//!
//! let bus = KeyEventBus::new();
//! let surface = Arc::new(Mutex::new(TextSurface::from_str("abc")));
//! let _editor = Editor::new(Arc::clone(&surface), &bus);
//!
//! let mut event = KeyEvent::key_down(TAB_KEY_CODE);
//! bus.emit(&mut event);
//!
//! assert!(event.is_default_prevented());
//! assert_eq!(surface.lock().text(), "\tabc");
//! ```

use std::sync::{Arc, Weak};

use amend_core::{
    AmendConfig, HandlerState, KeyEvent, KeyHandler, KeySource, Result, Surface, SubscriptionId,
    Unsubscriber,
};
use parking_lot::Mutex;
use tracing::debug;

use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::rules::{Rule, RuleTable};
use crate::selection::Selection;
use crate::splice;

/// Rule-driven key handling for one surface
///
/// The host keeps ownership of the surface; the editor only holds a shared
/// handle. Hosts must not hold the surface lock while emitting key events.
///
/// Dropping the editor unsubscribes it from sources that provide an
/// [`Unsubscriber`]; elsewhere its handlers report [`HandlerState::Dead`].
pub struct Editor<S: Surface + Send + 'static> {
    surface: Arc<Mutex<S>>,
    dispatcher: Arc<Dispatcher>,
    subscriptions: Vec<SubscriptionId>,
    unsubscriber: Option<Unsubscriber>,
}

impl<S: Surface + Send + 'static> Editor<S> {
    /// Create an editor with a private copy of the default rules
    pub fn new(surface: Arc<Mutex<S>>, source: &dyn KeySource) -> Self {
        Self::from_rules(surface, source, RuleTable::default())
    }

    /// Create an editor whose built-in rules follow `config`
    ///
    /// Fails without subscribing if `config` does not validate.
    pub fn with_config(
        surface: Arc<Mutex<S>>,
        source: &dyn KeySource,
        config: &AmendConfig,
    ) -> Result<Self> {
        let rules = RuleTable::with_config(config)?;
        Ok(Self::from_rules(surface, source, rules))
    }

    /// Create an editor with an explicit rule table
    pub fn from_rules(surface: Arc<Mutex<S>>, source: &dyn KeySource, rules: RuleTable) -> Self {
        let mut editor = Self {
            surface,
            dispatcher: Arc::new(Dispatcher::new(rules)),
            subscriptions: Vec::new(),
            unsubscriber: None,
        };
        editor.attach(source);
        editor
    }

    fn attach(&mut self, source: &dyn KeySource) {
        let down = source.on_key_down(self.handler());
        let up = source.on_key_up(self.handler());
        self.subscriptions.extend([down, up]);
        self.unsubscriber = source.unsubscriber();
        debug!(rules = self.dispatcher.rules().read().len(), "editor attached");
    }

    fn handler(&self) -> KeyHandler {
        let dispatcher: Weak<Dispatcher> = Arc::downgrade(&self.dispatcher);
        let surface: Weak<Mutex<S>> = Arc::downgrade(&self.surface);

        Arc::new(move |event: &mut KeyEvent| {
            // Inert once the editor or the surface is gone
            let (Some(dispatcher), Some(surface)) = (dispatcher.upgrade(), surface.upgrade()) else {
                return HandlerState::Dead;
            };
            let mut surface = surface.lock();
            dispatcher.dispatch(&mut *surface, event);
            HandlerState::Alive
        })
    }

    /// Unsubscribe from the key source
    pub fn detach(mut self, source: &dyn KeySource) {
        for id in self.subscriptions.drain(..) {
            source.unsubscribe(id);
        }
        debug!("editor detached");
    }

    /// Shared handle to the surface
    pub fn surface(&self) -> &Arc<Mutex<S>> {
        &self.surface
    }

    /// Current selection of the surface, optionally extended to whole lines
    pub fn selection(&self, extend: bool) -> Selection {
        let surface = self.surface.lock();
        Selection::compute(
            &surface.text(),
            surface.selection_start(),
            surface.selection_end(),
            extend,
        )
    }

    /// Replace the `selection` range of `text` with `replacement`
    pub fn insert(text: &str, replacement: &str, selection: &Selection) -> String {
        splice::insert(text, replacement, selection)
    }

    /// Dispatch an event directly, bypassing the key source
    pub fn dispatch(&self, event: &mut KeyEvent) -> DispatchOutcome {
        let mut surface = self.surface.lock();
        self.dispatcher.dispatch(&mut *surface, event)
    }

    /// Append a rule
    pub fn add_rule(&self, rule: Rule) {
        self.dispatcher.rules().write().push(rule);
    }

    /// Insert a rule at a table position
    pub fn insert_rule(&self, index: usize, rule: Rule) {
        self.dispatcher.rules().write().insert(index, rule);
    }

    /// Replace a rule by name, appending if absent
    pub fn replace_rule(&self, name: &str, rule: Rule) -> Option<Rule> {
        self.dispatcher.rules().write().replace(name, rule)
    }

    /// Remove rules by name
    pub fn remove_rule(&self, name: &str) -> usize {
        self.dispatcher.rules().write().remove(name)
    }

    /// Read access to the rule table
    pub fn with_rules<R>(&self, f: impl FnOnce(&RuleTable) -> R) -> R {
        f(&self.dispatcher.rules().read())
    }

    /// Copy of the current rule table
    pub fn rules(&self) -> RuleTable {
        self.dispatcher.rules().read().clone()
    }
}

impl<S: Surface + Send + 'static> Drop for Editor<S> {
    fn drop(&mut self) {
        let Some(unsubscribe) = self.unsubscriber.take() else {
            return;
        };
        for id in self.subscriptions.drain(..) {
            unsubscribe(id);
        }
    }
}
