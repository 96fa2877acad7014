//! Key Event System
//!
//! Key events delivered by a host surface, and a synchronous bus that fans
//! them out to subscribed handlers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, trace};

/// Key code of the Tab key
pub const TAB_KEY_CODE: u32 = 9;

/// Direction of a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventType {
    KeyDown,
    KeyUp,
}

/// A raw key event as delivered by the host surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Whether the key went down or up
    pub event_type: KeyEventType,
    /// Host key code
    pub key_code: u32,
    /// Meta (command) modifier held
    pub meta_key: bool,
    /// Shift modifier held
    pub shift_key: bool,
    default_prevented: bool,
}

impl KeyEvent {
    /// Create an event with no modifiers
    pub fn new(event_type: KeyEventType, key_code: u32) -> Self {
        Self {
            event_type,
            key_code,
            meta_key: false,
            shift_key: false,
            default_prevented: false,
        }
    }

    /// Create a key-down event
    pub fn key_down(key_code: u32) -> Self {
        Self::new(KeyEventType::KeyDown, key_code)
    }

    /// Create a key-up event
    pub fn key_up(key_code: u32) -> Self {
        Self::new(KeyEventType::KeyUp, key_code)
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift_key = shift;
        self
    }

    pub fn with_meta(mut self, meta: bool) -> Self {
        self.meta_key = meta;
        self
    }

    /// Suppress the host's default handling of this event
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a handler asked the host to skip its default handling
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Handle identifying a subscription on a [`KeySource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Whether a handler wants further events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Alive,
    /// The handler's owner is gone; the source drops the subscription
    Dead,
}

/// Callback invoked for each delivered key event
pub type KeyHandler = Arc<dyn Fn(&mut KeyEvent) -> HandlerState + Send + Sync>;

/// Removes a subscription without borrowing its source
///
/// Returns false if the subscription, or the source, is already gone.
pub type Unsubscriber = Arc<dyn Fn(SubscriptionId) -> bool + Send + Sync>;

/// Something that delivers raw key events to subscribers
///
/// Implementations must invoke handlers synchronously, one event at a time,
/// and must not hold any lock a handler might need while doing so.
pub trait KeySource {
    /// Subscribe to key-down events
    fn on_key_down(&self, handler: KeyHandler) -> SubscriptionId;

    /// Subscribe to key-up events
    fn on_key_up(&self, handler: KeyHandler) -> SubscriptionId;

    /// Remove a subscription. Returns false if it was not registered.
    ///
    /// Handlers returning [`HandlerState::Dead`] are removed without this.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// An [`Unsubscriber`] that may outlive this borrow of the source
    ///
    /// Subscribers use it to clean up when dropped. Sources that cannot
    /// provide one rely on [`HandlerState::Dead`] instead.
    fn unsubscriber(&self) -> Option<Unsubscriber> {
        None
    }
}

struct Subscriber {
    id: SubscriptionId,
    event_type: KeyEventType,
    handler: KeyHandler,
}

type Subscribers = RwLock<Vec<Subscriber>>;

fn remove_subscriber(subscribers: &Subscribers, id: SubscriptionId) -> bool {
    let mut subscribers = subscribers.write();
    let before = subscribers.len();
    subscribers.retain(|s| s.id != id);
    subscribers.len() != before
}

/// In-process key event bus
pub struct KeyEventBus {
    subscribers: Arc<Subscribers>,
    next_id: AtomicU64,
}

impl KeyEventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    fn subscribe(&self, event_type: KeyEventType, handler: KeyHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push(Subscriber {
            id,
            event_type,
            handler,
        });
        trace!(?id, ?event_type, "key handler subscribed");
        id
    }

    /// Deliver an event to every matching subscriber, in subscription order
    ///
    /// Subscribers whose handler reports [`HandlerState::Dead`] are removed.
    /// Returns the number of handlers invoked.
    pub fn emit(&self, event: &mut KeyEvent) -> usize {
        // Handlers may subscribe or unsubscribe; never call them under the lock.
        let handlers: Vec<(SubscriptionId, KeyHandler)> = self
            .subscribers
            .read()
            .iter()
            .filter(|s| s.event_type == event.event_type)
            .map(|s| (s.id, Arc::clone(&s.handler)))
            .collect();

        let dead: Vec<SubscriptionId> = handlers
            .iter()
            .filter(|(_, handler)| handler(event) == HandlerState::Dead)
            .map(|(id, _)| *id)
            .collect();

        if !dead.is_empty() {
            self.subscribers.write().retain(|s| !dead.contains(&s.id));
            debug!("Removed {} dead key handlers", dead.len());
        }

        debug!(
            "Key event {:?}/{} delivered to {} handlers",
            event.event_type,
            event.key_code,
            handlers.len()
        );
        handlers.len()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl KeySource for KeyEventBus {
    fn on_key_down(&self, handler: KeyHandler) -> SubscriptionId {
        self.subscribe(KeyEventType::KeyDown, handler)
    }

    fn on_key_up(&self, handler: KeyHandler) -> SubscriptionId {
        self.subscribe(KeyEventType::KeyUp, handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        remove_subscriber(&self.subscribers, id)
    }

    fn unsubscriber(&self) -> Option<Unsubscriber> {
        let subscribers: Weak<Subscribers> = Arc::downgrade(&self.subscribers);
        Some(Arc::new(move |id: SubscriptionId| {
            subscribers
                .upgrade()
                .map_or(false, |subscribers| remove_subscriber(&subscribers, id))
        }))
    }
}

impl Default for KeyEventBus {
    fn default() -> Self {
        Self::new()
    }
}
