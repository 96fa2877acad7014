//! Amend Core - shared types
//!
//! Key events and the event bus, the host `Surface` contract,
//! configuration, logging and the common error type.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod surface;

pub use config::{AmendConfig, IndentConfig, LoggingConfig, OutdentConfig, OutdentEndPolicy};
pub use error::{AmendError, Result};
pub use events::{
    HandlerState, KeyEvent, KeyEventBus, KeyEventType, KeyHandler, KeySource, SubscriptionId,
    Unsubscriber, TAB_KEY_CODE,
};
pub use surface::Surface;

/// Amend version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
