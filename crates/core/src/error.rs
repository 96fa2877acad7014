//! Error types for Amend
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Main error type for Amend
#[derive(Error, Debug)]
pub enum AmendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Rule '{rule}' failed: {message}")]
    Rule { rule: String, message: String },

    #[error("Invalid selection {start}..{end} for text of length {len}")]
    InvalidSelection { start: usize, end: usize, len: usize },

    #[error("Logging error: {0}")]
    Logging(String),
}

/// Result type alias for Amend operations
pub type Result<T> = std::result::Result<T, AmendError>;

impl AmendError {
    /// Build a rule failure for the named rule
    pub fn rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        AmendError::Rule {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Check if this error is recoverable
    ///
    /// Rule failures only drop the current event; the editor keeps working.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AmendError::Rule { .. } | AmendError::InvalidSelection { .. }
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AmendError::Io(e) => format!("File operation failed: {}", e),
            AmendError::Config(msg) => format!("Configuration error: {}", msg),
            AmendError::TomlParse(e) => format!("Configuration file is not valid TOML: {}", e),
            AmendError::Rule { rule, .. } => {
                format!("Key binding '{}' could not be applied and was skipped", rule)
            }
            _ => self.to_string(),
        }
    }
}
