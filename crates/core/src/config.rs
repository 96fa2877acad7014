//! Configuration
//!
//! Settings for the built-in indentation rules and logging:
//! - Indent unit and the key code that triggers it
//! - How the selection end is computed after a block outdent
//! - Log level

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AmendError, Result};
use crate::events::TAB_KEY_CODE;

/// Indentation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndentConfig {
    /// Text inserted or removed per indentation level
    pub unit: String,
    /// Key code that triggers indentation
    pub key_code: u32,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            unit: "\t".to_string(),
            key_code: TAB_KEY_CODE,
        }
    }
}

/// How a block outdent reports its new selection end
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutdentEndPolicy {
    /// End is derived from the text actually left after outdenting
    #[default]
    Actual,
    /// End assumes one unit was removed from every line, even lines that had
    /// none. Can report an end short of the outdented block.
    Legacy,
}

/// Outdent settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct OutdentConfig {
    pub end_policy: OutdentEndPolicy,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `AMEND_LOG`
    pub level: String,
    /// Include the event target in log lines
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: false,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AmendConfig {
    /// Configuration version for migrations
    pub version: u32,
    pub indent: IndentConfig,
    pub outdent: OutdentConfig,
    pub logging: LoggingConfig,
}

impl Default for AmendConfig {
    fn default() -> Self {
        Self {
            version: 1,
            indent: IndentConfig::default(),
            outdent: OutdentConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AmendConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "amend", "Amend").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the configuration file path
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        let config_file = Self::config_file()
            .ok_or_else(|| AmendError::Config("Cannot determine config path".into()))?;

        if config_file.exists() {
            Self::load_from(&config_file)
        } else {
            info!("Config file not found, using defaults");
            Ok(AmendConfig::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AmendConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml_string()?)?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    /// Check invariants the indentation rules rely on
    pub fn validate(&self) -> Result<()> {
        if self.indent.unit.is_empty() {
            return Err(AmendError::Config("indent unit must not be empty".into()));
        }
        if self.indent.unit.contains('\n') {
            return Err(AmendError::Config(
                "indent unit must not contain a newline".into(),
            ));
        }
        Ok(())
    }
}
