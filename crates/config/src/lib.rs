//! Basin Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use basin_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[buffers.publish]\nfile_buffer_enabled = true").unwrap();
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [buffers.publish]
//! queued_item_limit = 50000
//! file_buffer_enabled = true
//!
//! [buffers.delete]
//! process_interval = "1s"
//! ```

mod buffers;
mod error;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use buffers::{BufferConfig, BuffersConfig};
pub use error::{ConfigError, Result};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Named operation buffer configurations
    pub buffers: BuffersConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        self.buffers.validate()
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
