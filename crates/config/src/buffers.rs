//! Buffer configuration types
//!
//! Configuration for operation buffers: the in-memory working queue, the
//! process/retry cadence, and the on-disk file buffer (store-and-forward).
//!
//! Buffers are named instances, allowing per-operation tuning (e.g. a
//! publish buffer with file buffering enabled next to a delete buffer that
//! runs memory-only).
//!
//! # Example
//!
//! ```toml
//! [buffers.default]
//! # uses all defaults
//!
//! [buffers.publish]
//! queued_item_limit = 50000
//! file_buffer_enabled = true
//! file_buffer_page_size = 10000000
//!
//! [buffers.delete]
//! process_interval = "1s"
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Container for all buffer configurations
///
/// Buffers are stored as a map of name -> config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuffersConfig {
    /// Named buffer instances
    #[serde(flatten)]
    buffers: HashMap<String, BufferConfig>,
}

impl BuffersConfig {
    /// Get a buffer config by name
    pub fn get(&self, name: &str) -> Option<&BufferConfig> {
        self.buffers.get(name)
    }

    /// Check if a buffer config exists
    pub fn contains(&self, name: &str) -> bool {
        self.buffers.contains_key(name)
    }

    /// Iterate over all buffer configs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BufferConfig)> {
        self.buffers.iter()
    }

    /// Get the number of configured buffers
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Check if no buffers are configured
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Get all buffer names
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.buffers.keys()
    }

    /// Validate every configured buffer
    pub fn validate(&self) -> Result<()> {
        for (name, config) in &self.buffers {
            config.validate(name)?;
        }
        Ok(())
    }
}

/// Configuration for a single operation buffer
///
/// All fields are optional with documented defaults. Durations are
/// humantime-encoded in TOML (`"5s"`, `"100ms"`).
///
/// # Example
///
/// ```toml
/// [buffers.publish]
/// process_interval = "5s"
/// retry_interval = "10s"
/// max_items_per_interval = 5000
/// queued_item_limit = 25000
/// file_buffer_enabled = true
/// file_buffer_page_size = 5000000
/// file_buffer_read_interval = "100ms"
/// path = "buffer"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Interval at which the working queue is processed
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub process_interval: Duration,

    /// Interval at which processing is retried after a failure
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub retry_interval: Duration,

    /// Maximum number of items offered to the sink per interval
    /// Default: 5000
    pub max_items_per_interval: usize,

    /// Maximum number of items held in the working queue
    /// Default: 25000
    pub queued_item_limit: usize,

    /// Whether the store-and-forward file buffer is enabled
    /// Default: false
    pub file_buffer_enabled: bool,

    /// Force every add to the file buffer, bypassing the working queue.
    /// A testing/recovery mode; leaves the memory path unused.
    /// Default: false
    pub file_buffer_force_enabled: bool,

    /// Maximum page size in bytes before rotating to a new page
    /// Default: 5000000 (5 MB)
    pub file_buffer_page_size: u64,

    /// Interval at which file buffer pages are read back into the queue
    /// Default: 100ms
    #[serde(with = "humantime_serde")]
    pub file_buffer_read_interval: Duration,

    /// Cadence of the write-side housekeeping tick (idle-close watchdog)
    /// Default: 100ms
    #[serde(with = "humantime_serde")]
    pub file_buffer_write_interval: Duration,

    /// Quiet period after which an idle write stream is closed
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub file_buffer_idle_close: Duration,

    /// Root directory for file buffer pages
    /// Default: "buffer"
    pub path: PathBuf,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            process_interval: Duration::from_secs(5),
            retry_interval: Duration::from_secs(10),
            max_items_per_interval: 5000,
            queued_item_limit: 25000,
            file_buffer_enabled: false,
            file_buffer_force_enabled: false,
            file_buffer_page_size: 5_000_000,
            file_buffer_read_interval: Duration::from_millis(100),
            file_buffer_write_interval: Duration::from_millis(100),
            file_buffer_idle_close: Duration::from_secs(5),
            path: PathBuf::from("buffer"),
        }
    }
}

impl BufferConfig {
    /// Set the process interval
    #[must_use]
    pub fn with_process_interval(mut self, interval: Duration) -> Self {
        self.process_interval = interval;
        self
    }

    /// Set the retry interval
    #[must_use]
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Set the per-interval item budget
    #[must_use]
    pub fn with_max_items_per_interval(mut self, max: usize) -> Self {
        self.max_items_per_interval = max;
        self
    }

    /// Set the working queue limit
    #[must_use]
    pub fn with_queued_item_limit(mut self, limit: usize) -> Self {
        self.queued_item_limit = limit;
        self
    }

    /// Enable the file buffer
    #[must_use]
    pub fn with_file_buffer(mut self) -> Self {
        self.file_buffer_enabled = true;
        self
    }

    /// Force every add to the file buffer
    #[must_use]
    pub fn with_file_buffer_forced(mut self) -> Self {
        self.file_buffer_enabled = true;
        self.file_buffer_force_enabled = true;
        self
    }

    /// Set the page size limit in bytes
    #[must_use]
    pub fn with_page_size(mut self, bytes: u64) -> Self {
        self.file_buffer_page_size = bytes;
        self
    }

    /// Set the file buffer read interval
    #[must_use]
    pub fn with_read_interval(mut self, interval: Duration) -> Self {
        self.file_buffer_read_interval = interval;
        self
    }

    /// Set the write-side housekeeping interval
    #[must_use]
    pub fn with_write_interval(mut self, interval: Duration) -> Self {
        self.file_buffer_write_interval = interval;
        self
    }

    /// Set the idle-close quiet period
    #[must_use]
    pub fn with_idle_close(mut self, period: Duration) -> Self {
        self.file_buffer_idle_close = period;
        self
    }

    /// Set the file buffer root directory
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Validate this configuration
    ///
    /// `name` identifies the buffer in error messages.
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.queued_item_limit == 0 {
            return Err(ConfigError::invalid_value(
                name,
                "queued_item_limit",
                "must be greater than zero",
            ));
        }
        if self.max_items_per_interval == 0 {
            return Err(ConfigError::invalid_value(
                name,
                "max_items_per_interval",
                "must be greater than zero",
            ));
        }
        if self.file_buffer_enabled && self.file_buffer_page_size == 0 {
            return Err(ConfigError::invalid_value(
                name,
                "file_buffer_page_size",
                "must be greater than zero when the file buffer is enabled",
            ));
        }
        if self.file_buffer_force_enabled && !self.file_buffer_enabled {
            return Err(ConfigError::invalid_value(
                name,
                "file_buffer_force_enabled",
                "requires file_buffer_enabled",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "buffers_test.rs"]
mod buffers_test;
