//! Per-store tuning options.

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{KvError, Result};

const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1000;

/// Default delay between two background reconciliation passes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS);

/// Shortest delay the background refresher will wait between passes.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// Default capacity of the change notification channel.
pub const DEFAULT_CHANGE_CAPACITY: usize = 1000;

/// Options applied to a single [`ConfigStore`](crate::config_store::ConfigStore).
///
/// Every field has a default, so a TOML file only needs to list what it
/// overrides:
///
/// ```toml
/// refresh_interval_ms = 250
/// log_updates = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Milliseconds between background reconciliation passes.
    pub refresh_interval_ms: u64,

    /// Whether additions, updates and malformed lines are reported to the sink.
    pub log_updates: bool,

    /// Buffered change events per subscriber before the slowest lags.
    pub change_capacity: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            log_updates: true,
            change_capacity: DEFAULT_CHANGE_CAPACITY,
        }
    }
}

impl StoreOptions {
    /// Loads options from a TOML file.
    ///
    /// # Errors
    /// * `KvError::IoError` - If the file cannot be read
    /// * `KvError::TomlParseError` - If the content is not valid options TOML
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| KvError::io(e, path))?;
        toml::from_str(&content).map_err(|e| KvError::toml_parse(e, Some(path)))
    }

    /// Parses options from a TOML string.
    ///
    /// # Errors
    /// Returns `KvError::TomlParseError` if the content is not valid options TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| KvError::toml_parse(e, None))
    }

    /// The refresh interval as a `Duration`, never shorter than
    /// [`MIN_REFRESH_INTERVAL`].
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms).max(MIN_REFRESH_INTERVAL)
    }

    /// Returns a copy with the given refresh interval.
    ///
    /// The interval is kept in whole milliseconds: anything shorter than
    /// [`MIN_REFRESH_INTERVAL`] is raised to it and sub-millisecond parts
    /// are dropped. Intervals too long for `u64` milliseconds saturate.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        let millis = interval.max(MIN_REFRESH_INTERVAL).as_millis();
        self.refresh_interval_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }

    /// Returns a copy with update logging switched on or off.
    pub fn with_log_updates(mut self, log_updates: bool) -> Self {
        self.log_updates = log_updates;
        self
    }
}
