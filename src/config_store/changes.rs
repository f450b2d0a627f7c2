use std::{
    io,
    path::{Path, PathBuf},
    time::Instant,
};

use thiserror::Error;

/// Where a configuration change originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// Written through [`ConfigStore::set_key_value`](super::ConfigStore::set_key_value).
    Api,
    /// Picked up while reconciling the backing file.
    File,
}

/// A single applied change to a key.
///
/// Only real changes are recorded; writing a key with the value it already
/// holds produces nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigChange {
    /// The key that changed.
    pub key: String,
    /// The previous value, or `None` when the key was new.
    pub old_value: Option<String>,
    /// The value now stored.
    pub new_value: String,
    /// What caused the change.
    pub source: ChangeSource,
    /// When the change was applied.
    pub timestamp: Instant,
}

impl ConfigChange {
    /// Creates a new change record stamped with the current instant.
    ///
    /// # Arguments
    ///
    /// * `key` - The key that changed
    /// * `old_value` - The previous value (if the key existed)
    /// * `new_value` - The new value
    /// * `source` - Origin of the change
    pub fn new(
        key: String,
        old_value: Option<String>,
        new_value: String,
        source: ChangeSource,
    ) -> Self {
        Self {
            key,
            old_value,
            new_value,
            source,
            timestamp: Instant::now(),
        }
    }

    /// Returns true if the key did not exist before this change.
    pub fn is_addition(&self) -> bool {
        self.old_value.is_none()
    }
}

/// Failures that abort a single reconciliation pass.
///
/// These never reach callers of `get` or `set_key_value`; they are reported
/// to the update sink and the pass is retried on the next tick.
#[derive(Debug, Error)]
pub enum ReloadError {
    /// The file metadata could not be read.
    #[error("failed to stat '{path}': {source}")]
    Stat {
        /// The source file
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The file exists but could not be opened.
    #[error("failed to open '{path}': {source}")]
    Open {
        /// The source file
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Reading failed part way through the file.
    #[error("failed to read '{path}' at line {line}: {source}")]
    Read {
        /// The source file
        path: PathBuf,
        /// 1-based line number where reading stopped
        line: usize,
        /// Underlying I/O error
        source: io::Error,
    },
}

impl ReloadError {
    /// The file the failed pass was reading.
    pub fn path(&self) -> &Path {
        match self {
            ReloadError::Stat { path, .. }
            | ReloadError::Open { path, .. }
            | ReloadError::Read { path, .. } => path,
        }
    }
}

/// Result of one reconciliation pass.
#[derive(Debug)]
pub enum ReloadOutcome {
    /// The source file does not exist.
    SourceMissing,
    /// The file has not been modified since it was last applied.
    Unchanged,
    /// The pass was aborted; state is untouched apart from lines applied
    /// before a read error.
    Failed(ReloadError),
    /// The file was scanned and its timestamp recorded.
    Reloaded(ScanStats),
}

impl ReloadOutcome {
    /// Returns true if the file was scanned to the end.
    pub fn is_reloaded(&self) -> bool {
        matches!(self, ReloadOutcome::Reloaded(_))
    }
}

/// Line counts gathered while scanning a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Lines read, blank ones included.
    pub lines: usize,
    /// Lines that changed a value.
    pub changed: usize,
    /// Non-blank lines that could not be parsed.
    pub rejected: usize,
}
