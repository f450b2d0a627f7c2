use std::{fmt, path::PathBuf};

use tracing::{error, info, warn};

use super::{ChangeSource, LineError};

/// An observable event raised while the store is mutated or reloaded.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEvent {
    /// A key that did not exist was stored.
    Added {
        /// The new key
        key: String,
        /// Its value
        value: String,
        /// Origin of the write
        source: ChangeSource,
    },
    /// An existing key received a different value.
    Updated {
        /// The key
        key: String,
        /// Value before the write
        old_value: String,
        /// Value after the write
        new_value: String,
        /// Origin of the write
        source: ChangeSource,
    },
    /// A non-blank line in the source file could not be parsed.
    MalformedLine {
        /// The source file
        path: PathBuf,
        /// 1-based line number
        line_number: usize,
        /// The raw line
        line: String,
        /// Why it was rejected
        error: LineError,
    },
    /// The source file could not be read this pass.
    FileError {
        /// The source file
        path: PathBuf,
        /// Formatted error
        details: String,
    },
}

impl fmt::Display for UpdateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateEvent::Added { key, value, source } => {
                write!(f, "storing key '{key}' with value '{value}' ({source:?})")
            }
            UpdateEvent::Updated {
                key,
                old_value,
                new_value,
                source,
            } => write!(
                f,
                "updating key '{key}' value from '{old_value}' to '{new_value}' ({source:?})"
            ),
            UpdateEvent::MalformedLine {
                path,
                line_number,
                line,
                error,
            } => write!(
                f,
                "error parsing {}:{line_number} '{line}': {error}",
                path.display()
            ),
            UpdateEvent::FileError { path, details } => {
                write!(f, "error reading {}: {details}", path.display())
            }
        }
    }
}

/// Observer that receives store events.
///
/// Implementations must not block; they are called while the store's write
/// lock is held.
pub trait UpdateSink: Send + Sync {
    /// Records a single event.
    fn record(&self, event: &UpdateEvent);
}

/// Forwards events to `tracing`.
///
/// Additions and updates are logged at `info`, malformed lines at `warn`
/// and file errors at `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl UpdateSink for TracingSink {
    fn record(&self, event: &UpdateEvent) {
        match event {
            UpdateEvent::Added { .. } | UpdateEvent::Updated { .. } => {
                info!("{event}")
            }
            UpdateEvent::MalformedLine { .. } => warn!("{event}"),
            UpdateEvent::FileError { .. } => error!("{event}"),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl UpdateSink for NoopSink {
    fn record(&self, _event: &UpdateEvent) {}
}
