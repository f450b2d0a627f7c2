use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised by the fallible parts of the crate.
///
/// The store itself never fails; these cover loading options and
/// initialising logging.
#[derive(Error, Debug)]
pub enum KvError {
    /// I/O operation error with path context
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where the I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParseError {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// The tracing subscriber could not be installed
    #[error("failed to initialise logging: {0}")]
    Tracing(String),
}

/// A specialized `Result` type defaulting to [`KvError`].
pub type Result<T> = std::result::Result<T, KvError>;

impl KvError {
    /// Creates a TOML parsing error with optional file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying parsing error
    /// * `path` - Optional path to the file that failed to parse
    pub fn toml_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        KvError::TomlParseError {
            location,
            details: error.to_string(),
        }
    }

    /// Creates an I/O error carrying the path that failed.
    pub fn io(error: impl std::fmt::Display, path: &Path) -> Self {
        KvError::IoError {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }
}
