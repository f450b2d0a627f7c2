//! kvreload - a live-reloading key/value configuration store.
//!
//! Configuration lives in a plain text file of `key=value` or `key:value`
//! lines. The store loads it once on construction, serves lookups from
//! memory, and re-reads the file in the background whenever its
//! modification time moves forward.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kvreload::config_store::ConfigStore;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = ConfigStore::new("/etc/myapp.conf");
//!
//! let host = store.get("db.host");
//! let [user, password]: [String; 2] = store
//!     .get_slice(&["db.user", "db.password"])
//!     .try_into()
//!     .unwrap();
//! # }
//! ```

/// Crate-level error types and result alias.
pub mod core;

/// Live-reloading key/value store.
pub mod config_store;

/// Per-store tuning options.
pub mod options;

/// Command-line interface for inspecting configuration files.
pub mod cli;

/// Tracing subscriber setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use crate::core::{KvError, Result};
