//! Live-reloading key/value store.
//!
//! Loads `key=value` / `key:value` lines from a text file, serves them from
//! memory behind a reader/writer lock, and re-reads the file whenever its
//! modification time moves forward.

mod changes;
mod line;
mod reconcile;
mod refresher;
mod sink;
mod store;

#[cfg(test)]
mod tests;

pub use changes::{ChangeSource, ConfigChange, ReloadError, ReloadOutcome, ScanStats};
pub use line::{DELIMITERS, LineError, split_line};
pub use sink::{NoopSink, TracingSink, UpdateEvent, UpdateSink};
pub use store::{ConfigStore, ConfigStoreBuilder};
