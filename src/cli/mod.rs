//! Command-line interface for inspecting configuration files.
//!
//! Commands are organized by category and generate their help text from
//! metadata.

mod commands;
pub mod formatting;
mod registry;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use commands::config::{DumpCommand, GetCommand, WatchCommand};
pub use registry::CommandRegistry;
pub use service::CliService;
pub use types::{ArgType, CliError, Command, CommandArg, CommandMetadata, CommandResult};
