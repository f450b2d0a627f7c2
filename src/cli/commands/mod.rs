//! Built-in CLI commands grouped by category.

pub mod config;
