//! Formatting utilities for CLI output.

use crate::config_store::ConfigChange;

/// ANSI color codes for terminal output
pub struct Colors;

impl Colors {
    /// Reset all formatting
    pub const RESET: &'static str = "\x1b[0m";
    /// Bold text
    pub const BOLD: &'static str = "\x1b[1m";
    /// Dim text
    pub const DIM: &'static str = "\x1b[2m";

    /// Red color
    pub const RED: &'static str = "\x1b[31m";
    /// Green color
    pub const GREEN: &'static str = "\x1b[32m";
    /// Blue color
    pub const BLUE: &'static str = "\x1b[34m";
    /// Cyan color
    pub const CYAN: &'static str = "\x1b[36m";
}

/// Formats section headers with styling
pub fn format_header(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::CYAN, text, Colors::RESET)
}

/// Formats command names with styling
pub fn format_command(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::GREEN, text, Colors::RESET)
}

/// Formats category names with styling
pub fn format_category(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::BLUE, text, Colors::RESET)
}

/// Formats descriptions with muted styling
pub fn format_description(text: &str) -> String {
    format!("{}{}{}", Colors::DIM, text, Colors::RESET)
}

/// Formats error messages with red styling
pub fn format_error(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::RED, text, Colors::RESET)
}

/// Quotes a stored value so leading and trailing whitespace stays visible.
///
/// ```
/// use kvreload::cli::formatting::format_value;
///
/// assert_eq!(format_value(" padded"), "\" padded\"");
/// ```
pub fn format_value(value: &str) -> String {
    format!("\"{value}\"")
}

/// Formats a `key: "value"` line.
pub fn format_pair(key: &str, value: &str) -> String {
    format!("{}: {}", key, format_value(value))
}

/// Formats one change event for `config watch`.
pub fn format_change(change: &ConfigChange) -> String {
    match &change.old_value {
        Some(old_value) => format!(
            "{}: {} -> {} (source: {:?})",
            change.key,
            format_value(old_value),
            format_value(&change.new_value),
            change.source
        ),
        None => format!(
            "{}: added {} (source: {:?})",
            change.key,
            format_value(&change.new_value),
            change.source
        ),
    }
}
