use thiserror::Error;

/// Characters accepted as the separator between key and value.
pub const DELIMITERS: [char; 2] = ['=', ':'];

/// Reasons a single configuration line could not be turned into a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LineError {
    /// The line is blank once surrounding whitespace is removed.
    #[error("empty line")]
    Empty,

    /// The line has content but neither `=` nor `:`.
    #[error("missing delimiter (':' or '=')")]
    MissingDelimiter,
}

/// Splits one line of a configuration file into a key and a value.
///
/// The line is trimmed first, then split at the first `=` or `:`, whichever
/// comes earlier. Whitespace inside the line is kept on both sides of the
/// delimiter, so `"a = b"` yields `("a ", " b")`.
///
/// # Errors
/// * `LineError::Empty` - The trimmed line has no content
/// * `LineError::MissingDelimiter` - No `=` or `:` is present
pub fn split_line(line: &str) -> Result<(String, String), LineError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(LineError::Empty);
    }

    let index = line.find(&DELIMITERS[..]).ok_or(LineError::MissingDelimiter)?;
    let (key, rest) = line.split_at(index);

    // delimiters are single-byte, so skipping one byte stays on a boundary
    Ok((key.to_string(), rest[1..].to_string()))
}
