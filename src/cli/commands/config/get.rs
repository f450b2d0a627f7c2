use crate::{
    cli::{
        CliError, Command, CommandResult,
        formatting::format_pair,
        types::{ArgType, CommandArg, CommandMetadata},
    },
    options::StoreOptions,
};

use super::open_store;

/// Command for reading a single key from a configuration file.
///
/// # Example Usage
///
/// ```bash
/// kvreload config get /etc/app.conf db.host
/// ```
pub struct GetCommand {
    options: StoreOptions,
}

impl GetCommand {
    /// Creates a new GetCommand.
    ///
    /// # Arguments
    ///
    /// * `options` - Options for the store opened on each execution
    pub fn new(options: StoreOptions) -> Self {
        Self { options }
    }
}

impl Command for GetCommand {
    /// Loads the file and prints `key: "value"`.
    ///
    /// Missing keys print an empty value, the same as the store reports them.
    ///
    /// # Errors
    ///
    /// * `CliError::InvalidArguments` - If the file or key argument is missing
    /// * `CliError::ConfigError` - If the file cannot be read
    fn execute(&self, args: &[String]) -> CommandResult {
        let file = args.first().ok_or_else(|| {
            CliError::InvalidArguments("Expected <file> argument for 'get' command".to_string())
        })?;
        let key = args.get(1).ok_or_else(|| {
            CliError::InvalidArguments("Expected <key> argument for 'get' command".to_string())
        })?;

        let store = open_store(file, &self.options)?;

        Ok(format_pair(key, &store.get(key)))
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "get".to_string(),
            description: "Get the value of one key".to_string(),
            category: "config".to_string(),
            args: vec![
                CommandArg {
                    name: "file".to_string(),
                    description: "Configuration file to read".to_string(),
                    required: true,
                    value_type: ArgType::Path,
                },
                CommandArg {
                    name: "key".to_string(),
                    description: "Key to look up".to_string(),
                    required: true,
                    value_type: ArgType::Key,
                },
            ],
            examples: vec![
                "kvreload config get /etc/app.conf db.host".to_string(),
                "kvreload config get ./service.conf port".to_string(),
            ],
        }
    }
}
