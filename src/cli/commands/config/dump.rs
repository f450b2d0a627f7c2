use crate::{
    cli::{
        CliError, Command, CommandResult,
        formatting::format_pair,
        types::{ArgType, CommandArg, CommandMetadata},
    },
    options::StoreOptions,
};

use super::open_store;

/// Prints every pair in a configuration file, sorted by key.
pub struct DumpCommand {
    options: StoreOptions,
}

impl DumpCommand {
    /// Creates a new DumpCommand.
    pub fn new(options: StoreOptions) -> Self {
        Self { options }
    }
}

impl Command for DumpCommand {
    fn execute(&self, args: &[String]) -> CommandResult {
        let file = args.first().ok_or_else(|| {
            CliError::InvalidArguments("Expected <file> argument for 'dump' command".to_string())
        })?;

        let store = open_store(file, &self.options)?;

        let mut pairs: Vec<(String, String)> = store.snapshot().into_iter().collect();
        pairs.sort();

        Ok(pairs
            .iter()
            .map(|(key, value)| format_pair(key, value))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "dump".to_string(),
            description: "Print every key and value".to_string(),
            category: "config".to_string(),
            args: vec![CommandArg {
                name: "file".to_string(),
                description: "Configuration file to read".to_string(),
                required: true,
                value_type: ArgType::Path,
            }],
            examples: vec!["kvreload config dump /etc/app.conf".to_string()],
        }
    }
}
