use crate::options::StoreOptions;

use super::{
    CliError, CommandRegistry,
    formatting::{format_category, format_command, format_description, format_header},
};

/// High-level service for managing and executing CLI commands.
pub struct CliService {
    registry: CommandRegistry,
}

impl CliService {
    /// Creates a new CLI service with all built-in commands registered.
    ///
    /// # Arguments
    /// * `options` - Options for the stores opened by commands
    pub fn new(options: StoreOptions) -> Self {
        let mut registry = CommandRegistry::new(options);
        registry.register_all_commands();

        CliService { registry }
    }

    /// Executes a command by category and name with the provided arguments.
    ///
    /// The `help` category, or an empty command name, renders the help text.
    ///
    /// # Errors
    /// Returns `CliError::CommandNotFound` if the command doesn't exist in the category,
    /// or whatever error the command itself produced.
    pub fn execute_command(
        &self,
        category: &str,
        command_name: &str,
        args: &[String],
    ) -> Result<String, CliError> {
        if category == "help" || command_name.is_empty() {
            return Ok(self.help_text());
        }

        self.registry.execute(category, command_name, args)
    }

    /// Lists all available commands organized by category.
    pub fn list_all(&self) -> Vec<(String, Vec<String>)> {
        self.registry.list_commands()
    }

    /// Renders usage help for every registered command.
    pub fn help_text(&self) -> String {
        let mut lines = vec![format_header("Usage: kvreload <category> <command> [args]")];

        for (category, commands) in self.list_all() {
            lines.push(String::new());
            lines.push(format_category(&category));

            for command in commands {
                let Some(metadata) = self.registry.metadata(&category, &command) else {
                    continue;
                };

                let args: Vec<String> = metadata
                    .args
                    .iter()
                    .map(|arg| {
                        if arg.required {
                            format!("<{}>", arg.name)
                        } else {
                            format!("[{}]", arg.name)
                        }
                    })
                    .collect();

                lines.push(format!(
                    "  {} {}  {}",
                    format_command(&command),
                    args.join(" "),
                    format_description(&metadata.description)
                ));

                for arg in &metadata.args {
                    lines.push(format!(
                        "      {} ({})  {}",
                        arg.name,
                        arg.value_type,
                        format_description(&arg.description)
                    ));
                }

                for example in &metadata.examples {
                    lines.push(format!("      e.g. {example}"));
                }
            }
        }

        lines.join("\n")
    }
}
