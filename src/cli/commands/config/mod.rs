//! Commands that read a configuration file through a store.
mod dump;
mod get;
mod watch;

use std::path::Path;

pub use dump::DumpCommand;
pub use get::GetCommand;
pub use watch::WatchCommand;
#[cfg(test)]
pub(crate) use watch::start_watch;

use crate::{
    cli::{CliError, CommandRegistry},
    config_store::{ConfigStore, NoopSink, ReloadOutcome},
    options::StoreOptions,
};

/// Registers all configuration commands under the "config" category.
///
/// # Arguments
///
/// * `registry` - Mutable reference to the command registry
/// * `options` - Options for the stores the commands open
pub fn register_commands(registry: &mut CommandRegistry, options: StoreOptions) {
    const CATEGORY_NAME: &str = "config";

    registry.register_command(CATEGORY_NAME, Box::new(GetCommand::new(options.clone())));
    registry.register_command(CATEGORY_NAME, Box::new(DumpCommand::new(options.clone())));
    registry.register_command(CATEGORY_NAME, Box::new(WatchCommand::new(options)));
}

/// Loads `file` into a store without a background refresher.
///
/// # Errors
/// Returns `CliError::ConfigError` if the file is missing or unreadable.
fn open_store(file: &str, options: &StoreOptions) -> Result<ConfigStore, CliError> {
    let store = ConfigStore::builder(file)
        .options(options.clone())
        .sink(NoopSink)
        .build_detached();

    // construction already loaded the file; this pass only surfaces why it could not
    match store.update() {
        ReloadOutcome::SourceMissing => Err(CliError::ConfigError(format!(
            "'{}' does not exist",
            Path::new(file).display()
        ))),
        ReloadOutcome::Failed(e) => Err(CliError::ConfigError(e.to_string())),
        ReloadOutcome::Unchanged | ReloadOutcome::Reloaded(_) => Ok(store),
    }
}
