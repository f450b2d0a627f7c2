use futures::{Stream, StreamExt};
use tokio::sync::oneshot;

use crate::{
    cli::{
        CliError, Command, CommandResult,
        formatting::{format_change, format_pair},
        types::{ArgType, CommandArg, CommandMetadata},
    },
    config_store::{ConfigChange, ConfigStore},
    options::StoreOptions,
};

/// Keeps a refreshing store open and prints every change until Ctrl+C.
pub struct WatchCommand {
    options: StoreOptions,
}

impl WatchCommand {
    /// Creates a new WatchCommand.
    pub fn new(options: StoreOptions) -> Self {
        Self { options }
    }
}

/// Subscribes to `pattern`, then renders the current contents sorted by key.
///
/// The subscription exists before the snapshot is taken, so a change that
/// lands in between is printed twice instead of never.
pub(crate) fn start_watch(
    store: &ConfigStore,
    pattern: &str,
) -> (impl Stream<Item = ConfigChange> + use<>, Vec<String>) {
    let changes = store.subscribe_to_key(pattern);

    let mut current: Vec<(String, String)> = store.snapshot().into_iter().collect();
    current.sort();
    let lines = current
        .iter()
        .map(|(key, value)| format_pair(key, value))
        .collect();

    (changes, lines)
}

impl Command for WatchCommand {
    fn execute(&self, args: &[String]) -> CommandResult {
        let file = args.first().ok_or_else(|| {
            CliError::InvalidArguments("Expected <file> argument for 'watch' command".to_string())
        })?;
        let pattern = args.get(1).map(String::as_str).unwrap_or("*").to_string();

        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| CliError::ServiceError(format!("Failed to create runtime: {}", e)))?;

        let file = file.clone();
        let options = self.options.clone();

        runtime.block_on(async move {
            let (done_tx, done_rx) = oneshot::channel::<()>();
            let store = ConfigStore::builder(&file)
                .options(options)
                .shutdown(async move {
                    let _ = done_rx.await;
                })
                .build();

            println!("Watching '{}' for keys matching '{}'...", file, pattern);
            println!("Press Ctrl+C to stop");

            let (changes, current) = start_watch(&store, &pattern);
            for line in current {
                println!("{line}");
            }

            let mut changes = Box::pin(changes);
            loop {
                tokio::select! {
                    change = changes.next() => match change {
                        Some(change) => println!("{}", format_change(&change)),
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }

            let _ = done_tx.send(());
        });

        Ok("Watch ended".to_string())
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "watch".to_string(),
            description: "Print changes to a configuration file as they are picked up"
                .to_string(),
            category: "config".to_string(),
            args: vec![
                CommandArg {
                    name: "file".to_string(),
                    description: "Configuration file to watch".to_string(),
                    required: true,
                    value_type: ArgType::Path,
                },
                CommandArg {
                    name: "pattern".to_string(),
                    description: "Key or key prefix ending in '*' (default: all keys)"
                        .to_string(),
                    required: false,
                    value_type: ArgType::Key,
                },
            ],
            examples: vec![
                "kvreload config watch /etc/app.conf".to_string(),
                "kvreload config watch /etc/app.conf 'db.*'".to_string(),
            ],
        }
    }
}
