//! kvreload - inspect and watch live-reloading key/value configuration files.

use std::{env, error::Error, path::PathBuf, process};

use kvreload::{
    cli::{CliService, formatting::format_error},
    options::StoreOptions,
    tracing_config,
};
use tracing::debug;

const OPTIONS_VAR: &str = "KVRELOAD_OPTIONS";
const LOG_DIR_VAR: &str = "KVRELOAD_LOG_DIR";

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();

    let _log_guard = match env::var_os(LOG_DIR_VAR) {
        Some(dir) => Some(tracing_config::init_with_file(&PathBuf::from(dir))?),
        None => {
            tracing_config::init_cli_mode()?;
            None
        }
    };

    let options = load_options()?;
    debug!(?options, "store options");
    let cli_service = CliService::new(options);

    let category = args.get(1).map(|s| s.as_str()).unwrap_or("help");
    let command = args.get(2).map(|s| s.as_str()).unwrap_or("");
    let remaining_args = args.get(3..).unwrap_or(&[]);

    match cli_service.execute_command(category, command, remaining_args) {
        Ok(output) => {
            if !output.trim().is_empty() {
                println!("{output}");
            }
        }
        Err(e) => {
            eprintln!("{}: {}", format_error("Error"), e);
            process::exit(1);
        }
    }

    Ok(())
}

fn load_options() -> Result<StoreOptions, Box<dyn Error>> {
    match env::var_os(OPTIONS_VAR) {
        Some(path) => Ok(StoreOptions::from_toml_file(&PathBuf::from(path))?),
        None => Ok(StoreOptions::default()),
    }
}
