use std::{env, path::Path};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{KvError, Result};

const LOG_FORMAT_VAR: &str = "KVRELOAD_LOG_FORMAT";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn json_requested() -> bool {
    env::var(LOG_FORMAT_VAR).is_ok_and(|format| format == "json")
}

/// Initialize tracing for the application
///
/// Uses RUST_LOG if set, otherwise defaults to "info". Output is pretty
/// printed unless KVRELOAD_LOG_FORMAT=json.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init() -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter());

    let installed = if json_requested() {
        registry
            .with(fmt::layer().json().with_target(true).with_level(true))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_names(true),
            )
            .try_init()
    };

    installed.map_err(|e| KvError::Tracing(e.to_string()))
}

/// Initialize tracing for short-lived CLI commands
///
/// Only warnings and errors reach stderr unless RUST_LOG says otherwise, so
/// command output on stdout stays clean.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init_cli_mode() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| KvError::Tracing(e.to_string()))
}

/// Initialize tracing with file output
///
/// Like [`init`], but also writes a daily rotated log into `log_dir`.
/// The returned guard flushes the file writer and must be kept alive for as
/// long as logging is needed.
///
/// # Errors
/// Returns error if the log directory cannot be used or a subscriber is
/// already installed
pub fn init_with_file(log_dir: &Path) -> Result<WorkerGuard> {
    const DAYS_TO_KEEP: usize = 7;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .max_log_files(DAYS_TO_KEEP)
        .filename_prefix("kvreload")
        .filename_suffix("log")
        .build(log_dir)
        .map_err(|e| KvError::io(e, log_dir))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let registry = tracing_subscriber::registry().with(env_filter());

    let installed = if json_requested() {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(non_blocking)
                    .with_ansi(false),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(non_blocking)
                    .with_ansi(false),
            )
            .try_init()
    };

    installed.map_err(|e| KvError::Tracing(e.to_string()))?;
    Ok(guard)
}
