//! Unit tests for CLI module
//!
//! Tests command registry, formatting and the read-only config commands.

#![allow(clippy::unwrap_used)]

use std::{
    fs,
    time::{Duration, Instant},
};

use futures::StreamExt;
use tempfile::TempDir;

use crate::{
    cli::{
        CliError, CliService, CommandRegistry,
        commands::config::start_watch,
        formatting::{format_change, format_pair, format_value},
    },
    config_store::{ChangeSource, ConfigChange, ConfigStore, NoopSink},
    options::StoreOptions,
};

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn service_with_file(content: &str) -> (TempDir, String, CliService) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.conf");
    fs::write(&path, content).unwrap();

    let path = path.to_string_lossy().to_string();
    (dir, path, CliService::new(StoreOptions::default()))
}

#[test]
fn format_value_keeps_whitespace_visible() {
    assert_eq!(format_value("plain"), "\"plain\"");
    assert_eq!(format_value(" padded "), "\" padded \"");
    assert_eq!(format_value(""), "\"\"");
}

#[test]
fn format_pair_joins_key_and_quoted_value() {
    assert_eq!(format_pair("db.host", "localhost"), "db.host: \"localhost\"");
}

#[test]
fn format_change_distinguishes_additions() {
    let added = ConfigChange {
        key: "k".to_string(),
        old_value: None,
        new_value: "v".to_string(),
        source: ChangeSource::File,
        timestamp: Instant::now(),
    };
    assert_eq!(format_change(&added), "k: added \"v\" (source: File)");

    let updated = ConfigChange {
        old_value: Some("u".to_string()),
        source: ChangeSource::Api,
        ..added
    };
    assert_eq!(format_change(&updated), "k: \"u\" -> \"v\" (source: Api)");
}

#[test]
fn command_registry_starts_empty() {
    let registry = CommandRegistry::new(StoreOptions::default());
    assert!(registry.list_commands().is_empty());
}

#[test]
fn command_registry_lists_config_commands_sorted() {
    let mut registry = CommandRegistry::new(StoreOptions::default());
    registry.register_all_commands();

    assert_eq!(
        registry.list_commands(),
        vec![(
            "config".to_string(),
            vec!["dump".to_string(), "get".to_string(), "watch".to_string()]
        )]
    );
}

#[test]
fn unknown_category_and_command_are_reported() {
    let service = CliService::new(StoreOptions::default());

    let err = service.execute_command("nope", "get", &[]).unwrap_err();
    assert!(matches!(err, CliError::CommandNotFound(_)));

    let err = service.execute_command("config", "nope", &[]).unwrap_err();
    assert!(matches!(err, CliError::CommandNotFound(_)));
}

#[test]
fn argument_count_is_validated() {
    let service = CliService::new(StoreOptions::default());

    let err = service
        .execute_command("config", "get", &args(&["only-file"]))
        .unwrap_err();
    assert!(matches!(err, CliError::InvalidArguments(_)));

    let err = service
        .execute_command("config", "dump", &args(&["a", "b"]))
        .unwrap_err();
    assert!(matches!(err, CliError::InvalidArguments(_)));
}

#[test]
fn get_prints_value_or_empty() {
    let (_dir, path, service) = service_with_file("host=example.com\n");

    let output = service
        .execute_command("config", "get", &args(&[path.as_str(), "host"]))
        .unwrap();
    assert_eq!(output, "host: \"example.com\"");

    let output = service
        .execute_command("config", "get", &args(&[path.as_str(), "missing"]))
        .unwrap();
    assert_eq!(output, "missing: \"\"");
}

#[test]
fn get_on_missing_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.conf").to_string_lossy().to_string();
    let service = CliService::new(StoreOptions::default());

    let err = service
        .execute_command("config", "get", &args(&[path.as_str(), "k"]))
        .unwrap_err();
    assert!(matches!(err, CliError::ConfigError(_)));
}

#[test]
fn dump_sorts_pairs_by_key() {
    let (_dir, path, service) = service_with_file("b=2\nnot a pair\na:1\n");

    let output = service
        .execute_command("config", "dump", &args(&[path.as_str()]))
        .unwrap();
    assert_eq!(output, "a: \"1\"\nb: \"2\"");
}

#[test]
fn help_mentions_every_command() {
    let service = CliService::new(StoreOptions::default());

    let help = service.execute_command("help", "", &[]).unwrap();
    for command in ["get", "dump", "watch"] {
        assert!(help.contains(command), "help is missing '{command}'");
    }
}

#[test]
fn help_shows_argument_types_and_examples() {
    let service = CliService::new(StoreOptions::default());

    let help = service.help_text();
    assert!(help.contains("file (path)"));
    assert!(help.contains("key (key)"));
    assert!(help.contains("e.g. kvreload config get /etc/app.conf db.host"));
    assert!(help.contains("e.g. kvreload config dump /etc/app.conf"));
}

#[tokio::test]
async fn watch_sees_changes_made_right_after_the_snapshot() {
    let store = ConfigStore::builder("/nonexistent/kvreload/watch.conf")
        .sink(NoopSink)
        .build_detached();
    store.set_key_value("k", "1");

    let (changes, current) = start_watch(&store, "*");
    store.set_key_value("k", "2");

    assert_eq!(current, vec![format_pair("k", "1")]);

    let mut changes = Box::pin(changes);
    let change = tokio::time::timeout(Duration::from_secs(1), changes.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(change.old_value.as_deref(), Some("1"));
    assert_eq!(change.new_value, "2");
}
