//! Unit tests for config_store module
//! No filesystem fixtures; file-backed behaviour lives in tests/config_store.rs.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]

use std::{
    io,
    path::PathBuf,
    sync::{Arc, Mutex},
    thread,
    time::{Duration, Instant},
};

use tokio::sync::broadcast::error::TryRecvError;

use crate::{
    config_store::{
        ChangeSource, ConfigChange, ConfigStore, LineError, NoopSink, ReloadOutcome, UpdateEvent,
        UpdateSink, store::key_matches,
    },
    options::{MIN_REFRESH_INTERVAL, StoreOptions},
};

const MISSING_SOURCE: &str = "/nonexistent/kvreload/unit.conf";
const FAST: Duration = Duration::from_millis(10);
const PATIENCE: Duration = Duration::from_secs(5);

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<UpdateEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<UpdateEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl UpdateSink for RecordingSink {
    fn record(&self, event: &UpdateEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

fn detached_store(sink: Arc<RecordingSink>, options: StoreOptions) -> ConfigStore {
    ConfigStore::builder(MISSING_SOURCE)
        .options(options)
        .shared_sink(sink)
        .build_detached()
}

#[test]
fn key_matches_exact_wildcard_and_prefix() {
    assert!(key_matches("db.host", "db.host"));
    assert!(key_matches("db.host", "db.*"));
    assert!(key_matches("db.host", "*"));
    assert!(key_matches("", "*"));

    assert!(!key_matches("db.host", "db.port"));
    assert!(!key_matches("db.host", "cache.*"));
    assert!(!key_matches("db", "db.*"));
}

#[test]
fn missing_keys_read_as_empty() {
    let store = detached_store(Arc::default(), StoreOptions::default());

    assert_eq!(store.get("absent"), "");
    assert!(!store.contains_key("absent"));
    assert!(store.is_empty());
}

#[test]
fn set_key_value_logs_addition_then_update() {
    let sink = Arc::new(RecordingSink::default());
    let store = detached_store(sink.clone(), StoreOptions::default());

    store.set_key_value("color", "red");
    store.set_key_value("color", "blue");

    assert_eq!(store.get("color"), "blue");
    assert_eq!(
        sink.events(),
        vec![
            UpdateEvent::Added {
                key: "color".to_string(),
                value: "red".to_string(),
                source: ChangeSource::Api,
            },
            UpdateEvent::Updated {
                key: "color".to_string(),
                old_value: "red".to_string(),
                new_value: "blue".to_string(),
                source: ChangeSource::Api,
            },
        ]
    );
}

#[test]
fn setting_same_value_twice_is_silent() {
    let sink = Arc::new(RecordingSink::default());
    let store = detached_store(sink.clone(), StoreOptions::default());
    let mut changes = store.subscribe();

    store.set_key_value("mode", "fast");
    store.set_key_value("mode", "fast");

    assert_eq!(store.get("mode"), "fast");
    assert_eq!(sink.events().len(), 1);

    let first = changes.try_recv().unwrap();
    assert!(first.is_addition());
    assert!(matches!(changes.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn disabled_logging_still_stores_values() {
    let sink = Arc::new(RecordingSink::default());
    let store = detached_store(sink.clone(), StoreOptions::default().with_log_updates(false));

    store.set_key_value("quiet", "1");
    store.set_key_value("quiet", "2");

    assert_eq!(store.get("quiet"), "2");
    assert!(sink.events().is_empty());
}

#[test]
fn log_toggle_can_change_at_runtime() {
    let sink = Arc::new(RecordingSink::default());
    let store = detached_store(sink.clone(), StoreOptions::default());

    store.set_log_updates(false);
    store.set_key_value("a", "1");
    assert!(!store.log_updates());

    store.set_log_updates(true);
    store.set_key_value("b", "2");

    assert_eq!(sink.events().len(), 1);
}

#[test]
fn get_slice_preserves_order_and_length() {
    let store = detached_store(Arc::default(), StoreOptions::default());
    store.set_key_value("a", "1");
    store.set_key_value("b", "2");

    assert_eq!(store.get_slice(&["b", "missing", "a"]), vec!["2", "", "1"]);
    assert!(store.get_slice::<&str>(&[]).is_empty());

    let owned = vec!["a".to_string(), "a".to_string()];
    assert_eq!(store.get_slice(&owned), vec!["1", "1"]);
}

#[test]
fn snapshot_is_a_copy() {
    let store = detached_store(Arc::default(), StoreOptions::default());
    store.set_key_value("k", "v");

    let snapshot = store.snapshot();
    store.set_key_value("k", "w");

    assert_eq!(snapshot.get("k").map(String::as_str), Some("v"));
    assert_eq!(store.len(), 1);
}

#[test]
fn missing_source_is_not_reported() {
    let sink = Arc::new(RecordingSink::default());
    let store = detached_store(sink.clone(), StoreOptions::default());

    assert!(matches!(store.update(), ReloadOutcome::SourceMissing));
    assert!(sink.events().is_empty());
    assert_eq!(store.source_path(), PathBuf::from(MISSING_SOURCE));
}

#[test]
fn detached_store_has_no_refresher() {
    let store = detached_store(Arc::default(), StoreOptions::default());
    assert!(!store.is_refreshing());
}

#[test]
fn build_outside_runtime_refreshes_on_own_thread() {
    let store = ConfigStore::builder(MISSING_SOURCE)
        .options(StoreOptions::default().with_refresh_interval(FAST))
        .sink(NoopSink)
        .build();

    store.set_key_value("still", "works");
    assert_eq!(store.get("still"), "works");
    assert!(store.is_refreshing());

    let handle = store.refresher_handle().unwrap();
    drop(store);

    let deadline = Instant::now() + PATIENCE;
    while !handle.is_finished() {
        assert!(Instant::now() < deadline, "refresher thread outlived the store");
        thread::sleep(FAST);
    }
}

#[tokio::test]
async fn refresher_outlives_dropped_clone() {
    let store = ConfigStore::builder(MISSING_SOURCE)
        .options(StoreOptions::default().with_refresh_interval(FAST))
        .sink(NoopSink)
        .build();
    let handle = store.refresher_handle().unwrap();
    let other = store.clone();

    drop(store);
    tokio::time::sleep(FAST * 5).await;
    assert!(!handle.is_finished());
    assert!(other.is_refreshing());

    drop(other);
    let stopped = tokio::time::timeout(PATIENCE, async {
        while !handle.is_finished() {
            tokio::time::sleep(FAST).await;
        }
    })
    .await;
    assert!(stopped.is_ok(), "refresher kept running after the last handle dropped");
}

#[test]
fn refresh_interval_is_per_store() {
    let fast = detached_store(
        Arc::default(),
        StoreOptions::default().with_refresh_interval(Duration::from_millis(10)),
    );
    let default = detached_store(Arc::default(), StoreOptions::default());

    assert_eq!(fast.refresh_interval().as_millis(), 10);
    assert_eq!(default.refresh_interval().as_secs(), 1);

    fast.set_refresh_interval(Duration::from_secs(5));
    assert_eq!(fast.refresh_interval().as_secs(), 5);
    assert_eq!(default.refresh_interval().as_secs(), 1);
}

#[test]
fn refresh_interval_keeps_sub_millisecond_precision() {
    let store = detached_store(Arc::default(), StoreOptions::default());

    store.set_refresh_interval(Duration::from_micros(500));
    assert_eq!(store.refresh_interval(), MIN_REFRESH_INTERVAL);

    store.set_refresh_interval(Duration::ZERO);
    assert_eq!(store.refresh_interval(), MIN_REFRESH_INTERVAL);

    store.set_refresh_interval(Duration::from_micros(1500));
    assert_eq!(store.refresh_interval(), Duration::from_micros(1500));

    store.set_refresh_interval(Duration::MAX);
    assert_eq!(store.refresh_interval(), Duration::from_nanos(u64::MAX));
}

#[test]
fn clones_share_state() {
    let store = detached_store(Arc::default(), StoreOptions::default());
    let other = store.clone();

    other.set_key_value("shared", "yes");
    assert_eq!(store.get("shared"), "yes");
}

#[test]
fn update_event_display() {
    let added = UpdateEvent::Added {
        key: "k".to_string(),
        value: "v".to_string(),
        source: ChangeSource::File,
    };
    assert_eq!(added.to_string(), "storing key 'k' with value 'v' (File)");

    let updated = UpdateEvent::Updated {
        key: "k".to_string(),
        old_value: "a".to_string(),
        new_value: "b".to_string(),
        source: ChangeSource::Api,
    };
    assert_eq!(
        updated.to_string(),
        "updating key 'k' value from 'a' to 'b' (Api)"
    );

    let malformed = UpdateEvent::MalformedLine {
        path: PathBuf::from("app.conf"),
        line_number: 3,
        line: "garbage".to_string(),
        error: LineError::MissingDelimiter,
    };
    assert_eq!(
        malformed.to_string(),
        "error parsing app.conf:3 'garbage': missing delimiter (':' or '=')"
    );
}

#[test]
fn config_change_new() {
    let change = ConfigChange::new(
        "key".to_string(),
        Some("old".to_string()),
        "new".to_string(),
        ChangeSource::File,
    );

    assert_eq!(change.key, "key");
    assert_eq!(change.old_value.as_deref(), Some("old"));
    assert_eq!(change.new_value, "new");
    assert!(!change.is_addition());
    assert!(change.timestamp.elapsed().as_secs() < 1);
}

#[test]
fn source_switch_is_quiet_at_info_with_logging_disabled() {
    let store = ConfigStore::builder(MISSING_SOURCE)
        .options(StoreOptions::default().with_log_updates(false))
        .build_detached();

    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        store.set_filename("/nonexistent/kvreload/other.conf");
    });

    assert_eq!(logs.contents(), "");
}
