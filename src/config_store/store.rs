use std::{
    collections::HashMap,
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
    sync::{
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, instrument};

use crate::options::{MIN_REFRESH_INTERVAL, StoreOptions};

use super::{
    ChangeSource, ConfigChange, ReloadOutcome, TracingSink, UpdateEvent, UpdateSink,
    refresher::{self, RefresherHandle},
};

/// Everything guarded by the store's lock.
pub(super) struct State {
    pub(super) source_path: PathBuf,
    /// Modification time of the last fully scanned file.
    pub(super) last_applied: SystemTime,
    pub(super) parameters: HashMap<String, String>,
}

/// State shared between store handles and the background refresher.
pub(super) struct Shared {
    state: RwLock<State>,
    log_updates: AtomicBool,
    refresh_interval_nanos: AtomicU64,
    pub(super) sink: Arc<dyn UpdateSink>,
    change_sender: broadcast::Sender<ConfigChange>,
}

type ShutdownSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A live-reloading, thread-safe key/value configuration store.
///
/// The store is loaded from a plain text file of `key=value` or `key:value`
/// lines and re-reads it whenever the file's modification time moves
/// forward. Reads never fail: missing keys read as the empty string.
///
/// Handles are cheap to clone and all share the same state. The background
/// refresher stops when the shutdown signal fires or once every handle has
/// been dropped.
#[derive(Clone)]
pub struct ConfigStore {
    shared: Arc<Shared>,
    refresher: Option<Arc<RefresherHandle>>,
}

impl ConfigStore {
    /// Creates a store for `path` with default options and starts refreshing it.
    ///
    /// The file is read once before this returns.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::builder(path).build()
    }

    /// Creates a store for `path` with the given options and starts refreshing it.
    pub fn with_options(path: impl Into<PathBuf>, options: StoreOptions) -> Self {
        Self::builder(path).options(options).build()
    }

    /// Creates a store that only reloads when [`update`](Self::update) or
    /// [`set_filename`](Self::set_filename) is called.
    pub fn detached(path: impl Into<PathBuf>, options: StoreOptions) -> Self {
        Self::builder(path).options(options).build_detached()
    }

    /// Starts building a store for `path`.
    pub fn builder(path: impl Into<PathBuf>) -> ConfigStoreBuilder {
        ConfigStoreBuilder {
            path: path.into(),
            options: StoreOptions::default(),
            sink: Arc::new(TracingSink),
            shutdown: None,
        }
    }

    /// Returns the value stored for `key`, or an empty string if absent.
    pub fn get(&self, key: &str) -> String {
        self.shared
            .read_state()
            .parameters
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the values for `keys` in the same order, all read under one lock.
    ///
    /// Missing keys yield empty strings, so the result always has the same
    /// length as the input.
    pub fn get_slice<K: AsRef<str>>(&self, keys: &[K]) -> Vec<String> {
        let state = self.shared.read_state();

        keys.iter()
            .map(|key| {
                state
                    .parameters
                    .get(key.as_ref())
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Returns true if `key` has a stored value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.shared.read_state().parameters.contains_key(key)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.shared.read_state().parameters.len()
    }

    /// Returns true if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a consistent copy of every stored pair.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.shared.read_state().parameters.clone()
    }

    /// The file the store is currently backed by.
    pub fn source_path(&self) -> PathBuf {
        self.shared.read_state().source_path.clone()
    }

    /// Stores `value` under `key`.
    ///
    /// Writing the value a key already holds does nothing: no event is
    /// logged and no change is broadcast.
    pub fn set_key_value(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut state = self.shared.write_state();
        let change = self.shared.apply(
            &mut state.parameters,
            key.into(),
            value.into(),
            ChangeSource::Api,
        );

        if let Some(change) = change {
            self.shared.publish(change);
        }
    }

    /// Points the store at a different file and reconciles immediately.
    ///
    /// A new path always forces a full reload, even if its modification time
    /// is older than the previous file's. Keys from the previous file are
    /// kept unless the new file overrides them.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn set_filename(&self, path: impl AsRef<Path>) -> ReloadOutcome {
        let path = path.as_ref();
        let mut changes = Vec::new();

        let mut state = self.shared.write_state();
        if state.source_path != path {
            debug!("switching configuration source from {}", state.source_path.display());
            state.source_path = path.to_path_buf();
            state.last_applied = UNIX_EPOCH;
        }
        let outcome = self.shared.reconcile(&mut state, &mut changes);

        self.shared.publish_all(changes);
        outcome
    }

    /// Runs one reconciliation pass right away.
    pub fn update(&self) -> ReloadOutcome {
        self.shared.update()
    }

    /// Whether additions, updates and malformed lines are reported.
    pub fn log_updates(&self) -> bool {
        self.shared.log_updates()
    }

    /// Switches reporting of additions, updates and malformed lines.
    pub fn set_log_updates(&self, enabled: bool) {
        self.shared.log_updates.store(enabled, Ordering::Relaxed);
    }

    /// Delay between background reconciliation passes.
    pub fn refresh_interval(&self) -> Duration {
        self.shared.refresh_interval()
    }

    /// Changes the delay used for the next background wait.
    ///
    /// A wait already in progress is not shortened or extended. Intervals
    /// shorter than [`MIN_REFRESH_INTERVAL`] are raised to it.
    pub fn set_refresh_interval(&self, interval: Duration) {
        self.shared.set_refresh_interval(interval);
    }

    /// Returns true while the background refresher is running.
    pub fn is_refreshing(&self) -> bool {
        self.refresher
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// The refresher handle, observable after every store handle is gone.
    #[cfg(test)]
    pub(crate) fn refresher_handle(&self) -> Option<Arc<RefresherHandle>> {
        self.refresher.clone()
    }

    /// Subscribes to every change applied after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigChange> {
        self.shared.change_sender.subscribe()
    }

    /// Creates a stream of changes whose key matches `pattern`.
    ///
    /// # Arguments
    /// * `pattern` - An exact key, `"*"` for every key, or `"prefix*"`
    pub fn subscribe_to_key(&self, pattern: &str) -> impl Stream<Item = ConfigChange> + use<> {
        let pattern = pattern.to_string();
        let receiver = self.shared.change_sender.subscribe();

        futures::stream::unfold(receiver, move |mut receiver| {
            let pattern = pattern.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(change) => {
                            if key_matches(&change.key, &pattern) {
                                return Some((change, receiver));
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            debug!("change subscriber for '{pattern}' skipped {skipped} events");
                        }
                        Err(RecvError::Closed) => return None,
                    }
                }
            }
        })
    }
}

/// Configures and creates a [`ConfigStore`].
pub struct ConfigStoreBuilder {
    path: PathBuf,
    options: StoreOptions,
    sink: Arc<dyn UpdateSink>,
    shutdown: Option<ShutdownSignal>,
}

impl ConfigStoreBuilder {
    /// Sets the store options.
    pub fn options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the observer that receives update events.
    pub fn sink(self, sink: impl UpdateSink + 'static) -> Self {
        self.shared_sink(Arc::new(sink))
    }

    /// Sets an already shared observer.
    pub fn shared_sink(mut self, sink: Arc<dyn UpdateSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Stops the background refresher once `signal` completes.
    ///
    /// Without a signal the refresher runs until every store handle is
    /// dropped or the runtime shuts down.
    pub fn shutdown(mut self, signal: impl Future<Output = ()> + Send + 'static) -> Self {
        self.shutdown = Some(Box::pin(signal));
        self
    }

    /// Creates the store, reads the file once and starts the background refresher.
    ///
    /// Inside a tokio runtime the refresher is a task on that runtime.
    /// Outside one it runs on a dedicated thread.
    pub fn build(mut self) -> ConfigStore {
        let shutdown = self
            .shutdown
            .take()
            .unwrap_or_else(|| Box::pin(std::future::pending::<()>()) as ShutdownSignal);
        let shared = self.into_shared();

        shared.update();
        let refresher = refresher::spawn(Arc::downgrade(&shared), shutdown).map(Arc::new);

        ConfigStore { shared, refresher }
    }

    /// Creates the store and reads the file once, without a background refresher.
    pub fn build_detached(self) -> ConfigStore {
        let shared = self.into_shared();
        shared.update();

        ConfigStore {
            shared,
            refresher: None,
        }
    }

    fn into_shared(self) -> Arc<Shared> {
        let (change_sender, _) = broadcast::channel(self.options.change_capacity.max(1));
        let refresh_interval_nanos = AtomicU64::new(interval_nanos(self.options.refresh_interval()));

        Arc::new(Shared {
            state: RwLock::new(State {
                source_path: self.path,
                last_applied: UNIX_EPOCH,
                parameters: HashMap::new(),
            }),
            log_updates: AtomicBool::new(self.options.log_updates),
            refresh_interval_nanos,
            sink: self.sink,
            change_sender,
        })
    }
}

impl Shared {
    pub(super) fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn log_updates(&self) -> bool {
        self.log_updates.load(Ordering::Relaxed)
    }

    pub(super) fn refresh_interval(&self) -> Duration {
        Duration::from_nanos(self.refresh_interval_nanos.load(Ordering::Relaxed))
    }

    fn set_refresh_interval(&self, interval: Duration) {
        self.refresh_interval_nanos
            .store(interval_nanos(interval), Ordering::Relaxed);
    }

    /// Takes the write lock, reconciles and broadcasts what changed.
    ///
    /// Changes are sent before the lock is released so that concurrent
    /// writers can never broadcast out of the order they were applied in.
    pub(super) fn update(&self) -> ReloadOutcome {
        let mut changes = Vec::new();
        let mut state = self.write_state();
        let outcome = self.reconcile(&mut state, &mut changes);

        self.publish_all(changes);
        outcome
    }

    /// Writes one pair into an already locked map.
    ///
    /// Returns the change that was made, or `None` if the key already held
    /// this exact value.
    pub(super) fn apply(
        &self,
        parameters: &mut HashMap<String, String>,
        key: String,
        value: String,
        source: ChangeSource,
    ) -> Option<ConfigChange> {
        let old_value = match parameters.get(&key) {
            Some(stored) if *stored == value => return None,
            stored => stored.cloned(),
        };

        if self.log_updates() {
            let event = match &old_value {
                None => UpdateEvent::Added {
                    key: key.clone(),
                    value: value.clone(),
                    source,
                },
                Some(old_value) => UpdateEvent::Updated {
                    key: key.clone(),
                    old_value: old_value.clone(),
                    new_value: value.clone(),
                    source,
                },
            };
            self.sink.record(&event);
        }

        parameters.insert(key.clone(), value.clone());
        Some(ConfigChange::new(key, old_value, value, source))
    }

    fn publish(&self, change: ConfigChange) {
        // no receivers is not an error
        let _ = self.change_sender.send(change);
    }

    fn publish_all(&self, changes: Vec<ConfigChange>) {
        for change in changes {
            self.publish(change);
        }
    }
}

fn interval_nanos(interval: Duration) -> u64 {
    u64::try_from(interval.max(MIN_REFRESH_INTERVAL).as_nanos()).unwrap_or(u64::MAX)
}

/// Checks if a key matches a subscription pattern
///
/// # Examples
/// * `"db.host"` matches `"db.host"`
/// * `"db.host"` matches `"db.*"`
/// * `"db.host"` matches `"*"`
pub(super) fn key_matches(key: &str, pattern: &str) -> bool {
    const WILDCARD: char = '*';

    match pattern.strip_suffix(WILDCARD) {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}
