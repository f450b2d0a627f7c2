use std::{future::Future, sync::Weak, thread};

use tokio::{
    runtime::{Builder, Handle},
    task::JoinHandle,
};
use tracing::{debug, error, trace};

use super::store::Shared;

const THREAD_NAME: &str = "kvreload-refresh";

/// Handle to a running background refresher.
pub(crate) enum RefresherHandle {
    /// Task spawned on the caller's tokio runtime.
    Task(JoinHandle<()>),
    /// Dedicated thread driving its own single-threaded runtime.
    Thread(thread::JoinHandle<()>),
}

impl RefresherHandle {
    pub(crate) fn is_finished(&self) -> bool {
        match self {
            RefresherHandle::Task(handle) => handle.is_finished(),
            RefresherHandle::Thread(handle) => handle.is_finished(),
        }
    }
}

/// Spawns the background loop that reconciles the store on every tick.
///
/// Inside a tokio runtime the loop is a task on that runtime. Outside one it
/// gets a dedicated thread with a current-thread runtime. The loop holds only
/// a weak reference, so it ends on its own once every store handle is gone.
/// Returns `None` only if neither could be started.
pub(super) fn spawn<F>(shared: Weak<Shared>, shutdown: F) -> Option<RefresherHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(runtime) = Handle::try_current() {
        return Some(RefresherHandle::Task(
            runtime.spawn(refresh_loop(shared, shutdown)),
        ));
    }

    let runtime = match Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to build refresher runtime, background refresh disabled: {e}");
            return None;
        }
    };

    debug!("no tokio runtime available, refreshing on a dedicated thread");
    let spawned = thread::Builder::new()
        .name(THREAD_NAME.to_string())
        .spawn(move || runtime.block_on(refresh_loop(shared, shutdown)));

    match spawned {
        Ok(handle) => Some(RefresherHandle::Thread(handle)),
        Err(e) => {
            error!("failed to spawn refresher thread, background refresh disabled: {e}");
            None
        }
    }
}

async fn refresh_loop<F>(shared: Weak<Shared>, shutdown: F)
where
    F: Future<Output = ()> + Send,
{
    tokio::pin!(shutdown);

    loop {
        let Some(interval) = shared.upgrade().map(|shared| shared.refresh_interval()) else {
            debug!("store dropped, stopping refresher");
            return;
        };

        tokio::select! {
            _ = &mut shutdown => {
                debug!("shutdown signalled, stopping refresher");
                return;
            }

            _ = tokio::time::sleep(interval) => {
                let Some(shared) = shared.upgrade() else {
                    debug!("store dropped, stopping refresher");
                    return;
                };

                match tokio::task::spawn_blocking(move || shared.update()).await {
                    Ok(outcome) => trace!(?outcome, "refresh tick"),
                    Err(e) => error!("reconciliation task failed: {e}"),
                }
            }
        }
    }
}
