//! Live view updates.
//!
//! Components never share in-memory state; they learn about each other's
//! writes by re-reading storage. A [`ChangeFeed`] turns a
//! [`SnapshotSource`] into a [`Subscription`] whose value follows storage.
//! [`PollingFeed`] is the only feed today.
//!
//! Loads are blocking storage reads (SQLite included), so the feed runs
//! them on tokio's blocking pool rather than on a runtime worker.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use zawamis_shared::constants::DEFAULT_POLL_INTERVAL_MS;

/// Something that can produce the current view of storage.
pub trait SnapshotSource: Send + Sync + 'static {
    type Snapshot: Clone + PartialEq + Send + Sync + 'static;

    fn load(&self) -> Self::Snapshot;
}

/// Adapts a closure into a [`SnapshotSource`].
pub struct SourceFn<F>(pub F);

impl<F, T> SnapshotSource for SourceFn<F>
where
    F: Fn() -> T + Send + Sync + 'static,
    T: Clone + PartialEq + Send + Sync + 'static,
{
    type Snapshot = T;

    fn load(&self) -> T {
        (self.0)()
    }
}

pub trait ChangeFeed {
    /// Start following `source`. Must be called inside a tokio runtime.
    fn subscribe<S: SnapshotSource>(&self, source: S) -> Subscription<S::Snapshot>;
}

/// Re-runs the source on a fixed period and publishes the result when it
/// differs from the last one.
#[derive(Debug, Clone, Copy)]
pub struct PollingFeed {
    period: Duration,
}

impl PollingFeed {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for PollingFeed {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS))
    }
}

impl ChangeFeed for PollingFeed {
    fn subscribe<S: SnapshotSource>(&self, source: S) -> Subscription<S::Snapshot> {
        let (tx, rx) = watch::channel(source.load());
        let source = Arc::new(source);
        let period = self.period;

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the initial snapshot is
            // already in the channel.
            interval.tick().await;

            loop {
                interval.tick().await;
                if tx.is_closed() {
                    break;
                }

                let loader = Arc::clone(&source);
                let next = match tokio::task::spawn_blocking(move || loader.load()).await {
                    Ok(next) => next,
                    Err(e) => {
                        tracing::warn!(error = %e, "snapshot load failed, keeping the last one");
                        continue;
                    }
                };
                let changed = tx.send_if_modified(|current| {
                    if *current == next {
                        false
                    } else {
                        *current = next;
                        true
                    }
                });
                if changed {
                    tracing::debug!("refreshed snapshot published");
                }
            }
            tracing::debug!("refresh task finished, no subscribers left");
        });

        Subscription { rx, task }
    }
}

/// Handle to a running refresh. Dropping it stops the refresh task.
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
    task: JoinHandle<()>,
}

impl<T: Clone> Subscription<T> {
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Wait for the next published snapshot. Returns `false` if the refresh
    /// task is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// An extra receiver for components that want to watch the same feed.
    pub fn watch(&self) -> watch::Receiver<T> {
        self.rx.clone()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
