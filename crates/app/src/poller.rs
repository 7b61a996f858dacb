//! Fixed-interval polling with last-write-wins publication.
//!
//! A [`Poller`] re-runs a fetch on every tick and publishes each successful
//! result through a [`watch`] channel. Failures are logged and the previous
//! value is kept. Dropping or stopping the [`PollHandle`] aborts the task,
//! including a fetch that is still in flight, so nothing is published after
//! teardown.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use plugdash_domain::error::PlugDashError;

/// Default refresh period of the device list.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
pub struct Poller {
    interval: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Poller {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the polling task. The first fetch starts immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<T, F, Fut>(&self, mut fetch: F) -> PollHandle<T>
    where
        T: Send + Sync + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, PlugDashError>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(None);
        let period = self.interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match fetch().await {
                    Ok(value) => {
                        tx.send_replace(Some(value));
                    }
                    Err(err) => tracing::warn!(error = %err, "poll failed, keeping last value"),
                }
                if tx.is_closed() {
                    tracing::debug!("all poll subscribers gone");
                    break;
                }
            }
        });
        PollHandle { task, rx }
    }
}

/// Owner of a polling task. Aborts the task when dropped.
#[derive(Debug)]
pub struct PollHandle<T> {
    task: JoinHandle<()>,
    rx: watch::Receiver<Option<T>>,
}

impl<T> PollHandle<T> {
    /// Another receiver of the published values.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.rx.clone()
    }

    /// Wait for the next published value.
    ///
    /// # Errors
    ///
    /// Fails once the task has stopped and no further value will come.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }

    /// Latest successful result, if any.
    #[must_use]
    pub fn latest(&self) -> Option<T>
    where
        T: Clone,
    {
        self.rx.borrow().clone()
    }

    /// Stop polling now. Equivalent to dropping the handle.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
