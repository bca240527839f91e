//! Background sweep of expired entries.
//!
//! One Tokio task per cache wakes on a fixed interval and runs a sweep
//! closure supplied by the cache. The closure takes the same lock as every
//! other operation and reports whether the cache is still alive. The loop
//! ends when the closure returns `false`, when [`Sweeper::stop`] is called,
//! or when the `Sweeper` is dropped. A stopped sweeper cannot be restarted.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::error::{CacheError, CacheResult};

/// Handle to a running sweep task.
#[derive(Debug)]
pub struct Sweeper {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    interval: Duration,
}

impl Sweeper {
    /// Spawn the sweep loop on the current Tokio runtime.
    ///
    /// Fails if `interval` is zero or if called outside a runtime.
    pub fn spawn<F>(interval: Duration, mut sweep: F) -> CacheResult<Self>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        if interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "cleanup interval must be greater than zero".to_string(),
            ));
        }
        let runtime = Handle::try_current().map_err(|_| {
            CacheError::InvalidConfig("background cleanup requires a Tokio runtime".to_string())
        })?;

        let (stop, mut stopped) = oneshot::channel::<()>();
        let task = runtime.spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {
                        if !sweep() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("ttl sweep stopped");
        });

        tracing::debug!(?interval, "ttl sweep started");
        Ok(Self {
            stop: Some(stop),
            task,
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Signal the loop to exit. Later calls do nothing.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            // The task may already be gone if the cache was dropped.
            let _ = stop.send(());
        }
    }

    /// `true` until `stop` has been called or the task has exited.
    pub fn is_running(&self) -> bool {
        self.stop.is_some() && !self.task.is_finished()
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}
