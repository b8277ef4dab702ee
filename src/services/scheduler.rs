//! Deferred-action scheduler keyed by entity id.
//!
//! Every timer in the system (bot fallback, room expiry, post-resolution
//! cleanup) runs through here so that removing an entity can also cancel its
//! pending timers. Cancellation is best-effort: callbacks must still re-check
//! that their target entity exists before acting.

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct Scheduler {
    tasks: DashMap<String, JoinHandle<()>>,
}

impl Scheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tasks: DashMap::new(),
        })
    }

    /// Run `action` after `delay`. Re-scheduling under the same key replaces
    /// (and aborts) the previous timer.
    pub fn schedule<F>(self: &Arc<Self>, key: impl Into<String>, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = key.into();
        let scheduler = Arc::clone(self);
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
            scheduler.tasks.remove(&task_key);
        });

        if let Some(previous) = self.tasks.insert(key.clone(), handle) {
            debug!("Replacing scheduled task for {}", key);
            previous.abort();
        }
    }

    /// Cancel the timer registered under `key`, if any.
    pub fn cancel(&self, key: &str) {
        if let Some((_, handle)) = self.tasks.remove(key) {
            handle.abort();
        }
    }

    /// Number of pending timers.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}
