//! Collapses bursts of change notifications into one delayed action.
//!
//! A package manager rewriting hundreds of desktop files should cause one
//! rebuild, not hundreds: every [`DebounceTrigger::notify`] restarts a
//! single-shot timer, and the action only runs once the timer elapses
//! without another notification.

use crate::worker::BackgroundExecutor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;

pub use crate::config::DEFAULT_DEBOUNCE_DELAY;

/// Delayed, restartable trigger. Dropping it cancels a pending action.
#[derive(Debug)]
pub struct DebounceTrigger {
    notify_tx: watch::Sender<u64>,
    fired: Arc<AtomicU64>,
    delay: Duration,
}

impl DebounceTrigger {
    /// Create a trigger on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn new<F>(delay: Duration, action: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::with_handle(delay, action, &Handle::current())
    }

    pub fn with_handle<F>(delay: Duration, action: F, handle: &Handle) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (notify_tx, notify_rx) = watch::channel(0);
        let fired = Arc::new(AtomicU64::new(0));
        handle.spawn(debounce_loop(notify_rx, delay, action, Arc::clone(&fired)));

        Self {
            notify_tx,
            fired,
            delay,
        }
    }

    /// Trigger that requests a rebuild from `executor` once changes settle.
    ///
    /// Only a weak reference is kept, so the trigger never extends the
    /// executor's lifetime.
    pub fn for_executor<R: Send + 'static>(
        delay: Duration,
        executor: &Arc<BackgroundExecutor<R>>,
    ) -> Self {
        let executor: Weak<BackgroundExecutor<R>> = Arc::downgrade(executor);
        Self::new(delay, move || {
            if let Some(executor) = executor.upgrade() {
                executor.run();
            }
        })
    }

    /// Record a change and restart the delay. Never blocks.
    pub fn notify(&self) {
        self.notify_tx.send_modify(|count| *count = count.wrapping_add(1));
    }

    /// How many times the action has run.
    pub fn fire_count(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

async fn debounce_loop<F>(
    mut notify_rx: watch::Receiver<u64>,
    delay: Duration,
    mut action: F,
    fired: Arc<AtomicU64>,
) where
    F: FnMut() + Send + 'static,
{
    // `changed` errors once the trigger is dropped.
    while notify_rx.changed().await.is_ok() {
        let mut coalesced: u64 = 1;
        loop {
            tokio::select! {
                changed = notify_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    coalesced += 1;
                }
                () = tokio::time::sleep(delay) => {
                    tracing::debug!(
                        "Changes settled after {} notification batches, triggering",
                        coalesced
                    );
                    fired.fetch_add(1, Ordering::Relaxed);
                    action();
                    break;
                }
            }
        }
    }
}
