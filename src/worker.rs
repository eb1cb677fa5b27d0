//! Background executor for catalogue rebuilds.
//!
//! A rebuild runs a producer closure on the blocking pool and hands its result
//! to a completion closure. Requests made while a rebuild is in flight are
//! coalesced into a single rerun, so at most one producer runs at a time and
//! at most one more is queued behind it.
//!
//! Cancellation is cooperative: the producer receives an [`AtomicBool`] and is
//! expected to poll it (e.g. once per file) and return early when it is set.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::task::TaskTracker;

type Producer<R> = dyn Fn(&AtomicBool) -> R + Send + Sync;
type Finisher<R> = dyn Fn(R) + Send + Sync;

/// Lifecycle of a [`BackgroundExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Idle,
    Running,
    /// A rebuild is in flight and another was requested meanwhile.
    RunningWithPendingRerun,
}

/// Tuning knobs for [`BackgroundExecutor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutorOptions {
    /// Set the in-flight run's cancel flag when a rerun is requested. The
    /// stale run stops early and its partial result is not published.
    pub cancel_on_rerun: bool,
}

struct Control {
    state: ExecutorState,
    cancel: Arc<AtomicBool>,
}

struct Shared<R> {
    producer: Arc<Producer<R>>,
    finish: Box<Finisher<R>>,
    options: ExecutorOptions,
    control: Mutex<Control>,
    state_tx: watch::Sender<ExecutorState>,
    runs: AtomicU64,
    last_runtime: Mutex<Option<Duration>>,
}

impl<R> Shared<R> {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, control: &mut Control, state: ExecutorState) {
        control.state = state;
        self.state_tx.send_replace(state);
    }

    /// Leave the pending-rerun state with a fresh cancel flag, or go idle.
    ///
    /// Returns the flag for the next run, if there is one.
    fn next_run(&self) -> Option<Arc<AtomicBool>> {
        let mut control = self.control();
        if control.state == ExecutorState::RunningWithPendingRerun {
            control.cancel = Arc::new(AtomicBool::new(false));
            self.set_state(&mut control, ExecutorState::Running);
            Some(Arc::clone(&control.cancel))
        } else {
            self.set_state(&mut control, ExecutorState::Idle);
            None
        }
    }
}

/// Runs a producer off the interactive path and serializes its invocations.
pub struct BackgroundExecutor<R> {
    shared: Arc<Shared<R>>,
    state_rx: watch::Receiver<ExecutorState>,
    handle: Handle,
    tracker: TaskTracker,
}

impl<R> fmt::Debug for BackgroundExecutor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundExecutor")
            .field("state", &self.state())
            .field("run_count", &self.run_count())
            .field("runtime", &self.runtime())
            .field("options", &self.shared.options)
            .finish_non_exhaustive()
    }
}

impl<R: Send + 'static> BackgroundExecutor<R> {
    /// Create an executor bound to the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn new<P, F>(producer: P, finish: F) -> Self
    where
        P: Fn(&AtomicBool) -> R + Send + Sync + 'static,
        F: Fn(R) + Send + Sync + 'static,
    {
        Self::with_options(producer, finish, ExecutorOptions::default())
    }

    pub fn with_options<P, F>(producer: P, finish: F, options: ExecutorOptions) -> Self
    where
        P: Fn(&AtomicBool) -> R + Send + Sync + 'static,
        F: Fn(R) + Send + Sync + 'static,
    {
        let (state_tx, state_rx) = watch::channel(ExecutorState::Idle);
        Self {
            shared: Arc::new(Shared {
                producer: Arc::new(producer),
                finish: Box::new(finish),
                options,
                control: Mutex::new(Control {
                    state: ExecutorState::Idle,
                    cancel: Arc::new(AtomicBool::new(false)),
                }),
                state_tx,
                runs: AtomicU64::new(0),
                last_runtime: Mutex::new(None),
            }),
            state_rx,
            handle: Handle::current(),
            tracker: TaskTracker::new(),
        }
    }

    /// Spawn rebuild tasks on `handle` instead of the runtime current at construction.
    #[must_use]
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = handle;
        self
    }

    /// Request a rebuild.
    ///
    /// Starts one when idle; otherwise marks a single rerun to follow the
    /// current one. Never blocks on the producer.
    pub fn run(&self) {
        let mut control = self.shared.control();
        match control.state {
            ExecutorState::Idle => {
                control.cancel = Arc::new(AtomicBool::new(false));
                let cancel = Arc::clone(&control.cancel);
                self.shared.set_state(&mut control, ExecutorState::Running);
                drop(control);

                tracing::debug!("Starting index rebuild");
                let shared = Arc::clone(&self.shared);
                self.tracker
                    .spawn_on(supervise(shared, cancel), &self.handle);
            }
            ExecutorState::Running | ExecutorState::RunningWithPendingRerun => {
                if self.shared.options.cancel_on_rerun {
                    control.cancel.store(true, Ordering::Relaxed);
                }
                if control.state == ExecutorState::Running {
                    tracing::debug!("Rebuild in flight, queueing a rerun");
                    self.shared
                        .set_state(&mut control, ExecutorState::RunningWithPendingRerun);
                }
            }
        }
    }
}

impl<R> BackgroundExecutor<R> {
    pub fn state(&self) -> ExecutorState {
        *self.state_rx.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state() != ExecutorState::Idle
    }

    /// Number of producer invocations started so far.
    pub fn run_count(&self) -> u64 {
        self.shared.runs.load(Ordering::Relaxed)
    }

    /// Wall-clock duration of the most recent completed producer invocation.
    pub fn runtime(&self) -> Option<Duration> {
        *self
            .shared
            .last_runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask the in-flight producer to stop and drop any queued rerun.
    ///
    /// The result of a cancelled run is discarded, so the previously
    /// finished result stays in place.
    pub fn cancel(&self) {
        let mut control = self.shared.control();
        control.cancel.store(true, Ordering::Relaxed);
        if control.state == ExecutorState::RunningWithPendingRerun {
            self.shared.set_state(&mut control, ExecutorState::Running);
        }
    }

    /// Resolve once no rebuild is running or queued.
    pub async fn wait_idle(&self) {
        let mut state_rx = self.state_rx.clone();
        // The sender lives in `shared`, which `self` keeps alive.
        let _ = state_rx
            .wait_for(|state| *state == ExecutorState::Idle)
            .await;
    }

    /// Cancel outstanding work and wait for the worker task to exit.
    pub async fn shutdown(&self) {
        self.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}

impl<R> Drop for BackgroundExecutor<R> {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn supervise<R: Send + 'static>(shared: Arc<Shared<R>>, mut cancel: Arc<AtomicBool>) {
    loop {
        let run = shared.runs.fetch_add(1, Ordering::Relaxed) + 1;
        let producer = Arc::clone(&shared.producer);
        let flag = Arc::clone(&cancel);
        let started = Instant::now();

        let outcome = tokio::task::spawn_blocking(move || producer(&flag)).await;

        let elapsed = started.elapsed();
        *shared
            .last_runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(elapsed);

        let result = match outcome {
            Ok(result) => Some(result),
            Err(e) if e.is_panic() => {
                let payload = e.into_panic();
                tracing::error!(
                    "Index producer panicked in run {}, keeping previous index: {}",
                    run,
                    panic_message(&*payload)
                );
                None
            }
            Err(e) => {
                tracing::warn!("Index producer task failed in run {}: {}", run, e);
                None
            }
        };

        // A set flag means the producer may have stopped early, so its
        // result is partial. A queued rerun alone does not invalidate it.
        if cancel.load(Ordering::Relaxed) {
            tracing::debug!("Discarding result of cancelled run {}", run);
        } else if let Some(result) = result {
            tracing::debug!("Rebuild run {} finished in {:?}", run, elapsed);
            (shared.finish)(result);
            if shared.control().state == ExecutorState::RunningWithPendingRerun {
                tracing::debug!("Rerun requested during run {}, starting it", run);
            }
        }

        match shared.next_run() {
            Some(next) => cancel = next,
            None => break,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}
