//! A self-refreshing, queryable catalogue.
//!
//! [`Catalogue`] ties a producer to a [`BackgroundExecutor`], publishes each
//! finished rebuild into a [`SnapshotStore`] and answers queries against
//! whatever snapshot is current. With [`Settings::rescan_interval`] set it
//! also requests a rebuild on a fixed period.

use crate::config::{MatchConfig, Settings};
use crate::debounce::DebounceTrigger;
use crate::index::{IndexEntry, IndexQueryHandler, RankItem, SnapshotStore, Suggestion};
use crate::registry::QueryHandler;
use crate::worker::{BackgroundExecutor, ExecutorOptions, ExecutorState};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

type Indexed = (Vec<IndexEntry>, Duration);

/// A named catalogue with its own rebuild worker.
#[derive(Debug)]
pub struct Catalogue {
    id: String,
    settings: Settings,
    handler: Arc<IndexQueryHandler>,
    executor: Arc<BackgroundExecutor<Indexed>>,
    rescan: Option<AbortHandle>,
}

impl Catalogue {
    /// Create an empty catalogue. Nothing is indexed until [`rebuild`](Self::rebuild)
    /// or the first periodic rescan.
    ///
    /// `id` names the catalogue in a [`HandlerRegistry`](crate::HandlerRegistry)
    /// and must be unique there.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn new<P>(id: impl Into<String>, producer: P, settings: Settings) -> Self
    where
        P: Fn(&AtomicBool) -> Vec<IndexEntry> + Send + Sync + 'static,
    {
        Self::with_options(id, producer, settings, ExecutorOptions::default())
    }

    pub fn with_options<P>(
        id: impl Into<String>,
        producer: P,
        settings: Settings,
        options: ExecutorOptions,
    ) -> Self
    where
        P: Fn(&AtomicBool) -> Vec<IndexEntry> + Send + Sync + 'static,
    {
        let store = Arc::new(SnapshotStore::new());
        let handler = Arc::new(IndexQueryHandler::from_settings(
            Arc::clone(&store),
            &settings,
        ));

        let timed = move |cancel: &AtomicBool| {
            let started = Instant::now();
            let entries = producer(cancel);
            (entries, started.elapsed())
        };
        let finish = move |(entries, elapsed): Indexed| {
            let count = entries.len();
            store.update(entries);
            tracing::info!("Indexed {} entries [{} ms]", count, elapsed.as_millis());
        };

        let executor = Arc::new(BackgroundExecutor::with_options(timed, finish, options));
        let rescan = settings
            .rescan_interval
            .filter(|period| !period.is_zero())
            .map(|period| spawn_rescan(period, &executor));

        Self {
            id: id.into(),
            settings,
            handler,
            executor,
            rescan,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn handler(&self) -> &IndexQueryHandler {
        &self.handler
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        self.handler.store()
    }

    pub fn state(&self) -> ExecutorState {
        self.executor.state()
    }

    /// Number of producer runs started so far.
    pub fn run_count(&self) -> u64 {
        self.executor.run_count()
    }

    /// Duration of the last completed producer run.
    pub fn runtime(&self) -> Option<Duration> {
        self.executor.runtime()
    }

    /// Request a rebuild; coalesced with one already in flight.
    pub fn rebuild(&self) {
        self.executor.run();
    }

    /// Stop the in-flight rebuild and drop a queued one.
    pub fn cancel(&self) {
        self.executor.cancel();
    }

    pub async fn wait_idle(&self) {
        self.executor.wait_idle().await;
    }

    /// Stop periodic rescans, cancel outstanding work and wait for it to exit.
    pub async fn shutdown(&self) {
        if let Some(rescan) = &self.rescan {
            rescan.abort();
        }
        self.executor.shutdown().await;
    }

    /// Trigger that rebuilds this catalogue once change notifications settle
    /// for the configured debounce delay.
    pub fn debounce_trigger(&self) -> DebounceTrigger {
        DebounceTrigger::for_executor(self.settings.debounce_delay, &self.executor)
    }

    /// Rank the current snapshot with the configured matching rules.
    pub fn query(&self, input: &str) -> Vec<RankItem> {
        self.handler.query(input, &self.settings.match_config)
    }

    pub fn query_with(&self, input: &str, config: &MatchConfig) -> Vec<RankItem> {
        self.handler.query(input, config)
    }

    pub fn trigger_query(&self, input: &str) -> Option<Vec<RankItem>> {
        self.handler
            .trigger_query(input, &self.settings.match_config)
    }

    pub fn suggest(&self, input: &str, limit: usize) -> Vec<Suggestion> {
        self.handler.suggest(input, limit)
    }
}

impl Drop for Catalogue {
    fn drop(&mut self) {
        if let Some(rescan) = self.rescan.take() {
            rescan.abort();
        }
    }
}

/// Request a rebuild every `period`, starting one period from now.
///
/// The task only holds a weak reference and exits once the executor is gone.
fn spawn_rescan(period: Duration, executor: &Arc<BackgroundExecutor<Indexed>>) -> AbortHandle {
    let executor = Arc::downgrade(executor);
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticks.tick().await;
        loop {
            ticks.tick().await;
            let Some(executor) = executor.upgrade() else {
                break;
            };
            tracing::debug!("Periodic rescan after {:?}", period);
            executor.run();
        }
    })
    .abort_handle()
}

impl QueryHandler for Catalogue {
    fn id(&self) -> &str {
        &self.id
    }

    fn trigger(&self) -> Option<&str> {
        self.handler.trigger()
    }

    fn handle_global_query(&self, query: &str, config: &MatchConfig) -> Vec<RankItem> {
        self.handler.query(query, config)
    }
}
