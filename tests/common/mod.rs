//! Shared test fixtures and utilities for integration tests.
//!
//! # Available Fixtures
//!
//! - `launcher_entries`: a small application catalogue with keyword aliases
//! - `launcher_handler`: an [`IndexQueryHandler`] already holding `launcher_entries`
//! - `temp_workspace`: an empty [`TempWorkspace`] for file-system producers
//!
//! # Shared Infrastructure
//!
//! [`TempWorkspace`] provides a temp directory that is removed on drop.
//! [`SlowProducer`] is a producer that records each invocation and takes a
//! configurable time, for exercising the scheduler.

use catalogue_index::{IndexEntry, IndexQueryHandler, Item, RankItem, SnapshotStore, StandardItem};
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Tolerance for comparing scores computed through different float paths.
#[allow(dead_code)] // Used across different integration test crates
pub const EPSILON: f64 = 1e-9;

#[allow(dead_code)] // Used across different integration test crates
pub fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Ids of ranked results, in rank order.
#[allow(dead_code)] // Used across different integration test crates
pub fn ids(results: &[RankItem]) -> Vec<String> {
    results.iter().map(|r| r.item.id().to_string()).collect()
}

/// Build entries for one item per `(id, strings)` pair; every string is an
/// entry pointing at the same item.
#[allow(dead_code)] // Used across different integration test crates
pub fn entries(items: &[(&str, &[&str])]) -> Vec<IndexEntry> {
    items
        .iter()
        .flat_map(|(id, strings)| {
            let item = StandardItem::new(*id, strings.first().copied().unwrap_or(*id)).into_ref();
            strings
                .iter()
                .map(move |s| IndexEntry::from((Arc::clone(&item), *s)))
        })
        .collect()
}

/// A temporary directory for test isolation.
///
/// # Example
///
/// ```ignore
/// let workspace = TempWorkspace::new();
/// workspace.create_file("docs/notes.txt", "");
/// assert!(workspace.path().join("docs/notes.txt").exists());
/// ```
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file with the given content; parent directories are created
    /// automatically.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }

    /// Removes a file from this workspace.
    ///
    /// # Panics
    /// Panics if removal fails.
    pub fn remove_file(&self, path: &str) {
        std::fs::remove_file(self.root.join(path))
            .unwrap_or_else(|e| panic!("Failed to remove file '{}': {}", path, e));
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A producer that sleeps for `delay` and returns one entry tagged with its
/// invocation number, so tests can tell which run published a snapshot.
#[allow(dead_code)] // Used by the scheduler tests only
#[derive(Clone)]
pub struct SlowProducer {
    delay: Duration,
    calls: Arc<AtomicUsize>,
    observed_cancel: Arc<Mutex<Vec<bool>>>,
}

#[allow(dead_code)] // Used by the scheduler tests only
impl SlowProducer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: Arc::new(AtomicUsize::new(0)),
            observed_cancel: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// For each finished invocation, whether it saw its cancel flag set.
    pub fn observed_cancel(&self) -> Vec<bool> {
        self.observed_cancel.lock().unwrap().clone()
    }

    /// Sleep in small steps, stopping early once cancelled.
    pub fn produce(&self, cancel: &AtomicBool) -> Vec<IndexEntry> {
        let run = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let step = Duration::from_millis(5);
        let mut waited = Duration::ZERO;
        while waited < self.delay && !cancel.load(Ordering::Relaxed) {
            std::thread::sleep(step);
            waited += step;
        }
        self.observed_cancel
            .lock()
            .unwrap()
            .push(cancel.load(Ordering::Relaxed));

        let name = format!("run-{}", run);
        vec![IndexEntry::new(StandardItem::new(&name, &name).into_ref(), name)]
    }

    pub fn into_producer(self) -> impl Fn(&AtomicBool) -> Vec<IndexEntry> + Send + Sync + 'static {
        move |cancel| self.produce(cancel)
    }
}

/// Applications with keyword aliases, in catalogue order.
#[fixture]
#[allow(dead_code)] // Used across different integration test crates
pub fn launcher_entries() -> Vec<IndexEntry> {
    entries(&[
        ("firefox", &["Firefox", "Web Browser", "Firefox Browser"]),
        ("files", &["Files", "File Manager"]),
        ("code", &["Visual Studio Code", "editor"]),
        ("terminal", &["Terminal", "shell", "console"]),
        ("cafe", &["Café Finder"]),
    ])
}

#[fixture]
#[allow(dead_code)] // Used across different integration test crates
pub fn launcher_handler(launcher_entries: Vec<IndexEntry>) -> IndexQueryHandler {
    let store = Arc::new(SnapshotStore::new());
    store.update(launcher_entries);
    IndexQueryHandler::new(store)
}

#[fixture]
#[allow(dead_code)] // Used across different integration test crates
pub fn temp_workspace() -> TempWorkspace {
    TempWorkspace::new()
}
