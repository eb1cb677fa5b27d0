//! Atomically replaceable catalogue snapshot.

use super::{IndexEntry, Snapshot};
use std::sync::{Arc, PoisonError, RwLock};

/// Holds the current [`Snapshot`].
///
/// Readers clone the `Arc` under a short read lock and then work on their own
/// reference, so a concurrent [`update`](Self::update) never exposes a
/// half-built catalogue. Replacing is a pointer swap, not a copy.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot current at the time of the call.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Publish `entries` as the new current snapshot and return it.
    pub fn update(&self, entries: Vec<IndexEntry>) -> Arc<Snapshot> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let snapshot = Arc::new(Snapshot::new(entries, current.generation() + 1));
        *current = Arc::clone(&snapshot);
        drop(current);

        tracing::debug!(
            "Published snapshot generation {} with {} entries",
            snapshot.generation(),
            snapshot.len()
        );
        snapshot
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::StandardItem;
    use assert2::check;

    fn entries(names: &[&str]) -> Vec<IndexEntry> {
        names
            .iter()
            .map(|name| IndexEntry::new(StandardItem::new(*name, *name).into_ref(), *name))
            .collect()
    }

    #[test]
    fn test_starts_empty() {
        let store = SnapshotStore::new();
        check!(store.snapshot().is_empty());
        check!(store.generation() == 0);
    }

    #[test]
    fn test_update_replaces_wholesale() {
        let store = SnapshotStore::new();
        store.update(entries(&["a", "b", "c"]));
        store.update(entries(&["d"]));

        let snapshot = store.snapshot();
        check!(snapshot.len() == 1);
        check!(snapshot.entries()[0].string() == "d");
        check!(snapshot.generation() == 2);
    }

    #[test]
    fn test_held_snapshot_unaffected_by_update() {
        let store = SnapshotStore::new();
        store.update(entries(&["old"]));
        let held = store.snapshot();

        store.update(entries(&["new", "newer"]));

        check!(held.len() == 1);
        check!(held.entries()[0].string() == "old");
        check!(store.snapshot().len() == 2);
    }
}
