//! Catalogue data model: items, index entries, snapshots and ranked results.

pub(crate) mod handler;
pub(crate) mod store;

pub use handler::{IndexQueryHandler, SUGGESTION_THRESHOLD, Suggestion};
pub use store::SnapshotStore;

use std::fmt::Debug;
use std::sync::Arc;

/// A displayable entity owned by a data source.
///
/// The index only relies on [`id`](Item::id) for identity; the other accessors
/// exist for presentation.
pub trait Item: Send + Sync + Debug {
    /// Stable identifier, unique within one catalogue.
    fn id(&self) -> &str;

    fn text(&self) -> &str {
        self.id()
    }

    fn subtext(&self) -> &str {
        ""
    }
}

/// Shared handle to an item; entries and data sources hold it jointly.
pub type ItemRef = Arc<dyn Item>;

/// A plain item with an id, a title and a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardItem {
    id: String,
    text: String,
    subtext: String,
}

impl StandardItem {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            subtext: String::new(),
        }
    }

    #[must_use]
    pub fn with_subtext(mut self, subtext: impl Into<String>) -> Self {
        self.subtext = subtext.into();
        self
    }

    /// Wrap into a shared [`ItemRef`].
    pub fn into_ref(self) -> ItemRef {
        Arc::new(self)
    }
}

impl Item for StandardItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn subtext(&self) -> &str {
        &self.subtext
    }
}

/// One searchable string pointing at an item. An item may own several entries.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    item: ItemRef,
    string: String,
}

impl IndexEntry {
    pub fn new(item: ItemRef, string: impl Into<String>) -> Self {
        Self {
            item,
            string: string.into(),
        }
    }

    pub fn item(&self) -> &ItemRef {
        &self.item
    }

    pub fn string(&self) -> &str {
        &self.string
    }
}

impl<S: Into<String>> From<(ItemRef, S)> for IndexEntry {
    fn from((item, string): (ItemRef, S)) -> Self {
        Self::new(item, string)
    }
}

/// An immutable, published version of a catalogue.
#[derive(Debug, Default)]
pub struct Snapshot {
    entries: Vec<IndexEntry>,
    generation: u64,
}

impl Snapshot {
    pub(crate) const fn new(entries: Vec<IndexEntry>, generation: u64) -> Self {
        Self {
            entries,
            generation,
        }
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of updates published before this snapshot; 0 is the initial empty one.
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// An item with its aggregated relevance for one query.
#[derive(Debug, Clone)]
pub struct RankItem {
    pub item: ItemRef,
    pub score: f64,
}

impl RankItem {
    pub const fn new(item: ItemRef, score: f64) -> Self {
        Self { item, score }
    }
}
