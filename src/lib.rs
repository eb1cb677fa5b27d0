//! Background-indexed catalogues with launcher-style fuzzy ranking.
//!
//! A [`Catalogue`] rebuilds its entries on a [`BackgroundExecutor`], publishes
//! them as an immutable snapshot, and ranks them against queries with the
//! rules in [`search`].

pub mod catalogue;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod error;
pub mod index;
pub mod registry;
pub mod search;
pub mod sources;
pub mod tracing;
pub mod worker;

pub use catalogue::Catalogue;
pub use config::{EmptyQueryPolicy, MatchConfig, MatchConfigBuilder, Settings};
pub use debounce::DebounceTrigger;
pub use error::{ConfigError, Error, RegistryError, Result};
pub use index::{
    IndexEntry, IndexQueryHandler, Item, ItemRef, RankItem, Snapshot, SnapshotStore,
    StandardItem, Suggestion,
};
pub use registry::{HandlerRegistry, QueryHandler};
pub use search::{Match, Matcher, match_any, match_str};
pub use sources::FileSource;
pub use worker::{BackgroundExecutor, ExecutorOptions, ExecutorState};
