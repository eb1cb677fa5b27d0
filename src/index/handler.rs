//! Query handling over the current catalogue snapshot.

use super::{IndexEntry, ItemRef, RankItem, SnapshotStore};
use crate::config::{EmptyQueryPolicy, MatchConfig, Settings};
use crate::search::{Matcher, normalize};
use ahash::{AHashMap, AHashSet};
use rapidfuzz::distance::jaro_winkler;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.8;

/// A close spelling of the query found in the catalogue.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub text: String,
    pub item: ItemRef,
    /// Similarity in `[0, 1]`, higher is closer.
    pub score: f64,
}

/// Scores and ranks the entries of a [`SnapshotStore`].
#[derive(Debug)]
pub struct IndexQueryHandler {
    store: Arc<SnapshotStore>,
    empty_query: EmptyQueryPolicy,
    max_results: Option<usize>,
    trigger: Option<String>,
}

impl IndexQueryHandler {
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self {
            store,
            empty_query: EmptyQueryPolicy::default(),
            max_results: None,
            trigger: None,
        }
    }

    /// Handler configured from the index section of `settings`.
    pub fn from_settings(store: Arc<SnapshotStore>, settings: &Settings) -> Self {
        Self {
            store,
            empty_query: settings.empty_query,
            max_results: settings.max_results,
            trigger: settings.trigger.clone(),
        }
    }

    #[must_use]
    pub const fn with_empty_query(mut self, policy: EmptyQueryPolicy) -> Self {
        self.empty_query = policy;
        self
    }

    #[must_use]
    pub const fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into()).filter(|t| !t.is_empty());
        self
    }

    pub const fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub const fn empty_query_policy(&self) -> EmptyQueryPolicy {
        self.empty_query
    }

    pub fn trigger(&self) -> Option<&str> {
        self.trigger.as_deref()
    }

    /// Replace the catalogue. Queries already running keep the old snapshot.
    pub fn update_snapshot(&self, entries: Vec<IndexEntry>) {
        self.store.update(entries);
    }

    /// Rank the items of the current snapshot against `input`.
    ///
    /// Each item appears at most once, with the best score of its entries.
    /// Equal scores keep snapshot order.
    pub fn query(&self, input: &str, config: &MatchConfig) -> Vec<RankItem> {
        let matcher = Matcher::new(input, config);
        if matcher.is_empty_query() && self.empty_query == EmptyQueryPolicy::MatchNone {
            return Vec::new();
        }

        let snapshot = self.store.snapshot();
        let mut ranked: Vec<RankItem> = Vec::new();
        let mut positions: AHashMap<&str, usize> = AHashMap::new();

        for entry in snapshot.entries() {
            let m = matcher.match_str(entry.string());
            if !m.is_match() {
                continue;
            }

            match positions.entry(entry.item().id()) {
                Entry::Occupied(slot) => {
                    let rank = &mut ranked[*slot.get()];
                    if m.score() > rank.score {
                        rank.score = m.score();
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(ranked.len());
                    ranked.push(RankItem::new(Arc::clone(entry.item()), m.score()));
                }
            }
        }

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        if let Some(max) = self.max_results {
            ranked.truncate(max);
        }

        tracing::trace!(
            "Query '{}' matched {} items in snapshot generation {}",
            input,
            ranked.len(),
            snapshot.generation()
        );
        ranked
    }

    /// Query scoped by this handler's trigger keyword.
    ///
    /// Returns `None` when no trigger is set or `input` does not start with it;
    /// otherwise the trigger is stripped and the rest is queried.
    pub fn trigger_query(&self, input: &str, config: &MatchConfig) -> Option<Vec<RankItem>> {
        let rest = input.strip_prefix(self.trigger.as_deref()?)?;
        Some(self.query(rest, config))
    }

    /// Entry strings spelled similarly to `input`, closest first.
    ///
    /// Intended for the "no results" case, where a typo keeps every matching
    /// rule from applying. Both sides are case and diacritic folded like a
    /// default query.
    pub fn suggest(&self, input: &str, limit: usize) -> Vec<Suggestion> {
        let config = MatchConfig::default();
        let query = normalize(input.trim(), &config);
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let snapshot = self.store.snapshot();
        let mut seen: AHashSet<&str> = AHashSet::new();
        let mut suggestions: Vec<Suggestion> = snapshot
            .entries()
            .iter()
            .filter(|entry| seen.insert(entry.string()))
            .filter_map(|entry| {
                let score = jaro_winkler::similarity(
                    query.chars(),
                    normalize(entry.string(), &config).chars(),
                );
                (score > SUGGESTION_THRESHOLD).then(|| Suggestion {
                    text: entry.string().to_string(),
                    item: Arc::clone(entry.item()),
                    score,
                })
            })
            .collect();

        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        suggestions.truncate(limit);
        suggestions
    }
}
