//! Dispatch of queries across several catalogues.

use crate::config::MatchConfig;
use crate::error::RegistryError;
use crate::index::RankItem;
use std::fmt;
use std::sync::Arc;

/// Anything that can answer a query with ranked items.
pub trait QueryHandler: Send + Sync {
    /// Unique, non-empty identifier.
    fn id(&self) -> &str;

    /// Keyword that scopes a query to this handler, e.g. `"snip "`.
    fn trigger(&self) -> Option<&str> {
        None
    }

    fn handle_global_query(&self, query: &str, config: &MatchConfig) -> Vec<RankItem>;
}

/// Ordered set of [`QueryHandler`]s with unique ids.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn QueryHandler>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|h| h.id()))
            .finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn QueryHandler>) -> Result<(), RegistryError> {
        let id = handler.id();
        if id.is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.get(id).is_some() {
            return Err(RegistryError::DuplicateHandler(id.to_string()));
        }

        tracing::debug!("Registered query handler '{}'", id);
        self.handlers.push(handler);
        Ok(())
    }

    /// Remove a handler, returning it if it was registered.
    pub fn unregister(&mut self, id: &str) -> Option<Arc<dyn QueryHandler>> {
        let position = self.handlers.iter().position(|h| h.id() == id)?;
        Some(self.handlers.remove(position))
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn QueryHandler>> {
        self.handlers.iter().find(|h| h.id() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|h| h.id())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Ask every handler and merge the results by descending score.
    ///
    /// Ties keep registration order, then each handler's own order.
    pub fn global_query(&self, query: &str, config: &MatchConfig) -> Vec<RankItem> {
        let mut merged: Vec<RankItem> = self
            .handlers
            .iter()
            .flat_map(|h| h.handle_global_query(query, config))
            .collect();
        merged.sort_by(|a, b| b.score.total_cmp(&a.score));
        merged
    }

    /// Route `input` to the first handler whose trigger prefixes it.
    ///
    /// Returns the handler id and its results for the input with the trigger
    /// removed, or `None` when no trigger applies.
    pub fn trigger_query(&self, input: &str, config: &MatchConfig) -> Option<(&str, Vec<RankItem>)> {
        self.handlers.iter().find_map(|h| {
            let rest = input.strip_prefix(h.trigger()?)?;
            Some((h.id(), h.handle_global_query(rest, config)))
        })
    }
}
