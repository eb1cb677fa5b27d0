//! Query-against-target matching.
//!
//! Rules are tried in priority order and the first that applies wins:
//! 1. empty query → 1.0, flagged `is_empty_query`
//! 2. exact equality → 1.0, flagged `is_exact`
//! 3. target starts with query
//! 4. every query word prefixes a distinct target word
//! 5. query is a subsequence of the target (only with `fuzzy`)
//!
//! Everything is compared after normalization (see [`normalize`]).

use super::normalize::normalize;
use super::scoring::{prefix_score, subsequence_score, word_prefix_score};
use super::tokenize::tokenize;
use crate::config::MatchConfig;
use std::cmp::Ordering;

/// Outcome of comparing one query against one or more targets.
///
/// Matches are totally ordered by score, so the best of several can be taken
/// with [`Iterator::max`]. Equal scores are ordered by the flags, a match
/// above a non-match and an exact match above a partial one.
#[derive(Debug, Clone, Copy)]
pub struct Match {
    score: f64,
    is_match: bool,
    is_exact: bool,
    is_empty_query: bool,
}

impl Match {
    pub const fn none() -> Self {
        Self {
            score: 0.0,
            is_match: false,
            is_exact: false,
            is_empty_query: false,
        }
    }

    pub const fn empty_query() -> Self {
        Self {
            score: 1.0,
            is_match: true,
            is_exact: false,
            is_empty_query: true,
        }
    }

    pub const fn exact() -> Self {
        Self {
            score: 1.0,
            is_match: true,
            is_exact: true,
            is_empty_query: false,
        }
    }

    /// A non-exact match; the score is clamped to `[0, 1]`.
    pub fn partial(score: f64) -> Self {
        Self {
            score: score.clamp(0.0, 1.0),
            is_match: true,
            is_exact: false,
            is_empty_query: false,
        }
    }

    pub const fn score(&self) -> f64 {
        self.score
    }

    pub const fn is_match(&self) -> bool {
        self.is_match
    }

    pub const fn is_exact(&self) -> bool {
        self.is_exact
    }

    pub const fn is_empty_query(&self) -> bool {
        self.is_empty_query
    }
}

impl PartialEq for Match {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Match {}

impl PartialOrd for Match {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Match {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(self.is_match.cmp(&other.is_match))
            .then(self.is_exact.cmp(&other.is_exact))
            .then(self.is_empty_query.cmp(&other.is_empty_query))
    }
}

/// A query prepared once and matched against many targets.
#[derive(Debug)]
pub struct Matcher<'c> {
    config: &'c MatchConfig,
    query: String,
    words: Vec<String>,
}

impl<'c> Matcher<'c> {
    pub fn new(query: &str, config: &'c MatchConfig) -> Self {
        let query = normalize(query.trim(), config).into_owned();
        let words = tokenize(&query, config.separator())
            .into_iter()
            .map(str::to_string)
            .collect();

        Self {
            config,
            query,
            words,
        }
    }

    /// The normalized query string.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_empty_query(&self) -> bool {
        self.query.is_empty()
    }

    pub fn match_str(&self, target: &str) -> Match {
        if self.is_empty_query() {
            return Match::empty_query();
        }

        let target = normalize(target, self.config);

        if target.as_ref() == self.query {
            return Match::exact();
        }

        if let Some(score) = prefix_score(&self.query, &target) {
            return Match::partial(score);
        }

        let target_words = tokenize(&target, self.config.separator());
        if let Some(score) =
            word_prefix_score(self.words.as_slice(), &target_words, self.config.ignore_word_order)
        {
            return Match::partial(score);
        }

        if self.config.fuzzy
            && let Some(score) = subsequence_score(&self.query, &target)
        {
            return Match::partial(score);
        }

        Match::none()
    }

    /// Best match across `targets`; the first candidate wins a tie.
    pub fn match_any<I, S>(&self, targets: I) -> Match
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.is_empty_query() {
            return Match::empty_query();
        }

        let mut best = Match::none();
        for target in targets {
            let candidate = self.match_str(target.as_ref());
            if candidate.is_match && (!best.is_match || candidate.score > best.score) {
                best = candidate;
                if best.is_exact {
                    break;
                }
            }
        }
        best
    }
}

/// Match `query` against a single `target`.
pub fn match_str(query: &str, target: &str, config: &MatchConfig) -> Match {
    Matcher::new(query, config).match_str(target)
}

/// Match `query` against several index strings of one item and keep the best.
pub fn match_any<I, S>(query: &str, targets: I, config: &MatchConfig) -> Match
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Matcher::new(query, config).match_any(targets)
}
