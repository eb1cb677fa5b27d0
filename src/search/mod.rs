//! Fuzzy text matching for catalogue queries.
//!
//! This module provides normalization, word splitting, scoring rules and the
//! [`Matcher`] that combines them into a single ranked [`Match`].

pub(crate) mod matcher;
pub(crate) mod normalize;
pub(crate) mod scoring;
pub(crate) mod tokenize;

pub use matcher::{Match, Matcher, match_any, match_str};
pub use normalize::{normalize, strip_diacritics};
pub use scoring::WORD_MATCH_SCALE;
pub use tokenize::tokenize;
