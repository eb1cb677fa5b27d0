//! Matching and indexing configuration.
//!
//! [`MatchConfig`] is the value type handed to every match call. [`Settings`]
//! bundles it with the per-catalogue knobs and can be loaded from TOML:
//!
//! ```toml
//! [match]
//! fuzzy = true
//! separator = "[\\s_-]+"
//!
//! [index]
//! debounce_secs = 30
//! rescan_secs = 900
//! max_results = 50
//! empty_query = "match-all"
//! trigger = "snip "
//! ```

use crate::error::{ConfigError, Error};
use crate::sources::expand_tilde;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// Runs of anything that is not a letter or a digit.
pub const DEFAULT_SEPARATOR: &str = r"[^\p{L}\p{N}]+";

/// Delay between the last change notification and the rebuild it triggers.
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_secs(60);

static DEFAULT_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_SEPARATOR).expect("default separator is a valid regex"));

/// Options controlling how a query is compared against a target string.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Fall back to subsequence matching when no prefix rule applies.
    pub fuzzy: bool,
    pub ignore_case: bool,
    /// Match query words against target words regardless of their order.
    pub ignore_word_order: bool,
    /// Compare base letters only ("é" matches "e").
    pub ignore_diacritics: bool,
    separator: Regex,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            fuzzy: false,
            ignore_case: true,
            ignore_word_order: true,
            ignore_diacritics: true,
            separator: DEFAULT_SEPARATOR_RE.clone(),
        }
    }
}

impl MatchConfig {
    pub fn builder() -> MatchConfigBuilder {
        MatchConfigBuilder::default()
    }

    /// Default configuration with fuzzy matching switched on.
    pub fn fuzzy() -> Self {
        Self {
            fuzzy: true,
            ..Self::default()
        }
    }

    /// The compiled word separator.
    pub fn separator(&self) -> &Regex {
        &self.separator
    }
}

/// Builder for [`MatchConfig`]; the separator pattern is validated in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct MatchConfigBuilder {
    fuzzy: bool,
    ignore_case: bool,
    ignore_word_order: bool,
    ignore_diacritics: bool,
    separator: Option<String>,
}

impl Default for MatchConfigBuilder {
    fn default() -> Self {
        let defaults = MatchConfig::default();
        Self {
            fuzzy: defaults.fuzzy,
            ignore_case: defaults.ignore_case,
            ignore_word_order: defaults.ignore_word_order,
            ignore_diacritics: defaults.ignore_diacritics,
            separator: None,
        }
    }
}

impl MatchConfigBuilder {
    pub const fn fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub const fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub const fn ignore_word_order(mut self, ignore_word_order: bool) -> Self {
        self.ignore_word_order = ignore_word_order;
        self
    }

    pub const fn ignore_diacritics(mut self, ignore_diacritics: bool) -> Self {
        self.ignore_diacritics = ignore_diacritics;
        self
    }

    pub fn separator(mut self, pattern: impl Into<String>) -> Self {
        self.separator = Some(pattern.into());
        self
    }

    pub fn build(self) -> Result<MatchConfig, ConfigError> {
        let separator = match self.separator {
            Some(pattern) => compile_separator(&pattern)?,
            None => DEFAULT_SEPARATOR_RE.clone(),
        };

        Ok(MatchConfig {
            fuzzy: self.fuzzy,
            ignore_case: self.ignore_case,
            ignore_word_order: self.ignore_word_order,
            ignore_diacritics: self.ignore_diacritics,
            separator,
        })
    }
}

fn compile_separator(pattern: &str) -> Result<Regex, ConfigError> {
    let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidSeparator {
        pattern: pattern.to_string(),
        source,
    })?;
    if regex.is_match("") {
        return Err(ConfigError::EmptySeparator(pattern.to_string()));
    }
    Ok(regex)
}

/// What a query handler returns for an empty (or whitespace-only) query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyQueryPolicy {
    /// List every item in the catalogue.
    MatchAll,
    /// Return no results until the user types something.
    #[default]
    MatchNone,
}

/// Per-catalogue settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub match_config: MatchConfig,
    pub debounce_delay: Duration,
    /// Rebuild on a fixed period as well as on request. `None` disables it.
    pub rescan_interval: Option<Duration>,
    pub max_results: Option<usize>,
    pub empty_query: EmptyQueryPolicy,
    /// Keyword prefix scoping trigger queries to this catalogue, e.g. `"snip "`.
    pub trigger: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            match_config: MatchConfig::default(),
            debounce_delay: DEFAULT_DEBOUNCE_DELAY,
            rescan_interval: None,
            max_results: None,
            empty_query: EmptyQueryPolicy::default(),
            trigger: None,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings = toml::from_str(input)?;
        raw.try_into()
    }

    /// Read settings from a TOML file, expanding a leading `~`.
    pub fn from_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = expand_tilde(path.as_ref());
        let input = std::fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&input)?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSettings {
    #[serde(rename = "match")]
    matching: RawMatch,
    index: RawIndex,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawMatch {
    fuzzy: bool,
    ignore_case: bool,
    ignore_word_order: bool,
    ignore_diacritics: bool,
    separator: Option<String>,
}

impl Default for RawMatch {
    fn default() -> Self {
        let defaults = MatchConfig::default();
        Self {
            fuzzy: defaults.fuzzy,
            ignore_case: defaults.ignore_case,
            ignore_word_order: defaults.ignore_word_order,
            ignore_diacritics: defaults.ignore_diacritics,
            separator: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawIndex {
    debounce_secs: u64,
    /// Seconds between periodic rescans; 0 disables them.
    rescan_secs: u64,
    max_results: Option<usize>,
    empty_query: EmptyQueryPolicy,
    trigger: Option<String>,
}

impl Default for RawIndex {
    fn default() -> Self {
        Self {
            debounce_secs: DEFAULT_DEBOUNCE_DELAY.as_secs(),
            rescan_secs: 0,
            max_results: None,
            empty_query: EmptyQueryPolicy::default(),
            trigger: None,
        }
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = ConfigError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        let mut builder = MatchConfig::builder()
            .fuzzy(raw.matching.fuzzy)
            .ignore_case(raw.matching.ignore_case)
            .ignore_word_order(raw.matching.ignore_word_order)
            .ignore_diacritics(raw.matching.ignore_diacritics);
        if let Some(pattern) = raw.matching.separator {
            builder = builder.separator(pattern);
        }

        Ok(Self {
            match_config: builder.build()?,
            debounce_delay: Duration::from_secs(raw.index.debounce_secs),
            rescan_interval: (raw.index.rescan_secs > 0)
                .then(|| Duration::from_secs(raw.index.rescan_secs)),
            max_results: raw.index.max_results,
            empty_query: raw.index.empty_query,
            trigger: raw.index.trigger.filter(|t| !t.is_empty()),
        })
    }
}
