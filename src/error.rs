//! Error handling types and utilities.

/// A specialized Result type for catalogue-index operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error raised while building a [`MatchConfig`](crate::MatchConfig) or [`Settings`](crate::Settings).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The separator pattern used for word splitting does not compile.
    #[error("invalid separator pattern '{pattern}': {source}")]
    InvalidSeparator {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// The separator pattern matches the empty string, which would split every character.
    #[error("separator pattern '{0}' matches the empty string")]
    EmptySeparator(String),
    /// The settings document is not valid TOML or has the wrong shape.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Error returned when registering query handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("a handler with id '{0}' is already registered")]
    DuplicateHandler(String),
    #[error("handler id must not be empty")]
    EmptyId,
}

/// Umbrella error for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("failed to read '{path}': {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
