//! Crate error type.

use std::time::Duration;

/// Errors surfaced by the induction and application layers.
///
/// The XPath engine keeps its internal `Result<_, String>` convention; strings
/// crossing a module boundary are wrapped into [`Error::Locator`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A sample or target document could not be parsed into a tree.
    #[error("document {index} failed to parse: {message}")]
    Parse { index: usize, message: String },

    /// A locator failed to compile or evaluate.
    #[error("locator error: {0}")]
    Locator(String),

    /// A configuration field failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Configuration file could not be deserialized.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// A rule-application task failed; the whole batch is aborted.
    #[error("rule application worker failed: {0}")]
    Worker(String),

    /// Rule application exceeded the configured overall timeout.
    #[error("rule application timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, Error>;
