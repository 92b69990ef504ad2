//! Engine configuration.
//!
//! All knobs consumed by the explorer, the generators, and the applicator live
//! in one serde-derived struct so a run can be pinned down by a small TOML
//! file. Every field has a default; absent fields take it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path-exploration budget: maximum accumulated move cost from a pivot
    /// occurrence to a value leaf.
    pub max_distance: u32,
    /// Consecutive occurrences of one pivot allowed to contribute no new
    /// locator before the remaining occurrences are abandoned.
    pub occurrence_patience: u32,
    /// Maximum length (chars, after trimming) for a text leaf to count as an
    /// extractable value.
    pub max_value_len: usize,
    /// Minimum length (chars, after trimming) for a text to count as a
    /// template token.
    pub min_token_len: usize,
    /// Maximum length (chars, after trimming) for a text to count as a
    /// template token.
    pub max_token_len: usize,
    /// Worker-pool size for rule application; 0 means available hardware
    /// parallelism.
    pub workers: usize,
    /// Overall timeout for one rule-application batch, in milliseconds.
    pub apply_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_distance: 5,
            occurrence_patience: 3,
            max_value_len: 80,
            min_token_len: 3,
            max_token_len: 40,
            workers: 0,
            apply_timeout_ms: 30_000,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check cross-field consistency. Called by the loaders; call it directly
    /// when building a config in code.
    pub fn validate(&self) -> Result<()> {
        if self.max_distance == 0 {
            return Err(Error::Config("max_distance must be at least 1".into()));
        }
        if self.occurrence_patience == 0 {
            return Err(Error::Config("occurrence_patience must be at least 1".into()));
        }
        if self.min_token_len == 0 {
            return Err(Error::Config("min_token_len must be at least 1".into()));
        }
        if self.min_token_len > self.max_token_len {
            return Err(Error::Config(format!(
                "min_token_len ({}) exceeds max_token_len ({})",
                self.min_token_len, self.max_token_len
            )));
        }
        if self.apply_timeout_ms == 0 {
            return Err(Error::Config("apply_timeout_ms must be at least 1".into()));
        }
        Ok(())
    }

    /// The apply timeout as a `Duration`.
    pub fn apply_timeout(&self) -> Duration {
        Duration::from_millis(self.apply_timeout_ms)
    }

    /// Resolved worker count: the configured value, or available hardware
    /// parallelism when 0.
    pub fn resolved_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        }
    }
}
