//! Builder configuration, loadable from TOML.
//!
//! Every field has a default, so an empty file (or no file) yields the
//! sequential, non-validating walk:
//!
//! ```toml
//! concurrency = 16
//! verify_link_sizes = true
//! max_blocks = 1000000
//! timeout_ms = 30000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Tuning and validation knobs for [`ManifestBuilder`](crate::ManifestBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    /// Maximum resolver calls in flight. `1` walks sequentially.
    pub concurrency: usize,
    /// Reject a block whose size differs from the size its parent's link declares.
    pub verify_link_sizes: bool,
    /// Reject a block that links to the same child more than once.
    pub reject_duplicate_links: bool,
    /// Abort once more distinct blocks than this are reachable.
    pub max_blocks: Option<usize>,
    /// Deadline for the whole walk, in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            verify_link_sizes: false,
            reject_duplicate_links: false,
            max_blocks: None,
            timeout_ms: None,
        }
    }
}

impl BuilderConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_blocks == Some(0) {
            return Err(ConfigError::Invalid(
                "max_blocks must be at least 1 (the root)".to_string(),
            ));
        }
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective walk deadline.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Set the number of concurrent resolver calls.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Enable or disable link-size verification.
    pub fn with_verify_link_sizes(mut self, verify: bool) -> Self {
        self.verify_link_sizes = verify;
        self
    }

    /// Enable or disable rejection of duplicate links within one block.
    pub fn with_reject_duplicate_links(mut self, reject: bool) -> Self {
        self.reject_duplicate_links = reject;
        self
    }

    /// Limit the number of distinct blocks.
    pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = Some(max_blocks);
        self
    }

    /// Bound the whole walk by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }
}
