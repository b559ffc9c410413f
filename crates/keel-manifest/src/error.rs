//! Error types for manifest building, encoding, and configuration.

use std::time::Duration;

use keel_resolve::ResolveError;
use keel_types::{BlockId, ManifestError};

/// Errors that abort a manifest build.
///
/// No build error comes with a partial manifest.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The resolver has no block for a reachable identifier.
    #[error("block not found: {id}")]
    NotFound {
        /// The identifier that could not be resolved.
        id: BlockId,
    },

    /// The resolver failed while looking up a reachable identifier.
    #[error("failed to resolve block {id}: {source}")]
    Resolve {
        /// The identifier being resolved.
        id: BlockId,
        /// The resolver's error.
        #[source]
        source: ResolveError,
    },

    /// The caller's cancellation token fired.
    #[error("manifest build cancelled")]
    Cancelled,

    /// The configured walk timeout elapsed.
    #[error("manifest build exceeded its deadline of {timeout:?}")]
    DeadlineExceeded {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// A resolved block is internally inconsistent.
    #[error("malformed block {id}: {reason}")]
    Malformed {
        /// The identifier that was requested.
        id: BlockId,
        /// What was wrong with the block.
        reason: String,
    },

    /// More distinct blocks are reachable than the configured limit allows.
    #[error("manifest exceeds the limit of {limit} blocks")]
    TooManyBlocks {
        /// The configured limit.
        limit: usize,
    },

    /// The collected entries violate a manifest invariant.
    #[error("invalid manifest: {0}")]
    Manifest(#[from] ManifestError),

    /// The builder configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A concurrent lookup task panicked or was aborted.
    #[error("resolver task failed: {0}")]
    Task(String),
}

impl BuildError {
    /// Whether the DAG could not be resolved (missing or unreadable block).
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Resolve { .. })
    }

    /// Whether the caller gave up (cancellation or deadline).
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded { .. })
    }

    /// The block identifier the error is about, if any.
    pub fn block_id(&self) -> Option<BlockId> {
        match self {
            Self::NotFound { id } | Self::Resolve { id, .. } | Self::Malformed { id, .. } => {
                Some(*id)
            }
            _ => None,
        }
    }
}

/// Errors that can occur while encoding or decoding manifests.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Encoded manifest has an unsupported format version.
    #[error("unsupported manifest format version {found}, this build supports version {supported}")]
    UnsupportedVersion {
        /// Version found in the input.
        found: u8,
        /// Version this build supports.
        supported: u8,
    },
}

impl From<postcard::Error> for CodecError {
    fn from(e: postcard::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_cbor::Error> for CodecError {
    fn from(e: serde_cbor::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Errors loading or validating a [`BuilderConfig`](crate::BuilderConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
