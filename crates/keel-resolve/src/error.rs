//! Error types for block resolution.

use keel_types::BlockId;

/// Errors a [`BlockResolver`](crate::BlockResolver) can report.
///
/// A block that simply does not exist is not an error: resolvers return
/// `Ok(None)` for it.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// An I/O error occurred while reading the block.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend could not serve the block right now.
    #[error("block {id} unavailable: {reason}")]
    Unavailable {
        /// The identifier that was requested.
        id: BlockId,
        /// Backend-specific description of the failure.
        reason: String,
    },

    /// The caller's cancellation token fired during the lookup.
    #[error("resolution cancelled")]
    Cancelled,
}
