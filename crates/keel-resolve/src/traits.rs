//! The block resolution contract.

use keel_types::{Block, BlockId};
use tokio_util::sync::CancellationToken;

use crate::error::ResolveError;

/// Maps an identifier to the [`Block`] it names.
///
/// Each call may perform I/O; no ordering or caching is promised across
/// calls. Implementations must be `Send + Sync` and tolerate concurrent
/// calls for distinct identifiers.
#[async_trait::async_trait]
pub trait BlockResolver: Send + Sync {
    /// Resolve `id`. Returns `Ok(None)` if no such block exists.
    ///
    /// `cancel` is the caller's ambient context. Implementations that wait
    /// on I/O should return [`ResolveError::Cancelled`] once it fires.
    async fn get(
        &self,
        cancel: &CancellationToken,
        id: BlockId,
    ) -> Result<Option<Block>, ResolveError>;
}
