//! A [`BlockResolver`] wrapper that fails lookups for chosen identifiers.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use keel_types::{Block, BlockId};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::ResolveError;
use crate::traits::BlockResolver;

/// Fails every lookup for identifiers in its failure set, and forwards the
/// rest to the wrapped resolver.
///
/// The failure set can be changed at any time, so a test can break a DAG,
/// observe the failure, heal it, and walk again.
pub struct FlakyResolver {
    inner: Arc<dyn BlockResolver>,
    failing: RwLock<HashSet<BlockId>>,
}

impl FlakyResolver {
    /// Wrap `inner` with an empty failure set.
    pub fn new(inner: Arc<dyn BlockResolver>) -> Self {
        Self {
            inner,
            failing: RwLock::new(HashSet::new()),
        }
    }

    /// Make lookups of `id` fail.
    pub fn fail_on(&self, id: BlockId) {
        self.failing.write().expect("lock poisoned").insert(id);
    }

    /// Let lookups of `id` succeed again.
    pub fn heal(&self, id: &BlockId) {
        self.failing.write().expect("lock poisoned").remove(id);
    }

    /// Clear the failure set.
    pub fn heal_all(&self) {
        self.failing.write().expect("lock poisoned").clear();
    }
}

#[async_trait::async_trait]
impl BlockResolver for FlakyResolver {
    async fn get(
        &self,
        cancel: &CancellationToken,
        id: BlockId,
    ) -> Result<Option<Block>, ResolveError> {
        let failing = self.failing.read().expect("lock poisoned").contains(&id);
        if failing {
            warn!(%id, "injected resolution failure");
            return Err(ResolveError::Unavailable {
                id,
                reason: "injected failure".to_string(),
            });
        }
        self.inner.get(cancel, id).await
    }
}
