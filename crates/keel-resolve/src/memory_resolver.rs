//! In-memory block resolver.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use keel_types::{Block, BlockId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::ResolveError;
use crate::traits::BlockResolver;

/// In-memory resolver backed by a `RwLock<HashMap>`.
///
/// Useful for testing and for callers that already hold the whole DAG in
/// memory. Every `get` is recorded so tests can assert which identifiers
/// a walk asked for, and how often.
#[derive(Default)]
pub struct MemoryResolver {
    blocks: RwLock<HashMap<BlockId, Block>>,
    calls: Mutex<HashMap<BlockId, usize>>,
}

impl MemoryResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver holding `blocks`.
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let resolver = Self::new();
        resolver.insert_all(blocks);
        resolver
    }

    /// Add or replace a block.
    pub fn insert(&self, block: Block) {
        let mut map = self.blocks.write().expect("lock poisoned");
        debug!(id = %block.id, size = block.size, links = block.links.len(), "storing block in memory");
        map.insert(block.id, block);
    }

    /// Add or replace many blocks.
    pub fn insert_all(&self, blocks: impl IntoIterator<Item = Block>) {
        let mut map = self.blocks.write().expect("lock poisoned");
        for block in blocks {
            map.insert(block.id, block);
        }
    }

    /// Remove a block, returning it if it was present.
    pub fn remove(&self, id: &BlockId) -> Option<Block> {
        let mut map = self.blocks.write().expect("lock poisoned");
        map.remove(id)
    }

    /// Number of blocks held.
    pub fn len(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    /// Whether no blocks are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of `get` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.lock().expect("lock poisoned").values().sum()
    }

    /// Number of `get` calls made for `id`.
    pub fn calls_for(&self, id: &BlockId) -> usize {
        self.calls
            .lock()
            .expect("lock poisoned")
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    /// Forget all recorded calls.
    pub fn reset_calls(&self) {
        self.calls.lock().expect("lock poisoned").clear();
    }
}

#[async_trait::async_trait]
impl BlockResolver for MemoryResolver {
    async fn get(
        &self,
        cancel: &CancellationToken,
        id: BlockId,
    ) -> Result<Option<Block>, ResolveError> {
        *self
            .calls
            .lock()
            .expect("lock poisoned")
            .entry(id)
            .or_default() += 1;

        if cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        let map = self.blocks.read().expect("lock poisoned");
        let block = map.get(&id).cloned();
        trace!(%id, found = block.is_some(), "memory lookup");
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use keel_types::Link;

    use super::*;

    fn leaf(name: &str, size: u64) -> Block {
        Block::leaf(BlockId::from_data(name.as_bytes()), size)
    }

    #[tokio::test]
    async fn test_insert_get_roundtrip() {
        let resolver = MemoryResolver::new();
        let block = Block::new(
            BlockId::from_data(b"parent"),
            100,
            vec![Link::new(BlockId::from_data(b"child"), 10)],
        );
        resolver.insert(block.clone());

        let got = resolver
            .get(&CancellationToken::new(), block.id)
            .await
            .unwrap();
        assert_eq!(got, Some(block));
    }

    #[tokio::test]
    async fn test_get_nonexistent_returns_none() {
        let resolver = MemoryResolver::new();
        let got = resolver
            .get(&CancellationToken::new(), BlockId::from_data(b"missing"))
            .await
            .unwrap();
        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn test_calls_are_counted_per_id() {
        let a = leaf("a", 1);
        let b = leaf("b", 2);
        let resolver = MemoryResolver::from_blocks([a.clone(), b.clone()]);
        let cancel = CancellationToken::new();

        resolver.get(&cancel, a.id).await.unwrap();
        resolver.get(&cancel, a.id).await.unwrap();
        resolver.get(&cancel, b.id).await.unwrap();

        assert_eq!(resolver.calls(), 3);
        assert_eq!(resolver.calls_for(&a.id), 2);
        assert_eq!(resolver.calls_for(&b.id), 1);

        resolver.reset_calls();
        assert_eq!(resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_token_is_honored() {
        let a = leaf("a", 1);
        let resolver = MemoryResolver::from_blocks([a.clone()]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = resolver.get(&cancel, a.id).await.unwrap_err();
        assert!(matches!(err, ResolveError::Cancelled));
    }

    #[test]
    fn test_remove_and_len() {
        let a = leaf("a", 1);
        let resolver = MemoryResolver::from_blocks([a.clone(), leaf("b", 2)]);
        assert_eq!(resolver.len(), 2);

        assert_eq!(resolver.remove(&a.id), Some(a));
        assert_eq!(resolver.len(), 1);
        assert!(!resolver.is_empty());
    }
}
