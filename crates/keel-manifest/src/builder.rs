//! Manifest building: a deduplicating pre-order walk of a Merkle DAG.
//!
//! The walk visits the root, then each child link in order, descending into
//! a child's whole subtree before moving on to its next sibling. A visited
//! set keyed by [`BlockId`] makes the walk safe on shared subtrees and on
//! cycles: a link to an already-visited block is skipped without asking the
//! resolver, and its size is not counted again.
//!
//! Two execution strategies produce identical manifests:
//!
//! - **Sequential** (`concurrency == 1`): an explicit stack of pending links,
//!   resolving one block at a time.
//! - **Concurrent** (`concurrency > 1`): identifiers are claimed in the
//!   visited set before their lookup is spawned, at most `concurrency`
//!   lookups run at once, and fetched blocks land in a map. Once every
//!   reachable block is in hand, a pre-order pass over the map (no I/O)
//!   emits the manifest, so completion order never leaks into the output.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use keel_resolve::{BlockResolver, ResolveError};
use keel_types::{Block, BlockId, Link, Manifest};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::config::BuilderConfig;
use crate::error::BuildError;

type Result<T> = std::result::Result<T, BuildError>;

/// Builds [`Manifest`]s by walking a DAG through a [`BlockResolver`].
///
/// The builder holds no per-walk state; one builder can serve any number
/// of concurrent [`build`](Self::build) calls.
pub struct ManifestBuilder {
    resolver: Arc<dyn BlockResolver>,
    config: BuilderConfig,
}

impl ManifestBuilder {
    /// Create a builder with the default (sequential) configuration.
    pub fn new(resolver: Arc<dyn BlockResolver>) -> Self {
        Self {
            resolver,
            config: BuilderConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Walk the DAG below `root` and return its manifest.
    ///
    /// `root` is taken as already resolved; the resolver is only asked for
    /// its descendants. `cancel` is forwarded to every resolver call. Any
    /// failure aborts the walk and no manifest is returned.
    pub async fn build(&self, cancel: &CancellationToken, root: &Block) -> Result<Manifest> {
        self.config.validate()?;

        // Fires on every exit path so lookups still in flight see it.
        let walk_cancel = cancel.child_token();
        let _guard = walk_cancel.clone().drop_guard();

        let walk = self.walk(&walk_cancel, root);
        let result = match self.config.timeout() {
            Some(timeout) => match tokio::time::timeout(timeout, walk).await {
                Ok(result) => result,
                Err(_) => Err(BuildError::DeadlineExceeded { timeout }),
            },
            None => walk.await,
        };

        match &result {
            Ok(manifest) => debug!(
                root = %root.id,
                blocks = manifest.len(),
                total = %manifest.total_size(),
                "built manifest"
            ),
            Err(e) if e.is_cancellation() => {
                debug!(root = %root.id, error = %e, "manifest build stopped");
            }
            Err(e) => warn!(root = %root.id, error = %e, "manifest build failed"),
        }

        result
    }

    async fn walk(&self, cancel: &CancellationToken, root: &Block) -> Result<Manifest> {
        if cancel.is_cancelled() {
            return Err(BuildError::Cancelled);
        }
        self.check_links(root)?;

        if self.config.concurrency > 1 {
            self.walk_concurrent(cancel, root).await
        } else {
            self.walk_sequential(cancel, root).await
        }
    }

    async fn walk_sequential(&self, cancel: &CancellationToken, root: &Block) -> Result<Manifest> {
        // Visited blocks and their declared sizes.
        let mut visited = HashMap::from([(root.id, root.size)]);
        let mut identifiers = vec![root.id];
        let mut sizes = vec![root.size];

        // Children are pushed in reverse so they pop in link order, and the
        // visited check happens at pop time: exactly when a recursive walk
        // would reach the link.
        let mut stack: Vec<Link> = root.links.iter().rev().copied().collect();

        while let Some(link) = stack.pop() {
            if let Some(&size) = visited.get(&link.id) {
                self.check_link_size(link, size)?;
                trace!(id = %link.id, "skipping visited block");
                continue;
            }
            self.check_limit(visited.len() + 1)?;

            let block = self.resolve(cancel, link).await?;
            self.check_link_size(link, block.size)?;
            visited.insert(block.id, block.size);
            identifiers.push(block.id);
            sizes.push(block.size);
            stack.extend(block.links.iter().rev().copied());
        }

        Ok(Manifest::from_parts(identifiers, sizes)?)
    }

    async fn walk_concurrent(&self, cancel: &CancellationToken, root: &Block) -> Result<Manifest> {
        let concurrency = self.config.concurrency;
        let mut claimed = HashSet::from([root.id]);
        let mut pending = VecDeque::new();
        let mut fetched: HashMap<BlockId, Block> = HashMap::new();
        let mut tasks = JoinSet::new();

        self.claim(&root.links, &mut claimed, &mut pending)?;

        loop {
            while tasks.len() < concurrency {
                let Some(link) = pending.pop_front() else {
                    break;
                };
                if cancel.is_cancelled() {
                    return Err(BuildError::Cancelled);
                }

                let resolver = Arc::clone(&self.resolver);
                let token = cancel.clone();
                tasks.spawn(async move {
                    let result = resolver.get(&token, link.id).await;
                    (link, result)
                });
            }

            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(BuildError::Cancelled),
                joined = tasks.join_next() => joined,
            };

            // Nothing in flight and nothing pending: every reachable block is in hand.
            let Some(joined) = joined else {
                break;
            };
            let (link, result) = joined.map_err(|e| BuildError::Task(e.to_string()))?;

            let block = self.accept(cancel, link, result)?;
            self.claim(&block.links, &mut claimed, &mut pending)?;
            fetched.insert(block.id, block);
        }

        trace!(blocks = fetched.len() + 1, "fetched reachable blocks");
        self.order(root, &fetched)
    }

    /// Emit the pre-order manifest from a fully fetched set of blocks.
    ///
    /// Link sizes are checked here rather than at fetch time, so every link
    /// is checked in the same order as the sequential walk.
    fn order(&self, root: &Block, fetched: &HashMap<BlockId, Block>) -> Result<Manifest> {
        let mut visited = HashMap::from([(root.id, root.size)]);
        let mut identifiers = Vec::with_capacity(fetched.len() + 1);
        let mut sizes = Vec::with_capacity(fetched.len() + 1);
        identifiers.push(root.id);
        sizes.push(root.size);

        let mut stack: Vec<Link> = root.links.iter().rev().copied().collect();

        while let Some(link) = stack.pop() {
            if let Some(&size) = visited.get(&link.id) {
                self.check_link_size(link, size)?;
                continue;
            }
            let block = fetched
                .get(&link.id)
                .ok_or(BuildError::NotFound { id: link.id })?;
            self.check_link_size(link, block.size)?;
            visited.insert(block.id, block.size);
            identifiers.push(block.id);
            sizes.push(block.size);
            stack.extend(block.links.iter().rev().copied());
        }

        Ok(Manifest::from_parts(identifiers, sizes)?)
    }

    /// Claim every unclaimed child of a block and queue it for lookup.
    fn claim(
        &self,
        links: &[Link],
        claimed: &mut HashSet<BlockId>,
        pending: &mut VecDeque<Link>,
    ) -> Result<()> {
        for link in links {
            if claimed.insert(link.id) {
                self.check_limit(claimed.len())?;
                pending.push_back(*link);
            } else {
                trace!(id = %link.id, "skipping claimed block");
            }
        }
        Ok(())
    }

    /// Resolve the block behind `link`, racing the lookup against `cancel`.
    async fn resolve(&self, cancel: &CancellationToken, link: Link) -> Result<Block> {
        if cancel.is_cancelled() {
            return Err(BuildError::Cancelled);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BuildError::Cancelled),
            result = self.resolver.get(cancel, link.id) => result,
        };

        self.accept(cancel, link, result)
    }

    /// Turn a resolver answer into a validated block.
    ///
    /// A resolver that reports cancellation while `cancel` is still live has
    /// failed on its own, which is a resolution failure for `link`.
    fn accept(
        &self,
        cancel: &CancellationToken,
        link: Link,
        result: std::result::Result<Option<Block>, ResolveError>,
    ) -> Result<Block> {
        let block = match result {
            Ok(Some(block)) => block,
            Ok(None) => return Err(BuildError::NotFound { id: link.id }),
            Err(ResolveError::Cancelled) if cancel.is_cancelled() => {
                return Err(BuildError::Cancelled);
            }
            Err(source) => {
                return Err(BuildError::Resolve {
                    id: link.id,
                    source,
                });
            }
        };

        if block.id != link.id {
            return Err(BuildError::Malformed {
                id: link.id,
                reason: format!("resolver returned block {}", block.id),
            });
        }

        self.check_links(&block)?;
        trace!(id = %block.id, size = block.size, links = block.links.len(), "resolved block");
        Ok(block)
    }

    fn check_links(&self, block: &Block) -> Result<()> {
        if !self.config.reject_duplicate_links {
            return Ok(());
        }

        let mut seen = HashSet::with_capacity(block.links.len());
        for link in &block.links {
            if !seen.insert(link.id) {
                return Err(BuildError::Malformed {
                    id: block.id,
                    reason: format!("duplicate link to {}", link.id),
                });
            }
        }
        Ok(())
    }

    /// With `verify_link_sizes`, every link must agree with the declared
    /// size of the block it points at, including links to visited blocks.
    fn check_link_size(&self, link: Link, size: u64) -> Result<()> {
        if self.config.verify_link_sizes && size != link.size {
            return Err(BuildError::Malformed {
                id: link.id,
                reason: format!(
                    "declared size {size} does not match link size {}",
                    link.size
                ),
            });
        }
        Ok(())
    }

    fn check_limit(&self, blocks: usize) -> Result<()> {
        match self.config.max_blocks {
            Some(limit) if blocks > limit => Err(BuildError::TooManyBlocks { limit }),
            _ => Ok(()),
        }
    }
}

/// Build a manifest with the default sequential configuration.
pub async fn build_manifest(
    cancel: &CancellationToken,
    resolver: Arc<dyn BlockResolver>,
    root: &Block,
) -> Result<Manifest> {
    ManifestBuilder::new(resolver).build(cancel, root).await
}
