//! Shared DAG fixtures for keel-manifest tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use keel_resolve::MemoryResolver;
use keel_types::{Block, BlockId, Link};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

pub const KB: u64 = 1_000;

/// Route `tracing` output to the test harness. Honors `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Identifier for a named fixture block.
pub fn id(name: &str) -> BlockId {
    BlockId::from_data(name.as_bytes())
}

/// A named block linking to `children` in order, declaring their own sizes.
pub fn node(name: &str, size: u64, children: &[&Block]) -> Block {
    Block::new(id(name), size, children.iter().map(|c| c.as_link()).collect())
}

/// A DAG held in a [`MemoryResolver`], with its root in hand.
pub struct Dag {
    pub root: Block,
    pub resolver: Arc<MemoryResolver>,
    pub blocks: HashMap<BlockId, Block>,
}

impl Dag {
    /// Store every block (the root included) in a fresh resolver.
    pub fn new(root: Block, blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut map: HashMap<BlockId, Block> = blocks.into_iter().map(|b| (b.id, b)).collect();
        map.insert(root.id, root.clone());
        let resolver = Arc::new(MemoryResolver::from_blocks(map.values().cloned()));
        Self {
            root,
            resolver,
            blocks: map,
        }
    }

    /// Manifest entries computed by a plain recursive pre-order walk.
    pub fn expected(&self) -> (Vec<BlockId>, Vec<u64>) {
        fn visit(
            block: &Block,
            blocks: &HashMap<BlockId, Block>,
            seen: &mut HashSet<BlockId>,
            out: &mut (Vec<BlockId>, Vec<u64>),
        ) {
            if !seen.insert(block.id) {
                return;
            }
            out.0.push(block.id);
            out.1.push(block.size);
            for link in &block.links {
                if let Some(child) = blocks.get(&link.id) {
                    visit(child, blocks, seen, out);
                }
            }
        }

        let mut out = (Vec::new(), Vec::new());
        visit(&self.root, &self.blocks, &mut HashSet::new(), &mut out);
        out
    }
}

/// A tree with `layers[i].0` children of size `layers[i].1` under every
/// node of depth `i`. Identifiers are `layer-{n}` with `n` in pre-order.
pub fn layered(root_size: u64, layers: &[(usize, u64)]) -> Dag {
    fn grow(
        size: u64,
        layers: &[(usize, u64)],
        counter: &mut usize,
        out: &mut Vec<Block>,
    ) -> Block {
        let block_id = id(&format!("layer-{counter}"));
        *counter += 1;

        let links = match layers.split_first() {
            Some((&(children, child_size), rest)) => (0..children)
                .map(|_| grow(child_size, rest, counter, out).as_link())
                .collect(),
            None => Vec::new(),
        };

        let block = Block::new(block_id, size, links);
        out.push(block.clone());
        block
    }

    let mut counter = 0;
    let mut blocks = Vec::new();
    let root = grow(root_size, layers, &mut counter, &mut blocks);
    Dag::new(root, blocks)
}

/// Identifier of the `n`-th block (pre-order) of a [`layered`] DAG.
pub fn layer_id(n: usize) -> BlockId {
    id(&format!("layer-{n}"))
}

/// A seeded random graph of `n` blocks rooted at block 0.
///
/// Every block links to between one and `max_links` others, repeats allowed. Links
/// only point forward unless `cyclic` is set, so sharing is common either
/// way and cycles appear only when asked for.
pub fn random_dag(seed: u64, n: usize, max_links: usize, cyclic: bool) -> Dag {
    let mut rng = StdRng::seed_from_u64(seed);
    let ids: Vec<BlockId> = (0..n).map(|i| id(&format!("rand-{seed}-{i}"))).collect();
    let sizes: Vec<u64> = (0..n).map(|_| rng.random_range(1..=256 * KB)).collect();

    let mut blocks: Vec<Block> = (0..n)
        .map(|i| {
            let lo = if cyclic { 0 } else { i + 1 };
            let links = if lo >= n {
                Vec::new()
            } else {
                (0..rng.random_range(1..=max_links))
                    .map(|_| {
                        let j = rng.random_range(lo..n);
                        Link::new(ids[j], sizes[j])
                    })
                    .collect()
            };
            Block::new(ids[i], sizes[i], links)
        })
        .collect();

    let root = blocks.remove(0);
    Dag::new(root, blocks)
}
