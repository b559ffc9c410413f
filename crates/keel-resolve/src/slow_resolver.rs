//! A [`BlockResolver`] wrapper that adds configurable random latency.
//!
//! `SlowResolver` wraps any `Arc<dyn BlockResolver>` and sleeps for a random
//! duration before each lookup. The RNG is seeded for deterministic,
//! reproducible behaviour across test runs.
//!
//! # Example
//!
//! ```ignore
//! let slow = SlowResolver::new(inner)
//!     .latency(1, 15)   // 1–15 ms per lookup
//!     .seed(42);
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use keel_types::{Block, BlockId};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;

use crate::error::ResolveError;
use crate::traits::BlockResolver;

/// A [`BlockResolver`] wrapper that injects random latency before lookups.
///
/// Concurrent callers see lookups complete out of order, which surfaces
/// code that depends on completion order.
pub struct SlowResolver {
    inner: Arc<dyn BlockResolver>,
    latency_ms: (u64, u64),
    rng: Mutex<StdRng>,
}

impl SlowResolver {
    /// Wrap an existing resolver with zero latency (pass-through) by default.
    pub fn new(inner: Arc<dyn BlockResolver>) -> Self {
        Self {
            inner,
            latency_ms: (0, 0),
            rng: Mutex::new(StdRng::seed_from_u64(0)),
        }
    }

    /// Set the lookup latency range in milliseconds (uniform random).
    pub fn latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.latency_ms = (min_ms, max_ms);
        self
    }

    /// Set the RNG seed for deterministic behaviour.
    pub fn seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    fn pick_delay(&self) -> Duration {
        let (min, max) = self.latency_ms;

        let ms = if max <= min {
            min
        } else {
            self.rng
                .lock()
                .expect("lock poisoned")
                .random_range(min..=max)
        };

        Duration::from_millis(ms)
    }
}

#[async_trait::async_trait]
impl BlockResolver for SlowResolver {
    async fn get(
        &self,
        cancel: &CancellationToken,
        id: BlockId,
    ) -> Result<Option<Block>, ResolveError> {
        let delay = self.pick_delay();

        if !delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(ResolveError::Cancelled),
            }
        }

        self.inner.get(cancel, id).await
    }
}
