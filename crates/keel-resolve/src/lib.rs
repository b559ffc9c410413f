//! Block resolution contract and in-process backends.
//!
//! This crate defines the [`BlockResolver`] trait that maps a [`BlockId`]
//! to the [`Block`] it names, along with resolvers useful in tests and
//! embedded deployments:
//!
//! - [`MemoryResolver`]: in-memory blocks behind a `RwLock<HashMap>`, with
//!   per-identifier call accounting.
//! - [`SlowResolver`]: wraps another resolver and injects seeded random latency.
//! - [`FlakyResolver`]: wraps another resolver and fails chosen identifiers.
//!
//! [`BlockId`]: keel_types::BlockId
//! [`Block`]: keel_types::Block

mod error;
mod flaky_resolver;
mod memory_resolver;
mod slow_resolver;
mod traits;

pub use error::ResolveError;
pub use flaky_resolver::FlakyResolver;
pub use memory_resolver::MemoryResolver;
pub use slow_resolver::SlowResolver;
pub use traits::BlockResolver;
pub use tokio_util::sync::CancellationToken;
