//! Manifest extraction for Merkle DAGs.
//!
//! A [`ManifestBuilder`] walks the DAG below a root [`Block`] through a
//! [`BlockResolver`], visiting every reachable block exactly once, and
//! records each block's identifier and declared size in a [`Manifest`].
//!
//! - Walk order is pre-order depth-first over link order; a block shared by
//!   several parents appears at its first encounter.
//! - Links back to already-visited blocks (shared blocks and cycles) are
//!   skipped without a resolver call.
//! - With [`BuilderConfig::concurrency`] above one, lookups fan out while the
//!   output order stays identical to the sequential walk.
//!
//! Manifests persist as CBOR ([`encode_cbor`]) or versioned postcard
//! ([`serialize_manifest`]).
//!
//! [`Block`]: keel_types::Block
//! [`BlockResolver`]: keel_resolve::BlockResolver
//! [`Manifest`]: keel_types::Manifest

mod builder;
mod codec;
mod config;
mod error;

pub use builder::{ManifestBuilder, build_manifest};
pub use codec::{
    MANIFEST_FORMAT_VERSION, decode_cbor, deserialize_manifest, encode_cbor, serialize_manifest,
};
pub use config::BuilderConfig;
pub use error::{BuildError, CodecError, ConfigError};

#[cfg(test)]
mod tests;
