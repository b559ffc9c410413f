//! The flat, deduplicated inventory produced by a DAG walk.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{BlockId, ByteSize};

/// Errors raised when a manifest's parts violate its invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    /// `identifiers` and `sizes` differ in length.
    #[error("manifest length mismatch: {identifiers} identifiers, {sizes} sizes")]
    LengthMismatch {
        /// Number of identifiers.
        identifiers: usize,
        /// Number of sizes.
        sizes: usize,
    },

    /// The same identifier appears more than once.
    #[error("duplicate identifier in manifest: {0}")]
    DuplicateIdentifier(BlockId),
}

/// Every distinct block reachable from a root, with its declared size.
///
/// `sizes[i]` is the declared size of `identifiers[i]`. The two sequences
/// always have equal length, no identifier appears twice, and the root is
/// the first entry of a manifest produced by a walk.
///
/// The serialized shape is a struct with two named arrays, `identifiers`
/// and `sizes`. Deserialization re-checks the invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ManifestParts")]
pub struct Manifest {
    identifiers: Vec<BlockId>,
    sizes: Vec<u64>,
}

/// Unchecked wire form of a [`Manifest`].
#[derive(Deserialize)]
struct ManifestParts {
    identifiers: Vec<BlockId>,
    sizes: Vec<u64>,
}

impl TryFrom<ManifestParts> for Manifest {
    type Error = ManifestError;

    fn try_from(parts: ManifestParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts.identifiers, parts.sizes)
    }
}

impl Manifest {
    /// Assemble a manifest from index-aligned parts, checking invariants.
    pub fn from_parts(identifiers: Vec<BlockId>, sizes: Vec<u64>) -> Result<Self, ManifestError> {
        if identifiers.len() != sizes.len() {
            return Err(ManifestError::LengthMismatch {
                identifiers: identifiers.len(),
                sizes: sizes.len(),
            });
        }

        let mut seen = HashSet::with_capacity(identifiers.len());
        for id in &identifiers {
            if !seen.insert(*id) {
                return Err(ManifestError::DuplicateIdentifier(*id));
            }
        }

        Ok(Self { identifiers, sizes })
    }

    /// Identifiers in walk order.
    pub fn identifiers(&self) -> &[BlockId] {
        &self.identifiers
    }

    /// Declared sizes, index-aligned with [`identifiers`](Self::identifiers).
    pub fn sizes(&self) -> &[u64] {
        &self.sizes
    }

    /// Number of distinct blocks.
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    /// Whether the manifest has no entries.
    ///
    /// A manifest produced by a walk always holds at least the root.
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// The first entry, which is the root for a walk-produced manifest.
    pub fn root(&self) -> Option<(BlockId, u64)> {
        self.iter().next()
    }

    /// Iterate `(identifier, size)` pairs in walk order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (BlockId, u64)> + '_ {
        self.identifiers
            .iter()
            .copied()
            .zip(self.sizes.iter().copied())
    }

    /// Whether `id` is part of the manifest.
    pub fn contains(&self, id: &BlockId) -> bool {
        self.identifiers.contains(id)
    }

    /// Declared size of `id`, if present.
    pub fn size_of(&self, id: &BlockId) -> Option<u64> {
        self.identifiers
            .iter()
            .position(|candidate| candidate == id)
            .map(|i| self.sizes[i])
    }

    /// Total bytes in the reachable set, each shared block counted once.
    pub fn total_size(&self) -> ByteSize {
        ByteSize(
            self.sizes
                .iter()
                .fold(0u64, |acc, size| acc.saturating_add(*size)),
        )
    }

    /// Split into the owned `(identifiers, sizes)` sequences.
    pub fn into_parts(self) -> (Vec<BlockId>, Vec<u64>) {
        (self.identifiers, self.sizes)
    }
}
