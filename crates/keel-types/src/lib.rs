//! Shared types and identifiers for Keel.
//!
//! This crate defines the data model every other Keel crate speaks:
//! the content identifier ([`BlockId`]), the DAG node as seen by a walk
//! ([`Block`], [`Link`]), the flat inventory produced by a walk
//! ([`Manifest`]), and the [`ByteSize`] display helper.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

mod manifest;
mod size;

pub use manifest::{Manifest, ManifestError};
pub use size::ByteSize;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Content-addressed identifier for a block: `blake3(block_data)`.
///
/// Two identifiers are equal iff they name the same block content. The walk
/// uses this equality, and nothing else, to deduplicate shared blocks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BlockId([u8; 32]);

impl BlockId {
    /// Create an ID by hashing arbitrary data with BLAKE3.
    pub fn from_data(data: &[u8]) -> Self {
        Self(blake3::hash(data).into())
    }

    /// Return the raw 32-byte representation.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for BlockId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for BlockId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({self})")
    }
}

/// Error returned when parsing a [`BlockId`] from its hex form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseIdError {
    /// The input contained a character outside ASCII.
    #[error("invalid hex character {0:?}")]
    NonAscii(char),

    /// The input is not 64 hex digits.
    #[error("invalid block id: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl FromStr for BlockId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // hex reports offending bytes, which garbles multi-byte characters.
        if let Some(c) = s.chars().find(|c| !c.is_ascii()) {
            return Err(ParseIdError::NonAscii(c));
        }

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

// ---------------------------------------------------------------------------
// DAG nodes
// ---------------------------------------------------------------------------

/// A reference from a block to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Identifier of the child block.
    pub id: BlockId,
    /// Size of the child as declared by the parent.
    pub size: u64,
}

impl Link {
    /// Create a link to `id` declaring `size` bytes.
    pub fn new(id: BlockId, size: u64) -> Self {
        Self { id, size }
    }
}

/// One DAG node as seen by a walk: identifier, declared size, and links.
///
/// Payload bytes are never part of a `Block`. Link order is significant
/// only in that it fixes the order of a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Content identifier of this block.
    pub id: BlockId,
    /// The block's own declared size in bytes (not its subtree).
    pub size: u64,
    /// Ordered child references.
    pub links: Vec<Link>,
}

impl Block {
    /// Create a block with the given links.
    pub fn new(id: BlockId, size: u64, links: Vec<Link>) -> Self {
        Self { id, size, links }
    }

    /// Create a block without children.
    pub fn leaf(id: BlockId, size: u64) -> Self {
        Self::new(id, size, Vec::new())
    }

    /// A link pointing at this block, declaring its own size.
    pub fn as_link(&self) -> Link {
        Link::new(self.id, self.size)
    }

    /// Whether this block has no children.
    pub fn is_leaf(&self) -> bool {
        self.links.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
