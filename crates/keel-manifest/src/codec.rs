//! Manifest encodings.
//!
//! A [`Manifest`] serializes as a struct with two named arrays,
//! `identifiers` and `sizes`, so any serde format can carry it directly.
//! Two encodings are provided here:
//!
//! - CBOR, self-describing, for manifests handed to other tools.
//! - postcard behind a one-byte format version, for compact storage.
//!   Unknown versions are rejected before the body is decoded.
//!
//! Both decoders re-check the manifest invariants.

use keel_types::Manifest;

use crate::error::CodecError;

/// Current postcard envelope version.
pub const MANIFEST_FORMAT_VERSION: u8 = 1;

/// Encode a manifest as CBOR.
pub fn encode_cbor(manifest: &Manifest) -> Result<Vec<u8>, CodecError> {
    Ok(serde_cbor::to_vec(manifest)?)
}

/// Decode a manifest from CBOR.
pub fn decode_cbor(bytes: &[u8]) -> Result<Manifest, CodecError> {
    Ok(serde_cbor::from_slice(bytes)?)
}

/// Serialize a manifest to versioned postcard bytes.
pub fn serialize_manifest(manifest: &Manifest) -> Result<Vec<u8>, CodecError> {
    let mut out = postcard::to_allocvec(&MANIFEST_FORMAT_VERSION)?;
    out.extend(postcard::to_allocvec(manifest)?);
    Ok(out)
}

/// Deserialize a manifest from versioned postcard bytes.
///
/// Rejects unknown version numbers and trailing bytes.
pub fn deserialize_manifest(bytes: &[u8]) -> Result<Manifest, CodecError> {
    let (version, body): (u8, &[u8]) = postcard::take_from_bytes(bytes)?;
    if version != MANIFEST_FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: version,
            supported: MANIFEST_FORMAT_VERSION,
        });
    }

    let (manifest, rest): (Manifest, &[u8]) = postcard::take_from_bytes(body)?;
    if !rest.is_empty() {
        return Err(CodecError::Serialization(format!(
            "{} trailing bytes after manifest",
            rest.len()
        )));
    }
    Ok(manifest)
}
