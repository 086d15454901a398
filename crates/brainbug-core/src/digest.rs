//! SHA-256 digests for persisted split files.
//!
//! A split's digest is taken over its compact JSON encoding, so two runs
//! with the same examples, ratios and seed produce the same digest
//! regardless of pretty-printing.

use sha2::{Digest, Sha256};

use crate::domain::error::Result;
use crate::domain::example::CuratedExample;

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Digest of an ordered example list.
pub fn examples_digest(examples: &[CuratedExample]) -> Result<String> {
    let bytes = serde_json::to_vec(examples)?;
    Ok(sha256_hex(&bytes))
}
