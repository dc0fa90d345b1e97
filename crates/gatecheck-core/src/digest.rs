//! Digest boundary: deterministic SHA-256 content hashing.
//!
//! Digests stamp emitted artifacts and verify that recorded references
//! (`source_sha256`, receipt `artifact_sha256`) still match the referenced
//! file's current bytes.

use crate::error::GateError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Hash raw bytes to a 64-character lowercase hex digest.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Hash a file's current on-disk bytes.
pub fn digest_file(path: &Path) -> Result<String, GateError> {
    let bytes = std::fs::read(path).map_err(|e| GateError::read(path, e))?;
    Ok(sha256_hex(&bytes))
}

/// Shape check for recorded digest strings (64 chars, lowercase hex).
pub fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64
        && value
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
