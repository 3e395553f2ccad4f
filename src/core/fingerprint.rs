//! BLAKE3 fingerprinting of built specifications.
//!
//! The fingerprint is computed over the canonical JSON encoding of the
//! specification. Because composition is deterministic, equal fragment
//! lists produce equal fingerprints.

use crate::core::error::DeployError;
use crate::core::types::DeploymentSpec;

/// Canonical fingerprint of a specification. Returns `"blake3:{hex}"`.
pub fn spec_fingerprint(spec: &DeploymentSpec) -> Result<String, DeployError> {
    let canonical = serde_json::to_vec(spec).map_err(|e| DeployError::Encode(e.to_string()))?;
    Ok(hash_bytes(&canonical))
}

/// Hash raw bytes. Returns `"blake3:{hex}"`.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(bytes).to_hex())
}
