//! Keccak-256 (the pre-standard SHA-3 padding used by EVM chains).

use sha3::{Digest, Keccak256};
use topup_core::Bytes32;

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Bytes32 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    Bytes32::new(hasher.finalize().into())
}

/// Keccak-256 over the concatenation of `parts`, without allocating.
pub fn keccak256_concat(parts: &[&[u8]]) -> Bytes32 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    Bytes32::new(hasher.finalize().into())
}
