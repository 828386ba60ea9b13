//! # Cryptographic Error Types
//!
//! Structured errors for tree construction and tree interchange in
//! `topup-crypto`. Proof verification itself never errors: a bad proof is
//! simply `false`.

use thiserror::Error;

/// Errors from Merkle tree operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// A tree needs at least one value.
    #[error("cannot build a Merkle tree with no values")]
    EmptyTree,

    /// A value index is past the end of the tree's value list.
    #[error("value index {index} out of range for tree of {len} values")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of values in the tree.
        len: usize,
    },

    /// A dumped tree is structurally invalid.
    #[error("invalid tree dump: {0}")]
    InvalidDump(String),

    /// A dumped value does not hash to the leaf stored at its tree index.
    #[error("value {index} does not match leaf at tree index {tree_index}")]
    LeafMismatch {
        /// Index into the value list.
        index: usize,
        /// Position in the node array the value claims.
        tree_index: usize,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
