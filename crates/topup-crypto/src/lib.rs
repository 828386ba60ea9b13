//! # topup-crypto — Cryptographic Primitives for the Top-Up Guard
//!
//! This crate provides the hashing and membership-proof building blocks
//! used by the funding service:
//!
//! - **Keccak-256** digests producing [`Bytes32`](topup_core::Bytes32) values.
//! - **Leaf encoding** of an [`IdentityTuple`](topup_core::IdentityTuple):
//!   ABI tuple encoding followed by a double Keccak-256.
//! - **Merkle proof verification** with commutative (sorted-pair) node
//!   hashing, so proofs carry no left/right bookkeeping.
//! - **Standard Merkle tree** construction for allowlist operators, with
//!   proof extraction and a JSON dump/load interchange format.

pub mod abi;
pub mod error;
pub mod keccak;
pub mod merkle;
pub mod standard_tree;

// Re-export primary types.
pub use abi::{encode_identity, leaf_hash, LEAF_ENCODING};
pub use error::CryptoError;
pub use keccak::keccak256;
pub use merkle::{hash_pair, process_proof, roots_equal, verify, verify_identity};
pub use standard_tree::{StandardMerkleTree, StandardTreeDump};
