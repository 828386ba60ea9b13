//! # Merkle Proof Verification
//!
//! Proofs are ordered lists of sibling hashes from a leaf up to the root.
//! Internal nodes hash their children in sorted order,
//! `keccak256(min(a, b) || max(a, b))`, so a verifier never needs to know
//! whether a sibling sat on the left or the right.
//!
//! ## Security Invariant
//!
//! [`verify`] has no failure mode other than returning `false`. An empty
//! proof is accepted only when the leaf itself is the root (a one-leaf
//! tree).

use subtle::ConstantTimeEq;
use topup_core::{Bytes32, IdentityTuple};

use crate::abi::leaf_hash;
use crate::keccak::keccak256_concat;

/// Hash two nodes in sorted order. Commutative: `hash_pair(a, b) == hash_pair(b, a)`.
pub fn hash_pair(a: &Bytes32, b: &Bytes32) -> Bytes32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    keccak256_concat(&[lo.as_bytes(), hi.as_bytes()])
}

/// Fold a proof over a leaf, returning the reconstructed root.
pub fn process_proof(leaf: &Bytes32, proof: &[Bytes32]) -> Bytes32 {
    proof
        .iter()
        .fold(*leaf, |computed, sibling| hash_pair(&computed, sibling))
}

/// Constant-time equality of two roots.
pub fn roots_equal(a: &Bytes32, b: &Bytes32) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Whether `proof` reconstructs `root` from `leaf`.
pub fn verify(leaf: &Bytes32, proof: &[Bytes32], root: &Bytes32) -> bool {
    roots_equal(&process_proof(leaf, proof), root)
}

/// Whether `proof` proves membership of `tuple` under `root`.
pub fn verify_identity(tuple: &IdentityTuple, proof: &[Bytes32], root: &Bytes32) -> bool {
    verify(&leaf_hash(tuple), proof, root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keccak::keccak256;

    fn word(n: u8) -> Bytes32 {
        keccak256(&[n])
    }

    #[test]
    fn hash_pair_is_commutative() {
        let (a, b) = (word(1), word(2));
        assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
    }

    #[test]
    fn hash_pair_puts_smaller_first() {
        let (a, b) = (word(1), word(2));
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(lo.as_bytes());
        buf.extend_from_slice(hi.as_bytes());
        assert_eq!(hash_pair(&a, &b), keccak256(&buf));
    }

    #[test]
    fn empty_proof_accepts_only_leaf_as_root() {
        let leaf = word(7);
        assert!(verify(&leaf, &[], &leaf));
        assert!(!verify(&leaf, &[], &word(8)));
    }

    #[test]
    fn two_leaf_tree_either_side() {
        let (a, b) = (word(1), word(2));
        let root = hash_pair(&a, &b);
        assert!(verify(&a, &[b], &root));
        assert!(verify(&b, &[a], &root));
        assert!(!verify(&a, &[a], &root));
    }

    #[test]
    fn four_leaf_tree() {
        let leaves: Vec<Bytes32> = (0..4).map(word).collect();
        let left = hash_pair(&leaves[0], &leaves[1]);
        let right = hash_pair(&leaves[2], &leaves[3]);
        let root = hash_pair(&left, &right);

        assert!(verify(&leaves[0], &[leaves[1], right], &root));
        assert!(verify(&leaves[3], &[leaves[2], left], &root));
        // Sibling order within the proof is significant.
        assert!(!verify(&leaves[0], &[right, leaves[1]], &root));
        // Truncated proof reconstructs an internal node, not the root.
        assert!(!verify(&leaves[0], &[leaves[1]], &root));
    }

    #[test]
    fn roots_equal_matches_eq() {
        assert!(roots_equal(&word(1), &word(1)));
        assert!(!roots_equal(&word(1), &word(2)));
    }
}
