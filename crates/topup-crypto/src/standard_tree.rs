//! # Standard Merkle Tree
//!
//! Builds the allowlist tree that a root registry publishes, and extracts
//! per-value proofs for keepers to submit alongside a funding request.
//!
//! ## Layout
//!
//! The tree is a complete binary tree stored as a flat array of `2n - 1`
//! nodes, root at index 0 and the children of node `i` at `2i + 1` and
//! `2i + 2`. Leaf hashes are sorted ascending and written to the tail of the
//! array in reverse, so the smallest leaf sits at the last index. Values
//! keep their input order; each records the array index of its leaf.
//!
//! ## Interchange
//!
//! [`StandardMerkleTree::dump`] produces the `standard-v1` JSON document
//! (`format`, `leafEncoding`, `tree`, `values[{value, treeIndex}]`) that
//! allowlist tooling exchanges. [`StandardMerkleTree::load`] re-validates
//! every node and every value before accepting a dump.

use serde::{Deserialize, Serialize};
use topup_core::{Address, Bytes32, IdentityTuple};

use crate::abi::{leaf_hash, LEAF_ENCODING};
use crate::error::CryptoError;
use crate::merkle::{hash_pair, verify};

/// Format tag of a serialized tree.
pub const DUMP_FORMAT: &str = "standard-v1";

/// A Merkle tree over identity tuples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardMerkleTree {
    tree: Vec<Bytes32>,
    values: Vec<IdentityTuple>,
    tree_indices: Vec<usize>,
}

/// Serialized form of a [`StandardMerkleTree`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardTreeDump {
    /// Always [`DUMP_FORMAT`].
    pub format: String,
    /// ABI types of each value field; always [`LEAF_ENCODING`].
    pub leaf_encoding: Vec<String>,
    /// Flat node array, root first.
    pub tree: Vec<Bytes32>,
    /// Values in insertion order with the index of their leaf.
    pub values: Vec<DumpedValue>,
}

/// One value entry of a [`StandardTreeDump`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpedValue {
    /// `[name, feedId, recipient]`.
    pub value: (Bytes32, Bytes32, Address),
    /// Index of this value's leaf in the node array.
    pub tree_index: usize,
}

fn left_child(i: usize) -> usize {
    2 * i + 1
}

fn sibling(i: usize) -> usize {
    if i % 2 == 1 {
        i + 1
    } else {
        i - 1
    }
}

fn parent(i: usize) -> usize {
    (i - 1) / 2
}

impl StandardMerkleTree {
    /// Build a tree over `values`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptyTree`] when `values` is empty.
    pub fn of(values: Vec<IdentityTuple>) -> Result<Self, CryptoError> {
        if values.is_empty() {
            return Err(CryptoError::EmptyTree);
        }

        let mut hashed: Vec<(usize, Bytes32)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (i, leaf_hash(v)))
            .collect();
        hashed.sort_by(|a, b| a.1.cmp(&b.1));

        let n = hashed.len();
        let mut tree = vec![Bytes32::ZERO; 2 * n - 1];
        let mut tree_indices = vec![0usize; n];
        let last = tree.len() - 1;
        for (i, (value_index, leaf)) in hashed.into_iter().enumerate() {
            tree[last - i] = leaf;
            tree_indices[value_index] = last - i;
        }
        for i in (0..tree.len() - n).rev() {
            let l = left_child(i);
            tree[i] = hash_pair(&tree[l], &tree[l + 1]);
        }

        Ok(Self {
            tree,
            values,
            tree_indices,
        })
    }

    /// The tree root.
    pub fn root(&self) -> Bytes32 {
        self.tree[0]
    }

    /// Number of values (leaves).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; construction rejects empty trees.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at `index`, in insertion order.
    pub fn value(&self, index: usize) -> Result<&IdentityTuple, CryptoError> {
        self.values.get(index).ok_or(CryptoError::IndexOutOfRange {
            index,
            len: self.values.len(),
        })
    }

    /// All values in insertion order.
    pub fn values(&self) -> &[IdentityTuple] {
        &self.values
    }

    /// Index of the first value equal to `tuple`, if present.
    pub fn position(&self, tuple: &IdentityTuple) -> Option<usize> {
        self.values.iter().position(|v| v == tuple)
    }

    /// The leaf hash of the value at `index`.
    pub fn leaf_hash(&self, index: usize) -> Result<Bytes32, CryptoError> {
        let ti = self.tree_index(index)?;
        Ok(self.tree[ti])
    }

    /// Sibling path from the value at `index` up to the root.
    pub fn proof(&self, index: usize) -> Result<Vec<Bytes32>, CryptoError> {
        let mut ti = self.tree_index(index)?;
        let mut proof = Vec::new();
        while ti > 0 {
            proof.push(self.tree[sibling(ti)]);
            ti = parent(ti);
        }
        Ok(proof)
    }

    /// Check `proof` for the value at `index` against this tree's root.
    pub fn verify(&self, index: usize, proof: &[Bytes32]) -> Result<bool, CryptoError> {
        let leaf = leaf_hash(self.value(index)?);
        Ok(verify(&leaf, proof, &self.root()))
    }

    /// Serialize to the interchange structure.
    pub fn dump(&self) -> StandardTreeDump {
        StandardTreeDump {
            format: DUMP_FORMAT.to_string(),
            leaf_encoding: LEAF_ENCODING.iter().map(|s| s.to_string()).collect(),
            tree: self.tree.clone(),
            values: self
                .values
                .iter()
                .zip(&self.tree_indices)
                .map(|(v, ti)| DumpedValue {
                    value: (v.name, v.feed_id, v.recipient),
                    tree_index: *ti,
                })
                .collect(),
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CryptoError> {
        Ok(serde_json::to_string_pretty(&self.dump())?)
    }

    /// Parse and validate a JSON dump.
    pub fn from_json(json: &str) -> Result<Self, CryptoError> {
        let dump: StandardTreeDump = serde_json::from_str(json)?;
        Self::load(dump)
    }

    /// Rebuild a tree from its dump, validating structure and contents.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidDump`] for a wrong format tag or leaf
    ///   encoding, a malformed node array, an internal node that is not the
    ///   hash of its children, or a value whose tree index is not a leaf.
    /// - [`CryptoError::LeafMismatch`] if a value does not hash to the leaf
    ///   at its tree index.
    pub fn load(dump: StandardTreeDump) -> Result<Self, CryptoError> {
        if dump.format != DUMP_FORMAT {
            return Err(CryptoError::InvalidDump(format!(
                "unknown format \"{}\" (expected \"{DUMP_FORMAT}\")",
                dump.format
            )));
        }
        if dump.leaf_encoding.iter().map(String::as_str).ne(LEAF_ENCODING) {
            return Err(CryptoError::InvalidDump(format!(
                "unsupported leaf encoding {:?} (expected {:?})",
                dump.leaf_encoding, LEAF_ENCODING
            )));
        }
        let n = dump.values.len();
        if n == 0 {
            return Err(CryptoError::EmptyTree);
        }
        if dump.tree.len() != 2 * n - 1 {
            return Err(CryptoError::InvalidDump(format!(
                "{} nodes for {n} values (expected {})",
                dump.tree.len(),
                2 * n - 1
            )));
        }

        let first_leaf = dump.tree.len() - n;
        for i in 0..first_leaf {
            let l = left_child(i);
            if dump.tree[i] != hash_pair(&dump.tree[l], &dump.tree[l + 1]) {
                return Err(CryptoError::InvalidDump(format!(
                    "node {i} is not the hash of its children"
                )));
            }
        }

        let mut values = Vec::with_capacity(n);
        let mut tree_indices = Vec::with_capacity(n);
        let mut seen = vec![false; dump.tree.len()];
        for (index, entry) in dump.values.into_iter().enumerate() {
            let ti = entry.tree_index;
            if ti < first_leaf || ti >= dump.tree.len() {
                return Err(CryptoError::InvalidDump(format!(
                    "value {index} has tree index {ti} outside the leaf range"
                )));
            }
            if seen[ti] {
                return Err(CryptoError::InvalidDump(format!(
                    "tree index {ti} claimed by more than one value"
                )));
            }
            seen[ti] = true;
            let (name, feed_id, recipient) = entry.value;
            let tuple = IdentityTuple::new(name, feed_id, recipient);
            if leaf_hash(&tuple) != dump.tree[ti] {
                return Err(CryptoError::LeafMismatch {
                    index,
                    tree_index: ti,
                });
            }
            values.push(tuple);
            tree_indices.push(ti);
        }

        Ok(Self {
            tree: dump.tree,
            values,
            tree_indices,
        })
    }

    fn tree_index(&self, index: usize) -> Result<usize, CryptoError> {
        self.tree_indices
            .get(index)
            .copied()
            .ok_or(CryptoError::IndexOutOfRange {
                index,
                len: self.values.len(),
            })
    }
}
