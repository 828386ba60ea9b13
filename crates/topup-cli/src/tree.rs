//! # Tree Subcommand
//!
//! Builds the allowlist Merkle tree whose root is published to the root
//! registry, and extracts or checks the per-entry proofs that keepers
//! submit with `fund`.
//!
//! Tree files use the `standard-v1` JSON dump, so they interoperate with
//! the JavaScript tooling commonly used to build EVM allowlists.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};
use topup_core::{Bytes32, IdentityTuple};
use topup_crypto::StandardMerkleTree;

use crate::allowlist::load_tree;

/// Arguments for the `topup tree` subcommand.
#[derive(Args, Debug)]
pub struct TreeArgs {
    #[command(subcommand)]
    pub command: TreeCommand,
}

/// Tree subcommands.
#[derive(Subcommand, Debug)]
pub enum TreeCommand {
    /// Build a tree dump from a YAML allowlist and print its root.
    Build {
        /// Allowlist YAML file.
        #[arg(value_name = "ALLOWLIST")]
        allowlist: PathBuf,
        /// Write the tree dump here instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the proof for one entry of a tree dump.
    Proof {
        /// Tree dump JSON file.
        #[arg(value_name = "TREE")]
        tree: PathBuf,
        /// Entry index, in allowlist order.
        #[arg(long)]
        index: usize,
    },

    /// Verify an entry's proof against the tree root.
    Verify {
        /// Tree dump JSON file.
        #[arg(value_name = "TREE")]
        tree: PathBuf,
        /// Entry index, in allowlist order.
        #[arg(long)]
        index: usize,
        /// Proof document produced by `topup tree proof`. When omitted the
        /// proof is recomputed from the tree.
        #[arg(long, value_name = "FILE")]
        proof: Option<PathBuf>,
    },
}

/// Proof document emitted by `topup tree proof`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofDocument {
    /// Entry index.
    pub index: usize,
    /// The proven identity tuple.
    pub value: IdentityTuple,
    /// Its leaf hash.
    pub leaf: Bytes32,
    /// Sibling hashes from leaf to root.
    pub proof: Vec<Bytes32>,
    /// The root the proof reconstructs.
    pub root: Bytes32,
}

/// Execute the tree subcommand.
pub fn run_tree(args: &TreeArgs) -> Result<u8> {
    match &args.command {
        TreeCommand::Build { allowlist, output } => cmd_build(allowlist, output.as_deref()),
        TreeCommand::Proof { tree, index } => cmd_proof(tree, *index),
        TreeCommand::Verify { tree, index, proof } => cmd_verify(tree, *index, proof.as_deref()),
    }
}

/// Load a tree dump, validating it fully.
pub fn read_tree(path: &Path) -> Result<StandardMerkleTree> {
    let json = crate::read_file(path)?;
    StandardMerkleTree::from_json(&json)
        .with_context(|| format!("invalid tree dump: {}", path.display()))
}

/// Build the proof document for entry `index`.
pub fn proof_document(tree: &StandardMerkleTree, index: usize) -> Result<ProofDocument> {
    Ok(ProofDocument {
        index,
        value: *tree.value(index)?,
        leaf: tree.leaf_hash(index)?,
        proof: tree.proof(index)?,
        root: tree.root(),
    })
}

fn cmd_build(allowlist: &Path, output: Option<&Path>) -> Result<u8> {
    let tree = load_tree(allowlist)?;
    tracing::info!(entries = tree.len(), root = %tree.root(), "built allowlist tree");

    crate::write_json(&tree.dump(), output)?;
    if output.is_some() {
        println!("{}", tree.root());
    }
    Ok(0)
}

fn cmd_proof(tree_path: &Path, index: usize) -> Result<u8> {
    let tree = read_tree(tree_path)?;
    crate::write_json(&proof_document(&tree, index)?, None)?;
    Ok(0)
}

fn cmd_verify(tree_path: &Path, index: usize, proof_path: Option<&Path>) -> Result<u8> {
    let tree = read_tree(tree_path)?;
    let proof = match proof_path {
        Some(path) => {
            let doc: ProofDocument = serde_json::from_str(&crate::read_file(path)?)
                .with_context(|| format!("invalid proof document: {}", path.display()))?;
            if doc.index != index {
                bail!(
                    "proof document is for index {}, not {index}",
                    doc.index
                );
            }
            if doc.root != tree.root() {
                println!("FAIL: proof targets root {}, tree root is {}", doc.root, tree.root());
                return Ok(1);
            }
            doc.proof
        }
        None => tree.proof(index)?,
    };

    if tree.verify(index, &proof)? {
        println!("OK: entry {index} ({}) is in tree {}", tree.value(index)?, tree.root());
        Ok(0)
    } else {
        println!("FAIL: proof for entry {index} does not reconstruct {}", tree.root());
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topup_core::Address;

    fn tree() -> StandardMerkleTree {
        StandardMerkleTree::of(
            (1..=3u8)
                .map(|n| {
                    IdentityTuple::new(
                        Bytes32::new([n; 32]),
                        Bytes32::new([n + 10; 32]),
                        Address::from_low_u64(u64::from(n)),
                    )
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn proof_document_verifies() {
        let tree = tree();
        for i in 0..tree.len() {
            let doc = proof_document(&tree, i).unwrap();
            assert_eq!(doc.root, tree.root());
            assert!(topup_crypto::verify(&doc.leaf, &doc.proof, &doc.root));
        }
    }

    #[test]
    fn proof_document_out_of_range() {
        assert!(proof_document(&tree(), 3).is_err());
    }
}
