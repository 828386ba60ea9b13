//! # Tree Command Tests
//!
//! Exercises `topup tree build`, `proof` and `verify` against files in a
//! temporary directory.

use std::path::{Path, PathBuf};

use topup_cli::tree::{proof_document, read_tree, run_tree, ProofDocument, TreeArgs, TreeCommand};
use topup_core::Bytes32;
use topup_crypto::StandardMerkleTree;

const ALLOWLIST: &str = include_str!("../../../demos/allowlist.yaml");

fn build(dir: &Path) -> PathBuf {
    let allowlist = dir.join("allowlist.yaml");
    let output = dir.join("tree.json");
    std::fs::write(&allowlist, ALLOWLIST).unwrap();
    let code = run_tree(&TreeArgs {
        command: TreeCommand::Build {
            allowlist,
            output: Some(output.clone()),
        },
    })
    .unwrap();
    assert_eq!(code, 0);
    output
}

fn verify(tree: PathBuf, index: usize, proof: Option<PathBuf>) -> u8 {
    run_tree(&TreeArgs {
        command: TreeCommand::Verify { tree, index, proof },
    })
    .unwrap()
}

#[test]
fn build_writes_loadable_dump() {
    let dir = tempfile::tempdir().unwrap();
    let path = build(dir.path());

    let json = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["format"], "standard-v1");
    assert_eq!(value["values"].as_array().unwrap().len(), 3);

    let tree = read_tree(&path).unwrap();
    assert_eq!(tree.len(), 3);
    assert_eq!(
        tree.value(0).unwrap().name.to_short_string().as_deref(),
        Some("ETH/USD")
    );
}

#[test]
fn build_is_deterministic() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let first = std::fs::read_to_string(build(a.path())).unwrap();
    let second = std::fs::read_to_string(build(b.path())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn build_rejects_empty_allowlist() {
    let dir = tempfile::tempdir().unwrap();
    let allowlist = dir.path().join("empty.yaml");
    std::fs::write(&allowlist, "[]\n").unwrap();
    let result = run_tree(&TreeArgs {
        command: TreeCommand::Build {
            allowlist,
            output: Some(dir.path().join("tree.json")),
        },
    });
    assert!(result.is_err());
}

#[test]
fn verify_recomputed_proofs() {
    let dir = tempfile::tempdir().unwrap();
    let path = build(dir.path());
    for index in 0..3 {
        assert_eq!(verify(path.clone(), index, None), 0);
    }
}

#[test]
fn verify_out_of_range_index_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = build(dir.path());
    let result = run_tree(&TreeArgs {
        command: TreeCommand::Verify {
            tree: path,
            index: 3,
            proof: None,
        },
    });
    assert!(result.is_err());
}

#[test]
fn verify_saved_proof_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = build(dir.path());
    let tree = read_tree(&path).unwrap();

    let doc = proof_document(&tree, 1).unwrap();
    let proof_path = dir.path().join("proof.json");
    std::fs::write(&proof_path, serde_json::to_string(&doc).unwrap()).unwrap();

    assert_eq!(verify(path, 1, Some(proof_path)), 0);
}

#[test]
fn verify_rejects_tampered_proof() {
    let dir = tempfile::tempdir().unwrap();
    let path = build(dir.path());
    let tree = read_tree(&path).unwrap();

    let mut doc = proof_document(&tree, 0).unwrap();
    doc.proof[0] = Bytes32::new([0x42; 32]);
    let proof_path = dir.path().join("proof.json");
    std::fs::write(&proof_path, serde_json::to_string(&doc).unwrap()).unwrap();

    assert_eq!(verify(path, 0, Some(proof_path)), 1);
}

#[test]
fn verify_rejects_proof_for_other_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = build(dir.path());
    let tree = read_tree(&path).unwrap();

    let mut doc: ProofDocument = proof_document(&tree, 0).unwrap();
    doc.root = Bytes32::new([0x24; 32]);
    let proof_path = dir.path().join("proof.json");
    std::fs::write(&proof_path, serde_json::to_string(&doc).unwrap()).unwrap();

    assert_eq!(verify(path, 0, Some(proof_path)), 1);
}

#[test]
fn verify_rejects_proof_for_other_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = build(dir.path());
    let tree = read_tree(&path).unwrap();

    let doc = proof_document(&tree, 0).unwrap();
    let proof_path = dir.path().join("proof.json");
    std::fs::write(&proof_path, serde_json::to_string(&doc).unwrap()).unwrap();

    let result = run_tree(&TreeArgs {
        command: TreeCommand::Verify {
            tree: path,
            index: 2,
            proof: Some(proof_path),
        },
    });
    assert!(result.is_err());
}

#[test]
fn corrupted_dump_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = build(dir.path());
    let json = std::fs::read_to_string(&path).unwrap();
    let tree = StandardMerkleTree::from_json(&json).unwrap();

    let mut dump = tree.dump();
    dump.tree[0] = Bytes32::new([0x99; 32]);
    std::fs::write(&path, serde_json::to_string(&dump).unwrap()).unwrap();

    assert!(read_tree(&path).is_err());
}
