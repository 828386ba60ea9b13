//! # topup-cli — CLI for the Top-Up Guard
//!
//! Provides the `topup` command-line interface.
//!
//! ## Subcommands
//!
//! - `topup tree build`: Build a standard Merkle tree from a YAML allowlist.
//! - `topup tree proof`: Extract the proof for one allowlist entry.
//! - `topup tree verify`: Verify an entry's proof against the tree root.
//! - `topup simulate`: Run a scripted scenario through a funding service
//!   backed by in-memory collaborators.
//!
//! ```bash
//! topup tree build allowlist.yaml -o tree.json
//! topup tree proof tree.json --index 0
//! topup simulate scenario.yaml -v
//! ```

pub mod allowlist;
pub mod simulate;
pub mod tree;

use std::path::Path;

use anyhow::{Context, Result};

/// Read a file to a string, naming the path on failure.
pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Write pretty JSON to `path`, or to stdout when `path` is `None`.
pub fn write_json<T: serde::Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize JSON")?;
    match path {
        Some(path) => std::fs::write(path, format!("{json}\n"))
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
