//! Allowlist files.
//!
//! An allowlist is a YAML sequence of entries, each naming a feed by its
//! human-readable name:
//!
//! ```yaml
//! - name: ETH/USD
//!   feed_id: "0x4385..."
//!   recipient: "0x1111111111111111111111111111111111111111"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use topup_core::{Address, Bytes32, IdentityTuple, ValidationError};
use topup_crypto::StandardMerkleTree;

/// One allowlist entry as written by operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllowlistEntry {
    /// Feed name, at most 31 bytes of UTF-8.
    pub name: String,
    /// Feed identifier.
    pub feed_id: Bytes32,
    /// Wallet to keep funded.
    pub recipient: Address,
}

impl AllowlistEntry {
    /// Encode the entry as an identity tuple.
    pub fn to_identity(&self) -> Result<IdentityTuple, ValidationError> {
        Ok(IdentityTuple::new(
            Bytes32::from_short_string(&self.name)?,
            self.feed_id,
            self.recipient,
        ))
    }
}

/// Parse a YAML allowlist into identity tuples, in file order.
pub fn parse_allowlist(yaml: &str) -> Result<Vec<IdentityTuple>> {
    let entries: Vec<AllowlistEntry> =
        serde_yaml::from_str(yaml).context("invalid allowlist document")?;
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            entry
                .to_identity()
                .with_context(|| format!("allowlist entry {i} ({})", entry.name))
        })
        .collect()
}

/// Read an allowlist file and build its tree.
pub fn load_tree(path: &Path) -> Result<StandardMerkleTree> {
    let identities = parse_allowlist(&crate::read_file(path)?)?;
    StandardMerkleTree::of(identities)
        .with_context(|| format!("cannot build tree from {}", path.display()))
}
