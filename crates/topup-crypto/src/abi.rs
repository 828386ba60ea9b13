//! # Leaf Encoding
//!
//! A leaf commits to one [`IdentityTuple`] as
//! `keccak256(keccak256(abi.encode(bytes32 name, bytes32 feedId, address recipient)))`.
//!
//! `abi.encode` places each static field in its own 32-byte word, so the
//! preimage is always 96 bytes and no two distinct tuples share an
//! encoding. Hashing twice keeps leaves out of the 64-byte preimage space
//! used by internal nodes, which closes the second-preimage gap between a
//! leaf and a pair of children.

use topup_core::{Bytes32, IdentityTuple};

use crate::keccak::keccak256;

/// ABI type list of a leaf value, in field order.
pub const LEAF_ENCODING: [&str; 3] = ["bytes32", "bytes32", "address"];

/// ABI-encode an identity tuple: three 32-byte words.
pub fn encode_identity(tuple: &IdentityTuple) -> [u8; 96] {
    let mut out = [0u8; 96];
    out[..32].copy_from_slice(tuple.name.as_bytes());
    out[32..64].copy_from_slice(tuple.feed_id.as_bytes());
    out[64..].copy_from_slice(tuple.recipient.to_word().as_bytes());
    out
}

/// The Merkle leaf for an identity tuple.
pub fn leaf_hash(tuple: &IdentityTuple) -> Bytes32 {
    let inner = keccak256(&encode_identity(tuple));
    keccak256(inner.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use topup_core::Address;

    fn tuple() -> IdentityTuple {
        IdentityTuple::new(
            Bytes32::from_short_string("ETH/USD").unwrap(),
            Bytes32::from_hex("0x1c9a270cbb4ef1588638981be015232f9fbfa6978d137fed669e4095e0b82f31")
                .unwrap(),
            Address::from_low_u64(0xABCD),
        )
    }

    #[test]
    fn encoding_layout() {
        let t = tuple();
        let enc = encode_identity(&t);
        assert_eq!(&enc[..7], b"ETH/USD");
        assert_eq!(&enc[32..64], t.feed_id.as_bytes());
        assert!(enc[64..76].iter().all(|b| *b == 0));
        assert_eq!(&enc[76..], t.recipient.as_bytes());
    }

    #[test]
    fn leaf_is_double_hash() {
        let t = tuple();
        let once = keccak256(&encode_identity(&t));
        assert_eq!(leaf_hash(&t), keccak256(once.as_bytes()));
        assert_ne!(leaf_hash(&t), once);
    }

    #[test]
    fn field_order_matters() {
        let t = tuple();
        let swapped = IdentityTuple::new(t.feed_id, t.name, t.recipient);
        assert_ne!(leaf_hash(&t), leaf_hash(&swapped));
    }

    #[test]
    fn each_field_changes_leaf() {
        let t = tuple();
        let mut other = t;
        other.recipient = Address::from_low_u64(0xABCE);
        assert_ne!(leaf_hash(&t), leaf_hash(&other));
        let mut other = t;
        other.name = Bytes32::from_short_string("BTC/USD").unwrap();
        assert_ne!(leaf_hash(&t), leaf_hash(&other));
    }
}
