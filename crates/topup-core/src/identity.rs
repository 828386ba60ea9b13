//! # Identity Tuples
//!
//! An [`IdentityTuple`] names one allowlisted funding relationship: a data
//! feed name, the feed's identifier, and the recipient wallet that keeps
//! that feed running. Tuples are supplied per call and never persisted.

use serde::{Deserialize, Serialize};

use crate::bytes::{Address, Bytes32};

/// One allowlisted `(name, feed_id, recipient)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityTuple {
    /// Human-readable feed name packed into a word (e.g. `"ETH/USD"`).
    pub name: Bytes32,
    /// Feed identifier.
    pub feed_id: Bytes32,
    /// Wallet that receives top-ups for this feed.
    pub recipient: Address,
}

/// A field of an [`IdentityTuple`], in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityField {
    /// The `name` word.
    Name,
    /// The `feed_id` word.
    FeedId,
    /// The `recipient` address.
    Recipient,
}

impl IdentityTuple {
    /// Assemble a tuple.
    pub fn new(name: Bytes32, feed_id: Bytes32, recipient: Address) -> Self {
        Self {
            name,
            feed_id,
            recipient,
        }
    }

    /// The first zero-valued field, checking name, then feed ID, then
    /// recipient.
    pub fn first_zero_field(&self) -> Option<IdentityField> {
        if self.name.is_zero() {
            Some(IdentityField::Name)
        } else if self.feed_id.is_zero() {
            Some(IdentityField::FeedId)
        } else if self.recipient.is_zero() {
            Some(IdentityField::Recipient)
        } else {
            None
        }
    }
}

impl std::fmt::Display for IdentityTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name.to_short_string() {
            Some(name) => write!(f, "{name}/{}/{}", self.feed_id, self.recipient),
            None => write!(f, "{}/{}/{}", self.name, self.feed_id, self.recipient),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple() -> IdentityTuple {
        IdentityTuple::new(
            Bytes32::from_short_string("ETH/USD").unwrap(),
            Bytes32::new([7u8; 32]),
            Address::from_low_u64(9),
        )
    }

    #[test]
    fn valid_tuple_has_no_zero_field() {
        assert_eq!(tuple().first_zero_field(), None);
    }

    #[test]
    fn name_reported_before_feed_id() {
        let mut t = tuple();
        t.name = Bytes32::ZERO;
        t.feed_id = Bytes32::ZERO;
        t.recipient = Address::ZERO;
        assert_eq!(t.first_zero_field(), Some(IdentityField::Name));
    }

    #[test]
    fn feed_id_reported_before_recipient() {
        let mut t = tuple();
        t.feed_id = Bytes32::ZERO;
        t.recipient = Address::ZERO;
        assert_eq!(t.first_zero_field(), Some(IdentityField::FeedId));
    }

    #[test]
    fn recipient_reported_last() {
        let mut t = tuple();
        t.recipient = Address::ZERO;
        assert_eq!(t.first_zero_field(), Some(IdentityField::Recipient));
    }

    #[test]
    fn display_prefers_readable_name() {
        let s = tuple().to_string();
        assert!(s.starts_with("ETH/USD/0x0707"));
    }

    #[test]
    fn serde_roundtrip_uses_hex_fields() {
        let t = tuple();
        let json = serde_json::to_value(t).unwrap();
        assert_eq!(
            json["recipient"],
            "0x0000000000000000000000000000000000000009"
        );
        let back: IdentityTuple = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }
}
