//! # Fixed-Width Byte Newtypes
//!
//! [`Bytes32`] carries names, feed identifiers, Merkle leaves and roots.
//! [`Address`] carries 20-byte account addresses. Both display and serialize
//! as `0x`-prefixed lowercase hex and both reserve the all-zero value as
//! "unset", which callers reject explicitly.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;
use crate::hex::{decode_fixed, to_prefixed_hex};

macro_rules! hex_newtype {
    ($name:ident, $len:expr, $kind:literal) => {
        impl $name {
            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Wrap raw bytes.
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Consume into the raw bytes.
            pub fn into_bytes(self) -> [u8; $len] {
                self.0
            }

            /// Whether every byte is zero.
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; $len]
            }

            /// Parse from hex, with or without a `0x` prefix.
            pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
                decode_fixed::<$len>(s, $kind).map(Self)
            }

            /// `0x`-prefixed lowercase hex.
            pub fn to_hex(&self) -> String {
                to_prefixed_hex(&self.0)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::from_hex(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// A 32-byte word: names, feed IDs, leaves, roots.
///
/// Ordering is lexicographic over the raw bytes, which is the same as
/// numeric ordering of the big-endian `uint256` the word represents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Bytes32([u8; 32]);

hex_newtype!(Bytes32, 32, "bytes32");

impl Bytes32 {
    /// Pack a short UTF-8 string into a word, right-padded with zeros.
    ///
    /// At most 31 bytes are accepted so that the final byte is always a
    /// terminator, matching the `encodeBytes32String` convention used to
    /// name data feeds (`"ETH/USD"`).
    pub fn from_short_string(s: &str) -> Result<Self, ValidationError> {
        let raw = s.as_bytes();
        if raw.len() > 31 {
            return Err(ValidationError::StringTooLong {
                value: s.to_string(),
                len: raw.len(),
            });
        }
        let mut out = [0u8; 32];
        out[..raw.len()].copy_from_slice(raw);
        Ok(Self(out))
    }

    /// Recover a string packed by [`Bytes32::from_short_string`].
    ///
    /// Returns `None` if the last byte is non-zero, if a non-zero byte
    /// follows the first zero, or if the content is not UTF-8.
    pub fn to_short_string(&self) -> Option<String> {
        if self.0[31] != 0 {
            return None;
        }
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(32);
        if self.0[end..].iter().any(|b| *b != 0) {
            return None;
        }
        String::from_utf8(self.0[..end].to_vec()).ok()
    }
}

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

hex_newtype!(Address, 20, "address");

impl Address {
    /// The ABI word for this address: 12 zero bytes followed by the address.
    pub fn to_word(&self) -> Bytes32 {
        let mut out = [0u8; 32];
        out[12..].copy_from_slice(&self.0);
        Bytes32(out)
    }

    /// Build a test/demo address whose last byte is `n`.
    pub fn from_low_u64(n: u64) -> Self {
        let mut out = [0u8; 20];
        out[12..].copy_from_slice(&n.to_be_bytes());
        Self(out)
    }
}
