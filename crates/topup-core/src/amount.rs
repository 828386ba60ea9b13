//! # Native Currency Amounts
//!
//! [`Amount`] is a quantity of the native currency in its smallest
//! denomination (wei, `10^18` per whole unit). The target balance of
//! 0.123456789 units is `123_456_789_000_000_000` wei.
//!
//! ## Serialization
//!
//! Amounts serialize as decimal wei strings (`"123456789000000000"`) so that
//! no JSON consumer silently rounds them through a float. Human-facing
//! configuration uses whole-unit decimal strings instead, via the
//! [`as_units`] serde adapter.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Number of decimal places in one whole unit.
pub const UNIT_DECIMALS: u32 = 18;

/// Wei per whole unit.
pub const WEI_PER_UNIT: u128 = 1_000_000_000_000_000_000;

/// A non-negative quantity of native currency, in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u128);

impl Amount {
    /// Zero wei.
    pub const ZERO: Self = Self(0);

    /// Construct from a raw wei value.
    pub const fn from_wei(wei: u128) -> Self {
        Self(wei)
    }

    /// Construct from whole units, failing on overflow.
    pub fn from_units(units: u64) -> Result<Self, ValidationError> {
        u128::from(units)
            .checked_mul(WEI_PER_UNIT)
            .map(Self)
            .ok_or_else(|| ValidationError::AmountOverflow(format!("{units} units")))
    }

    /// The raw wei value.
    pub const fn wei(&self) -> u128 {
        self.0
    }

    /// Whether this amount is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `self + rhs`, or `None` on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// `self - rhs`, or `None` if `rhs > self`.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Parse a whole-unit decimal string such as `"0.123456789"` or `"1"`.
    pub fn parse_units(s: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidAmount {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let t = s.trim();
        if t.is_empty() {
            return Err(invalid("empty string"));
        }
        let (int_part, frac_part) = t.split_once('.').unwrap_or((t, ""));
        if frac_part.contains('.') {
            return Err(invalid("more than one decimal point"));
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid("no digits"));
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid("non-digit character"));
        }
        if frac_part.len() > UNIT_DECIMALS as usize {
            return Err(invalid("more than 18 decimal places"));
        }

        let overflow = || ValidationError::AmountOverflow(s.to_string());
        let int: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };
        let frac: u128 = if frac_part.is_empty() {
            0
        } else {
            let scale = 10u128.pow(UNIT_DECIMALS - frac_part.len() as u32);
            frac_part.parse::<u128>().map_err(|_| overflow())? * scale
        };

        int.checked_mul(WEI_PER_UNIT)
            .and_then(|w| w.checked_add(frac))
            .map(Self)
            .ok_or_else(overflow)
    }

    /// Render as a whole-unit decimal string with trailing zeros trimmed.
    pub fn to_units_string(&self) -> String {
        let int = self.0 / WEI_PER_UNIT;
        let frac = self.0 % WEI_PER_UNIT;
        if frac == 0 {
            return int.to_string();
        }
        let frac = format!("{frac:018}");
        format!("{int}.{}", frac.trim_end_matches('0'))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_units_string())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .parse::<u128>()
            .map(Self)
            .map_err(|e| serde::de::Error::custom(format!("invalid wei amount \"{raw}\": {e}")))
    }
}

/// Serde adapter that reads and writes an [`Amount`] as a whole-unit
/// decimal string. Use with `#[serde(with = "topup_core::amount::as_units")]`.
pub mod as_units {
    use super::Amount;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as `"0.123456789"`.
    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_units_string())
    }

    /// Deserialize from `"0.123456789"`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Amount::parse_units(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_target_constant() {
        let a = Amount::parse_units("0.123456789").unwrap();
        assert_eq!(a.wei(), 123_456_789_000_000_000);
        assert_eq!(a.to_units_string(), "0.123456789");
    }

    #[test]
    fn parses_whole_units() {
        assert_eq!(Amount::parse_units("1").unwrap(), Amount::from_units(1).unwrap());
        assert_eq!(Amount::parse_units("1.").unwrap().wei(), WEI_PER_UNIT);
        assert_eq!(Amount::parse_units(".5").unwrap().wei(), WEI_PER_UNIT / 2);
        assert_eq!(Amount::parse_units(" 2.50 ").unwrap().to_units_string(), "2.5");
    }

    #[test]
    fn parses_one_wei() {
        let a = Amount::parse_units("0.000000000000000001").unwrap();
        assert_eq!(a.wei(), 1);
        assert_eq!(a.to_string(), "0.000000000000000001");
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", ".", "1.2.3", "-1", "1e18", "abc", "0.0000000000000000001"] {
            assert!(
                matches!(
                    Amount::parse_units(bad),
                    Err(ValidationError::InvalidAmount { .. })
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        let huge = "9".repeat(40);
        assert!(matches!(
            Amount::parse_units(&huge),
            Err(ValidationError::AmountOverflow(_))
        ));
        // Fits in u128 as an integer but not once scaled to wei.
        assert!(matches!(
            Amount::parse_units("1000000000000000000000"),
            Err(ValidationError::AmountOverflow(_))
        ));
    }

    #[test]
    fn checked_arithmetic() {
        let one = Amount::from_wei(1);
        assert_eq!(Amount::ZERO.checked_sub(one), None);
        assert_eq!(Amount::from_wei(u128::MAX).checked_add(one), None);
        assert_eq!(one.checked_add(one), Some(Amount::from_wei(2)));
    }

    #[test]
    fn serde_wei_string() {
        let a = Amount::from_wei(123_456_789_000_000_000);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"123456789000000000\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
        assert!(serde_json::from_str::<Amount>("\"-5\"").is_err());
    }

    #[test]
    fn serde_units_adapter() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Holder {
            #[serde(with = "as_units")]
            target: Amount,
        }
        let h: Holder = serde_json::from_str(r#"{"target":"0.123456789"}"#).unwrap();
        assert_eq!(h.target.wei(), 123_456_789_000_000_000);
        let out = serde_json::to_string(&h).unwrap();
        assert_eq!(out, r#"{"target":"0.123456789"}"#);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Rendering then parsing is lossless for every representable amount.
        #[test]
        fn units_string_is_lossless(wei in any::<u128>()) {
            let a = Amount::from_wei(wei);
            let back = Amount::parse_units(&a.to_units_string()).unwrap();
            prop_assert_eq!(back, a);
        }
    }
}
