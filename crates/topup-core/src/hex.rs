//! Hex encoding helpers shared by the byte newtypes.

use crate::error::ValidationError;

/// Encode bytes as lowercase hex without a prefix.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Encode bytes as `0x`-prefixed lowercase hex.
pub fn to_prefixed_hex(bytes: &[u8]) -> String {
    format!("0x{}", to_hex(bytes))
}

/// Decode a hex string, with or without a `0x` prefix. Case-insensitive.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, ValidationError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.len() % 2 != 0 {
        return Err(ValidationError::InvalidHex {
            value: s.to_string(),
            reason: format!("odd number of digits ({})", digits.len()),
        });
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            let pair = digits.get(i..i + 2).ok_or_else(|| ValidationError::InvalidHex {
                value: s.to_string(),
                reason: format!("non-ascii input at position {i}"),
            })?;
            u8::from_str_radix(pair, 16).map_err(|e| ValidationError::InvalidHex {
                value: s.to_string(),
                reason: format!("position {i}: {e}"),
            })
        })
        .collect()
}

/// Decode a hex string into a fixed-width array.
pub fn decode_fixed<const N: usize>(
    s: &str,
    kind: &'static str,
) -> Result<[u8; N], ValidationError> {
    let bytes = decode_hex(s)?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| ValidationError::InvalidLength {
            kind,
            expected: N,
            actual,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_lowercase() {
        assert_eq!(to_hex(&[0xAB, 0x01]), "ab01");
        assert_eq!(to_prefixed_hex(&[0xAB, 0x01]), "0xab01");
    }

    #[test]
    fn decodes_with_and_without_prefix() {
        assert_eq!(decode_hex("0xab01").unwrap(), vec![0xab, 0x01]);
        assert_eq!(decode_hex("AB01").unwrap(), vec![0xab, 0x01]);
        assert_eq!(decode_hex("0X").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn rejects_odd_length() {
        assert!(matches!(
            decode_hex("0xabc"),
            Err(ValidationError::InvalidHex { .. })
        ));
    }

    #[test]
    fn rejects_non_hex() {
        assert!(decode_hex("0xzz").is_err());
        assert!(decode_hex("é0").is_err());
    }

    #[test]
    fn fixed_rejects_wrong_length() {
        let err = decode_fixed::<4>("0x0102", "word").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidLength {
                kind: "word",
                expected: 4,
                actual: 2
            }
        );
        assert_eq!(decode_fixed::<2>("0x0102", "word").unwrap(), [1, 2]);
    }
}
