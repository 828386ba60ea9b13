//! # Validation Errors
//!
//! Every primitive in this crate validates its input at construction time.
//! These errors carry the rejected input and the expected format so that
//! operators can diagnose a bad allowlist or config file without guesswork.

use thiserror::Error;

/// Validation errors for primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input is not valid hexadecimal.
    #[error("invalid hex \"{value}\": {reason}")]
    InvalidHex {
        /// The string that failed to decode.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Decoded byte length does not match the target type.
    #[error("invalid {kind} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// The type being constructed (e.g. "address").
        kind: &'static str,
        /// Required byte length.
        expected: usize,
        /// Byte length actually supplied.
        actual: usize,
    },

    /// A string is too long to be packed into a `bytes32`.
    #[error("string \"{value}\" is {len} bytes; at most 31 fit in a bytes32")]
    StringTooLong {
        /// The offending string.
        value: String,
        /// Its UTF-8 length.
        len: usize,
    },

    /// A decimal amount string could not be parsed.
    #[error("invalid amount \"{value}\": {reason}")]
    InvalidAmount {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An amount exceeds the representable range.
    #[error("amount overflow: {0}")]
    AmountOverflow(String),
}
