#![deny(missing_docs)]

//! # topup-core — Foundational Types for the Top-Up Guard
//!
//! This crate defines the primitive types that every other crate in the
//! workspace depends on. It has no internal crate dependencies, only `serde`
//! and `thiserror` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for fixed-width values.** A [`Bytes32`] is not an
//!    [`Address`], and neither is an [`Amount`]. Each has its own parsing,
//!    display and zero-value check.
//!
//! 2. **Hex on the wire.** Byte newtypes serialize as `0x`-prefixed lowercase
//!    hex strings so that JSON/YAML artifacts match what EVM tooling emits.
//!
//! 3. **Checked arithmetic.** [`Amount`] never wraps; every operation that
//!    can overflow returns `Option` or a [`ValidationError`].
//!
//! 4. **[`ValidationError`] hierarchy.** Structured errors with `thiserror`,
//!    no `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod amount;
pub mod bytes;
pub mod error;
pub mod hex;
pub mod identity;

// Re-export primary types at crate root for ergonomic imports.
pub use amount::Amount;
pub use bytes::{Address, Bytes32};
pub use error::ValidationError;
pub use identity::{IdentityField, IdentityTuple};
