#![deny(missing_docs)]

//! # topup-funder — Merkle-Authorized Treasury Top-Ups
//!
//! A [`FundingService`] holds native currency and keeps allowlisted
//! recipient wallets topped up to a fixed target. Allowlist membership is
//! proven per call against a Merkle root published by an external
//! [`RootRegistry`]; the service stores no allowlist of its own.
//!
//! ## Components
//!
//! - [`RootOfTrust`]: checks caller-supplied roots against the registry.
//! - [`FundingPolicy`]: decides whether and how much to top up.
//! - [`TreasuryLedger`]: the service balance and atomic outbound transfers
//!   through a [`ValueTransfer`] environment.
//! - [`Ownable`]: single-owner guard for withdrawal and ownership changes.
//! - [`EventLog`]: `Funded`, `Withdrew` and `OwnershipTransferred` records.
//!
//! [`StaticRootRegistry`] and [`InMemoryWallets`] are in-process
//! implementations of the two seams, used by the CLI simulator and tests.

pub mod access;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod policy;
pub mod registry;
pub mod service;
pub mod wallets;

pub use access::Ownable;
pub use config::{ConfigError, FunderConfig};
pub use error::{
    ConstructionError, FundError, LedgerError, OwnershipError, RegistryError, RootError,
    TopupError, WithdrawError,
};
pub use events::{EventLog, EventRecord, FunderEvent};
pub use ledger::{OutboundTransfer, TransferRejected, TreasuryLedger, ValueTransfer};
pub use policy::{FundingDecision, FundingPolicy};
pub use registry::{RootOfTrust, RootRegistry, StaticRootRegistry};
pub use service::FundingService;
pub use wallets::{InMemoryWallets, Refusal};
