//! # Funder Error Types
//!
//! One error enum per public operation, so that a caller matching on a
//! `fund` failure never has to consider `NotOwner`, and a `withdraw`
//! failure never reports `InvalidProof`. Every variant aborts only the
//! offending call; the service state is left exactly as it was.
//!
//! [`TopupError`] aggregates them for callers that drive several
//! operations (the scenario runner, the CLI).

use thiserror::Error;
use topup_core::{Address, Amount, Bytes32, ValidationError};
use topup_crypto::CryptoError;

use crate::config::ConfigError;

/// The root registry could not be queried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry call failed.
    #[error("root registry {registry} unavailable: {reason}")]
    Unavailable {
        /// Registry address.
        registry: Address,
        /// Failure detail from the registry adapter.
        reason: String,
    },
}

/// Failures of the root-of-trust check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RootError {
    /// The supplied root differs from the registered one.
    #[error("invalid root: supplied {supplied}, registered {registered}")]
    Invalid {
        /// Root supplied by the caller.
        supplied: Bytes32,
        /// Root currently held by the registry.
        registered: Bytes32,
    },

    /// The registry could not be read.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Failures of an outbound treasury transfer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger holds less than the requested amount.
    #[error("insufficient balance: have {available}, need {required}")]
    InsufficientBalance {
        /// Current ledger balance.
        available: Amount,
        /// Amount requested.
        required: Amount,
    },

    /// The destination rejected the value; nothing moved.
    #[error("transfer of {amount} to {destination} unsuccessful: {reason}")]
    TransferFailed {
        /// Intended recipient.
        destination: Address,
        /// Amount that was not delivered.
        amount: Amount,
        /// Rejection reason reported by the destination.
        reason: String,
    },

    /// Crediting the ledger would overflow.
    #[error("ledger balance overflow crediting {amount}")]
    Overflow {
        /// Amount that could not be credited.
        amount: Amount,
    },
}

/// Failures of the owner guard.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OwnershipError {
    /// The caller is not the current owner.
    #[error("caller {caller} is not the owner")]
    NotOwner {
        /// The rejected caller.
        caller: Address,
    },

    /// The zero address cannot own the service.
    #[error("new owner is the zero address")]
    ZeroOwner,
}

/// Failures of `fund`, in the order they are checked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FundError {
    /// `name` is zero.
    #[error("name zero")]
    NameZero,

    /// `feed_id` is zero.
    #[error("feed ID zero")]
    FeedIdZero,

    /// `recipient` is the zero address.
    #[error("recipient address zero")]
    RecipientZero,

    /// The supplied root is not the registry's current root.
    #[error("invalid root: supplied {supplied}, registered {registered}")]
    InvalidRoot {
        /// Root supplied by the caller.
        supplied: Bytes32,
        /// Root currently held by the registry.
        registered: Bytes32,
    },

    /// The registry could not be read.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The proof does not reconstruct the supplied root for this tuple.
    #[error("invalid proof")]
    InvalidProof,

    /// The recipient already holds at least the target.
    #[error("fund not needed: recipient holds {balance}, target {target}")]
    FundNotNeeded {
        /// Recipient's balance.
        balance: Amount,
        /// Funding target.
        target: Amount,
    },

    /// The treasury cannot cover the top-up.
    #[error("insufficient balance: have {available}, need {required}")]
    InsufficientBalance {
        /// Treasury balance.
        available: Amount,
        /// Top-up amount.
        required: Amount,
    },

    /// The recipient rejected the transfer.
    #[error("transfer of {amount} to {destination} unsuccessful: {reason}")]
    TransferFailed {
        /// Recipient.
        destination: Address,
        /// Amount that was not delivered.
        amount: Amount,
        /// Rejection reason.
        reason: String,
    },
}

/// Failures of `withdraw`, in the order they are checked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WithdrawError {
    /// The caller is not the owner.
    #[error("caller {caller} is not the owner")]
    NotOwner {
        /// The rejected caller.
        caller: Address,
    },

    /// `destination` is the zero address.
    #[error("recipient address zero")]
    RecipientZero,

    /// `amount` is zero.
    #[error("amount zero")]
    AmountZero,

    /// The treasury holds less than `amount`.
    #[error("insufficient balance: have {available}, need {required}")]
    InsufficientBalance {
        /// Treasury balance.
        available: Amount,
        /// Requested amount.
        required: Amount,
    },

    /// The destination rejected the transfer.
    #[error("transfer of {amount} to {destination} unsuccessful: {reason}")]
    TransferFailed {
        /// Destination.
        destination: Address,
        /// Amount that was not delivered.
        amount: Amount,
        /// Rejection reason.
        reason: String,
    },
}

/// Failures constructing a [`FundingService`](crate::FundingService).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// The registry's address is zero.
    #[error("registry address zero")]
    RegistryZero,

    /// The initial owner is zero.
    #[error("owner address zero")]
    ZeroOwner,

    /// The registry handle is not the registry the configuration names.
    #[error("registry {actual} does not match configured registry {configured}")]
    RegistryMismatch {
        /// Address from the configuration.
        configured: Address,
        /// Address of the supplied registry.
        actual: Address,
    },
}

impl From<RootError> for FundError {
    fn from(err: RootError) -> Self {
        match err {
            RootError::Invalid {
                supplied,
                registered,
            } => Self::InvalidRoot {
                supplied,
                registered,
            },
            RootError::Registry(e) => Self::Registry(e),
        }
    }
}

impl From<LedgerError> for FundError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance {
                available,
                required,
            } => Self::InsufficientBalance {
                available,
                required,
            },
            LedgerError::TransferFailed {
                destination,
                amount,
                reason,
            } => Self::TransferFailed {
                destination,
                amount,
                reason,
            },
            // Outbound transfers only ever debit the ledger.
            LedgerError::Overflow { amount } => Self::InsufficientBalance {
                available: Amount::ZERO,
                required: amount,
            },
        }
    }
}

impl From<LedgerError> for WithdrawError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance {
                available,
                required,
            } => Self::InsufficientBalance {
                available,
                required,
            },
            LedgerError::TransferFailed {
                destination,
                amount,
                reason,
            } => Self::TransferFailed {
                destination,
                amount,
                reason,
            },
            LedgerError::Overflow { amount } => Self::InsufficientBalance {
                available: Amount::ZERO,
                required: amount,
            },
        }
    }
}

impl From<OwnershipError> for WithdrawError {
    fn from(err: OwnershipError) -> Self {
        match err {
            OwnershipError::NotOwner { caller } => Self::NotOwner { caller },
            // require_owner never reports ZeroOwner; treat it as a failed gate.
            OwnershipError::ZeroOwner => Self::NotOwner {
                caller: Address::ZERO,
            },
        }
    }
}

/// Any error the funder crate can produce.
#[derive(Error, Debug)]
pub enum TopupError {
    /// `fund` failed.
    #[error("fund: {0}")]
    Fund(#[from] FundError),

    /// `withdraw` failed.
    #[error("withdraw: {0}")]
    Withdraw(#[from] WithdrawError),

    /// Ownership change failed.
    #[error("ownership: {0}")]
    Ownership(#[from] OwnershipError),

    /// Inbound credit failed.
    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    /// Service construction failed.
    #[error("construction: {0}")]
    Construction(#[from] ConstructionError),

    /// Configuration could not be loaded.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// Primitive validation failed.
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    /// Merkle tree handling failed.
    #[error("crypto: {0}")]
    Crypto(#[from] CryptoError),
}

impl TopupError {
    /// A stable identifier for the failure, e.g. `"InvalidProof"`.
    ///
    /// Scenario files match expectations against this code rather than
    /// the human-readable message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Fund(e) => match e {
                FundError::NameZero => "NameZero",
                FundError::FeedIdZero => "FeedIdZero",
                FundError::RecipientZero => "RecipientZero",
                FundError::InvalidRoot { .. } => "InvalidRoot",
                FundError::Registry(_) => "RegistryUnavailable",
                FundError::InvalidProof => "InvalidProof",
                FundError::FundNotNeeded { .. } => "FundNotNeeded",
                FundError::InsufficientBalance { .. } => "InsufficientBalance",
                FundError::TransferFailed { .. } => "TransferFailed",
            },
            Self::Withdraw(e) => match e {
                WithdrawError::NotOwner { .. } => "NotOwner",
                WithdrawError::RecipientZero => "RecipientZero",
                WithdrawError::AmountZero => "AmountZero",
                WithdrawError::InsufficientBalance { .. } => "InsufficientBalance",
                WithdrawError::TransferFailed { .. } => "TransferFailed",
            },
            Self::Ownership(e) => match e {
                OwnershipError::NotOwner { .. } => "NotOwner",
                OwnershipError::ZeroOwner => "ZeroOwner",
            },
            Self::Ledger(e) => match e {
                LedgerError::InsufficientBalance { .. } => "InsufficientBalance",
                LedgerError::TransferFailed { .. } => "TransferFailed",
                LedgerError::Overflow { .. } => "Overflow",
            },
            Self::Construction(e) => match e {
                ConstructionError::RegistryZero => "RegistryZero",
                ConstructionError::ZeroOwner => "ZeroOwner",
                ConstructionError::RegistryMismatch { .. } => "RegistryMismatch",
            },
            Self::Config(_) => "Config",
            Self::Validation(_) => "Validation",
            Self::Crypto(_) => "Crypto",
        }
    }
}
