//! # Treasury Ledger
//!
//! The service's own balance of native currency, and the seam through
//! which value leaves it.
//!
//! ## Security Invariant
//!
//! Outbound transfers follow check, then effect, then interaction: the
//! ledger is decremented *before* the destination is invoked, and the
//! debit is restored if the destination rejects the value. A failed
//! transfer therefore leaves the ledger exactly as it was, and no
//! observer ever sees value counted in two places.
//!
//! The treasury's own address is not part of the environment. A transfer
//! to it is checked against the balance like any other, then moves nothing.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use topup_core::{Address, Amount};

use crate::error::LedgerError;

/// A single outbound value movement presented to the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundTransfer {
    /// The treasury's address.
    pub from: Address,
    /// Destination wallet.
    pub to: Address,
    /// Value to deliver.
    pub amount: Amount,
    /// The account that invoked the service operation.
    pub origin: Address,
}

/// The destination refused the value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct TransferRejected {
    /// Reason reported by the destination.
    pub reason: String,
}

impl TransferRejected {
    /// Construct a rejection.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The environment holding every wallet except the treasury's.
///
/// ## Security Invariant
///
/// `deliver` must either credit `transfer.to` in full and return `Ok`,
/// or change nothing and return `Err`. Partial delivery is not a state
/// the ledger can restore from.
pub trait ValueTransfer {
    /// Current balance of `address`.
    fn balance_of(&self, address: &Address) -> Amount;

    /// Deliver `transfer.amount` to `transfer.to`.
    fn deliver(&mut self, transfer: &OutboundTransfer) -> Result<(), TransferRejected>;
}

/// The service's balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreasuryLedger {
    address: Address,
    balance: Amount,
}

impl TreasuryLedger {
    /// An empty ledger for the treasury at `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balance: Amount::ZERO,
        }
    }

    /// The treasury's address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current balance.
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Whether the ledger holds at least `amount`.
    pub fn can_cover(&self, amount: Amount) -> bool {
        self.balance >= amount
    }

    /// Credit an inbound deposit.
    pub fn credit(&mut self, amount: Amount) -> Result<Amount, LedgerError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { amount })?;
        Ok(self.balance)
    }

    /// Move `amount` to `to` through `env`, restoring the debit if the
    /// destination rejects it.
    ///
    /// When `to` is the treasury itself the balance is left as is and `env`
    /// is not called.
    pub fn transfer_out<E: ValueTransfer + ?Sized>(
        &mut self,
        env: &mut E,
        to: Address,
        amount: Amount,
        origin: Address,
    ) -> Result<(), LedgerError> {
        let previous = self.balance;
        let remaining = previous
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                available: previous,
                required: amount,
            })?;

        if to == self.address {
            tracing::debug!(amount = %amount, "outbound transfer to treasury itself; balance unchanged");
            return Ok(());
        }

        self.balance = remaining;

        let transfer = OutboundTransfer {
            from: self.address,
            to,
            amount,
            origin,
        };
        if let Err(rejected) = env.deliver(&transfer) {
            self.balance = previous;
            tracing::warn!(
                destination = %to,
                amount = %amount,
                reason = %rejected.reason,
                "outbound transfer rejected; ledger restored"
            );
            return Err(LedgerError::TransferFailed {
                destination: to,
                amount,
                reason: rejected.reason,
            });
        }

        tracing::debug!(destination = %to, amount = %amount, remaining = %remaining, "outbound transfer delivered");
        Ok(())
    }
}
