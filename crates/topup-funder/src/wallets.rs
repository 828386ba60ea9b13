//! In-memory wallet environment for development, simulation and tests.
//!
//! Wallets can be configured to refuse incoming value, either always or
//! only when the operation was invoked by a particular account, which
//! models contract recipients whose receive hook reverts.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use topup_core::{Address, Amount};

use crate::ledger::{OutboundTransfer, TransferRejected, ValueTransfer};

/// When a wallet refuses incoming value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "refuse", content = "origin", rename_all = "snake_case")]
pub enum Refusal {
    /// Every delivery is refused.
    Always,
    /// Deliveries on behalf of this origin are refused.
    FromOrigin(Address),
}

/// Balances of every wallet except the treasury.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWallets {
    balances: HashMap<Address, Amount>,
    refusals: HashMap<Address, HashSet<Refusal>>,
}

impl InMemoryWallets {
    /// An empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `address`'s balance.
    pub fn set_balance(&mut self, address: Address, amount: Amount) {
        self.balances.insert(address, amount);
    }

    /// Make `address` refuse deliveries matching `refusal`.
    pub fn refuse(&mut self, address: Address, refusal: Refusal) {
        self.refusals.entry(address).or_default().insert(refusal);
    }

    /// Remove every refusal rule for `address`.
    pub fn accept_all(&mut self, address: &Address) {
        self.refusals.remove(address);
    }

    /// Sum of all wallet balances.
    pub fn total(&self) -> u128 {
        self.balances.values().map(Amount::wei).sum()
    }

    fn refuses(&self, transfer: &OutboundTransfer) -> bool {
        self.refusals.get(&transfer.to).is_some_and(|rules| {
            rules.iter().any(|rule| match rule {
                Refusal::Always => true,
                Refusal::FromOrigin(origin) => *origin == transfer.origin,
            })
        })
    }
}

impl ValueTransfer for InMemoryWallets {
    fn balance_of(&self, address: &Address) -> Amount {
        self.balances.get(address).copied().unwrap_or_default()
    }

    fn deliver(&mut self, transfer: &OutboundTransfer) -> Result<(), TransferRejected> {
        if self.refuses(transfer) {
            return Err(TransferRejected::new(format!(
                "{} refused value from {}",
                transfer.to, transfer.from
            )));
        }
        let current = self.balance_of(&transfer.to);
        let updated = current
            .checked_add(transfer.amount)
            .ok_or_else(|| TransferRejected::new("recipient balance overflow"))?;
        self.balances.insert(transfer.to, updated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(to: u64, origin: u64, wei: u128) -> OutboundTransfer {
        OutboundTransfer {
            from: Address::from_low_u64(0xF0),
            to: Address::from_low_u64(to),
            amount: Amount::from_wei(wei),
            origin: Address::from_low_u64(origin),
        }
    }

    #[test]
    fn unknown_wallet_has_zero_balance() {
        let wallets = InMemoryWallets::new();
        assert_eq!(wallets.balance_of(&Address::from_low_u64(1)), Amount::ZERO);
    }

    #[test]
    fn delivery_credits_recipient() {
        let mut wallets = InMemoryWallets::new();
        wallets.set_balance(Address::from_low_u64(1), Amount::from_wei(5));
        wallets.deliver(&transfer(1, 2, 10)).unwrap();
        assert_eq!(wallets.balance_of(&Address::from_low_u64(1)), Amount::from_wei(15));
        assert_eq!(wallets.total(), 15);
    }

    #[test]
    fn always_refusal() {
        let mut wallets = InMemoryWallets::new();
        wallets.refuse(Address::from_low_u64(1), Refusal::Always);
        assert!(wallets.deliver(&transfer(1, 2, 10)).is_err());
        assert_eq!(wallets.total(), 0);
    }

    #[test]
    fn origin_refusal_is_selective() {
        let mut wallets = InMemoryWallets::new();
        wallets.refuse(
            Address::from_low_u64(1),
            Refusal::FromOrigin(Address::from_low_u64(2)),
        );
        assert!(wallets.deliver(&transfer(1, 2, 10)).is_err());
        assert!(wallets.deliver(&transfer(1, 3, 10)).is_ok());
        assert_eq!(wallets.balance_of(&Address::from_low_u64(1)), Amount::from_wei(10));
    }

    #[test]
    fn accept_all_clears_refusals() {
        let mut wallets = InMemoryWallets::new();
        let addr = Address::from_low_u64(1);
        wallets.refuse(addr, Refusal::Always);
        wallets.accept_all(&addr);
        assert!(wallets.deliver(&transfer(1, 2, 10)).is_ok());
    }

    #[test]
    fn overflow_is_refused_without_change() {
        let mut wallets = InMemoryWallets::new();
        wallets.set_balance(Address::from_low_u64(1), Amount::from_wei(u128::MAX));
        assert!(wallets.deliver(&transfer(1, 2, 1)).is_err());
        assert_eq!(
            wallets.balance_of(&Address::from_low_u64(1)),
            Amount::from_wei(u128::MAX)
        );
    }
}
