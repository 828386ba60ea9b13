//! # Funding Service
//!
//! Holds a treasury of native currency and tops up allowlisted recipient
//! wallets to a fixed target. The allowlist lives off-service as a Merkle
//! tree whose root is published by a [`RootRegistry`]; callers prove
//! membership per call.
//!
//! ## Security Invariant
//!
//! `fund` moves value only when all of the following hold:
//!
//! 1. No field of the identity tuple is zero.
//! 2. The supplied root equals the registry's root *at call time*.
//! 3. The proof reconstructs that root from the tuple's leaf.
//! 4. The recipient holds less than the target.
//! 5. The treasury covers the gap.
//!
//! The transfer amount is exactly the gap, so a funded recipient lands on
//! the target and never above it. Any failure leaves the treasury, the
//! recipient, ownership and the event log unchanged.
//!
//! Every mutating operation takes `&mut self`, so no second operation can
//! observe or enter the service while a transfer is in flight.

use topup_core::{Address, Amount, Bytes32, IdentityField, IdentityTuple};
use topup_crypto::verify_identity;

use crate::access::Ownable;
use crate::config::FunderConfig;
use crate::error::{ConstructionError, FundError, LedgerError, OwnershipError, WithdrawError};
use crate::events::{EventLog, EventRecord, FunderEvent};
use crate::ledger::{TreasuryLedger, ValueTransfer};
use crate::policy::{FundingDecision, FundingPolicy};
use crate::registry::{RootOfTrust, RootRegistry};

/// The Merkle-authorized top-up service.
#[derive(Debug)]
pub struct FundingService<R> {
    root_of_trust: RootOfTrust<R>,
    policy: FundingPolicy,
    ledger: TreasuryLedger,
    access: Ownable,
    events: EventLog,
}

impl<R: RootRegistry> FundingService<R> {
    /// Construct a service at `address` trusting `registry`, owned by
    /// `owner`, topping recipients up per `policy`.
    ///
    /// Emits `OwnershipTransferred(0, owner)`.
    pub fn new(
        address: Address,
        registry: R,
        owner: Address,
        policy: FundingPolicy,
    ) -> Result<Self, ConstructionError> {
        if registry.address().is_zero() {
            return Err(ConstructionError::RegistryZero);
        }
        let access = Ownable::new(owner).map_err(|_| ConstructionError::ZeroOwner)?;

        let mut events = EventLog::new();
        events.emit(FunderEvent::OwnershipTransferred {
            previous_owner: Address::ZERO,
            new_owner: owner,
        });

        tracing::info!(
            service = %address,
            registry = %registry.address(),
            owner = %owner,
            target = %policy.target(),
            "funding service constructed"
        );

        Ok(Self {
            root_of_trust: RootOfTrust::new(registry),
            policy,
            ledger: TreasuryLedger::new(address),
            access,
            events,
        })
    }

    /// Construct from a loaded [`FunderConfig`].
    ///
    /// `registry` must be the registry at `config.registry_address`;
    /// any other handle is rejected with `RegistryMismatch`.
    pub fn from_config(registry: R, config: &FunderConfig) -> Result<Self, ConstructionError> {
        let actual = registry.address();
        if actual != config.registry_address {
            tracing::warn!(
                configured = %config.registry_address,
                actual = %actual,
                "registry handle does not match configured address"
            );
            return Err(ConstructionError::RegistryMismatch {
                configured: config.registry_address,
                actual,
            });
        }
        Self::new(
            config.service_address,
            registry,
            config.owner,
            config.policy(),
        )
    }

    // ── Funding ─────────────────────────────────────────────────────────

    /// Top up `identity.recipient` to the target.
    ///
    /// `caller` is recorded in the `Funded` event; anyone may fund.
    /// Returns the amount transferred.
    pub fn fund<E: ValueTransfer + ?Sized>(
        &mut self,
        env: &mut E,
        caller: Address,
        identity: &IdentityTuple,
        root: &Bytes32,
        proof: &[Bytes32],
    ) -> Result<Amount, FundError> {
        if let Some(field) = identity.first_zero_field() {
            tracing::debug!(?field, "fund rejected: zero field");
            return Err(match field {
                IdentityField::Name => FundError::NameZero,
                IdentityField::FeedId => FundError::FeedIdZero,
                IdentityField::Recipient => FundError::RecipientZero,
            });
        }

        self.root_of_trust.check_root(root)?;

        if !verify_identity(identity, proof, root) {
            tracing::debug!(identity = %identity, proof_len = proof.len(), "fund rejected: invalid proof");
            return Err(FundError::InvalidProof);
        }

        let balance = self.balance_of(&*env, &identity.recipient);
        let amount = match self.policy.evaluate(balance) {
            FundingDecision::Need(amount) => amount,
            FundingDecision::NotNeeded => {
                tracing::debug!(recipient = %identity.recipient, balance = %balance, "fund rejected: not needed");
                return Err(FundError::FundNotNeeded {
                    balance,
                    target: self.policy.target(),
                });
            }
        };

        if !self.ledger.can_cover(amount) {
            return Err(FundError::InsufficientBalance {
                available: self.ledger.balance(),
                required: amount,
            });
        }

        self.ledger
            .transfer_out(env, identity.recipient, amount, caller)?;

        self.events.emit(FunderEvent::Funded {
            name: identity.name,
            recipient: identity.recipient,
            amount,
            caller,
        });
        Ok(amount)
    }

    /// What `fund` would transfer to `recipient` now, ignoring the
    /// treasury balance and proof checks.
    pub fn needed_amount<E: ValueTransfer + ?Sized>(
        &self,
        env: &E,
        recipient: &Address,
    ) -> FundingDecision {
        self.policy.evaluate(self.balance_of(env, recipient))
    }

    /// Balance of `address`, reading the ledger for the service's own
    /// address.
    fn balance_of<E: ValueTransfer + ?Sized>(&self, env: &E, address: &Address) -> Amount {
        if *address == self.ledger.address() {
            self.ledger.balance()
        } else {
            env.balance_of(address)
        }
    }

    // ── Treasury ────────────────────────────────────────────────────────

    /// Accept an inbound deposit of `amount`.
    pub fn receive(&mut self, from: Address, amount: Amount) -> Result<Amount, LedgerError> {
        let balance = self.ledger.credit(amount)?;
        tracing::debug!(from = %from, amount = %amount, balance = %balance, "deposit received");
        Ok(balance)
    }

    /// Owner-only: move `amount` from the treasury to `destination`.
    pub fn withdraw<E: ValueTransfer + ?Sized>(
        &mut self,
        env: &mut E,
        caller: Address,
        destination: Address,
        amount: Amount,
    ) -> Result<(), WithdrawError> {
        self.access.require_owner(&caller)?;
        if destination.is_zero() {
            return Err(WithdrawError::RecipientZero);
        }
        if amount.is_zero() {
            return Err(WithdrawError::AmountZero);
        }
        if !self.ledger.can_cover(amount) {
            return Err(WithdrawError::InsufficientBalance {
                available: self.ledger.balance(),
                required: amount,
            });
        }

        self.ledger.transfer_out(env, destination, amount, caller)?;

        self.events.emit(FunderEvent::Withdrew {
            destination,
            amount,
            caller,
        });
        Ok(())
    }

    // ── Ownership ───────────────────────────────────────────────────────

    /// Owner-only: hand ownership to `new_owner`.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), OwnershipError> {
        let previous_owner = self.access.transfer_ownership(&caller, new_owner)?;
        self.events.emit(FunderEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    // ── Accessors ───────────────────────────────────────────────────────

    /// The service's address.
    pub fn address(&self) -> Address {
        self.ledger.address()
    }

    /// Treasury balance.
    pub fn balance(&self) -> Amount {
        self.ledger.balance()
    }

    /// The funding target.
    pub fn target(&self) -> Amount {
        self.policy.target()
    }

    /// The current owner.
    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    /// The registry's address.
    pub fn registry_address(&self) -> Address {
        self.root_of_trust.registry_address()
    }

    /// Events not yet drained.
    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    /// Remove and return pending events.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }
}
