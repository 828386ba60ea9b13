//! # Single-Owner Access Control
//!
//! Exactly one owner at any time. Ownership moves only by an explicit
//! transfer from the current owner; there is no renounce.

use topup_core::Address;

use crate::error::OwnershipError;

/// The single-owner guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    /// Install `owner`. The zero address is refused.
    pub fn new(owner: Address) -> Result<Self, OwnershipError> {
        if owner.is_zero() {
            return Err(OwnershipError::ZeroOwner);
        }
        Ok(Self { owner })
    }

    /// The current owner.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Fail with `NotOwner` unless `caller` is the owner.
    pub fn require_owner(&self, caller: &Address) -> Result<(), OwnershipError> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(OwnershipError::NotOwner { caller: *caller })
        }
    }

    /// Hand ownership to `new_owner`, returning the previous owner.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<Address, OwnershipError> {
        self.require_owner(caller)?;
        if new_owner.is_zero() {
            return Err(OwnershipError::ZeroOwner);
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}
