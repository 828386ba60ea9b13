//! # Funding Policy
//!
//! Decides whether a recipient needs a top-up and by how much. A
//! recipient below the target is raised exactly to it; one at or above
//! the target gets nothing.

use serde::{Deserialize, Serialize};
use topup_core::Amount;

/// Outcome of evaluating a recipient's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "amount", rename_all = "snake_case")]
pub enum FundingDecision {
    /// The recipient already holds at least the target.
    NotNeeded,
    /// Transfer this amount to reach the target. Always non-zero.
    Need(Amount),
}

/// Fixed-target funding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundingPolicy {
    target: Amount,
}

impl FundingPolicy {
    /// 0.123456789 units.
    pub const DEFAULT_TARGET: Amount = Amount::from_wei(123_456_789_000_000_000);

    /// A policy topping recipients up to `target`.
    pub const fn new(target: Amount) -> Self {
        Self { target }
    }

    /// The target balance.
    pub const fn target(&self) -> Amount {
        self.target
    }

    /// Evaluate a recipient holding `current`.
    pub fn evaluate(&self, current: Amount) -> FundingDecision {
        match self.target.checked_sub(current) {
            Some(gap) if !gap.is_zero() => FundingDecision::Need(gap),
            _ => FundingDecision::NotNeeded,
        }
    }
}

impl Default for FundingPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TARGET)
    }
}
