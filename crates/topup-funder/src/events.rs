//! # Funding Events
//!
//! Every successful state-changing operation appends exactly one
//! [`EventRecord`] to the service's [`EventLog`]. Failed operations emit
//! nothing. Records are serializable so a host can forward them to an
//! indexer, and each emission is mirrored to `tracing` at `info` level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use topup_core::{Address, Amount, Bytes32};

/// A state change observable by off-service indexers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum FunderEvent {
    /// A recipient was topped up.
    Funded {
        /// Feed name of the funded tuple.
        name: Bytes32,
        /// Wallet that received the top-up.
        recipient: Address,
        /// Amount transferred.
        amount: Amount,
        /// Account that invoked `fund`.
        caller: Address,
    },

    /// The owner withdrew from the treasury.
    Withdrew {
        /// Destination wallet.
        destination: Address,
        /// Amount withdrawn.
        amount: Amount,
        /// The owner at the time of withdrawal.
        caller: Address,
    },

    /// Ownership changed hands.
    OwnershipTransferred {
        /// Previous owner; zero at construction.
        previous_owner: Address,
        /// New owner.
        new_owner: Address,
    },
}

impl FunderEvent {
    /// The event's name, e.g. `"Funded"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Funded { .. } => "Funded",
            Self::Withdrew { .. } => "Withdrew",
            Self::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }
}

/// An event with its position in the log and emission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Zero-based position; never reused, even after draining.
    pub sequence: u64,
    /// When the event was emitted.
    pub emitted_at: DateTime<Utc>,
    /// The event.
    pub event: FunderEvent,
}

/// Append-only event log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
    next_sequence: u64,
}

impl EventLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event`.
    pub fn emit(&mut self, event: FunderEvent) -> &EventRecord {
        match &event {
            FunderEvent::Funded {
                name,
                recipient,
                amount,
                caller,
            } => tracing::info!(
                name = %name.to_short_string().unwrap_or_else(|| name.to_hex()),
                recipient = %recipient,
                amount = %amount,
                caller = %caller,
                "Funded"
            ),
            FunderEvent::Withdrew {
                destination,
                amount,
                caller,
            } => tracing::info!(
                destination = %destination,
                amount = %amount,
                caller = %caller,
                "Withdrew"
            ),
            FunderEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            } => tracing::info!(
                previous_owner = %previous_owner,
                new_owner = %new_owner,
                "OwnershipTransferred"
            ),
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.records.push(EventRecord {
            sequence,
            emitted_at: Utc::now(),
            event,
        });
        &self.records[self.records.len() - 1]
    }

    /// Records not yet drained, oldest first.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Remove and return all pending records.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    /// Number of events ever emitted.
    pub fn emitted(&self) -> u64 {
        self.next_sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn withdrew(n: u64) -> FunderEvent {
        FunderEvent::Withdrew {
            destination: Address::from_low_u64(n),
            amount: Amount::from_wei(u128::from(n)),
            caller: Address::from_low_u64(1),
        }
    }

    #[test]
    fn sequences_are_monotonic_across_drains() {
        let mut log = EventLog::new();
        log.emit(withdrew(1));
        log.emit(withdrew(2));
        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].sequence, 1);
        assert!(log.records().is_empty());

        let record = log.emit(withdrew(3));
        assert_eq!(record.sequence, 2);
        assert_eq!(log.emitted(), 3);
    }

    #[test]
    fn event_serializes_with_tag() {
        let event = FunderEvent::Funded {
            name: Bytes32::from_short_string("ETH/USD").unwrap(),
            recipient: Address::from_low_u64(7),
            amount: Amount::from_wei(123_456_789_000_000_000),
            caller: Address::from_low_u64(8),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "Funded");
        assert_eq!(json["amount"], "123456789000000000");

        let back: FunderEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.kind(), "Funded");
    }

    #[test]
    fn record_carries_timestamp() {
        let before = Utc::now();
        let mut log = EventLog::new();
        let record = log.emit(FunderEvent::OwnershipTransferred {
            previous_owner: Address::ZERO,
            new_owner: Address::from_low_u64(1),
        });
        assert!(record.emitted_at >= before);
        assert_eq!(record.event.kind(), "OwnershipTransferred");
    }
}
