// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Settlement fingerprint ledgers
//!
//! [`FingerprintLedger`] holds transfer ids in a single namespace shared by the
//! outbound and inbound paths of a core: an id settled in one direction can
//! never be settled in the other. [`TransportLedger`] holds delivery ids and is
//! consulted on the inbound path only.

use alloy_primitives::B256;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::error::{BridgeError, Result};

/// Direction in which a transfer id was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Outbound,
    Inbound,
}

/// Transfer fingerprints, one namespace for both directions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintLedger {
    settled: HashMap<B256, Direction>,
}

impl FingerprintLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with `TransferReplay` if the id was already settled either way.
    pub fn ensure_unsettled(&self, transfer_id: B256) -> Result<()> {
        if self.settled.contains_key(&transfer_id) {
            return Err(BridgeError::TransferReplay(transfer_id));
        }
        Ok(())
    }

    /// Single check-then-insert; the only mutation this ledger offers.
    pub fn record(&mut self, transfer_id: B256, direction: Direction) -> Result<()> {
        match self.settled.entry(transfer_id) {
            Entry::Occupied(_) => Err(BridgeError::TransferReplay(transfer_id)),
            Entry::Vacant(slot) => {
                slot.insert(direction);
                Ok(())
            }
        }
    }

    /// Settled in either direction
    pub fn contains(&self, transfer_id: &B256) -> bool {
        self.settled.contains_key(transfer_id)
    }

    /// Outbound view
    pub fn outbound(&self, transfer_id: &B256) -> bool {
        self.settled.get(transfer_id) == Some(&Direction::Outbound)
    }

    /// Inbound view
    pub fn inbound(&self, transfer_id: &B256) -> bool {
        self.settled.get(transfer_id) == Some(&Direction::Inbound)
    }

    pub fn len(&self) -> usize {
        self.settled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settled.is_empty()
    }
}

/// Consumed transport delivery ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportLedger {
    consumed: HashSet<B256>,
}

impl TransportLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_unconsumed(&self, transport_id: B256) -> Result<()> {
        if self.consumed.contains(&transport_id) {
            return Err(BridgeError::TransportReplay(transport_id));
        }
        Ok(())
    }

    pub fn record(&mut self, transport_id: B256) -> Result<()> {
        if !self.consumed.insert(transport_id) {
            return Err(BridgeError::TransportReplay(transport_id));
        }
        Ok(())
    }

    pub fn contains(&self, transport_id: &B256) -> bool {
        self.consumed.contains(transport_id)
    }

    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_id_blocks_inbound_reuse() {
        let mut ledger = FingerprintLedger::new();
        let id = B256::repeat_byte(1);

        ledger.record(id, Direction::Outbound).unwrap();

        let err = ledger.record(id, Direction::Inbound).unwrap_err();
        assert!(matches!(err, BridgeError::TransferReplay(replayed) if replayed == id));
        assert!(ledger.outbound(&id));
        assert!(!ledger.inbound(&id));
    }

    #[test]
    fn test_inbound_id_blocks_outbound_reuse() {
        let mut ledger = FingerprintLedger::new();
        let id = B256::repeat_byte(2);

        ledger.record(id, Direction::Inbound).unwrap();

        assert!(ledger.ensure_unsettled(id).is_err());
        assert!(ledger.record(id, Direction::Outbound).is_err());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_transport_ledger_rejects_redelivery() {
        let mut ledger = TransportLedger::new();
        let id = B256::repeat_byte(3);

        ledger.record(id).unwrap();

        assert!(matches!(
            ledger.record(id).unwrap_err(),
            BridgeError::TransportReplay(replayed) if replayed == id
        ));
        assert!(ledger.contains(&id));
    }

    #[test]
    fn test_namespaces_are_independent() {
        let mut transfers = FingerprintLedger::new();
        let mut transports = TransportLedger::new();
        let id = B256::repeat_byte(4);

        transfers.record(id, Direction::Inbound).unwrap();
        transports.record(id).unwrap();

        assert!(transfers.contains(&id));
        assert!(transports.contains(&id));
    }
}
