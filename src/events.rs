// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Typed event log
//!
//! Components emit [`BridgeEvent`]s into their chain's [`EventLog`]. The log is
//! part of chain state, so a reverted call leaves no events behind.

use alloy_primitives::{Address, Bytes, B256, U256};

use crate::protocol::{ChainSelector, EndpointId};

/// Events emitted by ledgers, cores, adapters and endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    Transfer {
        from: Address,
        to: Address,
        value: U256,
    },
    Approval {
        owner: Address,
        spender: Address,
        value: U256,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
    AdapterSet {
        adapter: Address,
        allowed: bool,
    },
    BridgeOut {
        transfer_id: B256,
        from: Address,
        amount: U256,
    },
    BridgeIn {
        transfer_id: B256,
        transport_id: B256,
        to: Address,
        amount: U256,
    },
    PeerSet {
        eid: EndpointId,
        peer: B256,
    },
    LzSendOptionsSet {
        eid: EndpointId,
        options: Bytes,
    },
    LzSend {
        transfer_id: B256,
        dst_eid: EndpointId,
        to: Address,
        amount: U256,
        guid: B256,
    },
    LzReceive {
        transfer_id: B256,
        to: Address,
        amount: U256,
    },
    CcipPeerSet {
        selector: ChainSelector,
        peer: Bytes,
    },
    CcipExtraArgsSet {
        selector: ChainSelector,
        extra_args: Bytes,
    },
    CcipSend {
        transfer_id: B256,
        selector: ChainSelector,
        to: Address,
        amount: U256,
        message_id: B256,
    },
    CcipReceive {
        transfer_id: B256,
        to: Address,
        amount: U256,
    },
    PacketSent {
        guid: B256,
        dst_eid: EndpointId,
    },
    PayloadStored {
        guid: B256,
        reason: String,
    },
    CcipMessageSent {
        message_id: B256,
        selector: ChainSelector,
    },
}

/// An emitted event with its emitting contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    pub emitter: Address,
    pub event: BridgeEvent,
}

/// Append-only event log of one chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    entries: Vec<Log>,
}

impl EventLog {
    pub fn emit(&mut self, emitter: Address, event: BridgeEvent) {
        self.entries.push(Log { emitter, event });
    }

    pub fn as_slice(&self) -> &[Log] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Events emitted by one contract, oldest first
    pub fn emitted_by(&self, emitter: Address) -> impl Iterator<Item = &BridgeEvent> {
        self.entries
            .iter()
            .filter(move |log| log.emitter == emitter)
            .map(|log| &log.event)
    }
}
