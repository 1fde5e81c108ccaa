// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! CCIP-style router

use alloy_primitives::{Address, Bytes, B256, U256};
use std::collections::{HashSet, VecDeque};
use tracing::info;

use super::FeeSchedule;
use crate::error::{BridgeError, Result};
use crate::events::{BridgeEvent, EventLog};
use crate::protocol::{ccip_message_id, ChainSelector};

/// A token attached to a CCIP message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    pub token: Address,
    pub amount: U256,
}

/// Outbound message as handed to the router
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Evm2AnyMessage {
    pub receiver: Bytes,
    pub data: Bytes,
    pub token_amounts: Vec<TokenAmount>,
    /// Zero address means native fee payment
    pub fee_token: Address,
    pub extra_args: Bytes,
}

/// Inbound message as handed to the receiving contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Any2EvmMessage {
    pub message_id: B256,
    pub source_chain_selector: ChainSelector,
    pub sender: Bytes,
    pub data: Bytes,
    pub dest_token_amounts: Vec<TokenAmount>,
}

/// A routed message in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcipPacket {
    pub destination: ChainSelector,
    pub receiver: Bytes,
    pub message: Any2EvmMessage,
}

/// Per-chain CCIP router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcipRouter {
    address: Address,
    selector: ChainSelector,
    fees: FeeSchedule,
    supported: HashSet<ChainSelector>,
    sequence: u64,
    outbox: VecDeque<CcipPacket>,
}

impl CcipRouter {
    pub fn new(address: Address, selector: ChainSelector, fees: FeeSchedule) -> Self {
        Self {
            address,
            selector,
            fees,
            supported: HashSet::new(),
            sequence: 0,
            outbox: VecDeque::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn selector(&self) -> ChainSelector {
        self.selector
    }

    pub fn add_supported_chain(&mut self, selector: ChainSelector) {
        self.supported.insert(selector);
    }

    pub fn is_chain_supported(&self, selector: ChainSelector) -> bool {
        self.supported.contains(&selector)
    }

    pub fn get_fee(&self, destination: ChainSelector, message: &Evm2AnyMessage) -> Result<U256> {
        if !self.is_chain_supported(destination) {
            return Err(BridgeError::UnsupportedDestinationChain(
                destination.as_u64(),
            ));
        }
        Ok(self.fees.quote(message.data.len(), message.extra_args.len()))
    }

    /// Queues `message` for `destination` and returns its message id.
    pub fn ccip_send(
        &mut self,
        sender: Address,
        destination: ChainSelector,
        message: Evm2AnyMessage,
        paid: U256,
        logs: &mut EventLog,
    ) -> Result<B256> {
        let fee = self.get_fee(destination, &message)?;
        if paid < fee {
            return Err(BridgeError::InvalidNativeFee {
                paid,
                required: fee,
            });
        }

        self.sequence += 1;
        let sender_bytes = Bytes::copy_from_slice(sender.as_slice());
        let message_id = ccip_message_id(
            self.selector,
            destination,
            self.sequence,
            &sender_bytes,
            &message.receiver,
            &message.data,
        );

        self.outbox.push_back(CcipPacket {
            destination,
            receiver: message.receiver,
            message: Any2EvmMessage {
                message_id,
                source_chain_selector: self.selector,
                sender: sender_bytes,
                data: message.data,
                dest_token_amounts: message.token_amounts,
            },
        });

        info!(
            router = %self.address,
            message_id = %message_id,
            sequence = self.sequence,
            destination = %destination,
            event = "ccip_message_sent"
        );
        logs.emit(
            self.address,
            BridgeEvent::CcipMessageSent {
                message_id,
                selector: destination,
            },
        );

        Ok(message_id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &CcipPacket> {
        self.outbox.iter()
    }

    pub fn drain_outbox(&mut self) -> Vec<CcipPacket> {
        self.outbox.drain(..).collect()
    }
}
