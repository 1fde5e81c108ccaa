// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! LayerZero-style endpoint
//!
//! Assigns per-path nonces and packet guids, prices messages, queues outbound
//! packets for the relayer, and keeps payloads whose receive reverted so they
//! can be retried later.

use alloy_primitives::{Address, Bytes, B256, U256};
use std::collections::{HashMap, VecDeque};
use tracing::{info, warn};

use super::FeeSchedule;
use crate::error::{BridgeError, Result};
use crate::events::{BridgeEvent, EventLog};
use crate::protocol::{lz_guid, EndpointId};

/// Source coordinates of an inbound packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub src_eid: EndpointId,
    /// Sending adapter, left-padded
    pub sender: B256,
    pub nonce: u64,
}

/// Fee quote in native currency and LayerZero token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessagingFee {
    pub native_fee: U256,
    pub lz_token_fee: U256,
}

/// Result of a successful endpoint send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessagingReceipt {
    pub guid: B256,
    pub nonce: u64,
    pub fee: MessagingFee,
}

/// A packet in flight between two endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LzPacket {
    pub origin: Origin,
    pub dst_eid: EndpointId,
    /// Receiving adapter, left-padded
    pub receiver: B256,
    pub guid: B256,
    pub message: Bytes,
    pub options: Bytes,
}

/// A delivered packet whose receive reverted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPayload {
    pub packet: LzPacket,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PathKey {
    sender: Address,
    dst_eid: EndpointId,
    receiver: B256,
}

/// Per-chain LayerZero endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LzEndpoint {
    address: Address,
    eid: EndpointId,
    fees: FeeSchedule,
    nonces: HashMap<PathKey, u64>,
    outbox: VecDeque<LzPacket>,
    stored: HashMap<B256, StoredPayload>,
}

impl LzEndpoint {
    pub fn new(address: Address, eid: EndpointId, fees: FeeSchedule) -> Self {
        Self {
            address,
            eid,
            fees,
            nonces: HashMap::new(),
            outbox: VecDeque::new(),
            stored: HashMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn eid(&self) -> EndpointId {
        self.eid
    }

    pub fn fees(&self) -> FeeSchedule {
        self.fees
    }

    /// Prices a message; paying in the LayerZero token is not offered.
    pub fn quote(
        &self,
        message_len: usize,
        options_len: usize,
        pay_in_lz_token: bool,
    ) -> Result<MessagingFee> {
        if pay_in_lz_token {
            return Err(BridgeError::LzTokenUnavailable);
        }
        Ok(MessagingFee {
            native_fee: self.fees.quote(message_len, options_len),
            lz_token_fee: U256::ZERO,
        })
    }

    /// Queues a packet for `dst_eid`, charging exactly the quoted fee.
    ///
    /// `paid` is the native value forwarded by the sender; the caller is
    /// responsible for having moved it to this endpoint.
    #[allow(clippy::too_many_arguments)]
    pub fn send(
        &mut self,
        sender: Address,
        dst_eid: EndpointId,
        receiver: B256,
        message: Bytes,
        options: Bytes,
        paid: U256,
        logs: &mut EventLog,
    ) -> Result<MessagingReceipt> {
        let fee = self.quote(message.len(), options.len(), false)?;
        if paid < fee.native_fee {
            return Err(BridgeError::InvalidNativeFee {
                paid,
                required: fee.native_fee,
            });
        }

        let nonce = self
            .nonces
            .entry(PathKey {
                sender,
                dst_eid,
                receiver,
            })
            .and_modify(|n| *n += 1)
            .or_insert(1);
        let nonce = *nonce;

        let sender_word = sender.into_word();
        let guid = lz_guid(nonce, self.eid, sender_word, dst_eid, receiver);

        self.outbox.push_back(LzPacket {
            origin: Origin {
                src_eid: self.eid,
                sender: sender_word,
                nonce,
            },
            dst_eid,
            receiver,
            guid,
            message,
            options,
        });

        info!(
            endpoint = %self.address,
            guid = %guid,
            nonce = nonce,
            dst_eid = %dst_eid,
            event = "lz_packet_sent"
        );
        logs.emit(self.address, BridgeEvent::PacketSent { guid, dst_eid });

        Ok(MessagingReceipt { guid, nonce, fee })
    }

    /// Packets waiting for the relayer, oldest first
    pub fn pending(&self) -> impl Iterator<Item = &LzPacket> {
        self.outbox.iter()
    }

    pub fn drain_outbox(&mut self) -> Vec<LzPacket> {
        self.outbox.drain(..).collect()
    }

    pub fn store_payload(&mut self, packet: LzPacket, reason: String, logs: &mut EventLog) {
        let guid = packet.guid;
        warn!(
            endpoint = %self.address,
            guid = %guid,
            reason = %reason,
            event = "lz_payload_stored"
        );
        logs.emit(
            self.address,
            BridgeEvent::PayloadStored {
                guid,
                reason: reason.clone(),
            },
        );
        self.stored.insert(guid, StoredPayload { packet, reason });
    }

    pub fn stored_payload(&self, guid: &B256) -> Option<&StoredPayload> {
        self.stored.get(guid)
    }

    pub fn take_payload(&mut self, guid: B256) -> Result<StoredPayload> {
        self.stored
            .remove(&guid)
            .ok_or(BridgeError::PayloadNotFound(guid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: Address = Address::repeat_byte(0xe0);
    const ADAPTER: Address = Address::repeat_byte(0xad);

    fn endpoint() -> LzEndpoint {
        LzEndpoint::new(ENDPOINT, EndpointId::new(40161), FeeSchedule::default())
    }

    #[test]
    fn test_quote_in_lz_token_is_unavailable() {
        assert!(matches!(
            endpoint().quote(96, 0, true).unwrap_err(),
            BridgeError::LzTokenUnavailable
        ));
    }

    #[test]
    fn test_nonces_advance_per_path() {
        let mut endpoint = endpoint();
        let mut logs = EventLog::default();
        let receiver = Address::repeat_byte(0xbb).into_word();
        let dst = EndpointId::new(40245);

        let first = endpoint
            .send(ADAPTER, dst, receiver, Bytes::new(), Bytes::new(), U256::from(1u64), &mut logs)
            .unwrap();
        let second = endpoint
            .send(ADAPTER, dst, receiver, Bytes::new(), Bytes::new(), U256::from(1u64), &mut logs)
            .unwrap();
        let other_path = endpoint
            .send(
                ADAPTER,
                EndpointId::new(40231),
                receiver,
                Bytes::new(),
                Bytes::new(),
                U256::from(1u64),
                &mut logs,
            )
            .unwrap();

        assert_eq!((first.nonce, second.nonce, other_path.nonce), (1, 2, 1));
        assert_ne!(first.guid, second.guid);
        assert_eq!(endpoint.drain_outbox().len(), 3);
        assert_eq!(endpoint.pending().count(), 0);
    }

    #[test]
    fn test_send_requires_quoted_fee() {
        let mut endpoint =
            LzEndpoint::new(ENDPOINT, EndpointId::new(1), FeeSchedule::flat(U256::from(5u64)));
        let mut logs = EventLog::default();

        let err = endpoint
            .send(
                ADAPTER,
                EndpointId::new(2),
                B256::ZERO,
                Bytes::new(),
                Bytes::new(),
                U256::from(4u64),
                &mut logs,
            )
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidNativeFee { .. }));
    }

    #[test]
    fn test_stored_payload_can_be_taken_once() {
        let mut endpoint = endpoint();
        let mut logs = EventLog::default();
        endpoint
            .send(
                ADAPTER,
                EndpointId::new(2),
                B256::ZERO,
                Bytes::new(),
                Bytes::new(),
                U256::from(1u64),
                &mut logs,
            )
            .unwrap();
        let packet = endpoint.drain_outbox().remove(0);
        let guid = packet.guid;

        endpoint.store_payload(packet, "TransferReplay".to_string(), &mut logs);

        assert!(endpoint.stored_payload(&guid).is_some());
        endpoint.take_payload(guid).unwrap();
        assert!(matches!(
            endpoint.take_payload(guid).unwrap_err(),
            BridgeError::PayloadNotFound(_)
        ));
    }
}
