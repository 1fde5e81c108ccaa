// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Transport adapters
//!
//! An adapter translates between its core's custody calls and one transport's
//! message format. Adapters hold no governance state of their own: every
//! configuration change is authorized against the linked core's *current*
//! owner.
//!
//! Inbound validation is shared through [`BridgeAdapter::validate_and_decode`],
//! which turns a raw delivery into either a [`DecodedMessage`] or a
//! [`RejectReason`]. What each transport does with a rejection differs: the
//! CCIP adapter reverts with a typed error, the LayerZero adapter drops
//! deliveries from unknown peers without touching state.

pub mod ccip;
pub mod lz;

pub use ccip::CcipAdapter;
pub use lz::LzAdapter;

use alloy_primitives::{Address, Bytes, B256, U256};
use bon::Builder;
use std::collections::HashMap;
use thiserror::Error;

use crate::bridge_core::BridgeCore;
use crate::chain::ChainState;
use crate::error::{BridgeError, Result};
use crate::ledger::NativeBalances;
use crate::protocol::{BridgePayload, ChainSelector, EndpointId, PeerIdentity};
use crate::transport::Transport;

/// Parameters of an outbound bridge transfer
///
/// `K` is the transport's destination key: [`EndpointId`] or [`ChainSelector`].
/// Empty `options` fall back to the adapter's stored per-destination options.
#[derive(Builder, Debug, Clone)]
pub struct SendParams<K> {
    destination: K,
    recipient: Address,
    amount: U256,
    #[builder(default)]
    user_transfer_id: B256,
    #[builder(default, into)]
    options: Bytes,
}

/// Send parameters for the LayerZero adapter
pub type LzSendParams = SendParams<EndpointId>;

/// Send parameters for the CCIP adapter; `options` are the CCIP extra args
pub type CcipSendParams = SendParams<ChainSelector>;

impl<K: Copy> SendParams<K> {
    pub fn destination(&self) -> K {
        self.destination
    }

    pub fn recipient(&self) -> Address {
        self.recipient
    }

    pub fn amount(&self) -> U256 {
        self.amount
    }

    pub fn user_transfer_id(&self) -> B256 {
        self.user_transfer_id
    }

    pub fn options(&self) -> &Bytes {
        &self.options
    }
}

/// Outcome of a successful send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReceipt {
    /// Protocol-level fingerprint recorded by the source core
    pub transfer_id: B256,
    /// Transport handle: LayerZero guid or CCIP message id
    pub delivery_id: B256,
    /// Fee consumed by the transport
    pub fee: U256,
    /// Overpayment returned to the caller
    pub refund: U256,
}

/// A raw inbound delivery, transport-neutral
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundDelivery {
    /// Source chain key widened to `u64`
    pub source: u64,
    /// Claimed sender in the transport's native encoding
    pub sender: Bytes,
    pub payload: Bytes,
    /// Transport-assigned id of this physical delivery
    pub delivery_id: B256,
    /// Number of transport-native token attachments
    pub token_attachments: usize,
}

/// A delivery that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedMessage {
    pub source: u64,
    pub transfer_id: B256,
    pub recipient: Address,
    pub amount: U256,
    pub delivery_id: B256,
}

/// Why a delivery was refused before reaching the core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("sender {sender} is not the registered peer for chain {chain}")]
    UntrustedPeer { chain: u64, sender: Bytes },

    #[error("no peer registered for chain {chain}")]
    MissingPeer { chain: u64 },

    #[error("{0} token amount(s) attached")]
    UnsupportedTokenPayload(usize),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl RejectReason {
    /// The typed revert an adapter raises for this rejection.
    ///
    /// Peer rejections map to the CCIP errors; a LayerZero receive drops
    /// those before reverting.
    pub fn into_error(self) -> BridgeError {
        match self {
            Self::UntrustedPeer { chain, sender } => BridgeError::InvalidCcipPeer {
                selector: chain,
                sender,
            },
            Self::MissingPeer { chain } => BridgeError::MissingCcipPeer(chain),
            Self::UnsupportedTokenPayload(count) => BridgeError::UnsupportedCcipTokenPayload(count),
            Self::MalformedPayload(reason) => BridgeError::MalformedPayload(reason),
        }
    }

    /// Peer rejections are the ones a LayerZero receive drops silently.
    pub fn is_peer_rejection(&self) -> bool {
        matches!(self, Self::UntrustedPeer { .. } | Self::MissingPeer { .. })
    }
}

/// Result of an adapter receive that did not revert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    Delivered(DecodedMessage),
    Dropped(RejectReason),
}

/// Behaviour shared by both adapter variants
pub trait BridgeAdapter {
    fn address(&self) -> Address;

    /// The linked core, fixed at construction
    fn core(&self) -> Address;

    fn transport(&self) -> Transport;

    /// Registered peer for a source chain key widened to `u64`
    fn trusted_peer(&self, source: u64) -> Option<PeerIdentity>;

    /// Checks peer, payload and attachments, in that order.
    fn validate_and_decode(
        &self,
        delivery: &InboundDelivery,
    ) -> std::result::Result<DecodedMessage, RejectReason> {
        let peer = self
            .trusted_peer(delivery.source)
            .ok_or(RejectReason::MissingPeer {
                chain: delivery.source,
            })?;
        if !peer.matches(&delivery.sender) {
            return Err(RejectReason::UntrustedPeer {
                chain: delivery.source,
                sender: delivery.sender.clone(),
            });
        }

        let payload = BridgePayload::decode(&delivery.payload).map_err(|e| match e {
            BridgeError::MalformedPayload(reason) => RejectReason::MalformedPayload(reason),
            other => RejectReason::MalformedPayload(other.to_string()),
        })?;

        if delivery.token_attachments > 0 {
            return Err(RejectReason::UnsupportedTokenPayload(
                delivery.token_attachments,
            ));
        }

        Ok(DecodedMessage {
            source: delivery.source,
            transfer_id: payload.transfer_id,
            recipient: payload.recipient,
            amount: payload.amount,
            delivery_id: delivery.delivery_id,
        })
    }
}

/// Fails with `OnlyCoreOwner` unless `caller` owns `core` right now.
pub fn ensure_core_owner(
    cores: &HashMap<Address, BridgeCore>,
    core: Address,
    caller: Address,
) -> Result<()> {
    let owner = cores
        .get(&core)
        .ok_or(BridgeError::UnknownContract(core))?
        .owner();
    if caller != owner {
        return Err(BridgeError::OnlyCoreOwner { caller, owner });
    }
    Ok(())
}

pub(crate) fn lock_on_core(
    state: &mut ChainState,
    adapter: Address,
    core: Address,
    from: Address,
    amount: U256,
    transfer_id: B256,
) -> Result<()> {
    state
        .cores
        .get_mut(&core)
        .ok_or(BridgeError::UnknownContract(core))?
        .bridge_out(
            adapter,
            from,
            amount,
            transfer_id,
            &mut state.tokens,
            &mut state.logs,
        )
}

pub(crate) fn settle_on_core(
    state: &mut ChainState,
    adapter: Address,
    core: Address,
    message: &DecodedMessage,
) -> Result<()> {
    state
        .cores
        .get_mut(&core)
        .ok_or(BridgeError::UnknownContract(core))?
        .bridge_in(
            adapter,
            message.recipient,
            message.amount,
            message.transfer_id,
            message.delivery_id,
            &mut state.tokens,
            &mut state.logs,
        )
}

/// Forwards exactly `required` from the adapter to the transport and refunds
/// the rest of `paid` to `caller`.
pub(crate) fn settle_fee(
    native: &mut NativeBalances,
    adapter: Address,
    transport: Address,
    caller: Address,
    paid: U256,
    required: U256,
) -> Result<U256> {
    if paid < required {
        return Err(BridgeError::InvalidNativeFee { paid, required });
    }
    native.move_value(adapter, transport, required)?;
    let refund = paid - required;
    native.move_value(adapter, caller, refund)?;
    Ok(refund)
}

/// Caller-supplied options win over the stored per-destination default.
pub(crate) fn effective_options<K: Eq + std::hash::Hash>(
    supplied: &Bytes,
    stored: &HashMap<K, Bytes>,
    destination: &K,
) -> Bytes {
    if supplied.is_empty() {
        stored.get(destination).cloned().unwrap_or_default()
    } else {
        supplied.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::bytes;

    struct StaticPeer(Option<PeerIdentity>);

    impl BridgeAdapter for StaticPeer {
        fn address(&self) -> Address {
            Address::repeat_byte(0xad)
        }

        fn core(&self) -> Address {
            Address::repeat_byte(0xc0)
        }

        fn transport(&self) -> Transport {
            Transport::Ccip
        }

        fn trusted_peer(&self, _source: u64) -> Option<PeerIdentity> {
            self.0.clone()
        }
    }

    fn delivery(sender: Bytes, payload: Bytes, token_attachments: usize) -> InboundDelivery {
        InboundDelivery {
            source: 7,
            sender,
            payload,
            delivery_id: B256::repeat_byte(0xdd),
            token_attachments,
        }
    }

    fn payload() -> Bytes {
        BridgePayload::new(B256::repeat_byte(1), Address::repeat_byte(2), U256::from(3u64)).encode()
    }

    #[test]
    fn test_send_params_defaults() {
        let params = LzSendParams::builder()
            .destination(EndpointId::new(40245))
            .recipient(Address::repeat_byte(2))
            .amount(U256::from(5u64))
            .build();

        assert_eq!(params.destination(), EndpointId::new(40245));
        assert_eq!(params.user_transfer_id(), B256::ZERO);
        assert!(params.options().is_empty());
    }

    #[test]
    fn test_missing_peer_is_reported_first() {
        let adapter = StaticPeer(None);
        let reason = adapter
            .validate_and_decode(&delivery(Bytes::new(), Bytes::new(), 1))
            .unwrap_err();
        assert_eq!(reason, RejectReason::MissingPeer { chain: 7 });
    }

    #[test]
    fn test_untrusted_sender_is_rejected_before_decoding() {
        let adapter = StaticPeer(Some(PeerIdentity::OpaqueBytes(bytes!("11223344"))));
        let reason = adapter
            .validate_and_decode(&delivery(bytes!("11223355"), Bytes::new(), 0))
            .unwrap_err();
        assert!(matches!(reason, RejectReason::UntrustedPeer { chain: 7, .. }));
    }

    #[test]
    fn test_token_attachments_are_unsupported() {
        let adapter = StaticPeer(Some(PeerIdentity::OpaqueBytes(bytes!("11223344"))));
        let reason = adapter
            .validate_and_decode(&delivery(bytes!("11223344"), payload(), 2))
            .unwrap_err();
        assert_eq!(reason, RejectReason::UnsupportedTokenPayload(2));
        assert!(matches!(
            reason.into_error(),
            BridgeError::UnsupportedCcipTokenPayload(2)
        ));
    }

    #[test]
    fn test_valid_delivery_decodes() {
        let adapter = StaticPeer(Some(PeerIdentity::OpaqueBytes(bytes!("11223344"))));
        let decoded = adapter
            .validate_and_decode(&delivery(bytes!("11223344"), payload(), 0))
            .unwrap();

        assert_eq!(decoded.transfer_id, B256::repeat_byte(1));
        assert_eq!(decoded.recipient, Address::repeat_byte(2));
        assert_eq!(decoded.amount, U256::from(3u64));
        assert_eq!(decoded.delivery_id, B256::repeat_byte(0xdd));
    }

    #[test]
    fn test_settle_fee_refunds_overpayment() {
        let (adapter, router, caller) = (
            Address::repeat_byte(0xad),
            Address::repeat_byte(0xcc),
            Address::repeat_byte(0x0a),
        );
        let mut native = NativeBalances::default();
        native.credit(adapter, U256::from(3u64)).unwrap();

        let refund =
            settle_fee(&mut native, adapter, router, caller, U256::from(3u64), U256::from(2u64))
                .unwrap();

        assert_eq!(refund, U256::from(1u64));
        assert_eq!(native.balance_of(router), U256::from(2u64));
        assert_eq!(native.balance_of(caller), U256::from(1u64));
        assert_eq!(native.balance_of(adapter), U256::ZERO);
    }
}
