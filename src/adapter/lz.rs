// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! LayerZero adapter
//!
//! Peers are `bytes32` words keyed by endpoint id. A delivery whose origin is
//! not the registered peer is dropped without state change, the way the
//! LayerZero receive path treats untrusted senders.

use alloy_primitives::{Address, Bytes, B256, U256};
use std::collections::HashMap;
use tracing::{info, warn};

use super::{
    effective_options, ensure_core_owner, lock_on_core, settle_fee, settle_on_core,
    BridgeAdapter, InboundDelivery, LzSendParams, ReceiveOutcome, SendReceipt,
};
use crate::chain::ChainState;
use crate::error::{BridgeError, Result};
use crate::events::BridgeEvent;
use crate::protocol::{derive_lz_transfer_id, BridgePayload, EndpointId, PeerIdentity};
use crate::transport::{LzEndpoint, MessagingFee, Origin, Transport};

/// LayerZero adapter state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LzAdapter {
    address: Address,
    core: Address,
    endpoint: Address,
    peers: HashMap<EndpointId, B256>,
    send_options: HashMap<EndpointId, Bytes>,
}

impl LzAdapter {
    pub fn new(address: Address, core: Address, endpoint: Address) -> Self {
        Self {
            address,
            core,
            endpoint,
            peers: HashMap::new(),
            send_options: HashMap::new(),
        }
    }

    pub fn endpoint(&self) -> Address {
        self.endpoint
    }

    /// Registered peer word, zero when unset
    pub fn peers(&self, eid: EndpointId) -> B256 {
        self.peers.get(&eid).copied().unwrap_or_default()
    }

    /// Stored default options, empty when unset
    pub fn lz_send_options(&self, eid: EndpointId) -> Bytes {
        self.send_options.get(&eid).cloned().unwrap_or_default()
    }

    fn peer_or_revert(&self, eid: EndpointId) -> Result<B256> {
        match self.peers.get(&eid) {
            Some(peer) if !peer.is_zero() => Ok(*peer),
            _ => Err(BridgeError::NoPeer(eid.as_u32())),
        }
    }
}

impl BridgeAdapter for LzAdapter {
    fn address(&self) -> Address {
        self.address
    }

    fn core(&self) -> Address {
        self.core
    }

    fn transport(&self) -> Transport {
        Transport::LayerZero
    }

    fn trusted_peer(&self, source: u64) -> Option<PeerIdentity> {
        let eid = EndpointId::new(u32::try_from(source).ok()?);
        self.peers
            .get(&eid)
            .and_then(|word| PeerIdentity::from_bytes32(*word))
    }
}

fn lookup(state: &ChainState, address: Address) -> Result<&LzAdapter> {
    state
        .lz_adapters
        .get(&address)
        .ok_or(BridgeError::UnknownContract(address))
}

fn endpoint(state: &ChainState) -> Result<&LzEndpoint> {
    state
        .lz_endpoint
        .as_ref()
        .ok_or(BridgeError::EndpointNotDeployed("LayerZero"))
}

/// Core-owner gated; a zero word unsets the peer.
pub(crate) fn set_peer(
    state: &mut ChainState,
    caller: Address,
    address: Address,
    eid: EndpointId,
    peer: B256,
) -> Result<()> {
    let core = lookup(state, address)?.core;
    ensure_core_owner(&state.cores, core, caller)?;

    let adapter = state
        .lz_adapters
        .get_mut(&address)
        .ok_or(BridgeError::UnknownContract(address))?;
    adapter.peers.insert(eid, peer);

    info!(adapter = %address, eid = %eid, peer = %peer, event = "lz_peer_set");
    state.logs.emit(address, BridgeEvent::PeerSet { eid, peer });
    Ok(())
}

pub(crate) fn set_lz_send_options(
    state: &mut ChainState,
    caller: Address,
    address: Address,
    eid: EndpointId,
    options: Bytes,
) -> Result<()> {
    let core = lookup(state, address)?.core;
    ensure_core_owner(&state.cores, core, caller)?;

    let adapter = state
        .lz_adapters
        .get_mut(&address)
        .ok_or(BridgeError::UnknownContract(address))?;
    adapter.send_options.insert(eid, options.clone());

    info!(
        adapter = %address,
        eid = %eid,
        options = %options,
        event = "lz_send_options_set"
    );
    state
        .logs
        .emit(address, BridgeEvent::LzSendOptionsSet { eid, options });
    Ok(())
}

/// Prices a send without touching state.
pub(crate) fn quote(
    state: &ChainState,
    address: Address,
    params: &LzSendParams,
    pay_in_lz_token: bool,
) -> Result<MessagingFee> {
    let adapter = lookup(state, address)?;
    let eid = params.destination();
    adapter.peer_or_revert(eid)?;

    let options = effective_options(params.options(), &adapter.send_options, &eid);
    endpoint(state)?.quote(BridgePayload::SIZE, options.len(), pay_in_lz_token)
}

/// Locks or burns on the core, then dispatches the payload through the endpoint.
///
/// `paid` has already been moved from `caller` to the adapter.
pub(crate) fn send(
    state: &mut ChainState,
    caller: Address,
    address: Address,
    params: &LzSendParams,
    paid: U256,
) -> Result<SendReceipt> {
    let recipient = params.recipient();
    if recipient.is_zero() {
        return Err(BridgeError::InvalidRecipient(recipient));
    }

    let core = lookup(state, address)?.core;
    let (eid, amount) = (params.destination(), params.amount());
    let transfer_id =
        derive_lz_transfer_id(caller, eid, recipient, amount, params.user_transfer_id());

    lock_on_core(state, address, core, caller, amount, transfer_id)?;

    let adapter = lookup(state, address)?;
    let options = effective_options(params.options(), &adapter.send_options, &eid);
    let receiver = adapter.peer_or_revert(eid)?;
    let message = BridgePayload::new(transfer_id, recipient, amount).encode();

    let endpoint_address = endpoint(state)?.address();
    let fee = endpoint(state)?.quote(message.len(), options.len(), false)?;
    let refund = settle_fee(
        &mut state.native,
        address,
        endpoint_address,
        caller,
        paid,
        fee.native_fee,
    )?;

    let receipt = state
        .lz_endpoint
        .as_mut()
        .ok_or(BridgeError::EndpointNotDeployed("LayerZero"))?
        .send(
            address,
            eid,
            receiver,
            message,
            options,
            fee.native_fee,
            &mut state.logs,
        )?;

    info!(
        adapter = %address,
        transfer_id = %transfer_id,
        dst_eid = %eid,
        to = %recipient,
        amount = %amount,
        guid = %receipt.guid,
        event = "lz_send"
    );
    state.logs.emit(
        address,
        BridgeEvent::LzSend {
            transfer_id,
            dst_eid: eid,
            to: recipient,
            amount,
            guid: receipt.guid,
        },
    );

    Ok(SendReceipt {
        transfer_id,
        delivery_id: receipt.guid,
        fee: fee.native_fee,
        refund,
    })
}

/// Endpoint-only receive.
///
/// Deliveries from a missing or untrusted peer come back as
/// [`ReceiveOutcome::Dropped`] with nothing mutated; core errors revert.
pub(crate) fn receive(
    state: &mut ChainState,
    caller: Address,
    address: Address,
    origin: &Origin,
    guid: B256,
    message: &Bytes,
) -> Result<ReceiveOutcome> {
    let adapter = lookup(state, address)?;
    if caller != adapter.endpoint {
        return Err(BridgeError::OnlyEndpoint(caller));
    }

    let delivery = InboundDelivery {
        source: origin.src_eid.as_u64(),
        sender: Bytes::copy_from_slice(origin.sender.as_slice()),
        payload: message.clone(),
        delivery_id: guid,
        token_attachments: 0,
    };

    let decoded = match adapter.validate_and_decode(&delivery) {
        Ok(decoded) => decoded,
        Err(reason) if reason.is_peer_rejection() => {
            warn!(
                adapter = %address,
                guid = %guid,
                src_eid = %origin.src_eid,
                reason = %reason,
                event = "lz_delivery_dropped"
            );
            return Ok(ReceiveOutcome::Dropped(reason));
        }
        Err(reason) => return Err(reason.into_error()),
    };

    let core = adapter.core;
    settle_on_core(state, address, core, &decoded)?;

    info!(
        adapter = %address,
        transfer_id = %decoded.transfer_id,
        guid = %guid,
        to = %decoded.recipient,
        amount = %decoded.amount,
        event = "lz_receive"
    );
    state.logs.emit(
        address,
        BridgeEvent::LzReceive {
            transfer_id: decoded.transfer_id,
            to: decoded.recipient,
            amount: decoded.amount,
        },
    );

    Ok(ReceiveOutcome::Delivered(decoded))
}
