// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! CCIP adapter
//!
//! Peers are arbitrary byte strings keyed by chain selector, so a remote
//! adapter on a non-EVM chain can be registered as-is. Every rejected delivery
//! reverts with a typed error.

use alloy_primitives::{Address, Bytes, B256, U256};
use std::collections::HashMap;
use tracing::info;

use super::{
    effective_options, ensure_core_owner, lock_on_core, settle_fee, settle_on_core,
    BridgeAdapter, CcipSendParams, DecodedMessage, InboundDelivery, SendReceipt,
};
use crate::chain::ChainState;
use crate::error::{BridgeError, Result};
use crate::events::BridgeEvent;
use crate::protocol::{derive_ccip_transfer_id, BridgePayload, ChainSelector, PeerIdentity};
use crate::transport::{Any2EvmMessage, CcipRouter, Evm2AnyMessage, Transport};

/// CCIP adapter state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcipAdapter {
    address: Address,
    core: Address,
    router: Address,
    peers: HashMap<ChainSelector, Bytes>,
    extra_args: HashMap<ChainSelector, Bytes>,
}

impl CcipAdapter {
    pub fn new(address: Address, core: Address, router: Address) -> Self {
        Self {
            address,
            core,
            router,
            peers: HashMap::new(),
            extra_args: HashMap::new(),
        }
    }

    pub fn router(&self) -> Address {
        self.router
    }

    /// Registered peer bytes, empty when unset
    pub fn ccip_peers(&self, selector: ChainSelector) -> Bytes {
        self.peers.get(&selector).cloned().unwrap_or_default()
    }

    pub fn ccip_extra_args(&self, selector: ChainSelector) -> Bytes {
        self.extra_args.get(&selector).cloned().unwrap_or_default()
    }

    fn peer_or_revert(&self, selector: ChainSelector) -> Result<PeerIdentity> {
        self.trusted_peer(selector.as_u64())
            .ok_or(BridgeError::MissingCcipPeer(selector.as_u64()))
    }

    fn build_message(
        &self,
        selector: ChainSelector,
        transfer_id: B256,
        params: &CcipSendParams,
    ) -> Result<Evm2AnyMessage> {
        let peer = self.peer_or_revert(selector)?;
        Ok(Evm2AnyMessage {
            receiver: peer.to_wire_bytes(),
            data: BridgePayload::new(transfer_id, params.recipient(), params.amount()).encode(),
            token_amounts: Vec::new(),
            fee_token: Address::ZERO,
            extra_args: effective_options(params.options(), &self.extra_args, &selector),
        })
    }
}

impl BridgeAdapter for CcipAdapter {
    fn address(&self) -> Address {
        self.address
    }

    fn core(&self) -> Address {
        self.core
    }

    fn transport(&self) -> Transport {
        Transport::Ccip
    }

    fn trusted_peer(&self, source: u64) -> Option<PeerIdentity> {
        self.peers
            .get(&ChainSelector::new(source))
            .and_then(|bytes| PeerIdentity::from_ccip_bytes(bytes))
    }
}

fn lookup(state: &ChainState, address: Address) -> Result<&CcipAdapter> {
    state
        .ccip_adapters
        .get(&address)
        .ok_or(BridgeError::UnknownContract(address))
}

fn router(state: &ChainState) -> Result<&CcipRouter> {
    state
        .ccip_router
        .as_ref()
        .ok_or(BridgeError::EndpointNotDeployed("CCIP"))
}

/// Core-owner gated; empty bytes unset the peer.
pub(crate) fn set_ccip_peer(
    state: &mut ChainState,
    caller: Address,
    address: Address,
    selector: ChainSelector,
    peer: Bytes,
) -> Result<()> {
    let core = lookup(state, address)?.core;
    ensure_core_owner(&state.cores, core, caller)?;

    let adapter = state
        .ccip_adapters
        .get_mut(&address)
        .ok_or(BridgeError::UnknownContract(address))?;
    adapter.peers.insert(selector, peer.clone());

    info!(
        adapter = %address,
        selector = %selector,
        peer = %peer,
        event = "ccip_peer_set"
    );
    state
        .logs
        .emit(address, BridgeEvent::CcipPeerSet { selector, peer });
    Ok(())
}

pub(crate) fn set_ccip_extra_args(
    state: &mut ChainState,
    caller: Address,
    address: Address,
    selector: ChainSelector,
    extra_args: Bytes,
) -> Result<()> {
    let core = lookup(state, address)?.core;
    ensure_core_owner(&state.cores, core, caller)?;

    let adapter = state
        .ccip_adapters
        .get_mut(&address)
        .ok_or(BridgeError::UnknownContract(address))?;
    adapter.extra_args.insert(selector, extra_args.clone());

    info!(
        adapter = %address,
        selector = %selector,
        extra_args = %extra_args,
        event = "ccip_extra_args_set"
    );
    state.logs.emit(
        address,
        BridgeEvent::CcipExtraArgsSet {
            selector,
            extra_args,
        },
    );
    Ok(())
}

/// Prices a send for `sender` without touching state.
pub(crate) fn quote(
    state: &ChainState,
    address: Address,
    sender: Address,
    params: &CcipSendParams,
) -> Result<U256> {
    let adapter = lookup(state, address)?;
    let selector = params.destination();
    let transfer_id = derive_ccip_transfer_id(
        address,
        sender,
        selector,
        params.recipient(),
        params.amount(),
        params.user_transfer_id(),
    );
    let message = adapter.build_message(selector, transfer_id, params)?;
    router(state)?.get_fee(selector, &message)
}

/// Locks or burns on the core, then routes the payload.
///
/// `paid` has already been moved from `caller` to the adapter.
pub(crate) fn send(
    state: &mut ChainState,
    caller: Address,
    address: Address,
    params: &CcipSendParams,
    paid: U256,
) -> Result<SendReceipt> {
    let recipient = params.recipient();
    if recipient.is_zero() {
        return Err(BridgeError::InvalidRecipient(recipient));
    }

    let core = lookup(state, address)?.core;
    let (selector, amount) = (params.destination(), params.amount());
    let transfer_id = derive_ccip_transfer_id(
        address,
        caller,
        selector,
        recipient,
        amount,
        params.user_transfer_id(),
    );

    lock_on_core(state, address, core, caller, amount, transfer_id)?;

    let message = lookup(state, address)?.build_message(selector, transfer_id, params)?;
    let router_address = router(state)?.address();
    let fee = router(state)?.get_fee(selector, &message)?;
    let refund = settle_fee(&mut state.native, address, router_address, caller, paid, fee)?;

    let message_id = state
        .ccip_router
        .as_mut()
        .ok_or(BridgeError::EndpointNotDeployed("CCIP"))?
        .ccip_send(address, selector, message, fee, &mut state.logs)?;

    info!(
        adapter = %address,
        transfer_id = %transfer_id,
        selector = %selector,
        to = %recipient,
        amount = %amount,
        message_id = %message_id,
        event = "ccip_send"
    );
    state.logs.emit(
        address,
        BridgeEvent::CcipSend {
            transfer_id,
            selector,
            to: recipient,
            amount,
            message_id,
        },
    );

    Ok(SendReceipt {
        transfer_id,
        delivery_id: message_id,
        fee,
        refund,
    })
}

/// Router-only receive; every rejection reverts with a typed error.
pub(crate) fn receive(
    state: &mut ChainState,
    caller: Address,
    address: Address,
    message: &Any2EvmMessage,
) -> Result<DecodedMessage> {
    let adapter = lookup(state, address)?;
    if caller != adapter.router {
        return Err(BridgeError::InvalidRouter(caller));
    }

    let delivery = InboundDelivery {
        source: message.source_chain_selector.as_u64(),
        sender: message.sender.clone(),
        payload: message.data.clone(),
        delivery_id: message.message_id,
        token_attachments: message.dest_token_amounts.len(),
    };
    let decoded = adapter
        .validate_and_decode(&delivery)
        .map_err(|reason| reason.into_error())?;

    let core = adapter.core;
    settle_on_core(state, address, core, &decoded)?;

    info!(
        adapter = %address,
        transfer_id = %decoded.transfer_id,
        message_id = %message.message_id,
        to = %decoded.recipient,
        amount = %decoded.amount,
        event = "ccip_receive"
    );
    state.logs.emit(
        address,
        BridgeEvent::CcipReceive {
            transfer_id: decoded.transfer_id,
            to: decoded.recipient,
            amount: decoded.amount,
        },
    );

    Ok(decoded)
}
