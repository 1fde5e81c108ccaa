// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Execution environment for one chain
//!
//! A [`Chain`] hosts every component deployed on it and runs each external
//! call atomically: the whole [`ChainState`] is snapshotted before the call and
//! restored if the call returns an error, so a revert leaves balances,
//! fingerprints, peer maps, events and outboxes exactly as they were.

use alloy_chains::NamedChain;
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::adapter::{
    ccip, lz, CcipAdapter, CcipSendParams, DecodedMessage, LzAdapter, LzSendParams,
    ReceiveOutcome, SendReceipt,
};
use crate::bridge_core::BridgeCore;
use crate::error::{BridgeError, Result};
use crate::events::{EventLog, Log};
use crate::ledger::{FungibleLedger, NativeBalances, TokenRegistry};
use crate::protocol::{ChainSelector, EndpointId, PeerIdentity};
use crate::spans;
use crate::transport::{
    Any2EvmMessage, CcipPacket, CcipRouter, DeliveryOutcome, FeeSchedule, LzEndpoint, LzPacket,
    MessagingFee, Origin, Transport,
};

/// One external call: who calls whom, with how much native value attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub caller: Address,
    pub target: Address,
    pub value: U256,
}

impl Call {
    pub fn new(caller: Address, target: Address) -> Self {
        Self {
            caller,
            target,
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Everything a call can mutate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainState {
    pub(crate) native: NativeBalances,
    pub(crate) tokens: TokenRegistry,
    pub(crate) cores: HashMap<Address, BridgeCore>,
    pub(crate) lz_endpoint: Option<LzEndpoint>,
    pub(crate) lz_adapters: HashMap<Address, LzAdapter>,
    pub(crate) ccip_router: Option<CcipRouter>,
    pub(crate) ccip_adapters: HashMap<Address, CcipAdapter>,
    pub(crate) logs: EventLog,
}

impl ChainState {
    /// A stand-alone token, or the asset ledger of a satellite core
    pub fn ledger(&self, token: Address) -> Option<&FungibleLedger> {
        self.tokens
            .get(token)
            .or_else(|| self.cores.get(&token).and_then(BridgeCore::ledger))
    }

    pub fn logs(&self) -> &EventLog {
        &self.logs
    }
}

fn ledger_mut<'a>(
    tokens: &'a mut TokenRegistry,
    cores: &'a mut HashMap<Address, BridgeCore>,
    token: Address,
) -> Result<&'a mut FungibleLedger> {
    if tokens.contains(token) {
        return tokens.get_mut(token);
    }
    cores
        .get_mut(&token)
        .and_then(BridgeCore::ledger_mut)
        .ok_or(BridgeError::UnknownContract(token))
}

/// A simulated ledger hosting the bridge components
#[derive(Debug, Clone)]
pub struct Chain {
    named: NamedChain,
    deployer: Address,
    deploy_nonce: u64,
    state: ChainState,
}

impl Chain {
    pub fn new(named: NamedChain) -> Self {
        let id = alloy_chains::Chain::from_named(named).id();
        Self {
            named,
            deployer: Address::from_word(keccak256(id.to_be_bytes())),
            deploy_nonce: 0,
            state: ChainState::default(),
        }
    }

    pub fn named(&self) -> NamedChain {
        self.named
    }

    pub fn id(&self) -> u64 {
        alloy_chains::Chain::from_named(self.named).id()
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    pub fn logs(&self) -> &[Log] {
        self.state.logs.as_slice()
    }

    /// Runs `f` as one atomic call.
    ///
    /// `call.value` moves from caller to target before `f` runs. On error the
    /// state is restored to its pre-call snapshot.
    pub fn transact<T>(
        &mut self,
        call: Call,
        f: impl FnOnce(&mut ChainState) -> Result<T>,
    ) -> Result<T> {
        let snapshot = self.state.clone();
        let result = self
            .state
            .native
            .move_value(call.caller, call.target, call.value)
            .and_then(|()| f(&mut self.state));

        if let Err(e) = &result {
            self.state = snapshot;
            debug!(
                chain = %self.named,
                caller = %call.caller,
                target = %call.target,
                error = %e,
                event = "call_reverted"
            );
        }
        result
    }

    fn next_address(&mut self) -> Address {
        let address = self.deployer.create(self.deploy_nonce);
        self.deploy_nonce += 1;
        address
    }

    /// Credits native fee currency to `account`.
    pub fn fund(&mut self, account: Address, amount: U256) -> Result<()> {
        self.state.native.credit(account, amount)
    }

    pub fn native_balance(&self, account: Address) -> U256 {
        self.state.native.balance_of(account)
    }

    // Deployment

    /// Deploys a stand-alone token minting `supply` to `holder`.
    pub fn deploy_token(
        &mut self,
        name: impl Into<String>,
        symbol: impl Into<String>,
        holder: Address,
        supply: U256,
    ) -> Result<Address> {
        let address = self.next_address();
        self.transact(Call::new(holder, address), |state| {
            let mut ledger = FungibleLedger::new(address, name, symbol);
            ledger.mint(holder, supply, &mut state.logs)?;
            state.tokens.insert(ledger);
            Ok(address)
        })?;

        info!(chain = %self.named, token = %address, supply = %supply, event = "token_deployed");
        Ok(address)
    }

    /// Deploys a core that locks and releases `token`.
    pub fn deploy_canonical_core(&mut self, token: Address, owner: Address) -> Result<Address> {
        let address = self.next_address();
        self.transact(Call::new(owner, address), |state| {
            if !state.tokens.contains(token) {
                return Err(BridgeError::UnknownContract(token));
            }
            let core = BridgeCore::canonical(address, token, owner, &mut state.logs)?;
            state.cores.insert(address, core);
            Ok(())
        })?;

        info!(
            chain = %self.named,
            core = %address,
            token = %token,
            event = "canonical_core_deployed"
        );
        Ok(address)
    }

    /// Deploys a core that is its own mint/burn asset ledger.
    pub fn deploy_satellite_core(
        &mut self,
        name: impl Into<String>,
        symbol: impl Into<String>,
        owner: Address,
    ) -> Result<Address> {
        let address = self.next_address();
        self.transact(Call::new(owner, address), |state| {
            let core = BridgeCore::satellite(address, name, symbol, owner, &mut state.logs)?;
            state.cores.insert(address, core);
            Ok(())
        })?;

        info!(chain = %self.named, core = %address, event = "satellite_core_deployed");
        Ok(address)
    }

    pub fn deploy_lz_endpoint(&mut self, eid: EndpointId, fees: FeeSchedule) -> Result<Address> {
        if self.state.lz_endpoint.is_some() {
            return Err(BridgeError::InvalidConfig(format!(
                "LayerZero endpoint already deployed on {}",
                self.named
            )));
        }
        let address = self.next_address();
        self.state.lz_endpoint = Some(LzEndpoint::new(address, eid, fees));

        info!(chain = %self.named, endpoint = %address, eid = %eid, event = "lz_endpoint_deployed");
        Ok(address)
    }

    pub fn deploy_ccip_router(
        &mut self,
        selector: ChainSelector,
        fees: FeeSchedule,
    ) -> Result<Address> {
        if self.state.ccip_router.is_some() {
            return Err(BridgeError::InvalidConfig(format!(
                "CCIP router already deployed on {}",
                self.named
            )));
        }
        let address = self.next_address();
        self.state.ccip_router = Some(CcipRouter::new(address, selector, fees));

        info!(
            chain = %self.named,
            router = %address,
            selector = %selector,
            event = "ccip_router_deployed"
        );
        Ok(address)
    }

    /// Lets the local router dispatch to `selector`.
    pub fn add_ccip_supported_chain(&mut self, selector: ChainSelector) -> Result<()> {
        self.state
            .ccip_router
            .as_mut()
            .ok_or(BridgeError::EndpointNotDeployed("CCIP"))?
            .add_supported_chain(selector);
        Ok(())
    }

    /// Deploys a LayerZero adapter linked to `core` and the local endpoint.
    pub fn deploy_lz_adapter(&mut self, core: Address) -> Result<Address> {
        let endpoint = self
            .state
            .lz_endpoint
            .as_ref()
            .ok_or(BridgeError::EndpointNotDeployed("LayerZero"))?
            .address();
        if !self.state.cores.contains_key(&core) {
            return Err(BridgeError::UnknownContract(core));
        }
        let address = self.next_address();
        self.state
            .lz_adapters
            .insert(address, LzAdapter::new(address, core, endpoint));

        info!(chain = %self.named, adapter = %address, core = %core, event = "lz_adapter_deployed");
        Ok(address)
    }

    /// Deploys a CCIP adapter linked to `core` and the local router.
    pub fn deploy_ccip_adapter(&mut self, core: Address) -> Result<Address> {
        let router = self
            .state
            .ccip_router
            .as_ref()
            .ok_or(BridgeError::EndpointNotDeployed("CCIP"))?
            .address();
        if !self.state.cores.contains_key(&core) {
            return Err(BridgeError::UnknownContract(core));
        }
        let address = self.next_address();
        self.state
            .ccip_adapters
            .insert(address, CcipAdapter::new(address, core, router));

        info!(
            chain = %self.named,
            adapter = %address,
            core = %core,
            event = "ccip_adapter_deployed"
        );
        Ok(address)
    }

    // Fungible asset surface

    pub fn balance_of(&self, token: Address, account: Address) -> U256 {
        self.state
            .ledger(token)
            .map(|ledger| ledger.balance_of(account))
            .unwrap_or_default()
    }

    pub fn total_supply(&self, token: Address) -> U256 {
        self.state
            .ledger(token)
            .map(FungibleLedger::total_supply)
            .unwrap_or_default()
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.state
            .ledger(token)
            .map(|ledger| ledger.allowance(owner, spender))
            .unwrap_or_default()
    }

    pub fn approve(
        &mut self,
        caller: Address,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<()> {
        self.transact(Call::new(caller, token), |state| {
            ledger_mut(&mut state.tokens, &mut state.cores, token)?.approve(
                caller,
                spender,
                amount,
                &mut state.logs,
            )
        })
    }

    pub fn transfer(
        &mut self,
        caller: Address,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        self.transact(Call::new(caller, token), |state| {
            ledger_mut(&mut state.tokens, &mut state.cores, token)?.transfer(
                caller,
                to,
                amount,
                &mut state.logs,
            )
        })
    }

    // Core surface

    pub fn core(&self, core: Address) -> Option<&BridgeCore> {
        self.state.cores.get(&core)
    }

    pub fn set_adapter(
        &mut self,
        caller: Address,
        core: Address,
        adapter: Address,
        allowed: bool,
    ) -> Result<()> {
        self.transact(Call::new(caller, core), |state| {
            let logs = &mut state.logs;
            state
                .cores
                .get_mut(&core)
                .ok_or(BridgeError::UnknownContract(core))?
                .set_adapter(caller, adapter, allowed, logs)
        })
    }

    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        core: Address,
        new_owner: Address,
    ) -> Result<()> {
        self.transact(Call::new(caller, core), |state| {
            let logs = &mut state.logs;
            state
                .cores
                .get_mut(&core)
                .ok_or(BridgeError::UnknownContract(core))?
                .transfer_ownership(caller, new_owner, logs)
        })
    }

    pub fn renounce_ownership(&mut self, caller: Address, core: Address) -> Result<()> {
        self.transact(Call::new(caller, core), |state| {
            let logs = &mut state.logs;
            state
                .cores
                .get_mut(&core)
                .ok_or(BridgeError::UnknownContract(core))?
                .renounce_ownership(caller, logs)
        })
    }

    /// Direct `bridgeOut` call; only succeeds for an authorized adapter caller.
    pub fn bridge_out(
        &mut self,
        caller: Address,
        core: Address,
        from: Address,
        amount: U256,
        transfer_id: B256,
    ) -> Result<()> {
        self.transact(Call::new(caller, core), |state| {
            crate::adapter::lock_on_core(state, caller, core, from, amount, transfer_id)
        })
    }

    /// Direct `bridgeIn` call; only succeeds for an authorized adapter caller.
    pub fn bridge_in(
        &mut self,
        caller: Address,
        core: Address,
        to: Address,
        amount: U256,
        transfer_id: B256,
        transport_id: B256,
    ) -> Result<()> {
        self.transact(Call::new(caller, core), |state| {
            let ChainState {
                cores, tokens, logs, ..
            } = state;
            cores
                .get_mut(&core)
                .ok_or(BridgeError::UnknownContract(core))?
                .bridge_in(caller, to, amount, transfer_id, transport_id, tokens, logs)
        })
    }

    pub fn custody_balance(&self, core: Address) -> Result<U256> {
        Ok(self
            .core(core)
            .ok_or(BridgeError::UnknownContract(core))?
            .custody_balance(&self.state.tokens))
    }

    // LayerZero surface

    pub fn lz_endpoint(&self) -> Option<&LzEndpoint> {
        self.state.lz_endpoint.as_ref()
    }

    pub fn lz_adapter(&self, adapter: Address) -> Option<&LzAdapter> {
        self.state.lz_adapters.get(&adapter)
    }

    pub fn set_peer(
        &mut self,
        caller: Address,
        adapter: Address,
        eid: EndpointId,
        peer: B256,
    ) -> Result<()> {
        self.transact(Call::new(caller, adapter), |state| {
            lz::set_peer(state, caller, adapter, eid, peer)
        })
    }

    pub fn set_lz_send_options(
        &mut self,
        caller: Address,
        adapter: Address,
        eid: EndpointId,
        options: impl Into<Bytes>,
    ) -> Result<()> {
        let options = options.into();
        self.transact(Call::new(caller, adapter), |state| {
            lz::set_lz_send_options(state, caller, adapter, eid, options)
        })
    }

    pub fn quote_lz_send(
        &self,
        adapter: Address,
        params: &LzSendParams,
        pay_in_lz_token: bool,
    ) -> Result<MessagingFee> {
        lz::quote(&self.state, adapter, params, pay_in_lz_token)
    }

    /// Sends through a LayerZero adapter with `value` attached for the fee.
    pub fn send_with_lz(
        &mut self,
        caller: Address,
        adapter: Address,
        params: &LzSendParams,
        value: U256,
    ) -> Result<SendReceipt> {
        let span = spans::send(
            Transport::LayerZero,
            &self.named,
            &adapter,
            params.destination().as_u64(),
            params.amount(),
        );
        let _guard = span.enter();

        let result = self.transact(Call::new(caller, adapter).with_value(value), |state| {
            lz::send(state, caller, adapter, params, value)
        });
        if let Err(e) = &result {
            spans::record_error(e);
            warn!(chain = %self.named, adapter = %adapter, error = %e, event = "lz_send_failed");
        }
        result
    }

    /// Calls `lz_receive` directly; only the local endpoint is accepted as caller.
    pub fn lz_receive(
        &mut self,
        caller: Address,
        adapter: Address,
        origin: Origin,
        guid: B256,
        message: Bytes,
    ) -> Result<ReceiveOutcome> {
        self.transact(Call::new(caller, adapter), |state| {
            lz::receive(state, caller, adapter, &origin, guid, &message)
        })
    }

    /// Delivers a relayed packet through the local endpoint.
    ///
    /// A receive that reverts is rolled back and its payload stored on the
    /// endpoint; the delivery itself still succeeds. Only routing problems
    /// (wrong chain, non-EVM receiver) are returned as errors.
    pub fn lz_deliver(&mut self, packet: LzPacket) -> Result<DeliveryOutcome> {
        let span = spans::deliver(Transport::LayerZero, &self.named, &packet.guid);
        let _guard = span.enter();

        let endpoint = self
            .state
            .lz_endpoint
            .as_ref()
            .ok_or(BridgeError::EndpointNotDeployed("LayerZero"))?;
        if endpoint.eid() != packet.dst_eid {
            return Err(BridgeError::UnknownDestination(packet.dst_eid.as_u64()));
        }
        let endpoint_address = endpoint.address();
        let receiver = PeerIdentity::from_bytes32(packet.receiver)
            .and_then(|peer| peer.address())
            .ok_or_else(|| {
                BridgeError::UndeliverableReceiver(Bytes::copy_from_slice(
                    packet.receiver.as_slice(),
                ))
            })?;

        let snapshot = self.state.clone();
        let received = lz::receive(
            &mut self.state,
            endpoint_address,
            receiver,
            &packet.origin,
            packet.guid,
            &packet.message,
        );

        Ok(match received {
            Ok(ReceiveOutcome::Delivered(message)) => DeliveryOutcome::Delivered(message),
            Ok(ReceiveOutcome::Dropped(reason)) => DeliveryOutcome::Dropped(reason),
            Err(e) => {
                self.state = snapshot;
                spans::record_error(&e);
                let ChainState {
                    lz_endpoint, logs, ..
                } = &mut self.state;
                if let Some(endpoint) = lz_endpoint.as_mut() {
                    endpoint.store_payload(packet, e.to_string(), logs);
                }
                DeliveryOutcome::Stored(e)
            }
        })
    }

    /// Re-executes a stored payload; on failure it stays stored.
    pub fn lz_retry_payload(&mut self, caller: Address, guid: B256) -> Result<ReceiveOutcome> {
        let span = spans::retry_payload(&self.named, &guid);
        let _guard = span.enter();

        let endpoint_address = self
            .lz_endpoint()
            .ok_or(BridgeError::EndpointNotDeployed("LayerZero"))?
            .address();

        let result = self.transact(Call::new(caller, endpoint_address), |state| {
            let stored = state
                .lz_endpoint
                .as_mut()
                .ok_or(BridgeError::EndpointNotDeployed("LayerZero"))?
                .take_payload(guid)?;
            let packet = stored.packet;
            let receiver = PeerIdentity::from_bytes32(packet.receiver)
                .and_then(|peer| peer.address())
                .ok_or_else(|| {
                    BridgeError::UndeliverableReceiver(Bytes::copy_from_slice(
                        packet.receiver.as_slice(),
                    ))
                })?;
            lz::receive(
                state,
                endpoint_address,
                receiver,
                &packet.origin,
                packet.guid,
                &packet.message,
            )
        });
        if let Err(e) = &result {
            spans::record_error(e);
        }
        result
    }

    /// Removes and returns every packet queued on the local endpoint.
    pub fn drain_lz_outbox(&mut self) -> Vec<LzPacket> {
        self.state
            .lz_endpoint
            .as_mut()
            .map(LzEndpoint::drain_outbox)
            .unwrap_or_default()
    }

    // CCIP surface

    pub fn ccip_router(&self) -> Option<&CcipRouter> {
        self.state.ccip_router.as_ref()
    }

    pub fn ccip_adapter(&self, adapter: Address) -> Option<&CcipAdapter> {
        self.state.ccip_adapters.get(&adapter)
    }

    pub fn set_ccip_peer(
        &mut self,
        caller: Address,
        adapter: Address,
        selector: ChainSelector,
        peer: impl Into<Bytes>,
    ) -> Result<()> {
        let peer = peer.into();
        self.transact(Call::new(caller, adapter), |state| {
            ccip::set_ccip_peer(state, caller, adapter, selector, peer)
        })
    }

    pub fn set_ccip_extra_args(
        &mut self,
        caller: Address,
        adapter: Address,
        selector: ChainSelector,
        extra_args: impl Into<Bytes>,
    ) -> Result<()> {
        let extra_args = extra_args.into();
        self.transact(Call::new(caller, adapter), |state| {
            ccip::set_ccip_extra_args(state, caller, adapter, selector, extra_args)
        })
    }

    /// Quotes a CCIP send as it would be made by `sender`.
    pub fn quote_ccip_send(
        &self,
        adapter: Address,
        sender: Address,
        params: &CcipSendParams,
    ) -> Result<U256> {
        ccip::quote(&self.state, adapter, sender, params)
    }

    /// Sends through a CCIP adapter with `value` attached for the fee.
    pub fn send_with_ccip(
        &mut self,
        caller: Address,
        adapter: Address,
        params: &CcipSendParams,
        value: U256,
    ) -> Result<SendReceipt> {
        let span = spans::send(
            Transport::Ccip,
            &self.named,
            &adapter,
            params.destination().as_u64(),
            params.amount(),
        );
        let _guard = span.enter();

        let result = self.transact(Call::new(caller, adapter).with_value(value), |state| {
            ccip::send(state, caller, adapter, params, value)
        });
        if let Err(e) = &result {
            spans::record_error(e);
            warn!(chain = %self.named, adapter = %adapter, error = %e, event = "ccip_send_failed");
        }
        result
    }

    /// Calls `ccip_receive` directly; only the local router is accepted as caller.
    pub fn ccip_receive(
        &mut self,
        caller: Address,
        adapter: Address,
        message: &Any2EvmMessage,
    ) -> Result<DecodedMessage> {
        self.transact(Call::new(caller, adapter), |state| {
            ccip::receive(state, caller, adapter, message)
        })
    }

    /// Delivers a routed message through the local router.
    ///
    /// Unlike LayerZero, a reverting receive is returned to the caller.
    pub fn ccip_route(&mut self, packet: &CcipPacket) -> Result<DecodedMessage> {
        let span = spans::deliver(Transport::Ccip, &self.named, &packet.message.message_id);
        let _guard = span.enter();

        let router = self
            .ccip_router()
            .ok_or(BridgeError::EndpointNotDeployed("CCIP"))?;
        if router.selector() != packet.destination {
            return Err(BridgeError::UnknownDestination(packet.destination.as_u64()));
        }
        let router_address = router.address();
        let receiver = PeerIdentity::from_ccip_bytes(&packet.receiver)
            .and_then(|peer| peer.address())
            .ok_or_else(|| BridgeError::UndeliverableReceiver(packet.receiver.clone()))?;

        let result = self.transact(Call::new(router_address, receiver), |state| {
            ccip::receive(state, router_address, receiver, &packet.message)
        });
        if let Err(e) = &result {
            spans::record_error(e);
        }
        result
    }

    /// Removes and returns every message queued on the local router.
    pub fn drain_ccip_outbox(&mut self) -> Vec<CcipPacket> {
        self.state
            .ccip_router
            .as_mut()
            .map(CcipRouter::drain_outbox)
            .unwrap_or_default()
    }
}
