// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Idempotent adapter wiring
//!
//! Compares one chain's adapter against the outbound connections of a mesh
//! config and sets only what differs. Running the same config twice produces
//! an empty plan the second time.

use alloy_chains::NamedChain;
use alloy_primitives::{hex, Address, Bytes, B256};
use std::fmt;
use tracing::info;

use super::mesh_config::{CcipMeshConfig, LzMeshConfig, MeshPoint};
use crate::chain::Chain;
use crate::error::{BridgeError, Result};
use crate::protocol::{address_to_bytes32, ChainSelector, EndpointId, PeerIdentity};
use crate::spans;
use crate::transport::Transport;

/// One configuration write on an adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireAction {
    SetPeer { eid: EndpointId, peer: B256 },
    SetLzSendOptions { eid: EndpointId, options: Bytes },
    SetCcipPeer { selector: ChainSelector, peer: Bytes },
    SetCcipExtraArgs { selector: ChainSelector, extra_args: Bytes },
}

impl fmt::Display for WireAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetPeer { eid, peer } => {
                write!(f, "set_peer eid={eid} peer={}", hex::encode_prefixed(peer))
            }
            Self::SetLzSendOptions { eid, options } => write!(
                f,
                "set_lz_send_options eid={eid} options={}",
                hex::encode_prefixed(options)
            ),
            Self::SetCcipPeer { selector, peer } => write!(
                f,
                "set_ccip_peer selector={selector} peer={}",
                hex::encode_prefixed(peer)
            ),
            Self::SetCcipExtraArgs {
                selector,
                extra_args,
            } => write!(
                f,
                "set_ccip_extra_args selector={selector} extra_args={}",
                hex::encode_prefixed(extra_args)
            ),
        }
    }
}

/// Writes needed to bring one adapter in line with a mesh config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WirePlan {
    pub transport: Transport,
    pub chain: NamedChain,
    pub adapter: Address,
    pub dry_run: bool,
    pub actions: Vec<WireAction>,
    /// Settings that already matched
    pub unchanged: usize,
}

impl WirePlan {
    /// Returns true when the adapter already matched the config
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Display for WirePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} wiring on {}: {} change(s), {} already configured",
            self.transport,
            self.chain,
            self.actions.len(),
            self.unchanged
        )?;
        if self.dry_run {
            write!(f, " (dry-run)")?;
        }
        for action in &self.actions {
            write!(f, "\n- {action}")?;
        }
        Ok(())
    }
}

fn local_point<'a, K: Copy + PartialEq + fmt::Display>(
    points: &'a [MeshPoint<K>],
    network: &str,
    deployed: Option<K>,
) -> Result<&'a MeshPoint<K>> {
    let point = points
        .iter()
        .find(|point| point.network == network)
        .ok_or_else(|| BridgeError::InvalidConfig(format!("no point for network \"{network}\"")))?;
    if deployed != Some(point.key) {
        return Err(BridgeError::InvalidConfig(format!(
            "point \"{network}\" has key {} but the chain's endpoint does not match",
            point.key
        )));
    }
    Ok(point)
}

/// Plans and, unless `dry_run`, applies LayerZero peers and send options for
/// the connections leaving `chain`.
pub fn wire_lz(
    chain: &mut Chain,
    caller: Address,
    config: &LzMeshConfig,
    dry_run: bool,
) -> Result<WirePlan> {
    let network = chain.named().to_string();
    let deployed = chain.lz_endpoint().map(|endpoint| endpoint.eid());
    let point = local_point(&config.points, &network, deployed)?;
    let adapter_address = point.address.ok_or_else(|| {
        BridgeError::InvalidConfig(format!(
            "Point on network \"{network}\" must define an \"address\""
        ))
    })?;

    let span = spans::wire(Transport::LayerZero, &chain.named(), &adapter_address, dry_run);
    let _guard = span.enter();

    let adapter = chain
        .lz_adapter(adapter_address)
        .ok_or(BridgeError::UnknownContract(adapter_address))?;

    let mut plan = WirePlan {
        transport: Transport::LayerZero,
        chain: chain.named(),
        adapter: adapter_address,
        dry_run,
        actions: Vec::new(),
        unchanged: 0,
    };

    for connection in config.connections_from(&network)? {
        let eid = connection.to.key;
        let peer = address_to_bytes32(connection.to.address);
        if adapter.peers(eid) == peer {
            info!(eid = %eid, peer = %peer, event = "lz_peer_already_configured");
            plan.unchanged += 1;
        } else {
            plan.actions.push(WireAction::SetPeer { eid, peer });
        }

        if let Some(options) = connection.options {
            if adapter.lz_send_options(eid) == options {
                plan.unchanged += 1;
            } else {
                plan.actions
                    .push(WireAction::SetLzSendOptions { eid, options });
            }
        }
    }

    apply(chain, caller, &plan)?;
    Ok(plan)
}

/// Plans and, unless `dry_run`, applies CCIP peers and extra args for the
/// connections leaving `chain`.
///
/// A stored peer counts as configured when it names the same address in
/// either raw or `abi.encode(address)` form.
pub fn wire_ccip(
    chain: &mut Chain,
    caller: Address,
    config: &CcipMeshConfig,
    dry_run: bool,
) -> Result<WirePlan> {
    let network = chain.named().to_string();
    let deployed = chain.ccip_router().map(|router| router.selector());
    let point = local_point(&config.points, &network, deployed)?;
    let adapter_address = point.address.ok_or_else(|| {
        BridgeError::InvalidConfig(format!(
            "Point on network \"{network}\" must define an \"address\""
        ))
    })?;

    let span = spans::wire(Transport::Ccip, &chain.named(), &adapter_address, dry_run);
    let _guard = span.enter();

    let adapter = chain
        .ccip_adapter(adapter_address)
        .ok_or(BridgeError::UnknownContract(adapter_address))?;

    let mut plan = WirePlan {
        transport: Transport::Ccip,
        chain: chain.named(),
        adapter: adapter_address,
        dry_run,
        actions: Vec::new(),
        unchanged: 0,
    };

    for connection in config.connections_from(&network)? {
        let selector = connection.to.key;
        let desired = PeerIdentity::NativeAddress(connection.to.address);
        let current = PeerIdentity::from_ccip_bytes(&adapter.ccip_peers(selector));
        if current.as_ref() == Some(&desired) {
            info!(selector = %selector, peer = %desired, event = "ccip_peer_already_configured");
            plan.unchanged += 1;
        } else {
            plan.actions.push(WireAction::SetCcipPeer {
                selector,
                peer: desired.to_wire_bytes(),
            });
        }

        if let Some(extra_args) = connection.options {
            if adapter.ccip_extra_args(selector) == extra_args {
                plan.unchanged += 1;
            } else {
                plan.actions.push(WireAction::SetCcipExtraArgs {
                    selector,
                    extra_args,
                });
            }
        }
    }

    apply(chain, caller, &plan)?;
    Ok(plan)
}

fn apply(chain: &mut Chain, caller: Address, plan: &WirePlan) -> Result<()> {
    for action in &plan.actions {
        if plan.dry_run {
            info!(chain = %plan.chain, action = %action, event = "wire_action_planned");
            continue;
        }

        let adapter = plan.adapter;
        let result = match action.clone() {
            WireAction::SetPeer { eid, peer } => chain.set_peer(caller, adapter, eid, peer),
            WireAction::SetLzSendOptions { eid, options } => {
                chain.set_lz_send_options(caller, adapter, eid, options)
            }
            WireAction::SetCcipPeer { selector, peer } => {
                chain.set_ccip_peer(caller, adapter, selector, peer)
            }
            WireAction::SetCcipExtraArgs {
                selector,
                extra_args,
            } => chain.set_ccip_extra_args(caller, adapter, selector, extra_args),
        };
        if let Err(e) = &result {
            spans::record_error(e);
        }
        result?;
        info!(chain = %plan.chain, action = %action, event = "wire_action_applied");
    }
    Ok(())
}
