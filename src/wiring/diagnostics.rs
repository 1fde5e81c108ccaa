// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Read-only adapter health checks

use alloy_chains::NamedChain;
use alloy_primitives::{Address, Bytes, U256};
use std::fmt;
use tracing::{debug, warn};

use crate::adapter::{BridgeAdapter, CcipSendParams, LzSendParams};
use crate::chain::Chain;
use crate::error::{BridgeError, Result};
use crate::protocol::{ChainSelector, EndpointId, PeerIdentity};
use crate::spans;
use crate::transport::Transport;

/// Something that would make a send towards the diagnosed destination fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// The linked core does not accept calls from this adapter
    AdapterNotAuthorized,
    PeerNotSet,
    PeerMismatch {
        expected: Address,
        actual: PeerIdentity,
    },
    QuoteFailed(String),
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdapterNotAuthorized => write!(f, "adapter is not authorized on its core"),
            Self::PeerNotSet => write!(f, "no peer registered for destination"),
            Self::PeerMismatch { expected, actual } => {
                write!(f, "peer is {actual}, expected {expected}")
            }
            Self::QuoteFailed(reason) => write!(f, "quote failed: {reason}"),
        }
    }
}

/// Snapshot of an adapter's configuration towards one destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub transport: Transport,
    pub chain: NamedChain,
    pub adapter: Address,
    pub destination: u64,
    pub core: Address,
    pub core_owner: Address,
    pub adapter_authorized: bool,
    pub peer: Option<PeerIdentity>,
    /// Stored LayerZero send options or CCIP extra args
    pub options: Bytes,
    /// Native fee for a one-unit probe transfer
    pub quote: Option<U256>,
    pub issues: Vec<Issue>,
}

impl Diagnosis {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Reads a LayerZero adapter's configuration towards `eid`.
///
/// `expected_peer`, when given, is checked against the stored peer.
pub fn diagnose_lz(
    chain: &Chain,
    adapter_address: Address,
    eid: EndpointId,
    expected_peer: Option<Address>,
) -> Result<Diagnosis> {
    let span = spans::diagnose(
        Transport::LayerZero,
        &chain.named(),
        &adapter_address,
        eid.as_u64(),
    );
    let _guard = span.enter();

    let adapter = chain
        .lz_adapter(adapter_address)
        .ok_or(BridgeError::UnknownContract(adapter_address))?;
    let core = chain
        .core(adapter.core())
        .ok_or(BridgeError::UnknownContract(adapter.core()))?;

    let probe = LzSendParams::builder()
        .destination(eid)
        .recipient(core.owner())
        .amount(U256::from(1u64))
        .build();
    let quote = chain
        .quote_lz_send(adapter_address, &probe, false)
        .map(|fee| fee.native_fee);

    let diagnosis = assemble(
        Transport::LayerZero,
        chain.named(),
        adapter_address,
        eid.as_u64(),
        Context {
            core: core.address(),
            core_owner: core.owner(),
            adapter_authorized: core.is_adapter(adapter_address),
            peer: adapter.trusted_peer(eid.as_u64()),
            options: adapter.lz_send_options(eid),
        },
        quote,
        expected_peer,
    );
    report(&diagnosis);
    Ok(diagnosis)
}

/// Reads a CCIP adapter's configuration towards `selector`.
pub fn diagnose_ccip(
    chain: &Chain,
    adapter_address: Address,
    selector: ChainSelector,
    expected_peer: Option<Address>,
) -> Result<Diagnosis> {
    let span = spans::diagnose(
        Transport::Ccip,
        &chain.named(),
        &adapter_address,
        selector.as_u64(),
    );
    let _guard = span.enter();

    let adapter = chain
        .ccip_adapter(adapter_address)
        .ok_or(BridgeError::UnknownContract(adapter_address))?;
    let core = chain
        .core(adapter.core())
        .ok_or(BridgeError::UnknownContract(adapter.core()))?;

    let probe = CcipSendParams::builder()
        .destination(selector)
        .recipient(core.owner())
        .amount(U256::from(1u64))
        .build();
    let quote = chain.quote_ccip_send(adapter_address, core.owner(), &probe);

    let diagnosis = assemble(
        Transport::Ccip,
        chain.named(),
        adapter_address,
        selector.as_u64(),
        Context {
            core: core.address(),
            core_owner: core.owner(),
            adapter_authorized: core.is_adapter(adapter_address),
            peer: adapter.trusted_peer(selector.as_u64()),
            options: adapter.ccip_extra_args(selector),
        },
        quote,
        expected_peer,
    );
    report(&diagnosis);
    Ok(diagnosis)
}

struct Context {
    core: Address,
    core_owner: Address,
    adapter_authorized: bool,
    peer: Option<PeerIdentity>,
    options: Bytes,
}

fn assemble(
    transport: Transport,
    chain: NamedChain,
    adapter: Address,
    destination: u64,
    context: Context,
    quote: Result<U256>,
    expected_peer: Option<Address>,
) -> Diagnosis {
    let mut issues = Vec::new();
    if !context.adapter_authorized {
        issues.push(Issue::AdapterNotAuthorized);
    }
    match (&context.peer, expected_peer) {
        (None, _) => issues.push(Issue::PeerNotSet),
        (Some(actual), Some(expected)) if actual.address() != Some(expected) => {
            issues.push(Issue::PeerMismatch {
                expected,
                actual: actual.clone(),
            })
        }
        _ => {}
    }
    let quote = match quote {
        Ok(fee) => Some(fee),
        // a missing peer already explains a failed quote
        Err(BridgeError::NoPeer(_) | BridgeError::MissingCcipPeer(_)) => None,
        Err(e) => {
            issues.push(Issue::QuoteFailed(e.to_string()));
            None
        }
    };

    Diagnosis {
        transport,
        chain,
        adapter,
        destination,
        core: context.core,
        core_owner: context.core_owner,
        adapter_authorized: context.adapter_authorized,
        peer: context.peer,
        options: context.options,
        quote,
        issues,
    }
}

fn report(diagnosis: &Diagnosis) {
    debug!(
        transport = %diagnosis.transport,
        chain = %diagnosis.chain,
        adapter = %diagnosis.adapter,
        destination = diagnosis.destination,
        core = %diagnosis.core,
        owner = %diagnosis.core_owner,
        authorized = diagnosis.adapter_authorized,
        options = %diagnosis.options,
        event = "adapter_diagnosed"
    );
    for issue in &diagnosis.issues {
        warn!(
            transport = %diagnosis.transport,
            chain = %diagnosis.chain,
            adapter = %diagnosis.adapter,
            destination = diagnosis.destination,
            issue = %issue,
            event = "adapter_issue"
        );
    }
}
