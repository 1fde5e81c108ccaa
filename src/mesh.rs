// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Multi-chain mesh and relayer
//!
//! The [`Mesh`] is the external transport network: it carries packets from
//! each chain's endpoint outbox to the chain whose endpoint id or chain
//! selector matches the packet's destination.

use alloy_chains::NamedChain;
use alloy_primitives::B256;
use tracing::{info, warn};

use crate::chain::Chain;
use crate::error::{BridgeError, Result};
use crate::spans;
use crate::transport::{CcipPacket, DeliveryOutcome, LzPacket, Transport};

/// One relayed message and what happened to it
#[derive(Debug)]
pub struct DeliveryReport {
    pub transport: Transport,
    pub source: NamedChain,
    /// `None` when no chain in the mesh hosts the destination
    pub destination: Option<NamedChain>,
    pub delivery_id: B256,
    pub outcome: DeliveryOutcome,
}

/// A set of chains joined by both transports
#[derive(Debug, Default)]
pub struct Mesh {
    chains: Vec<Chain>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `chain`; fails if a chain with the same name is already present.
    pub fn add_chain(&mut self, chain: Chain) -> Result<()> {
        if self.chain(chain.named()).is_some() {
            return Err(BridgeError::InvalidConfig(format!(
                "chain {} already in mesh",
                chain.named()
            )));
        }
        self.chains.push(chain);
        Ok(())
    }

    pub fn chain(&self, named: NamedChain) -> Option<&Chain> {
        self.chains.iter().find(|chain| chain.named() == named)
    }

    pub fn chain_mut(&mut self, named: NamedChain) -> Option<&mut Chain> {
        self.chains.iter_mut().find(|chain| chain.named() == named)
    }

    pub fn chains(&self) -> impl Iterator<Item = &Chain> {
        self.chains.iter()
    }

    /// Registers every router's selector as a supported destination on every
    /// other router in the mesh.
    pub fn connect_ccip_routers(&mut self) -> Result<()> {
        let selectors: Vec<_> = self
            .chains
            .iter()
            .filter_map(|chain| chain.ccip_router().map(|router| router.selector()))
            .collect();

        for chain in self.chains.iter_mut().filter(|c| c.ccip_router().is_some()) {
            for selector in &selectors {
                let own = chain.ccip_router().map(|router| router.selector());
                if own != Some(*selector) {
                    chain.add_ccip_supported_chain(*selector)?;
                }
            }
        }
        Ok(())
    }

    /// Number of packets waiting in all outboxes
    pub fn pending(&self) -> usize {
        self.chains
            .iter()
            .map(|chain| {
                chain.lz_endpoint().map_or(0, |e| e.pending().count())
                    + chain.ccip_router().map_or(0, |r| r.pending().count())
            })
            .sum()
    }

    /// Drains every outbox and delivers each packet, oldest first per outbox.
    pub fn relay_all(&mut self) -> Vec<DeliveryReport> {
        let span = spans::relay(self.chains.len());
        let _guard = span.enter();

        let mut reports = Vec::new();
        loop {
            let mut in_flight: Vec<(NamedChain, Packet)> = Vec::new();
            for chain in &mut self.chains {
                let source = chain.named();
                in_flight.extend(
                    chain
                        .drain_lz_outbox()
                        .into_iter()
                        .map(|p| (source, Packet::Lz(p))),
                );
                in_flight.extend(
                    chain
                        .drain_ccip_outbox()
                        .into_iter()
                        .map(|p| (source, Packet::Ccip(p))),
                );
            }
            if in_flight.is_empty() {
                break;
            }

            for (source, packet) in in_flight {
                reports.push(self.deliver(source, packet));
            }
        }

        let delivered = reports.iter().filter(|r| r.outcome.is_delivered()).count();
        span.record("delivered", delivered);
        info!(
            relayed = reports.len(),
            delivered = delivered,
            event = "mesh_relay_completed"
        );
        reports
    }

    fn deliver(&mut self, source: NamedChain, packet: Packet) -> DeliveryReport {
        let (transport, delivery_id) = match &packet {
            Packet::Lz(p) => (Transport::LayerZero, p.guid),
            Packet::Ccip(p) => (Transport::Ccip, p.message.message_id),
        };

        let destination = self.chains.iter_mut().find(|chain| match &packet {
            Packet::Lz(p) => chain.lz_endpoint().map(|e| e.eid()) == Some(p.dst_eid),
            Packet::Ccip(p) => chain.ccip_router().map(|r| r.selector()) == Some(p.destination),
        });

        let Some(chain) = destination else {
            let key = match &packet {
                Packet::Lz(p) => p.dst_eid.as_u64(),
                Packet::Ccip(p) => p.destination.as_u64(),
            };
            warn!(
                transport = %transport,
                source = %source,
                destination = key,
                event = "relay_destination_unknown"
            );
            return DeliveryReport {
                transport,
                source,
                destination: None,
                delivery_id,
                outcome: DeliveryOutcome::Reverted(BridgeError::UnknownDestination(key)),
            };
        };

        let outcome = match packet {
            Packet::Lz(p) => chain.lz_deliver(p).unwrap_or_else(DeliveryOutcome::Reverted),
            Packet::Ccip(p) => match chain.ccip_route(&p) {
                Ok(message) => DeliveryOutcome::Delivered(message),
                Err(e) => DeliveryOutcome::Reverted(e),
            },
        };

        DeliveryReport {
            transport,
            source,
            destination: Some(chain.named()),
            delivery_id,
            outcome,
        }
    }
}

enum Packet {
    Lz(LzPacket),
    Ccip(CcipPacket),
}
