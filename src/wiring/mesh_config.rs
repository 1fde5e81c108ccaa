// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Mesh configuration files
//!
//! A mesh config lists one adapter per network and the two-way pathways
//! between them. Each pathway expands into two directed connections, each
//! carrying the options the `from` side uses when sending to the `to` side.

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{BridgeError, Result};
use crate::protocol::{ChainSelector, EndpointId};

/// One adapter deployment in a mesh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshPoint<K> {
    /// Network name as printed by `NamedChain`, e.g. `base-sepolia`
    pub network: String,
    /// Transport key of this network: endpoint id or chain selector
    #[serde(alias = "eid", alias = "chainSelector", alias = "chain_selector")]
    pub key: K,
    /// Adapter address; may be filled in after loading with [`MeshConfig::set_address`]
    #[serde(default)]
    pub address: Option<Address>,
}

/// A bidirectional link between two points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pathway {
    pub a: String,
    pub b: String,
    /// Options used by `a` when sending to `b`; `None` leaves them untouched
    #[serde(default)]
    pub a_to_b_options: Option<Bytes>,
    /// Options used by `b` when sending to `a`; `None` leaves them untouched
    #[serde(default)]
    pub b_to_a_options: Option<Bytes>,
}

/// A directed connection with both endpoints resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection<K> {
    pub from: ResolvedPoint<K>,
    pub to: ResolvedPoint<K>,
    pub options: Option<Bytes>,
}

/// A point whose address is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPoint<K> {
    pub network: String,
    pub key: K,
    pub address: Address,
}

/// Mesh config for one transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshConfig<K> {
    pub points: Vec<MeshPoint<K>>,
    #[serde(default)]
    pub pathways: Vec<Pathway>,
}

/// LayerZero mesh keyed by endpoint id
pub type LzMeshConfig = MeshConfig<EndpointId>;

/// CCIP mesh keyed by chain selector
pub type CcipMeshConfig = MeshConfig<ChainSelector>;

impl<K> MeshConfig<K>
where
    K: Copy + for<'de> Deserialize<'de>,
{
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), event = "mesh_config_loaded");
        Self::from_json(&json)
    }
}

impl<K: Copy> MeshConfig<K> {
    /// Every pathway must name known, distinct points.
    pub fn validate(&self) -> Result<()> {
        for pathway in &self.pathways {
            if pathway.a == pathway.b {
                return Err(BridgeError::InvalidConfig(format!(
                    "pathway connects \"{}\" to itself",
                    pathway.a
                )));
            }
            self.point(&pathway.a)?;
            self.point(&pathway.b)?;
        }
        Ok(())
    }

    pub fn point(&self, network: &str) -> Result<&MeshPoint<K>> {
        self.points
            .iter()
            .find(|point| point.network == network)
            .ok_or_else(|| {
                BridgeError::InvalidConfig(format!("no point for network \"{network}\""))
            })
    }

    /// Fills in the adapter address of `network`.
    pub fn set_address(&mut self, network: &str, address: Address) -> Result<()> {
        let point = self
            .points
            .iter_mut()
            .find(|point| point.network == network)
            .ok_or_else(|| {
                BridgeError::InvalidConfig(format!("no point for network \"{network}\""))
            })?;
        point.address = Some(address);
        Ok(())
    }

    fn resolve(&self, network: &str) -> Result<ResolvedPoint<K>> {
        let point = self.point(network)?;
        let address = point.address.ok_or_else(|| {
            BridgeError::InvalidConfig(format!(
                "Point on network \"{network}\" must define an \"address\""
            ))
        })?;
        Ok(ResolvedPoint {
            network: point.network.clone(),
            key: point.key,
            address,
        })
    }

    /// Expands every pathway into its two directed connections.
    pub fn connections(&self) -> Result<Vec<Connection<K>>> {
        let mut connections = Vec::with_capacity(self.pathways.len() * 2);
        for pathway in &self.pathways {
            let (a, b) = (self.resolve(&pathway.a)?, self.resolve(&pathway.b)?);
            connections.push(Connection {
                from: a.clone(),
                to: b.clone(),
                options: pathway.a_to_b_options.clone(),
            });
            connections.push(Connection {
                from: b,
                to: a,
                options: pathway.b_to_a_options.clone(),
            });
        }
        Ok(connections)
    }

    /// Outbound connections of `network`
    pub fn connections_from(&self, network: &str) -> Result<Vec<Connection<K>>> {
        self.point(network)?;
        Ok(self
            .connections()?
            .into_iter()
            .filter(|connection| connection.from.network == network)
            .collect())
    }
}

impl CcipMeshConfig {
    /// Replaces chain selectors from `CCIP_CHAIN_SELECTOR_<NETWORK>` variables,
    /// with the network upper-cased and dashes turned into underscores.
    pub fn apply_overrides_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        for point in &mut self.points {
            let variable = selector_variable(&point.network);
            if let Some(value) = lookup(&variable) {
                let selector: ChainSelector = value.parse()?;
                info!(
                    network = %point.network,
                    variable = %variable,
                    selector = %selector,
                    event = "ccip_selector_overridden"
                );
                point.key = selector;
            }
        }
        Ok(())
    }

    /// Loads `.env` if present, then applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Err(e) = dotenvy::dotenv() {
            debug!(error = %e, event = "dotenv_not_loaded");
        }
        self.apply_overrides_with(|name| std::env::var(name).ok())
    }
}

/// Environment variable that overrides the chain selector of `network`
pub fn selector_variable(network: &str) -> String {
    format!(
        "CCIP_CHAIN_SELECTOR_{}",
        network.to_uppercase().replace('-', "_")
    )
}
