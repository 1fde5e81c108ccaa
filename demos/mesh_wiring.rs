// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Wiring a fresh deployment from mesh configs
//!
//! Deploys unwired cores and adapters on two chains, plans the wiring with a
//! dry run, applies it, and diagnoses the result. CCIP chain selectors can be
//! overridden with `CCIP_CHAIN_SELECTOR_<NETWORK>` (e.g.
//! `CCIP_CHAIN_SELECTOR_BASE_SEPOLIA`), read from the environment or `.env`.
//!
//! Run with: `cargo run --example mesh_wiring`

use alloy_chains::NamedChain;
use alloy_primitives::{Address, U256};
use token6022_bridge::wiring::{
    diagnose_ccip, diagnose_lz, wire_ccip, wire_lz, CcipMeshConfig, LzMeshConfig,
};
use token6022_bridge::{BridgeError, Chain, FeeSchedule, Mesh};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LZ_MESH: &str = r#"{
    "points": [
        { "network": "sepolia", "eid": 40161 },
        { "network": "base-sepolia", "eid": 40245 }
    ],
    "pathways": [
        {
            "a": "sepolia",
            "b": "base-sepolia",
            "a_to_b_options": "0x00030100110100000000000000000000000000030d40",
            "b_to_a_options": "0x00030100110100000000000000000000000000030d40"
        }
    ]
}"#;

const CCIP_MESH: &str = r#"{
    "points": [
        { "network": "sepolia", "chainSelector": "16015286601757825753" },
        { "network": "base-sepolia", "chainSelector": "10344971235874465080" }
    ],
    "pathways": [ { "a": "sepolia", "b": "base-sepolia" } ]
}"#;

struct Deployed {
    lz_adapter: Address,
    ccip_adapter: Address,
}

fn deploy(
    chain: &mut Chain,
    owner: Address,
    lz: &LzMeshConfig,
    ccip: &CcipMeshConfig,
    canonical: bool,
) -> Result<Deployed, BridgeError> {
    let network = chain.named().to_string();
    chain.deploy_lz_endpoint(lz.point(&network)?.key, FeeSchedule::default())?;
    chain.deploy_ccip_router(ccip.point(&network)?.key, FeeSchedule::default())?;

    let core = if canonical {
        let supply = U256::from(1_000u64);
        let token = chain.deploy_token("Token6022", "T6022", owner, supply)?;
        chain.deploy_canonical_core(token, owner)?
    } else {
        chain.deploy_satellite_core("Token6022", "T6022", owner)?
    };
    let deployed = Deployed {
        lz_adapter: chain.deploy_lz_adapter(core)?,
        ccip_adapter: chain.deploy_ccip_adapter(core)?,
    };
    chain.set_adapter(owner, core, deployed.lz_adapter, true)?;
    chain.set_adapter(owner, core, deployed.ccip_adapter, true)?;
    Ok(deployed)
}

fn main() -> Result<(), BridgeError> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("token6022_bridge=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("🕸️  Mesh Wiring");
    println!("==============\n");

    let owner = Address::repeat_byte(0x0f);
    let mut lz = LzMeshConfig::from_json(LZ_MESH)?;
    let mut ccip = CcipMeshConfig::from_json(CCIP_MESH)?;
    ccip.apply_env_overrides()?;

    let mut sepolia = Chain::new(NamedChain::Sepolia);
    let mut base = Chain::new(NamedChain::BaseSepolia);
    let a = deploy(&mut sepolia, owner, &lz, &ccip, true)?;
    let b = deploy(&mut base, owner, &lz, &ccip, false)?;

    for (network, deployed) in [("sepolia", &a), ("base-sepolia", &b)] {
        lz.set_address(network, deployed.lz_adapter)?;
        ccip.set_address(network, deployed.ccip_adapter)?;
    }

    println!("📝 Dry run");
    for chain in [&mut sepolia, &mut base] {
        println!("{}", wire_lz(chain, owner, &lz, true)?);
        println!("{}", wire_ccip(chain, owner, &ccip, true)?);
    }

    println!("\n🔧 Applying");
    for chain in [&mut sepolia, &mut base] {
        println!("{}", wire_lz(chain, owner, &lz, false)?);
        println!("{}", wire_ccip(chain, owner, &ccip, false)?);
    }

    println!("\n🔁 Second pass");
    println!("{}", wire_lz(&mut sepolia, owner, &lz, false)?);

    let mut mesh = Mesh::new();
    mesh.add_chain(sepolia)?;
    mesh.add_chain(base)?;
    mesh.connect_ccip_routers()?;

    println!("\n🩺 Diagnostics");
    let sepolia = mesh
        .chain(NamedChain::Sepolia)
        .ok_or_else(|| BridgeError::InvalidConfig("sepolia missing from mesh".to_string()))?;
    let lz_report = diagnose_lz(
        sepolia,
        a.lz_adapter,
        lz.point("base-sepolia")?.key,
        Some(b.lz_adapter),
    )?;
    let ccip_report = diagnose_ccip(
        sepolia,
        a.ccip_adapter,
        ccip.point("base-sepolia")?.key,
        Some(b.ccip_adapter),
    )?;
    for report in [&lz_report, &ccip_report] {
        let status = if report.is_healthy() { "✅" } else { "⚠️ " };
        println!(
            "   {status} {} -> {}: peer {:?}, quote {:?}",
            report.transport, report.destination, report.peer, report.quote
        );
        for issue in &report.issues {
            println!("      - {issue}");
        }
    }

    Ok(())
}
