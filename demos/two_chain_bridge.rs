// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Two-chain bridge walkthrough
//!
//! Locks tokens on the canonical chain, relays them to the satellite over
//! LayerZero, then sends part of them back over CCIP. Every step is traced;
//! set `RUST_LOG=token6022_bridge=debug` for the full span tree.
//!
//! Run with: `cargo run --example two_chain_bridge`

use alloy_primitives::{B256, U256};
use token6022_bridge::testing::TwoChainFixture;
use token6022_bridge::{BridgeError, DeliveryOutcome};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn tokens(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

fn main() -> Result<(), BridgeError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("token6022_bridge=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    println!("🌉 Token6022 Two-Chain Bridge");
    println!("=============================\n");

    let mut fixture = TwoChainFixture::new()?;
    let (sender, recipient) = (fixture.owner_a, fixture.bob);

    println!("📋 Deployment:");
    println!("   Canonical core ({}): {}", TwoChainFixture::CANONICAL, fixture.canonical.core);
    println!("   Satellite core ({}): {}", TwoChainFixture::SATELLITE, fixture.satellite.core);

    // Step 1: lock on the canonical chain
    let amount = tokens(5);
    fixture.approve_core(sender, amount)?;
    let params = fixture.lz_to_b(recipient, amount, B256::ZERO);
    let fee = fixture
        .a()
        .quote_lz_send(fixture.canonical.lz_adapter, &params, false)?
        .native_fee;
    println!("\n1️⃣  Sending {amount} over LayerZero (fee {fee} wei)");
    let receipt = fixture.send_lz_from_a(sender, &params)?;
    println!("   Transfer id: {}", receipt.transfer_id);
    println!("   Guid:        {}", receipt.delivery_id);

    // Step 2: relay
    println!("\n2️⃣  Relaying");
    for report in fixture.mesh.relay_all() {
        print_report(&report.outcome);
    }

    // Step 3: send part of it back over CCIP
    let back = tokens(2);
    let params = fixture.ccip_to_a(sender, back, B256::repeat_byte(1));
    println!("\n3️⃣  Returning {back} over CCIP");
    let receipt = fixture.send_ccip_from_b(recipient, &params)?;
    println!("   Message id: {}", receipt.delivery_id);
    for report in fixture.mesh.relay_all() {
        print_report(&report.outcome);
    }

    println!("\n📊 Balances:");
    println!("   Sender on canonical:    {}", fixture.balance_a(sender));
    println!("   Recipient on satellite: {}", fixture.balance_b(recipient));
    println!(
        "   Canonical custody:      {}",
        fixture.a().custody_balance(fixture.canonical.core)?
    );
    println!(
        "   Satellite supply:       {}",
        fixture.b().total_supply(fixture.satellite.asset)
    );

    Ok(())
}

fn print_report(outcome: &DeliveryOutcome) {
    match outcome {
        DeliveryOutcome::Delivered(message) => {
            println!("   ✅ Delivered {} to {}", message.amount, message.recipient)
        }
        DeliveryOutcome::Dropped(reason) => println!("   ⚠️  Dropped: {reason}"),
        DeliveryOutcome::Stored(e) => println!("   💾 Stored for retry: {e}"),
        DeliveryOutcome::Reverted(e) => println!("   ❌ Reverted: {e}"),
    }
}
