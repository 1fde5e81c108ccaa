//! # token6022-bridge
//!
//! Exactly-once bridging of the 6022 token between EVM chains over two
//! interchangeable transports: a LayerZero-style endpoint and a CCIP-style
//! router.
//!
//! One chain holds the canonical token and a Bridge Core that locks it; every
//! other chain runs a satellite core that mints and burns a mirror supply.
//! Transport adapters sit between each core and its transport. A transfer is
//! identified by a fingerprint derived on the source chain; both cores record
//! it, so a message can never settle twice, whichever transport carried it.
//!
//! ## Quick Start
//!
//! ```rust
//! use token6022_bridge::testing::TwoChainFixture;
//! use token6022_bridge::BridgeError;
//! use alloy_primitives::{B256, U256};
//!
//! # fn example() -> Result<(), BridgeError> {
//! let mut fixture = TwoChainFixture::new()?;
//! let (alice, amount) = (fixture.owner_a, U256::from(5u64));
//!
//! // Lock on the canonical chain, then relay to the satellite
//! fixture.approve_core(alice, amount)?;
//! let params = fixture.lz_to_b(alice, amount, B256::ZERO);
//! let receipt = fixture.send_lz_from_a(alice, &params)?;
//!
//! let reports = fixture.mesh.relay_all();
//! assert!(reports[0].outcome.is_delivered());
//! assert_eq!(fixture.balance_b(alice), amount);
//! # let _ = receipt;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Wiring a mesh
//!
//! ```rust
//! use token6022_bridge::wiring::LzMeshConfig;
//!
//! # fn example() -> Result<(), token6022_bridge::BridgeError> {
//! let config = LzMeshConfig::from_json(r#"{
//!     "points": [
//!         { "network": "sepolia", "eid": 40161 },
//!         { "network": "base-sepolia", "eid": 40245 }
//!     ],
//!     "pathways": [ { "a": "sepolia", "b": "base-sepolia" } ]
//! }"#)?;
//! assert_eq!(config.points.len(), 2);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Public API
//!
//! - [`Chain`] and [`Mesh`] - Simulated ledgers and the relayer between them
//! - [`BridgeCore`] and [`CustodyMode`] - Lock/release and mint/burn custody
//! - [`LzAdapter`] and [`CcipAdapter`] - Transport adapters behind [`BridgeAdapter`]
//! - [`LzEndpoint`] and [`CcipRouter`] - Local transport endpoints
//! - [`BridgeError`] and [`Result`] - Error types for error handling
//! - [`wiring`] - Mesh config, idempotent wiring and diagnostics
//! - [`testing`] - A pre-wired two-chain fixture

mod adapter;
mod bridge_core;
mod chain;
mod error;
mod events;
mod ledger;
mod mesh;
mod protocol;
mod transport;

pub use adapter::{
    ensure_core_owner, BridgeAdapter, CcipAdapter, CcipSendParams, DecodedMessage,
    InboundDelivery, LzAdapter, LzSendParams, ReceiveOutcome, RejectReason, SendParams,
    SendReceipt,
};
pub use bridge_core::{BridgeCore, CustodyMode, Ownable, DEAD_ADDRESS};
pub use chain::{Call, Chain, ChainState};
pub use error::{BridgeError, Result};
pub use events::{BridgeEvent, EventLog, Log};
pub use ledger::{FungibleLedger, NativeBalances, TokenRegistry};
pub use mesh::{DeliveryReport, Mesh};
pub use protocol::{
    address_to_bytes32, ccip_message_id, derive_ccip_transfer_id, derive_lz_transfer_id, lz_guid,
    BridgePayload, ChainSelector, Direction, EndpointId, FingerprintLedger, PeerIdentity,
    TransportLedger,
};
pub use transport::{
    Any2EvmMessage, CcipPacket, CcipRouter, DeliveryOutcome, Evm2AnyMessage, FeeSchedule,
    LzEndpoint, LzPacket, MessagingFee, MessagingReceipt, Origin, StoredPayload, TokenAmount,
    Transport,
};

// Public module for advanced users who need custom instrumentation
pub mod spans;

pub mod testing;
pub mod wiring;
