// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Bridge protocol types and definitions
//!
//! Transport-independent building blocks: chain identifiers, peer identities,
//! the message payload, identifier derivation, and the fingerprint ledgers
//! that make settlement exactly-once.

mod chain_key;
mod fingerprint;
mod identifiers;
mod payload;
mod peer;

pub use chain_key::{ChainSelector, EndpointId};
pub use fingerprint::{Direction, FingerprintLedger, TransportLedger};
pub use identifiers::{
    ccip_message_id, derive_ccip_transfer_id, derive_lz_transfer_id, lz_guid,
};
pub use payload::BridgePayload;
pub use peer::{address_to_bytes32, PeerIdentity};
