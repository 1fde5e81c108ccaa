// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! External transport networks
//!
//! Each chain hosts at most one endpoint per transport. Endpoints price and
//! queue outbound messages; the [`Mesh`](crate::Mesh) relayer carries them to
//! the destination chain.

mod ccip;
mod config;
mod lz;

pub use ccip::{Any2EvmMessage, CcipPacket, CcipRouter, Evm2AnyMessage, TokenAmount};
pub use config::FeeSchedule;
pub use lz::{LzEndpoint, LzPacket, MessagingFee, MessagingReceipt, Origin, StoredPayload};

use std::fmt;

use crate::adapter::{DecodedMessage, RejectReason};
use crate::error::BridgeError;

/// The two supported transports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    LayerZero,
    Ccip,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LayerZero => write!(f, "layerzero"),
            Self::Ccip => write!(f, "ccip"),
        }
    }
}

/// What happened to one delivered message
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// Settled on the destination core
    Delivered(DecodedMessage),
    /// Rejected before reaching the core without changing state
    Dropped(RejectReason),
    /// Receive reverted and the endpoint kept the payload for retry
    Stored(BridgeError),
    /// Receive reverted and the revert reached the relayer
    Reverted(BridgeError),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}
