// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Peer identity encodings
//!
//! A peer is the trusted counterpart adapter on a remote chain. LayerZero
//! stores it as a left-padded `bytes32`, CCIP as an arbitrary byte string so
//! that non-EVM chains can be registered without an address-shaped encoding.

use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::SolValue;
use std::fmt;

/// Registered identity of a remote adapter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PeerIdentity {
    /// An EVM address, padded to 32 bytes on the wire
    NativeAddress(Address),
    /// Any other identity, compared byte-for-byte
    OpaqueBytes(Bytes),
}

impl PeerIdentity {
    /// Interprets a LayerZero `bytes32` peer.
    ///
    /// Returns `None` for the zero word, which LayerZero uses for "unset".
    pub fn from_bytes32(word: B256) -> Option<Self> {
        if word.is_zero() {
            return None;
        }
        Some(match address_from_padded(word.as_slice()) {
            Some(address) => Self::NativeAddress(address),
            None => Self::OpaqueBytes(Bytes::copy_from_slice(word.as_slice())),
        })
    }

    /// Interprets CCIP peer bytes.
    ///
    /// Raw 20-byte addresses and `abi.encode(address)` words are native
    /// addresses; everything else is opaque. Empty bytes mean "unset".
    pub fn from_ccip_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        Some(match native_address(bytes) {
            Some(address) => Self::NativeAddress(address),
            None => Self::OpaqueBytes(Bytes::copy_from_slice(bytes)),
        })
    }

    /// Returns true for the address variant
    pub fn is_native(&self) -> bool {
        matches!(self, Self::NativeAddress(_))
    }

    /// Returns the address if this peer is EVM-addressable
    pub fn address(&self) -> Option<Address> {
        match self {
            Self::NativeAddress(address) => Some(*address),
            Self::OpaqueBytes(_) => None,
        }
    }

    /// Encoding used when addressing this peer in an outbound message
    pub fn to_wire_bytes(&self) -> Bytes {
        match self {
            Self::NativeAddress(address) => Bytes::from(address.abi_encode()),
            Self::OpaqueBytes(bytes) => bytes.clone(),
        }
    }

    /// Checks a delivery's claimed sender against this peer.
    ///
    /// Native peers accept the sender in either raw or padded address form;
    /// opaque peers require exact byte equality.
    pub fn matches(&self, sender: &[u8]) -> bool {
        match self {
            Self::NativeAddress(address) => native_address(sender) == Some(*address),
            Self::OpaqueBytes(bytes) => bytes.as_ref() == sender,
        }
    }
}

impl fmt::Display for PeerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NativeAddress(address) => write!(f, "{address}"),
            Self::OpaqueBytes(bytes) => write!(f, "{bytes}"),
        }
    }
}

/// Left-pads an address into a LayerZero peer word
#[inline]
pub fn address_to_bytes32(address: Address) -> B256 {
    address.into_word()
}

fn native_address(bytes: &[u8]) -> Option<Address> {
    match bytes.len() {
        20 => Some(Address::from_slice(bytes)),
        32 => address_from_padded(bytes),
        _ => None,
    }
}

fn address_from_padded(word: &[u8]) -> Option<Address> {
    let (padding, address) = word.split_at(12);
    padding
        .iter()
        .all(|b| *b == 0)
        .then(|| Address::from_slice(address))
}
