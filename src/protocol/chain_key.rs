// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Transport-specific destination identifiers
//!
//! The two transports name chains differently: LayerZero uses a 32-bit endpoint
//! id (`eid`), CCIP a 64-bit chain selector. Both are kept as distinct newtypes
//! so a selector can never be passed where an endpoint id is expected.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BridgeError;

/// LayerZero endpoint id
///
/// # Example
///
/// ```rust
/// use token6022_bridge::EndpointId;
///
/// let eid = EndpointId::new(40161);
/// assert_eq!(eid.as_u64(), 40161);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(pub u32);

impl EndpointId {
    #[inline]
    pub const fn new(eid: u32) -> Self {
        Self(eid)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Widened form used by the transport-agnostic inbound path
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0 as u64
    }
}

impl From<u32> for EndpointId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// CCIP chain selector
///
/// Selectors are routinely written as decimal strings in configuration files
/// because they overflow JavaScript-safe integers. Parsing performs the
/// explicit `uint64` range check.
///
/// # Example
///
/// ```rust
/// use token6022_bridge::ChainSelector;
///
/// let selector: ChainSelector = "16015286601757825753".parse().unwrap();
/// assert_eq!(selector.as_u64(), 16015286601757825753);
/// assert!("18446744073709551616".parse::<ChainSelector>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ChainSelector(pub u64);

impl ChainSelector {
    #[inline]
    pub const fn new(selector: u64) -> Self {
        Self(selector)
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for ChainSelector {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ChainSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainSelector {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BridgeError::InvalidConfig(format!(
                "Invalid chain selector \"{s}\". Expected an unsigned integer string."
            )));
        }

        // Only digits remain, so overflow is the sole parse failure.
        trimmed.parse::<u64>().map(Self).map_err(|_| {
            BridgeError::InvalidConfig(format!("Chain selector {trimmed} exceeds uint64 range"))
        })
    }
}

impl<'de> Deserialize<'de> for ChainSelector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(Self(value)),
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_parse_trims_whitespace() {
        let selector: ChainSelector = " 14767482510784806043 ".parse().unwrap();
        assert_eq!(selector, ChainSelector::new(14767482510784806043));
    }

    #[test]
    fn test_selector_parse_rejects_non_digits() {
        let err = "0x10".parse::<ChainSelector>().unwrap_err();
        assert!(matches!(err, BridgeError::InvalidConfig(msg) if msg.contains("unsigned integer")));
    }

    #[test]
    fn test_selector_parse_rejects_overflow() {
        let err = "18446744073709551616".parse::<ChainSelector>().unwrap_err();
        assert!(matches!(err, BridgeError::InvalidConfig(msg) if msg.contains("exceeds uint64")));
    }

    #[test]
    fn test_selector_deserializes_from_number_or_string() {
        let from_string: ChainSelector = serde_json::from_str("\"10344971235874465080\"").unwrap();
        let from_number: ChainSelector = serde_json::from_str("10344971235874465080").unwrap();
        assert_eq!(from_string, from_number);
    }

    #[test]
    fn test_endpoint_id_widens() {
        assert_eq!(EndpointId::new(u32::MAX).as_u64(), u32::MAX as u64);
    }
}
