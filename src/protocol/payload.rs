// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Bridge message payload
//!
//! Both transports carry the same body: `abi.encode(bytes32 transferId,
//! address recipient, uint256 amount)`, three static words (96 bytes).

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;

use crate::error::{BridgeError, Result};

/// Decoded bridge message body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgePayload {
    /// Protocol-level transfer fingerprint
    pub transfer_id: B256,
    /// Account credited on the destination chain
    pub recipient: Address,
    /// Amount in the asset's smallest unit
    pub amount: U256,
}

impl BridgePayload {
    /// Encoded size in bytes
    pub const SIZE: usize = 96;

    pub fn new(transfer_id: B256, recipient: Address, amount: U256) -> Self {
        Self {
            transfer_id,
            recipient,
            amount,
        }
    }

    pub fn encode(&self) -> Bytes {
        Bytes::from((self.transfer_id, self.recipient, self.amount).abi_encode_params())
    }

    /// Decodes a payload, rejecting anything that is not exactly three words.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != Self::SIZE {
            return Err(BridgeError::MalformedPayload(format!(
                "expected {} bytes, got {}",
                Self::SIZE,
                data.len()
            )));
        }

        if data[32..44].iter().any(|b| *b != 0) {
            return Err(BridgeError::MalformedPayload(
                "recipient word has non-zero padding".to_string(),
            ));
        }

        let (transfer_id, recipient, amount) = <(B256, Address, U256)>::abi_decode_params(data)?;

        Ok(Self {
            transfer_id,
            recipient,
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_payload_layout() {
        let payload = BridgePayload::new(
            B256::repeat_byte(0xab),
            address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"),
            U256::from(5u64),
        );
        let encoded = payload.encode();

        assert_eq!(encoded.len(), BridgePayload::SIZE);
        assert_eq!(&encoded[..32], B256::repeat_byte(0xab).as_slice());
        assert_eq!(&encoded[44..64], payload.recipient.as_slice());
        assert_eq!(encoded[95], 5);
        assert_eq!(BridgePayload::decode(&encoded).unwrap(), payload);
    }

    #[test]
    fn test_decode_rejects_short_payload() {
        let err = BridgePayload::decode(&[0u8; 64]).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedPayload(_)));
    }

    #[test]
    fn test_decode_rejects_dirty_address_word() {
        let mut encoded = BridgePayload::new(B256::ZERO, Address::repeat_byte(1), U256::from(1u64))
            .encode()
            .to_vec();
        encoded[32] = 0xff;
        assert!(BridgePayload::decode(&encoded).is_err());
    }
}
