// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Transfer and delivery identifier derivation
//!
//! Transfer ids are protocol-level fingerprints derived by the sending adapter.
//! The caller's own address is always folded in, so two callers picking the
//! same user transfer id (typically the all-zero default) never collide.
//!
//! Delivery ids are assigned by the transports and identify one physical
//! message: the LayerZero `guid` and the CCIP `messageId`.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;

use super::{ChainSelector, EndpointId};

/// Derives the transfer id for a LayerZero send.
///
/// `keccak256(abi.encode(sender, uint32 dstEid, to, amount, userTransferId))`
pub fn derive_lz_transfer_id(
    sender: Address,
    dst_eid: EndpointId,
    to: Address,
    amount: U256,
    user_transfer_id: B256,
) -> B256 {
    keccak256((sender, dst_eid.as_u32(), to, amount, user_transfer_id).abi_encode_params())
}

/// Derives the transfer id for a CCIP send.
///
/// `keccak256(abi.encode(adapter, sender, uint64 dstSelector, to, amount, userTransferId))`
///
/// The sending adapter's address is included as well, so the same request
/// routed through two different CCIP adapters yields two distinct ids.
pub fn derive_ccip_transfer_id(
    adapter: Address,
    sender: Address,
    dst_selector: ChainSelector,
    to: Address,
    amount: U256,
    user_transfer_id: B256,
) -> B256 {
    keccak256(
        (
            adapter,
            sender,
            dst_selector.as_u64(),
            to,
            amount,
            user_transfer_id,
        )
            .abi_encode_params(),
    )
}

/// Computes a LayerZero packet guid.
///
/// `keccak256(abi.encodePacked(uint64 nonce, uint32 srcEid, bytes32 sender,
/// uint32 dstEid, bytes32 receiver))`
pub fn lz_guid(
    nonce: u64,
    src_eid: EndpointId,
    sender: B256,
    dst_eid: EndpointId,
    receiver: B256,
) -> B256 {
    keccak256(
        (
            nonce,
            src_eid.as_u32(),
            sender,
            dst_eid.as_u32(),
            receiver,
        )
            .abi_encode_packed(),
    )
}

/// Computes a CCIP message id from the routed message contents.
pub fn ccip_message_id(
    source: ChainSelector,
    destination: ChainSelector,
    sequence: u64,
    sender: &Bytes,
    receiver: &Bytes,
    data: &Bytes,
) -> B256 {
    keccak256(
        (
            source.as_u64(),
            destination.as_u64(),
            sequence,
            sender.clone(),
            receiver.clone(),
            data.clone(),
        )
            .abi_encode_params(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const SENDER_A: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const SENDER_B: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
    const RECIPIENT: Address = address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");

    #[test]
    fn test_lz_transfer_id_differs_per_sender() {
        let nonce = B256::ZERO;
        let amount = U256::from(1u64);
        let a = derive_lz_transfer_id(SENDER_A, EndpointId::new(2), RECIPIENT, amount, nonce);
        let b = derive_lz_transfer_id(SENDER_B, EndpointId::new(2), RECIPIENT, amount, nonce);
        assert_ne!(a, b);
    }

    #[test]
    fn test_lz_transfer_id_binds_recipient_and_amount() {
        let nonce = B256::repeat_byte(7);
        let base =
            derive_lz_transfer_id(SENDER_A, EndpointId::new(2), RECIPIENT, U256::from(5u64), nonce);
        let other_amount =
            derive_lz_transfer_id(SENDER_A, EndpointId::new(2), RECIPIENT, U256::from(6u64), nonce);
        let other_recipient =
            derive_lz_transfer_id(SENDER_A, EndpointId::new(2), SENDER_B, U256::from(5u64), nonce);
        assert_ne!(base, other_amount);
        assert_ne!(base, other_recipient);
    }

    #[test]
    fn test_lz_transfer_id_matches_manual_abi_layout() {
        let amount = U256::from(10u64);
        let nonce = B256::repeat_byte(1);

        let mut encoded = Vec::with_capacity(5 * 32);
        encoded.extend_from_slice(SENDER_A.into_word().as_slice());
        encoded.extend_from_slice(&U256::from(2u32).to_be_bytes::<32>());
        encoded.extend_from_slice(RECIPIENT.into_word().as_slice());
        encoded.extend_from_slice(&amount.to_be_bytes::<32>());
        encoded.extend_from_slice(nonce.as_slice());

        assert_eq!(
            derive_lz_transfer_id(SENDER_A, EndpointId::new(2), RECIPIENT, amount, nonce),
            keccak256(&encoded)
        );
    }

    #[test]
    fn test_ccip_transfer_id_binds_adapter() {
        let selector = ChainSelector::new(14767482510784806043);
        let adapter_a = Address::repeat_byte(0x01);
        let adapter_b = Address::repeat_byte(0x02);
        let amount = U256::from(1u64);

        let via_a =
            derive_ccip_transfer_id(adapter_a, SENDER_A, selector, RECIPIENT, amount, B256::ZERO);
        let via_b =
            derive_ccip_transfer_id(adapter_b, SENDER_A, selector, RECIPIENT, amount, B256::ZERO);
        assert_ne!(via_a, via_b);
    }

    #[test]
    fn test_guid_is_unique_per_nonce() {
        let sender = SENDER_A.into_word();
        let receiver = SENDER_B.into_word();
        let first = lz_guid(1, EndpointId::new(1), sender, EndpointId::new(2), receiver);
        let second = lz_guid(2, EndpointId::new(1), sender, EndpointId::new(2), receiver);
        assert_ne!(first, second);
    }
}
