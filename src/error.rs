// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_primitives::{Address, Bytes, B256, U256};
use thiserror::Error;

/// Every way a bridge operation can revert.
///
/// Variants carry the same arguments as the on-chain custom errors so callers
/// can surface them unchanged (e.g. both amounts of an underpaid fee).
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Invalid amount: bridged amount must be non-zero")]
    InvalidAmount,

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(Address),

    #[error("Invalid adapter: {0}")]
    InvalidAdapter(Address),

    #[error("Unsupported CCIP token payload: {0} token amount(s) attached")]
    UnsupportedCcipTokenPayload(usize),

    #[error("Malformed bridge payload: {0}")]
    MalformedPayload(String),

    #[error("Caller {0} is not an authorized adapter")]
    OnlyAdapter(Address),

    #[error("Caller {caller} is not the current core owner {owner}")]
    OnlyCoreOwner { caller: Address, owner: Address },

    #[error("Ownable: unauthorized account {0}")]
    OwnableUnauthorizedAccount(Address),

    #[error("Ownable: invalid owner {0}")]
    OwnableInvalidOwner(Address),

    #[error("Caller {0} is not the LayerZero endpoint")]
    OnlyEndpoint(Address),

    #[error("Caller {0} is not the CCIP router")]
    InvalidRouter(Address),

    #[error("Transfer replay: {0}")]
    TransferReplay(B256),

    #[error("Transport replay: {0}")]
    TransportReplay(B256),

    #[error("Invalid CCIP peer for selector {selector}: {sender}")]
    InvalidCcipPeer { selector: u64, sender: Bytes },

    #[error("Missing CCIP peer for selector {0}")]
    MissingCcipPeer(u64),

    #[error("No peer configured for endpoint id {0}")]
    NoPeer(u32),

    #[error("Invalid native fee: paid {paid}, required {required}")]
    InvalidNativeFee { paid: U256, required: U256 },

    #[error("Paying fees in the LayerZero token is not supported")]
    LzTokenUnavailable,

    #[error("Insufficient native balance for {account}: balance {balance}, needed {needed}")]
    InsufficientNativeBalance {
        account: Address,
        balance: U256,
        needed: U256,
    },

    #[error("Insufficient balance for {account}: balance {balance}, needed {needed}")]
    InsufficientBalance {
        account: Address,
        balance: U256,
        needed: U256,
    },

    #[error("Insufficient allowance for {spender}: allowance {allowance}, needed {needed}")]
    InsufficientAllowance {
        spender: Address,
        allowance: U256,
        needed: U256,
    },

    #[error("Arithmetic overflow crediting {amount} to {account} (ledger {ledger})")]
    ArithmeticOverflow {
        ledger: Address,
        account: Address,
        amount: U256,
    },

    #[error("Invalid sender: {0}")]
    InvalidSender(Address),

    #[error("Invalid receiver: {0}")]
    InvalidReceiver(Address),

    #[error("No contract deployed at {0}")]
    UnknownContract(Address),

    #[error("{0} endpoint is not deployed on this chain")]
    EndpointNotDeployed(&'static str),

    #[error("Destination chain not supported: {0}")]
    UnsupportedDestinationChain(u64),

    #[error("No chain in the mesh hosts destination {0}")]
    UnknownDestination(u64),

    #[error("Receiver {0} is not addressable on an EVM chain")]
    UndeliverableReceiver(Bytes),

    #[error("No stored payload for guid {0}")]
    PayloadNotFound(B256),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
