//! OpenTelemetry span helpers for bridge operations
//!
//! Static span names, structured attributes, and error recording kept apart
//! from the bridging logic. [`Chain`](crate::Chain), [`Mesh`](crate::Mesh)
//! and the wiring functions open these spans themselves; they are public for
//! callers that want to group several operations under their own spans.
//!
//! # Example
//!
//! ```rust
//! use token6022_bridge::{spans, Transport};
//! use alloy_chains::NamedChain;
//! use alloy_primitives::{Address, U256};
//!
//! let span = spans::send(
//!     Transport::LayerZero,
//!     &NamedChain::Sepolia,
//!     &Address::ZERO,
//!     40245,
//!     U256::from(5u64),
//! );
//! let _guard = span.enter();
//! // send, then record any failure with spans::record_error
//! ```

use alloy_chains::NamedChain;
use alloy_primitives::{Address, B256, U256};
use tracing::Span;

use crate::transport::Transport;

/// Create span for an outbound adapter send.
///
/// Parent: caller's span
/// Children: none
#[inline]
pub fn send(
    transport: Transport,
    chain: &NamedChain,
    adapter: &Address,
    destination: u64,
    amount: U256,
) -> Span {
    tracing::info_span!(
        "token6022_bridge.send",
        transport = %transport,
        chain = %chain,
        adapter = %adapter,
        destination = destination,
        amount = %amount,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for delivering one message to its destination adapter.
///
/// Parent: token6022_bridge.relay when driven by the mesh
/// Children: none
#[inline]
pub fn deliver(transport: Transport, chain: &NamedChain, delivery_id: &B256) -> Span {
    tracing::info_span!(
        "token6022_bridge.deliver",
        transport = %transport,
        chain = %chain,
        delivery_id = %delivery_id,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for retrying a stored LayerZero payload.
#[inline]
pub fn retry_payload(chain: &NamedChain, guid: &B256) -> Span {
    tracing::info_span!(
        "token6022_bridge.retry_payload",
        chain = %chain,
        guid = %guid,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for one relayer pass over every outbox in a mesh.
///
/// Parent: caller's span
/// Children: token6022_bridge.deliver (one per packet)
#[inline]
pub fn relay(chains: usize) -> Span {
    tracing::info_span!(
        "token6022_bridge.relay",
        chains = chains,
        delivered = tracing::field::Empty
    )
}

/// Create span for wiring one chain's adapter from a mesh config.
#[inline]
pub fn wire(transport: Transport, chain: &NamedChain, adapter: &Address, dry_run: bool) -> Span {
    tracing::info_span!(
        "token6022_bridge.wire",
        transport = %transport,
        chain = %chain,
        adapter = %adapter,
        dry_run = dry_run,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for reading an adapter's configuration towards one destination.
#[inline]
pub fn diagnose(
    transport: Transport,
    chain: &NamedChain,
    adapter: &Address,
    destination: u64,
) -> Span {
    tracing::debug_span!(
        "token6022_bridge.diagnose",
        transport = %transport,
        chain = %chain,
        adapter = %adapter,
        destination = destination,
    )
}

/// Record error attributes on the current span.
///
/// Follows OpenTelemetry semantic conventions for errors.
///
/// # Example
///
/// ```rust
/// use token6022_bridge::{spans, BridgeError};
///
/// let span = tracing::info_span!(
///     "token6022_bridge.operation",
///     error.type = tracing::field::Empty,
///     error.message = tracing::field::Empty,
///     otel.status_code = "OK",
/// );
/// let _guard = span.enter();
///
/// let result: Result<(), BridgeError> = Err(BridgeError::InvalidAmount);
/// if let Err(e) = &result {
///     spans::record_error(e);
/// }
/// ```
pub fn record_error<E: std::error::Error>(error: &E) {
    let current_span = tracing::Span::current();
    let message = error.to_string();
    current_span.record("error.type", message.split(':').next().unwrap_or("Unknown"));
    current_span.record("error.message", message.as_str());
    current_span.record("otel.status_code", "ERROR");

    if let Some(source) = error.source() {
        current_span.record("error.source", source.to_string());
    }
}
