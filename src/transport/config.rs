// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_primitives::U256;

/// Messaging fee schedule of a transport endpoint.
///
/// The quoted native fee is `base + per_byte * (payload + options)`.
///
/// # Examples
///
/// ```rust
/// use token6022_bridge::FeeSchedule;
/// use alloy_primitives::U256;
///
/// // Flat 1 wei per message
/// let fees = FeeSchedule::default();
/// assert_eq!(fees.quote(96, 0), U256::from(1u64));
///
/// // Size-dependent pricing
/// let fees = FeeSchedule::default()
///     .with_base(U256::from(1_000u64))
///     .with_per_byte(U256::from(16u64));
/// assert_eq!(fees.quote(96, 4), U256::from(1_000u64 + 16 * 100));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    /// Fee charged for every message
    pub base: U256,
    /// Fee charged per byte of payload and options
    pub per_byte: U256,
}

impl Default for FeeSchedule {
    /// A flat fee of 1 wei, matching the local test transports.
    fn default() -> Self {
        Self {
            base: U256::from(1u64),
            per_byte: U256::ZERO,
        }
    }
}

impl FeeSchedule {
    /// A flat fee independent of message size.
    pub fn flat(base: U256) -> Self {
        Self {
            base,
            per_byte: U256::ZERO,
        }
    }

    pub fn with_base(mut self, base: U256) -> Self {
        self.base = base;
        self
    }

    pub fn with_per_byte(mut self, per_byte: U256) -> Self {
        self.per_byte = per_byte;
        self
    }

    /// Saturates at `U256::MAX`, which no caller can pay.
    pub fn quote(&self, payload_len: usize, options_len: usize) -> U256 {
        let bytes = U256::from(payload_len.saturating_add(options_len));
        self.base.saturating_add(self.per_byte.saturating_mul(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_one_wei_flat() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.quote(0, 0), U256::from(1u64));
        assert_eq!(fees.quote(96, 1024), U256::from(1u64));
    }

    #[test]
    fn test_options_are_priced() {
        let fees = FeeSchedule::flat(U256::from(10u64)).with_per_byte(U256::from(2u64));
        assert_eq!(fees.quote(96, 0), U256::from(202u64));
        assert_eq!(fees.quote(96, 22), U256::from(246u64));
    }

    #[test]
    fn test_oversized_schedule_saturates_instead_of_wrapping() {
        let half = U256::MAX / U256::from(2u64);
        let fees = FeeSchedule::flat(U256::from(10u64)).with_per_byte(half);
        assert_eq!(fees.quote(96, 0), U256::MAX);

        let fees = FeeSchedule::flat(U256::MAX);
        assert_eq!(fees.quote(0, 0), U256::MAX);
        assert_eq!(fees.with_per_byte(U256::from(1u64)).quote(1, 0), U256::MAX);
    }
}
