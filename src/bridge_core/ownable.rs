// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! One-step ownership

use alloy_primitives::Address;
use tracing::info;

use crate::error::{BridgeError, Result};
use crate::events::{BridgeEvent, EventLog};

/// Single-writer owner field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    /// Rejects the zero address as initial owner.
    pub fn new(owner: Address, emitter: Address, logs: &mut EventLog) -> Result<Self> {
        if owner.is_zero() {
            return Err(BridgeError::OwnableInvalidOwner(owner));
        }
        logs.emit(
            emitter,
            BridgeEvent::OwnershipTransferred {
                previous_owner: Address::ZERO,
                new_owner: owner,
            },
        );
        Ok(Self { owner })
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn ensure_owner(&self, caller: Address) -> Result<()> {
        if caller != self.owner {
            return Err(BridgeError::OwnableUnauthorizedAccount(caller));
        }
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
        emitter: Address,
        logs: &mut EventLog,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(BridgeError::OwnableInvalidOwner(new_owner));
        }
        self.set(new_owner, emitter, logs);
        Ok(())
    }

    /// Leaves the contract without an owner; every owner-gated call fails afterwards.
    pub fn renounce_ownership(
        &mut self,
        caller: Address,
        emitter: Address,
        logs: &mut EventLog,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        self.set(Address::ZERO, emitter, logs);
        Ok(())
    }

    fn set(&mut self, new_owner: Address, emitter: Address, logs: &mut EventLog) {
        let previous_owner = std::mem::replace(&mut self.owner, new_owner);
        info!(
            contract = %emitter,
            previous_owner = %previous_owner,
            new_owner = %new_owner,
            event = "ownership_transferred"
        );
        logs.emit(
            emitter,
            BridgeEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            },
        );
    }
}
