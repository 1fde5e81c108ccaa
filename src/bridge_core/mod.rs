// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Bridge Core: custody, adapter authorization and settlement fingerprints
//!
//! A core is the single authority over the bridged asset on its chain. It
//! comes in two custody modes:
//!
//! - **Canonical**: the asset already exists as a stand-alone ledger; bridging
//!   out locks it in the core, bridging in releases it.
//! - **Satellite**: the core *is* the asset ledger and its whole supply is
//!   bridge-issued; bridging out burns, bridging in mints.
//!
//! Only adapters authorized by the core owner can move custody. Every transfer
//! id is recorded in one [`FingerprintLedger`] shared by both directions, and
//! every inbound delivery id in a separate [`TransportLedger`].

mod ownable;

pub use ownable::Ownable;

use alloy_primitives::{address, Address, B256, U256};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::{BridgeError, Result};
use crate::events::{BridgeEvent, EventLog};
use crate::ledger::{FungibleLedger, TokenRegistry};
use crate::protocol::{Direction, FingerprintLedger, TransportLedger};

/// Burn sink credited when a satellite mint targets the zero address
pub const DEAD_ADDRESS: Address = address!("000000000000000000000000000000000000dEaD");

/// How a core holds the bridged asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustodyMode {
    Canonical,
    Satellite,
}

impl std::fmt::Display for CustodyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Canonical => write!(f, "canonical"),
            Self::Satellite => write!(f, "satellite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Custody {
    /// Locks and releases balances of an external token
    Canonical { token: Address },
    /// Mints and burns its own supply
    Satellite { ledger: FungibleLedger },
}

/// Per-chain bridge authority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeCore {
    address: Address,
    ownable: Ownable,
    adapters: HashSet<Address>,
    transfers: FingerprintLedger,
    transports: TransportLedger,
    custody: Custody,
}

impl BridgeCore {
    /// Creates a core that locks `token` balances.
    pub fn canonical(
        address: Address,
        token: Address,
        owner: Address,
        logs: &mut EventLog,
    ) -> Result<Self> {
        let ownable = Ownable::new(owner, address, logs)?;
        Ok(Self::with_custody(address, ownable, Custody::Canonical { token }))
    }

    /// Creates a core that is itself the asset ledger, starting at zero supply.
    pub fn satellite(
        address: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        owner: Address,
        logs: &mut EventLog,
    ) -> Result<Self> {
        let ownable = Ownable::new(owner, address, logs)?;
        let ledger = FungibleLedger::new(address, name, symbol);
        Ok(Self::with_custody(
            address,
            ownable,
            Custody::Satellite { ledger },
        ))
    }

    fn with_custody(address: Address, ownable: Ownable, custody: Custody) -> Self {
        Self {
            address,
            ownable,
            adapters: HashSet::new(),
            transfers: FingerprintLedger::new(),
            transports: TransportLedger::new(),
            custody,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Current owner, read fresh by adapters on every configuration call
    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    pub fn mode(&self) -> CustodyMode {
        match self.custody {
            Custody::Canonical { .. } => CustodyMode::Canonical,
            Custody::Satellite { .. } => CustodyMode::Satellite,
        }
    }

    /// Address of the asset ledger: the locked token, or the core itself
    pub fn token(&self) -> Address {
        match &self.custody {
            Custody::Canonical { token } => *token,
            Custody::Satellite { .. } => self.address,
        }
    }

    /// The satellite's own asset ledger
    pub fn ledger(&self) -> Option<&FungibleLedger> {
        match &self.custody {
            Custody::Satellite { ledger } => Some(ledger),
            Custody::Canonical { .. } => None,
        }
    }

    pub fn ledger_mut(&mut self) -> Option<&mut FungibleLedger> {
        match &mut self.custody {
            Custody::Satellite { ledger } => Some(ledger),
            Custody::Canonical { .. } => None,
        }
    }

    pub fn is_adapter(&self, adapter: Address) -> bool {
        self.adapters.contains(&adapter)
    }

    pub fn outbound_transfers(&self, transfer_id: &B256) -> bool {
        self.transfers.outbound(transfer_id)
    }

    pub fn inbound_transfers(&self, transfer_id: &B256) -> bool {
        self.transfers.inbound(transfer_id)
    }

    pub fn inbound_transport_ids(&self, transport_id: &B256) -> bool {
        self.transports.contains(transport_id)
    }

    /// Settled in either direction
    pub fn transfer_settled(&self, transfer_id: &B256) -> bool {
        self.transfers.contains(transfer_id)
    }

    /// Amount currently held by this core.
    ///
    /// For a canonical core this is the locked balance; a satellite core holds
    /// nothing in custody and reports its own balance (normally zero).
    pub fn custody_balance(&self, tokens: &TokenRegistry) -> U256 {
        match &self.custody {
            Custody::Canonical { token } => tokens
                .get(*token)
                .map(|ledger| ledger.balance_of(self.address))
                .unwrap_or_default(),
            Custody::Satellite { ledger } => ledger.balance_of(self.address),
        }
    }

    /// Owner-only; adds or removes `adapter` from the authorized set.
    pub fn set_adapter(
        &mut self,
        caller: Address,
        adapter: Address,
        allowed: bool,
        logs: &mut EventLog,
    ) -> Result<()> {
        self.ownable.ensure_owner(caller)?;
        if adapter.is_zero() {
            return Err(BridgeError::InvalidAdapter(adapter));
        }

        if allowed {
            self.adapters.insert(adapter);
        } else {
            self.adapters.remove(&adapter);
        }

        info!(
            core = %self.address,
            adapter = %adapter,
            allowed = allowed,
            event = "adapter_set"
        );
        logs.emit(self.address, BridgeEvent::AdapterSet { adapter, allowed });
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
        logs: &mut EventLog,
    ) -> Result<()> {
        self.ownable
            .transfer_ownership(caller, new_owner, self.address, logs)
    }

    pub fn renounce_ownership(&mut self, caller: Address, logs: &mut EventLog) -> Result<()> {
        self.ownable.renounce_ownership(caller, self.address, logs)
    }

    /// Debits `from` and settles `transfer_id` outbound.
    ///
    /// A canonical core pulls the amount with `transfer_from`, so `from` must
    /// have approved the core beforehand.
    pub fn bridge_out(
        &mut self,
        caller: Address,
        from: Address,
        amount: U256,
        transfer_id: B256,
        tokens: &mut TokenRegistry,
        logs: &mut EventLog,
    ) -> Result<()> {
        self.ensure_adapter(caller)?;
        if amount.is_zero() {
            return Err(BridgeError::InvalidAmount);
        }
        self.transfers.ensure_unsettled(transfer_id)?;

        match &mut self.custody {
            Custody::Canonical { token } => {
                tokens
                    .get_mut(*token)?
                    .transfer_from(self.address, from, self.address, amount, logs)?;
            }
            Custody::Satellite { ledger } => ledger.burn(from, amount, logs)?,
        }

        self.transfers.record(transfer_id, Direction::Outbound)?;

        info!(
            core = %self.address,
            transfer_id = %transfer_id,
            from = %from,
            amount = %amount,
            event = "bridge_out"
        );
        logs.emit(
            self.address,
            BridgeEvent::BridgeOut {
                transfer_id,
                from,
                amount,
            },
        );
        Ok(())
    }

    /// Credits `to` and settles both `transfer_id` and `transport_id` inbound.
    ///
    /// The delivery id is checked before the transfer id, so a raw redelivery
    /// surfaces as `TransportReplay`.
    #[allow(clippy::too_many_arguments)]
    pub fn bridge_in(
        &mut self,
        caller: Address,
        to: Address,
        amount: U256,
        transfer_id: B256,
        transport_id: B256,
        tokens: &mut TokenRegistry,
        logs: &mut EventLog,
    ) -> Result<()> {
        self.ensure_adapter(caller)?;
        if amount.is_zero() {
            return Err(BridgeError::InvalidAmount);
        }
        self.transports.ensure_unconsumed(transport_id)?;
        self.transfers.ensure_unsettled(transfer_id)?;

        match &mut self.custody {
            Custody::Canonical { token } => {
                tokens
                    .get_mut(*token)?
                    .transfer(self.address, to, amount, logs)?;
            }
            Custody::Satellite { ledger } => {
                let credited = if to.is_zero() {
                    debug!(
                        core = %self.address,
                        transfer_id = %transfer_id,
                        event = "zero_recipient_redirected"
                    );
                    DEAD_ADDRESS
                } else {
                    to
                };
                ledger.mint(credited, amount, logs)?;
            }
        }

        self.transports.record(transport_id)?;
        self.transfers.record(transfer_id, Direction::Inbound)?;

        info!(
            core = %self.address,
            transfer_id = %transfer_id,
            transport_id = %transport_id,
            to = %to,
            amount = %amount,
            event = "bridge_in"
        );
        logs.emit(
            self.address,
            BridgeEvent::BridgeIn {
                transfer_id,
                transport_id,
                to,
                amount,
            },
        );
        Ok(())
    }

    fn ensure_adapter(&self, caller: Address) -> Result<()> {
        if !self.adapters.contains(&caller) {
            return Err(BridgeError::OnlyAdapter(caller));
        }
        Ok(())
    }
}
