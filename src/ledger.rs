// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Fungible asset bookkeeping
//!
//! [`FungibleLedger`] implements the standard ERC-20 balance/allowance model
//! the cores compose with. [`NativeBalances`] tracks the fee currency used to
//! pay transports.

use alloy_primitives::{Address, U256};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{BridgeError, Result};
use crate::events::{BridgeEvent, EventLog};

/// Decimals used by every ledger in this crate
pub const DECIMALS: u8 = 18;

/// ERC-20 style balance and allowance ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FungibleLedger {
    address: Address,
    name: String,
    symbol: String,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

impl FungibleLedger {
    pub fn new(address: Address, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            total_supply: U256::ZERO,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn mint(&mut self, to: Address, amount: U256, logs: &mut EventLog) -> Result<()> {
        if to.is_zero() {
            return Err(BridgeError::InvalidReceiver(to));
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| self.overflow(to, amount))?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| self.overflow(to, amount))?;
        self.total_supply = supply;
        self.balances.insert(to, balance);

        logs.emit(
            self.address,
            BridgeEvent::Transfer {
                from: Address::ZERO,
                to,
                value: amount,
            },
        );
        Ok(())
    }

    pub fn burn(&mut self, from: Address, amount: U256, logs: &mut EventLog) -> Result<()> {
        if from.is_zero() {
            return Err(BridgeError::InvalidSender(from));
        }
        self.debit(from, amount)?;
        self.total_supply -= amount;

        logs.emit(
            self.address,
            BridgeEvent::Transfer {
                from,
                to: Address::ZERO,
                value: amount,
            },
        );
        Ok(())
    }

    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
        logs: &mut EventLog,
    ) -> Result<()> {
        if from.is_zero() {
            return Err(BridgeError::InvalidSender(from));
        }
        if to.is_zero() {
            return Err(BridgeError::InvalidReceiver(to));
        }
        if from != to && self.balance_of(to).checked_add(amount).is_none() {
            return Err(self.overflow(to, amount));
        }
        self.debit(from, amount)?;
        *self.balances.entry(to).or_default() += amount;

        logs.emit(
            self.address,
            BridgeEvent::Transfer {
                from,
                to,
                value: amount,
            },
        );
        Ok(())
    }

    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: U256,
        logs: &mut EventLog,
    ) -> Result<()> {
        if owner.is_zero() {
            return Err(BridgeError::InvalidSender(owner));
        }
        if spender.is_zero() {
            return Err(BridgeError::InvalidReceiver(spender));
        }
        self.allowances.insert((owner, spender), amount);

        logs.emit(
            self.address,
            BridgeEvent::Approval {
                owner,
                spender,
                value: amount,
            },
        );
        Ok(())
    }

    /// Moves `amount` from `from` to `to` on behalf of `spender`.
    ///
    /// An allowance of `U256::MAX` is treated as infinite and never decremented.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
        logs: &mut EventLog,
    ) -> Result<()> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(BridgeError::InsufficientAllowance {
                spender,
                allowance,
                needed: amount,
            });
        }
        self.transfer(from, to, amount, logs)?;

        if allowance != U256::MAX {
            self.allowances.insert((from, spender), allowance - amount);
        }
        Ok(())
    }

    fn debit(&mut self, account: Address, amount: U256) -> Result<()> {
        let balance = self.balance_of(account);
        if balance < amount {
            return Err(BridgeError::InsufficientBalance {
                account,
                balance,
                needed: amount,
            });
        }
        self.balances.insert(account, balance - amount);
        Ok(())
    }

    fn overflow(&self, account: Address, amount: U256) -> BridgeError {
        BridgeError::ArithmeticOverflow {
            ledger: self.address,
            account,
            amount,
        }
    }
}

/// Stand-alone token deployments on one chain, keyed by address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRegistry {
    tokens: HashMap<Address, FungibleLedger>,
}

impl TokenRegistry {
    pub fn insert(&mut self, ledger: FungibleLedger) {
        debug!(
            token = %ledger.address(),
            symbol = ledger.symbol(),
            event = "token_registered"
        );
        self.tokens.insert(ledger.address(), ledger);
    }

    pub fn get(&self, token: Address) -> Option<&FungibleLedger> {
        self.tokens.get(&token)
    }

    pub fn get_mut(&mut self, token: Address) -> Result<&mut FungibleLedger> {
        self.tokens
            .get_mut(&token)
            .ok_or(BridgeError::UnknownContract(token))
    }

    pub fn contains(&self, token: Address) -> bool {
        self.tokens.contains_key(&token)
    }
}

/// Native fee-currency balances
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeBalances {
    balances: HashMap<Address, U256>,
}

impl NativeBalances {
    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    pub fn credit(&mut self, account: Address, amount: U256) -> Result<()> {
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or_else(|| native_overflow(account, amount))?;
        self.balances.insert(account, balance);
        Ok(())
    }

    pub fn move_value(&mut self, from: Address, to: Address, amount: U256) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(BridgeError::InsufficientNativeBalance {
                account: from,
                balance,
                needed: amount,
            });
        }
        if from != to && self.balance_of(to).checked_add(amount).is_none() {
            return Err(native_overflow(to, amount));
        }
        self.balances.insert(from, balance - amount);
        self.credit(to, amount)
    }
}

// The native currency has no ledger contract; zero stands in for it.
fn native_overflow(account: Address, amount: U256) -> BridgeError {
    BridgeError::ArithmeticOverflow {
        ledger: Address::ZERO,
        account,
        amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> (FungibleLedger, EventLog) {
        let mut logs = EventLog::default();
        let mut ledger = FungibleLedger::new(Address::repeat_byte(0x60), "6022", "6022");
        ledger
            .mint(Address::repeat_byte(1), U256::from(100u64), &mut logs)
            .unwrap();
        (ledger, logs)
    }

    #[test]
    fn test_mint_and_burn_track_supply() {
        let (mut ledger, mut logs) = ledger();
        ledger
            .burn(Address::repeat_byte(1), U256::from(40u64), &mut logs)
            .unwrap();

        assert_eq!(ledger.total_supply(), U256::from(60u64));
        assert_eq!(ledger.balance_of(Address::repeat_byte(1)), U256::from(60u64));
        assert_eq!(logs.len(), 2);
    }

    #[test]
    fn test_transfer_conserves_balances() {
        let (mut ledger, mut logs) = ledger();
        let (alice, bob) = (Address::repeat_byte(1), Address::repeat_byte(2));

        ledger.transfer(alice, bob, U256::from(30u64), &mut logs).unwrap();

        assert_eq!(ledger.balance_of(alice) + ledger.balance_of(bob), U256::from(100u64));
        assert_eq!(ledger.total_supply(), U256::from(100u64));
    }

    #[test]
    fn test_mint_overflow_is_rejected_without_wrapping() {
        let (mut ledger, mut logs) = ledger();
        let holder = Address::repeat_byte(1);
        let logged = logs.len();

        let err = ledger.mint(holder, U256::MAX, &mut logs).unwrap_err();

        assert!(matches!(
            err,
            BridgeError::ArithmeticOverflow { account, amount, .. }
                if account == holder && amount == U256::MAX
        ));
        assert_eq!(ledger.total_supply(), U256::from(100u64));
        assert_eq!(ledger.balance_of(holder), U256::from(100u64));
        assert_eq!(logs.len(), logged);
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let (mut ledger, mut logs) = ledger();
        let (alice, spender) = (Address::repeat_byte(1), Address::repeat_byte(9));

        ledger.approve(alice, spender, U256::from(10u64), &mut logs).unwrap();
        ledger
            .transfer_from(spender, alice, spender, U256::from(4u64), &mut logs)
            .unwrap();

        assert_eq!(ledger.allowance(alice, spender), U256::from(6u64));
        let err = ledger
            .transfer_from(spender, alice, spender, U256::from(7u64), &mut logs)
            .unwrap_err();
        assert!(matches!(err, BridgeError::InsufficientAllowance { .. }));
    }

    #[test]
    fn test_infinite_allowance_is_not_decremented() {
        let (mut ledger, mut logs) = ledger();
        let (alice, spender) = (Address::repeat_byte(1), Address::repeat_byte(9));

        ledger.approve(alice, spender, U256::MAX, &mut logs).unwrap();
        ledger
            .transfer_from(spender, alice, spender, U256::from(4u64), &mut logs)
            .unwrap();

        assert_eq!(ledger.allowance(alice, spender), U256::MAX);
    }

    #[test]
    fn test_transfer_to_zero_is_rejected() {
        let (mut ledger, mut logs) = ledger();
        let err = ledger
            .transfer(Address::repeat_byte(1), Address::ZERO, U256::from(1u64), &mut logs)
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidReceiver(_)));
    }

    #[test]
    fn test_native_credit_overflow_is_rejected() {
        let mut native = NativeBalances::default();
        let (rich, payer) = (Address::repeat_byte(1), Address::repeat_byte(2));
        native.credit(rich, U256::MAX).unwrap();
        native.credit(payer, U256::from(1u64)).unwrap();

        let err = native.credit(rich, U256::from(1u64)).unwrap_err();
        assert!(matches!(err, BridgeError::ArithmeticOverflow { .. }));

        let err = native.move_value(payer, rich, U256::from(1u64)).unwrap_err();
        assert!(matches!(err, BridgeError::ArithmeticOverflow { .. }));
        assert_eq!(native.balance_of(payer), U256::from(1u64));
        assert_eq!(native.balance_of(rich), U256::MAX);
    }

    #[test]
    fn test_native_move_requires_balance() {
        let mut native = NativeBalances::default();
        native
            .credit(Address::repeat_byte(1), U256::from(3u64))
            .unwrap();

        let err = native
            .move_value(Address::repeat_byte(1), Address::repeat_byte(2), U256::from(4u64))
            .unwrap_err();
        assert!(matches!(err, BridgeError::InsufficientNativeBalance { .. }));

        native
            .move_value(Address::repeat_byte(1), Address::repeat_byte(2), U256::from(3u64))
            .unwrap();
        assert_eq!(native.balance_of(Address::repeat_byte(2)), U256::from(3u64));
    }
}
