use std::collections::HashMap;

use ethereum_types::Address;
use tracing::trace;

use crate::{
    error::{MigrationError, MigrationResult},
    math::{checked_add, checked_sub},
};

/// Balance ledger of the bridged GRT on L2.
pub trait GraphToken {
    fn balance_of(&self, account: &Address) -> u128;

    fn total_supply(&self) -> u128;

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> MigrationResult<()>;

    /// Gateway-only on the real token.
    fn mint(&mut self, to: &Address, amount: u128) -> MigrationResult<()>;

    fn burn(&mut self, from: &Address, amount: u128) -> MigrationResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct LocalGraphToken {
    balances: HashMap<Address, u128>,
    total_supply: u128,
}

impl LocalGraphToken {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphToken for LocalGraphToken {
    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> MigrationResult<()> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(MigrationError::InsufficientBalance);
        }
        if from == to {
            return Ok(());
        }
        let to_balance = checked_add(self.balance_of(to), amount)?;
        self.balances.insert(*from, from_balance - amount);
        self.balances.insert(*to, to_balance);
        trace!(from = ?from, to = ?to, amount, "token: transfer");
        Ok(())
    }

    fn mint(&mut self, to: &Address, amount: u128) -> MigrationResult<()> {
        let total_supply = checked_add(self.total_supply, amount)?;
        let balance = checked_add(self.balance_of(to), amount)?;
        self.total_supply = total_supply;
        self.balances.insert(*to, balance);
        Ok(())
    }

    fn burn(&mut self, from: &Address, amount: u128) -> MigrationResult<()> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(MigrationError::InsufficientBalance);
        }
        self.total_supply = checked_sub(self.total_supply, amount)?;
        self.balances.insert(*from, balance - amount);
        Ok(())
    }
}
