use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::{Address, U256};

use crate::{module_address, BankError, BankKeeper, Coins};

/// An in-memory bank for testing purposes. Transfers are applied atomically.
#[derive(Debug, Default, Clone)]
pub struct MemoryBank {
    balances: BTreeMap<(Address, String), U256>,
    modules: BTreeSet<String>,
    transfers: usize,
}

impl MemoryBank {
    /// Registers a module account with an empty balance.
    pub fn register_module(&mut self, name: &str) {
        self.modules.insert(name.to_owned());
    }

    /// Sets the balance of an account.
    pub fn set_balance(&mut self, address: Address, denom: &str, amount: U256) {
        self.balances.insert((address, denom.to_owned()), amount);
    }

    /// Sets the balance of an account.
    pub fn balance(mut self, address: Address, denom: &str, amount: U256) -> Self {
        self.set_balance(address, denom, amount);
        self
    }

    /// Registers a module account and sets its balance.
    pub fn set_module_balance(&mut self, name: &str, denom: &str, amount: U256) {
        self.register_module(name);
        self.set_balance(module_address(name), denom, amount);
    }

    /// Registers a module account and sets its balance.
    pub fn module_balance(mut self, name: &str, denom: &str, amount: U256) -> Self {
        self.set_module_balance(name, denom, amount);
        self
    }

    /// Returns the balance of an account.
    pub fn balance_of(&self, address: Address, denom: &str) -> U256 {
        self.balances.get(&(address, denom.to_owned())).copied().unwrap_or_default()
    }

    /// Returns the balance of a module account.
    pub fn module_balance_of(&self, name: &str, denom: &str) -> U256 {
        self.balance_of(module_address(name), denom)
    }

    /// Number of transfers applied so far.
    pub const fn transfer_count(&self) -> usize {
        self.transfers
    }
}

impl BankKeeper for MemoryBank {
    fn send_coins_from_module_to_account(
        &mut self,
        module: &str,
        to: Address,
        coins: &Coins,
    ) -> Result<(), BankError> {
        if !self.modules.contains(module) {
            return Err(BankError::UnknownModuleAccount(module.to_owned()));
        }
        let from = module_address(module);

        for coin in coins {
            let balance = self.balance_of(from, &coin.denom);
            if balance < coin.amount {
                return Err(BankError::insufficient_funds(coin, balance));
            }
        }

        for coin in coins {
            let from_balance = self.balance_of(from, &coin.denom) - coin.amount;
            self.set_balance(from, &coin.denom, from_balance);
            let to_balance = self.balance_of(to, &coin.denom) + coin.amount;
            self.set_balance(to, &coin.denom, to_balance);
        }
        self.transfers += 1;
        Ok(())
    }
}
