use alloy_primitives::{keccak256, Address, U256};
use auto_impl::auto_impl;

use crate::{Coin, Coins};

/// Derives the address of a module account from the module name.
pub fn module_address(name: &str) -> Address {
    Address::from_word(keccak256(name.as_bytes()))
}

/// Error type for token transfers on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BankError {
    /// The sending account cannot cover the transfer.
    #[error("spendable balance {balance}{denom} is smaller than {amount}{denom}")]
    InsufficientFunds {
        /// Denomination of the coin that could not be covered.
        denom: String,
        /// Balance of the sender.
        balance: U256,
        /// Requested amount.
        amount: U256,
    },
    /// No module account is registered under the name.
    #[error("module account {0} does not exist")]
    UnknownModuleAccount(String),
}

impl BankError {
    /// Convenience constructor for [`BankError::InsufficientFunds`].
    pub fn insufficient_funds(coin: &Coin, balance: U256) -> Self {
        Self::InsufficientFunds { denom: coin.denom.clone(), balance, amount: coin.amount }
    }
}

/// The token transfer capability of the ledger's bank module.
///
/// Implementations must apply a transfer atomically: either every coin is moved or no balance
/// changes.
#[auto_impl(&mut, Box)]
pub trait BankKeeper {
    /// Moves `coins` from the module account `module` to the account `to`.
    fn send_coins_from_module_to_account(
        &mut self,
        module: &str,
        to: Address,
        coins: &Coins,
    ) -> Result<(), BankError>;
}
