use core::fmt;

use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Name of the module account that escrows the transaction fees.
pub const FEE_COLLECTOR_NAME: &str = "fee_collector";

/// An EVM message pending execution.
///
/// The message is owned by the block execution context for the duration of one transaction and
/// is only ever read by the keeper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// The sender.
    pub from: Address,
    /// The recipient, `None` for a contract creation.
    pub to: Option<Address>,
    /// Gas limit of the transaction.
    pub gas_limit: u64,
    /// Price paid per unit of gas, denominated in the fee token.
    ///
    /// Prices are bounded by `u128::MAX`, which keeps `leftover gas * price` below 2^192 and
    /// therefore exact in the 256-bit refund arithmetic.
    pub gas_price: u128,
    /// Call data or init code.
    pub input: Bytes,
    /// EIP-2930 access list.
    pub access_list: AccessList,
}

impl Message {
    /// Returns `true` if the message creates a contract.
    pub const fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }
}

/// An amount of a single token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// The token denomination.
    pub denom: String,
    /// The amount.
    pub amount: U256,
}

impl Coin {
    /// Creates a new coin.
    pub fn new(denom: impl Into<String>, amount: U256) -> Self {
        Self { denom: denom.into(), amount }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A set of coins of distinct denominations.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Deref,
    derive_more::IntoIterator,
)]
pub struct Coins(#[into_iterator(owned, ref)] Vec<Coin>);

impl Coins {
    /// Creates a set holding a single coin.
    pub fn single(coin: Coin) -> Self {
        Self(vec![coin])
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coin) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{coin}")?;
        }
        Ok(())
    }
}
