//! Constants of the intrinsic gas schedule.
//!
//! The schedule changed over the Ethereum hardforks, so the constants are grouped by the fork
//! that introduced them.

/// Constants of the `Frontier` schedule.
pub mod frontier {
    use revm::interpreter::gas;

    /// Constants inherited from `revm`.
    pub use gas::{NON_ZERO_BYTE_DATA_COST, STANDARD_TOKEN_COST};

    /// Base gas of every transaction, including contract creations before `Homestead`.
    pub const TX_GAS: u64 = 21_000;
    /// Gas per zero byte of transaction data.
    pub const TX_DATA_ZERO_GAS: u64 = STANDARD_TOKEN_COST;
    /// Gas per non-zero byte of transaction data.
    pub const TX_DATA_NON_ZERO_GAS: u64 = NON_ZERO_BYTE_DATA_COST;
}

/// Constants of the `Homestead` schedule.
pub mod homestead {
    /// Base gas of a contract creation transaction.
    pub const TX_GAS_CONTRACT_CREATION: u64 = 53_000;
}

/// Constants of the `Istanbul` schedule (EIP-2028).
pub mod istanbul {
    use revm::interpreter::gas;

    /// Gas per non-zero byte of transaction data.
    pub const TX_DATA_NON_ZERO_GAS: u64 = gas::NON_ZERO_BYTE_DATA_COST_ISTANBUL;
}

/// Constants of the `Berlin` schedule (EIP-2930).
pub mod berlin {
    /// Constants inherited from `revm`.
    pub use revm::interpreter::gas::{ACCESS_LIST_ADDRESS, ACCESS_LIST_STORAGE_KEY};
}
