use alloy_eips::eip2930::AccessList;
use alloy_primitives::BlockNumber;
use tracing::trace;

use crate::{
    constants::{berlin, frontier, homestead, istanbul},
    EvmHardforks,
};

/// Error type for the intrinsic gas calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IntrinsicGasError {
    /// The intrinsic gas does not fit into `u64`. The transaction should be treated as out of
    /// gas.
    #[error("gas uint64 overflow")]
    GasUintOverflow,
}

/// Calculates the intrinsic gas of a transaction, i.e. the gas it costs before any execution.
///
/// The cost is the base cost of a call or a contract creation, plus the cost of every byte of
/// `input`, plus the cost of every address and storage key in `access_list`. The creation base
/// cost and the price of non-zero bytes depend on the hardforks active at `block`.
pub fn intrinsic_gas(
    input: &[u8],
    access_list: &AccessList,
    is_contract_creation: bool,
    hardforks: impl EvmHardforks,
    block: BlockNumber,
) -> Result<u64, IntrinsicGasError> {
    let mut gas = if is_contract_creation && hardforks.is_homestead_active_at_block(block) {
        homestead::TX_GAS_CONTRACT_CREATION
    } else {
        frontier::TX_GAS
    };

    if !input.is_empty() {
        let non_zero = input.iter().filter(|byte| **byte != 0).count() as u64;
        let zero = input.len() as u64 - non_zero;
        let non_zero_gas = if hardforks.is_istanbul_active_at_block(block) {
            istanbul::TX_DATA_NON_ZERO_GAS
        } else {
            frontier::TX_DATA_NON_ZERO_GAS
        };
        gas = add_cost(gas, non_zero, non_zero_gas)?;
        gas = add_cost(gas, zero, frontier::TX_DATA_ZERO_GAS)?;
    }

    let addresses = access_list.0.len() as u64;
    let storage_keys =
        access_list.0.iter().map(|item| item.storage_keys.len() as u64).sum::<u64>();
    gas = add_cost(gas, addresses, berlin::ACCESS_LIST_ADDRESS)?;
    gas = add_cost(gas, storage_keys, berlin::ACCESS_LIST_STORAGE_KEY)?;

    trace!(
        target: "evm_keeper",
        input_len = input.len(),
        addresses,
        storage_keys,
        is_contract_creation,
        block,
        gas,
        "computed intrinsic gas"
    );
    Ok(gas)
}

/// Adds `count * unit_cost` to `gas`.
fn add_cost(gas: u64, count: u64, unit_cost: u64) -> Result<u64, IntrinsicGasError> {
    count
        .checked_mul(unit_cost)
        .and_then(|cost| gas.checked_add(cost))
        .ok_or(IntrinsicGasError::GasUintOverflow)
}
