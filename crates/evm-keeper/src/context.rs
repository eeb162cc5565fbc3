use alloy_primitives::BlockNumber;

use crate::GasMeter;

/// The slice of the block execution context the keeper works on: the current block height and
/// the gas meter of the transaction being executed.
///
/// The context owns the gas meter exclusively. Every gas mutation goes through
/// [`TxContext::gas_meter_mut`], so two effects on the same meter can never interleave.
#[derive(Debug, Clone, derive_more::Deref, derive_more::DerefMut)]
pub struct TxContext<M> {
    block_number: BlockNumber,
    #[deref]
    #[deref_mut]
    gas_meter: M,
}

impl<M: GasMeter> TxContext<M> {
    /// Creates a new context for a transaction executed at `block_number`.
    pub const fn new(block_number: BlockNumber, gas_meter: M) -> Self {
        Self { block_number, gas_meter }
    }

    /// The height of the block being executed.
    pub const fn block_number(&self) -> BlockNumber {
        self.block_number
    }

    /// The gas meter of the transaction.
    pub const fn gas_meter(&self) -> &M {
        &self.gas_meter
    }

    /// Mutable access to the gas meter of the transaction.
    pub fn gas_meter_mut(&mut self) -> &mut M {
        &mut self.gas_meter
    }

    /// Consumes the context and returns the gas meter.
    pub fn into_gas_meter(self) -> M {
        self.gas_meter
    }
}
