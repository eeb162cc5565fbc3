use auto_impl::auto_impl;

/// Error type for the gas meter effects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GasMeterError {
    /// Consuming gas pushed the meter past its limit.
    #[error("out of gas in location: {descriptor}; gasWanted: {limit}, gasUsed: {consumed}")]
    OutOfGas {
        /// Label of the failed effect.
        descriptor: &'static str,
        /// The meter limit.
        limit: u64,
        /// Gas consumed after the failed effect.
        consumed: u64,
    },
    /// Consuming gas overflowed the counter.
    #[error("gas overflow in location: {descriptor}")]
    GasOverflow {
        /// Label of the failed effect.
        descriptor: &'static str,
    },
    /// Refunding more gas than consumed.
    #[error(
        "negative gas consumed in location: {descriptor}; refund: {amount}, consumed: {consumed}"
    )]
    NegativeGasConsumed {
        /// Label of the failed effect.
        descriptor: &'static str,
        /// The refunded amount.
        amount: u64,
        /// Gas consumed before the failed effect.
        consumed: u64,
    },
}

impl GasMeterError {
    /// Returns `true` if the error is an out-of-gas condition.
    pub const fn is_out_of_gas(&self) -> bool {
        matches!(self, Self::OutOfGas { .. } | Self::GasOverflow { .. })
    }
}

/// The per-transaction gas counter of the ledger.
///
/// Both effects are labelled with a descriptor naming the location of the effect. The label has
/// no effect on the accounting and only shows up in errors and logs.
#[auto_impl(&mut, Box)]
pub trait GasMeter {
    /// Gas consumed so far.
    fn consumed(&self) -> u64;

    /// Upper bound of the consumed gas.
    fn limit(&self) -> u64;

    /// Increases the consumed gas by `amount`.
    ///
    /// Fails with [`GasMeterError::OutOfGas`] if the consumed gas exceeds the limit afterwards.
    /// The failed consumption stays recorded, the transaction is expected to abort. On
    /// [`GasMeterError::GasOverflow`] the consumed gas saturates at `u64::MAX`.
    fn consume(&mut self, amount: u64, descriptor: &'static str) -> Result<(), GasMeterError>;

    /// Decreases the consumed gas by `amount`. This is a bookkeeping effect and moves no tokens.
    fn refund(&mut self, amount: u64, descriptor: &'static str) -> Result<(), GasMeterError>;

    /// Gas left before reaching the limit.
    fn remaining(&self) -> u64 {
        self.limit().saturating_sub(self.consumed())
    }

    /// Returns `true` if the consumed gas reached the limit.
    fn is_out_of_gas(&self) -> bool {
        self.consumed() >= self.limit()
    }
}

/// A gas meter with a fixed limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicGasMeter {
    limit: u64,
    consumed: u64,
}

impl BasicGasMeter {
    /// Creates a new meter with the given limit and nothing consumed.
    pub const fn new(limit: u64) -> Self {
        Self { limit, consumed: 0 }
    }
}

impl GasMeter for BasicGasMeter {
    fn consumed(&self) -> u64 {
        self.consumed
    }

    fn limit(&self) -> u64 {
        self.limit
    }

    fn consume(&mut self, amount: u64, descriptor: &'static str) -> Result<(), GasMeterError> {
        let Some(consumed) = self.consumed.checked_add(amount) else {
            self.consumed = u64::MAX;
            return Err(GasMeterError::GasOverflow { descriptor });
        };
        self.consumed = consumed;
        if consumed > self.limit {
            return Err(GasMeterError::OutOfGas { descriptor, limit: self.limit, consumed });
        }
        Ok(())
    }

    fn refund(&mut self, amount: u64, descriptor: &'static str) -> Result<(), GasMeterError> {
        self.consumed = self.consumed.checked_sub(amount).ok_or(
            GasMeterError::NegativeGasConsumed { descriptor, amount, consumed: self.consumed },
        )?;
        Ok(())
    }
}

/// A gas meter without limit, used outside of transaction execution (e.g. genesis).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InfiniteGasMeter {
    consumed: u64,
}

impl InfiniteGasMeter {
    /// Creates a new meter with nothing consumed.
    pub const fn new() -> Self {
        Self { consumed: 0 }
    }
}

impl GasMeter for InfiniteGasMeter {
    fn consumed(&self) -> u64 {
        self.consumed
    }

    fn limit(&self) -> u64 {
        u64::MAX
    }

    fn consume(&mut self, amount: u64, descriptor: &'static str) -> Result<(), GasMeterError> {
        let Some(consumed) = self.consumed.checked_add(amount) else {
            self.consumed = u64::MAX;
            return Err(GasMeterError::GasOverflow { descriptor });
        };
        self.consumed = consumed;
        Ok(())
    }

    fn refund(&mut self, amount: u64, descriptor: &'static str) -> Result<(), GasMeterError> {
        self.consumed = self.consumed.checked_sub(amount).ok_or(
            GasMeterError::NegativeGasConsumed { descriptor, amount, consumed: self.consumed },
        )?;
        Ok(())
    }

    fn is_out_of_gas(&self) -> bool {
        false
    }
}
