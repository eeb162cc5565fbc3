use alloy_primitives::{I256, U256};
use tracing::{debug, warn};

use crate::{BankError, BankKeeper, Coin, Coins, Message, FEE_COLLECTOR_NAME};

/// Error type for the refund of leftover gas.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefundError {
    /// The computed refund is negative. Only reachable with corrupted inputs.
    #[error("invalid refund: refunded amount value cannot be negative {amount}")]
    InvalidRefund {
        /// The offending amount.
        amount: I256,
    },
    /// The escrow account could not pay the refund back.
    #[error(
        "failed to refund {leftover_gas} leftover gas ({refund}): escrow account failed to refund fees: {source}"
    )]
    InsufficientFunds {
        /// The leftover gas of the transaction.
        leftover_gas: u64,
        /// The coins that were to be refunded.
        refund: Coins,
        /// The bank error of the transfer.
        source: BankError,
    },
}

/// Value of `leftover_gas` at `gas_price`.
///
/// The product of a `u64` and a `u128` needs at most 192 bits, so it is exact in 256 bits.
pub fn refund_amount(leftover_gas: u64, gas_price: u128) -> I256 {
    I256::from_raw(U256::from(leftover_gas) * U256::from(gas_price))
}

/// What a refund amount resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundOutcome {
    /// All gas was used, nothing to pay back.
    None,
    /// Pay back the given amount of the fee token.
    Transfer(U256),
}

impl RefundOutcome {
    /// Classifies a refund amount by its sign. Negative amounts are rejected.
    pub fn classify(remaining: I256) -> Result<Self, RefundError> {
        if remaining.is_negative() {
            Err(RefundError::InvalidRefund { amount: remaining })
        } else if remaining.is_zero() {
            Ok(Self::None)
        } else {
            Ok(Self::Transfer(remaining.into_raw()))
        }
    }
}

/// Pays leftover gas back to the sender of a message once execution finished.
///
/// Any closure of the same shape is a policy, which makes it easy to plug in test doubles or
/// alternative fee economics:
///
/// ```
/// use evm_keeper::{BankKeeper, Message, RefundError, RefundPolicy};
///
/// fn burn_leftover<B: BankKeeper>() -> impl RefundPolicy<B> {
///     |_bank: &mut B, _msg: &Message, _leftover_gas: u64, _denom: &str| Ok::<_, RefundError>(())
/// }
/// ```
pub trait RefundPolicy<B: ?Sized>: Send + Sync {
    /// Refunds `leftover_gas` of `msg`, paid in `denom`.
    fn refund_gas(
        &self,
        bank: &mut B,
        msg: &Message,
        leftover_gas: u64,
        denom: &str,
    ) -> Result<(), RefundError>;
}

impl<B, F> RefundPolicy<B> for F
where
    B: ?Sized,
    F: Fn(&mut B, &Message, u64, &str) -> Result<(), RefundError> + Send + Sync,
{
    fn refund_gas(
        &self,
        bank: &mut B,
        msg: &Message,
        leftover_gas: u64,
        denom: &str,
    ) -> Result<(), RefundError> {
        self(bank, msg, leftover_gas, denom)
    }
}

/// The default refund policy: leftover gas is exchanged at the gas price of the message and paid
/// from the fee escrow module account to the sender.
///
/// The refund is not capped; the whole leftover gas is paid back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeftoverGasRefund {
    escrow: &'static str,
}

impl Default for LeftoverGasRefund {
    fn default() -> Self {
        Self::new(FEE_COLLECTOR_NAME)
    }
}

impl LeftoverGasRefund {
    /// Creates a policy paying refunds from the module account `escrow`.
    pub const fn new(escrow: &'static str) -> Self {
        Self { escrow }
    }

    /// The module account refunds are paid from.
    pub const fn escrow(&self) -> &'static str {
        self.escrow
    }
}

impl<B: BankKeeper + ?Sized> RefundPolicy<B> for LeftoverGasRefund {
    fn refund_gas(
        &self,
        bank: &mut B,
        msg: &Message,
        leftover_gas: u64,
        denom: &str,
    ) -> Result<(), RefundError> {
        let remaining = refund_amount(leftover_gas, msg.gas_price);
        let amount = match RefundOutcome::classify(remaining) {
            Ok(RefundOutcome::Transfer(amount)) => amount,
            Ok(RefundOutcome::None) => return Ok(()),
            Err(err) => {
                warn!(target: "evm_keeper", %remaining, "rejected negative refund");
                return Err(err);
            }
        };

        let refund = Coins::single(Coin::new(denom, amount));
        if let Err(source) = bank.send_coins_from_module_to_account(self.escrow, msg.from, &refund)
        {
            warn!(
                target: "evm_keeper",
                escrow = self.escrow,
                to = %msg.from,
                leftover_gas,
                %refund,
                %source,
                "failed to refund leftover gas"
            );
            return Err(RefundError::InsufficientFunds { leftover_gas, refund, source });
        }

        debug!(
            target: "evm_keeper",
            escrow = self.escrow,
            to = %msg.from,
            leftover_gas,
            %refund,
            "refunded leftover gas"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, Address};

    use super::*;
    use crate::test_utils::MemoryBank;

    const SENDER: Address = address!("2000000000000000000000000000000000000002");

    fn message(gas_price: u128) -> Message {
        Message { from: SENDER, gas_price, ..Default::default() }
    }

    #[test]
    fn test_refund_amount_is_exact() {
        assert_eq!(refund_amount(1000, 5), I256::from_raw(U256::from(5000)));
        assert_eq!(refund_amount(0, u128::MAX), I256::ZERO);
        assert_eq!(
            refund_amount(u64::MAX, u128::MAX).into_raw(),
            U256::from(u64::MAX) * U256::from(u128::MAX)
        );
        assert!(refund_amount(u64::MAX, u128::MAX).is_positive());
    }

    #[test]
    fn test_classify() {
        assert_eq!(RefundOutcome::classify(I256::ZERO), Ok(RefundOutcome::None));
        assert_eq!(
            RefundOutcome::classify(I256::from_raw(U256::from(7))),
            Ok(RefundOutcome::Transfer(U256::from(7)))
        );
        let negative = I256::try_from(-7i64).unwrap();
        assert_eq!(
            RefundOutcome::classify(negative),
            Err(RefundError::InvalidRefund { amount: negative })
        );
    }

    #[test]
    fn test_zero_leftover_gas_is_noop() {
        let mut bank = MemoryBank::default();
        LeftoverGasRefund::default().refund_gas(&mut bank, &message(5), 0, "atest").unwrap();
        assert_eq!(bank.balance_of(SENDER, "atest"), U256::ZERO);
        assert_eq!(bank.transfer_count(), 0);
    }

    #[test]
    fn test_zero_gas_price_is_noop() {
        // Escrow is empty: a transfer attempt would fail.
        let mut bank = MemoryBank::default();
        LeftoverGasRefund::default().refund_gas(&mut bank, &message(0), 1000, "atest").unwrap();
        assert_eq!(bank.transfer_count(), 0);
    }

    #[test]
    fn test_custom_escrow() {
        let mut bank = MemoryBank::default().module_balance("evm", "atest", U256::from(5000));
        let policy = LeftoverGasRefund::new("evm");
        assert_eq!(policy.escrow(), "evm");
        policy.refund_gas(&mut bank, &message(5), 1000, "atest").unwrap();
        assert_eq!(bank.balance_of(SENDER, "atest"), U256::from(5000));
        assert_eq!(bank.module_balance_of("evm", "atest"), U256::ZERO);
    }

    #[test]
    fn test_error_names_leftover_gas_and_refund() {
        let mut bank =
            MemoryBank::default().module_balance(FEE_COLLECTOR_NAME, "atest", U256::from(10));
        let err = LeftoverGasRefund::default()
            .refund_gas(&mut bank, &message(5), 1000, "atest")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("failed to refund 1000 leftover gas (5000atest)"), "{message}");
        assert!(matches!(
            err,
            RefundError::InsufficientFunds {
                leftover_gas: 1000,
                source: BankError::InsufficientFunds { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_closure_policy() {
        let policy = |bank: &mut MemoryBank, msg: &Message, leftover_gas: u64, denom: &str| {
            let refund = Coins::single(Coin::new(denom, U256::from(leftover_gas)));
            bank.send_coins_from_module_to_account(FEE_COLLECTOR_NAME, msg.from, &refund).map_err(
                |source| RefundError::InsufficientFunds { leftover_gas, refund, source },
            )
        };
        let mut bank =
            MemoryBank::default().module_balance(FEE_COLLECTOR_NAME, "atest", U256::from(100));
        policy.refund_gas(&mut bank, &message(5), 40, "atest").unwrap();
        assert_eq!(bank.balance_of(SENDER, "atest"), U256::from(40));
    }
}
