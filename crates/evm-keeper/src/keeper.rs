use tracing::debug;

use crate::{
    intrinsic_gas, BankKeeper, ChainConfig, ChainHardforks, ConfigError, GasMeter, GasMeterError,
    IntrinsicGasError, LeftoverGasRefund, Message, RefundError, RefundPolicy, TxContext,
};

/// Descriptor of the gas meter refund that clears the consumed gas.
pub const RESET_GAS_DESCRIPTOR: &str = "reset the gas count";
/// Descriptor of the gas meter consumption of the EVM execution.
pub const APPLY_EVM_TX_DESCRIPTOR: &str = "apply evm transaction";

/// Gas accounting of the EVM module.
///
/// The keeper owns the bank handle used to pay refunds, the fork schedule of the chain and the
/// refund policy. The policy is injected once, when the application is wired up. If the first
/// refund happens without one, [`LeftoverGasRefund`] is installed and stays for the lifetime of
/// the keeper.
#[derive(derive_more::Debug)]
pub struct EvmKeeper<B> {
    bank: B,
    chain_config: ChainConfig,
    hardforks: ChainHardforks,
    #[debug(skip)]
    refund_policy: Option<Box<dyn RefundPolicy<B>>>,
}

impl<B: BankKeeper> EvmKeeper<B> {
    /// Creates a keeper for a chain with the given fork schedule.
    pub fn new(bank: B, chain_config: ChainConfig) -> Result<Self, ConfigError> {
        chain_config.validate()?;
        Ok(Self { bank, hardforks: chain_config.hardforks(), chain_config, refund_policy: None })
    }

    /// Installs `policy` as the refund policy and returns the keeper.
    ///
    /// # Panics
    ///
    /// Panics if a refund policy is already installed.
    pub fn with_refund_policy(mut self, policy: impl RefundPolicy<B> + 'static) -> Self {
        self.set_refund_policy(policy);
        self
    }

    /// Installs `policy` as the refund policy.
    ///
    /// # Panics
    ///
    /// Panics if a refund policy is already installed, including the default one installed by the
    /// first [`refund_gas`](Self::refund_gas). Installing a policy twice is a wiring mistake of
    /// the application and must surface before any transaction is executed.
    pub fn set_refund_policy(&mut self, policy: impl RefundPolicy<B> + 'static) {
        assert!(!self.has_refund_policy(), "refund policy already set");
        self.refund_policy = Some(Box::new(policy));
    }

    /// Returns `true` if a refund policy is installed.
    pub fn has_refund_policy(&self) -> bool {
        self.refund_policy.is_some()
    }

    /// The fork schedule of the chain.
    pub const fn chain_config(&self) -> &ChainConfig {
        &self.chain_config
    }

    /// The hardfork lookup built from the chain config.
    pub const fn hardforks(&self) -> &ChainHardforks {
        &self.hardforks
    }

    /// The bank used to pay refunds.
    pub const fn bank(&self) -> &B {
        &self.bank
    }

    /// Mutable access to the bank used to pay refunds.
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    /// Returns the intrinsic gas of `msg` under the fork rules active at the block of `ctx`.
    ///
    /// An [`IntrinsicGasError`] means the transaction ran out of gas.
    pub fn intrinsic_gas<M: GasMeter>(
        &self,
        ctx: &TxContext<M>,
        msg: &Message,
        is_contract_creation: bool,
    ) -> Result<u64, IntrinsicGasError> {
        intrinsic_gas(
            &msg.input,
            &msg.access_list,
            is_contract_creation,
            &self.hardforks,
            ctx.block_number(),
        )
    }

    /// Replaces the gas consumed by the transaction of `ctx` with `gas_used`, the gas the EVM
    /// execution actually used.
    ///
    /// The meter is first refunded everything it consumed, then charged `gas_used`. Both effects
    /// happen under the same exclusive borrow of `ctx`. An out-of-gas error of the meter is
    /// returned unchanged.
    pub fn reset_gas_meter_and_consume_gas<M: GasMeter>(
        &self,
        ctx: &mut TxContext<M>,
        gas_used: u64,
    ) -> Result<(), GasMeterError> {
        let meter = ctx.gas_meter_mut();
        let consumed = meter.consumed();
        meter.refund(consumed, RESET_GAS_DESCRIPTOR)?;
        meter.consume(gas_used, APPLY_EVM_TX_DESCRIPTOR)?;
        debug!(target: "evm_keeper", previous = consumed, gas_used, "reset gas meter");
        Ok(())
    }

    /// Refunds the `leftover_gas` of `msg` to its sender, in `denom`, through the installed
    /// refund policy.
    ///
    /// Without an installed policy, [`LeftoverGasRefund`] is installed first, so every refund of
    /// the keeper goes through the same policy.
    pub fn refund_gas(
        &mut self,
        msg: &Message,
        leftover_gas: u64,
        denom: &str,
    ) -> Result<(), RefundError> {
        let policy =
            self.refund_policy.get_or_insert_with(|| Box::new(LeftoverGasRefund::default()));
        policy.refund_gas(&mut self.bank, msg, leftover_gas, denom)
    }
}
