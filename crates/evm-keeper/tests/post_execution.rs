//! Tests for the post-execution sequence driven by the block execution context: intrinsic gas
//! check, gas meter reconciliation and leftover gas refund.

use alloy_primitives::{address, Address, Bytes, U256};
use evm_keeper::{
    test_utils::MemoryBank, BasicGasMeter, ChainConfig, EvmKeeper, GasMeter, GasMeterError,
    InfiniteGasMeter, Message, RefundError, TxContext, FEE_COLLECTOR_NAME,
};
use proptest::prelude::*;

const SENDER: Address = address!("2000000000000000000000000000000000000002");
const CALLEE: Address = address!("1000000000000000000000000000000000000001");
const DENOM: &str = "atest";

/// Result of the (mocked) EVM execution.
struct VmResult {
    gas_used: u64,
}

/// Runs one transaction the way the block execution context does, with the fees of the whole
/// gas limit already escrowed in the fee collector.
fn apply_transaction(
    keeper: &mut EvmKeeper<MemoryBank>,
    ctx: &mut TxContext<BasicGasMeter>,
    msg: &Message,
    vm: VmResult,
) -> Result<(), String> {
    let intrinsic = keeper
        .intrinsic_gas(ctx, msg, msg.is_contract_creation())
        .map_err(|err| err.to_string())?;
    if intrinsic > msg.gas_limit {
        return Err("intrinsic gas too low".to_owned());
    }
    // The ante handler conservatively charges the intrinsic gas up front.
    ctx.gas_meter_mut().consume(intrinsic, "intrinsic gas").map_err(|err| err.to_string())?;

    keeper.reset_gas_meter_and_consume_gas(ctx, vm.gas_used).map_err(|err| err.to_string())?;
    let leftover_gas = msg.gas_limit - vm.gas_used;
    keeper.refund_gas(msg, leftover_gas, DENOM).map_err(|err| err.to_string())
}

fn call_message(gas_limit: u64, gas_price: u128) -> Message {
    Message {
        from: SENDER,
        to: Some(CALLEE),
        gas_limit,
        gas_price,
        input: Bytes::from_static(&[0xa9, 0x05, 0x9c, 0xbb]),
        ..Default::default()
    }
}

#[test]
fn test_transaction_refunds_unused_gas() {
    let gas_limit = 100_000;
    let gas_price = 7;
    let escrow = U256::from(gas_limit) * U256::from(gas_price);
    let bank = MemoryBank::default().module_balance(FEE_COLLECTOR_NAME, DENOM, escrow);
    let mut keeper = EvmKeeper::new(bank, ChainConfig::default()).unwrap();
    let mut ctx = TxContext::new(42, BasicGasMeter::new(gas_limit));

    let msg = call_message(gas_limit, gas_price);
    apply_transaction(&mut keeper, &mut ctx, &msg, VmResult { gas_used: 30_000 }).unwrap();

    assert_eq!(ctx.gas_meter().consumed(), 30_000);
    assert_eq!(keeper.bank().balance_of(SENDER, DENOM), U256::from(70_000 * 7));
    assert_eq!(
        keeper.bank().module_balance_of(FEE_COLLECTOR_NAME, DENOM),
        U256::from(30_000 * 7)
    );
}

#[test]
fn test_transaction_using_all_gas() {
    let bank = MemoryBank::default().module_balance(FEE_COLLECTOR_NAME, DENOM, U256::from(1));
    let mut keeper = EvmKeeper::new(bank, ChainConfig::default()).unwrap();
    let mut ctx = TxContext::new(42, BasicGasMeter::new(50_000));

    let msg = call_message(50_000, 3);
    apply_transaction(&mut keeper, &mut ctx, &msg, VmResult { gas_used: 50_000 }).unwrap();

    assert_eq!(ctx.gas_meter().consumed(), 50_000);
    assert_eq!(keeper.bank().transfer_count(), 0);
}

#[test]
fn test_transaction_with_empty_escrow_fails() {
    let bank = MemoryBank::default().module_balance(FEE_COLLECTOR_NAME, DENOM, U256::ZERO);
    let mut keeper = EvmKeeper::new(bank, ChainConfig::default()).unwrap();
    let mut ctx = TxContext::new(42, BasicGasMeter::new(50_000));

    let msg = call_message(50_000, 3);
    let err = apply_transaction(&mut keeper, &mut ctx, &msg, VmResult { gas_used: 25_000 })
        .unwrap_err();
    assert!(err.starts_with("failed to refund 25000 leftover gas (75000atest)"), "{err}");
}

#[test]
fn test_reconcile_out_of_gas_is_propagated() {
    let keeper = EvmKeeper::new(MemoryBank::default(), ChainConfig::default()).unwrap();
    let mut ctx = TxContext::new(1, BasicGasMeter::new(21_000));
    ctx.gas_meter_mut().consume(21_000, "intrinsic gas").unwrap();

    let err = keeper.reset_gas_meter_and_consume_gas(&mut ctx, 21_001).unwrap_err();
    assert!(matches!(err, GasMeterError::OutOfGas { limit: 21_000, consumed: 21_001, .. }));
}

#[test]
fn test_reconcile_on_unmetered_context() {
    let keeper = EvmKeeper::new(MemoryBank::default(), ChainConfig::default()).unwrap();
    let mut ctx = TxContext::new(0, InfiniteGasMeter::new());
    ctx.gas_meter_mut().consume(u64::MAX, "genesis").unwrap();
    keeper.reset_gas_meter_and_consume_gas(&mut ctx, 7).unwrap();
    assert_eq!(ctx.into_gas_meter().consumed(), 7);
}

#[test]
fn test_refund_policy_double() {
    let bank = MemoryBank::default().module_balance(FEE_COLLECTOR_NAME, DENOM, U256::from(1));
    let mut keeper = EvmKeeper::new(bank, ChainConfig::default()).unwrap().with_refund_policy(
        |_: &mut MemoryBank, _: &Message, leftover_gas: u64, _: &str| {
            if leftover_gas > 0 {
                return Err(RefundError::InvalidRefund { amount: Default::default() });
            }
            Ok(())
        },
    );
    let mut ctx = TxContext::new(1, BasicGasMeter::new(50_000));
    let msg = call_message(50_000, 3);
    let err =
        apply_transaction(&mut keeper, &mut ctx, &msg, VmResult { gas_used: 1 }).unwrap_err();
    assert!(err.starts_with("invalid refund"), "{err}");
}

proptest! {
    #[test]
    fn proptest_reconcile_sets_consumed_to_gas_used(
        limit in 1u64..u64::MAX,
        before in any::<u64>(),
        gas_used in any::<u64>(),
    ) {
        let keeper = EvmKeeper::new(MemoryBank::default(), ChainConfig::default()).unwrap();
        let before = before % (limit + 1);
        let gas_used = gas_used % (limit + 1);
        let mut ctx = TxContext::new(1, BasicGasMeter::new(limit));
        ctx.gas_meter_mut().consume(before, "ante").unwrap();

        keeper.reset_gas_meter_and_consume_gas(&mut ctx, gas_used).unwrap();
        prop_assert_eq!(ctx.gas_meter().consumed(), gas_used);
    }
}
