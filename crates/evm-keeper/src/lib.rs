//! Gas accounting and refunds for EVM transactions executed on a token ledger.
//!
//! The [`EvmKeeper`] exposes the three post-execution steps of a transaction: intrinsic gas
//! calculation, gas meter reconciliation and the refund of leftover gas to the sender. The
//! block execution context drives them in that order.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

mod bank;
pub use bank::*;

mod context;
pub use context::*;

mod gas;
pub use gas::*;

mod hardfork;
pub use hardfork::*;

mod intrinsic;
pub use intrinsic::*;

mod keeper;
pub use keeper::*;

mod refund;
pub use refund::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod types;
pub use types::*;
