//! Test utilities for the keeper.

mod bank;

pub use bank::*;
