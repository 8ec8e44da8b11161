//! Structured operation records.
//!
//! Every successful mutating call appends one [`Event`] to the pool's
//! journal. Events serialize to JSON for external observability; the
//! engine itself never reads them back.

use alloy_primitives::{Address, U256};
use serde::Serialize;

/// Record of one successful mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    Deposit {
        actor: Address,
        asset: Address,
        amount: U256,
        liquidity_index: U256,
        liquidity_rate: U256,
    },
    Withdraw {
        actor: Address,
        asset: Address,
        amount: U256,
        liquidity_index: U256,
        liquidity_rate: U256,
    },
    Borrow {
        actor: Address,
        asset: Address,
        amount: U256,
        borrow_index: U256,
        borrow_rate: U256,
    },
    Repay {
        actor: Address,
        asset: Address,
        amount: U256,
        borrow_index: U256,
        borrow_rate: U256,
    },
    Liquidate {
        liquidator: Address,
        borrower: Address,
        debt_asset: Address,
        collateral_asset: Address,
        debt_covered: U256,
        collateral_seized: U256,
    },
    AssetRegistered {
        asset: Address,
    },
    PriceUpdated {
        asset: Address,
        price: U256,
    },
    Paused,
    Unpaused,
}
