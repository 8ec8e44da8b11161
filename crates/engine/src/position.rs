//! Per-actor, per-asset position records.
//!
//! Positions store normalized quantities only. The real balance is always
//! re-derived through the owning reserve's current index at read time;
//! nothing derived is cached across operations.

use alloy_primitives::{Address, U256};

use crate::math::RoundingDirection;
use crate::reserve::Reserve;

/// One actor's holdings in one asset.
///
/// Created lazily on the first deposit or borrow and never deleted; a zero
/// balance is a valid steady state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// The account holding this position
    pub actor: Address,
    /// The asset of the owning reserve
    pub asset: Address,
    /// Deposit amount, normalized by the reserve's liquidity index
    pub scaled_deposit: U256,
    /// Borrow amount, normalized by the reserve's borrow index
    pub scaled_borrow: U256,
}

impl Position {
    pub fn empty(actor: Address, asset: Address) -> Self {
        Self {
            actor,
            asset,
            scaled_deposit: U256::ZERO,
            scaled_borrow: U256::ZERO,
        }
    }

    /// Real deposit balance at the reserve's current liquidity index
    pub fn deposit_balance(&self, reserve: &Reserve) -> U256 {
        reserve.from_scaled_deposit(self.scaled_deposit, RoundingDirection::Down)
    }

    /// Real debt at the reserve's current borrow index
    pub fn borrow_balance(&self, reserve: &Reserve) -> U256 {
        reserve.from_scaled_borrow(self.scaled_borrow, RoundingDirection::Up)
    }

    pub fn is_empty(&self) -> bool {
        self.scaled_deposit.is_zero() && self.scaled_borrow.is_zero()
    }
}
