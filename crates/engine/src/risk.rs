//! Cross-asset risk aggregation.
//!
//! The risk engine folds an actor's valued exposures over every registered
//! active asset into a single [`AccountSnapshot`]: total collateral and
//! debt value in the common unit, collateral-weighted average risk factors,
//! remaining borrow headroom, and the health factor that gates withdrawals,
//! borrows and liquidations.

use alloy_primitives::U256;

use crate::math::{w_div_down, w_mul_down, zero_floor_sub, WAD};

/// One asset's contribution to an account's risk picture, already valued
/// in the common unit via the price source.
#[derive(Debug, Clone, Copy)]
pub struct AssetExposure {
    /// Value of the actor's deposits in this asset
    pub deposit_value: U256,
    /// Value of the actor's debt in this asset
    pub debt_value: U256,
    /// The reserve's loan-to-value ceiling (WAD fraction)
    pub collateral_factor: U256,
    /// The reserve's liquidation threshold (WAD fraction)
    pub liquidation_threshold: U256,
}

/// Aggregated account-wide risk state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Sum of deposit values across all assets (common unit, WAD)
    pub total_collateral_value: U256,
    /// Sum of debt values across all assets (common unit, WAD)
    pub total_debt_value: U256,
    /// Collateral-weighted average loan-to-value ceiling (WAD fraction)
    pub avg_ltv: U256,
    /// Collateral-weighted average liquidation threshold (WAD fraction)
    pub avg_liquidation_threshold: U256,
    /// Borrow value still available under the LTV ceiling
    pub available_borrow_value: U256,
    /// Risk-weighted collateral over debt (WAD). `U256::MAX` when the
    /// account has no debt.
    pub health_factor: U256,
}

impl AccountSnapshot {
    /// An account with no exposure at all
    pub fn empty() -> Self {
        Self {
            total_collateral_value: U256::ZERO,
            total_debt_value: U256::ZERO,
            avg_ltv: U256::ZERO,
            avg_liquidation_threshold: U256::ZERO,
            available_borrow_value: U256::ZERO,
            health_factor: U256::MAX,
        }
    }

    /// Whether the account is above the liquidation threshold
    pub fn is_healthy(&self) -> bool {
        self.health_factor >= WAD
    }
}

/// Folds per-asset exposures into an account snapshot.
///
/// The borrow ceiling and the health numerator are accumulated directly as
/// `sum(value_i * factor_i)` rather than through the rounded averages, so a
/// single rounding step applies per asset.
pub fn aggregate(exposures: &[AssetExposure]) -> AccountSnapshot {
    let mut total_collateral_value = U256::ZERO;
    let mut total_debt_value = U256::ZERO;
    let mut weighted_ltv = U256::ZERO;
    let mut weighted_threshold = U256::ZERO;

    for exposure in exposures {
        total_collateral_value += exposure.deposit_value;
        total_debt_value += exposure.debt_value;
        weighted_ltv += w_mul_down(exposure.deposit_value, exposure.collateral_factor);
        weighted_threshold += w_mul_down(exposure.deposit_value, exposure.liquidation_threshold);
    }

    let (avg_ltv, avg_liquidation_threshold) = if total_collateral_value.is_zero() {
        (U256::ZERO, U256::ZERO)
    } else {
        (
            w_div_down(weighted_ltv, total_collateral_value),
            w_div_down(weighted_threshold, total_collateral_value),
        )
    };

    let available_borrow_value = zero_floor_sub(weighted_ltv, total_debt_value);

    let health_factor = if total_debt_value.is_zero() {
        U256::MAX
    } else {
        w_div_down(weighted_threshold, total_debt_value)
    };

    AccountSnapshot {
        total_collateral_value,
        total_debt_value,
        avg_ltv,
        avg_liquidation_threshold,
        available_borrow_value,
        health_factor,
    }
}
