//! Piecewise jump-rate interest rate model.
//!
//! The borrow rate is a pure function of reserve utilization:
//!
//! ```text
//! If utilization <= optimal:
//!     rate = base + base * utilization / optimal        // base .. 2 * base
//! If utilization > optimal:
//!     rate = 2 * base
//!          + (max - 2 * base) * (utilization - optimal) / (1 - optimal)
//! ```
//!
//! Below the optimal point the rate climbs linearly from `base` (at 0%
//! utilization) to `2 * base` (at the optimal point); above it the curve
//! jumps steeply towards `max_rate`, which caps the rate at 100%
//! utilization. Depositors earn the borrow interest pro rata to
//! utilization, net of the protocol's cut:
//!
//! ```text
//! liquidity_rate = borrow_rate * utilization * (1 - fee_share)
//! ```
//!
//! All rates are annualized and WAD-scaled; the accrual engine divides by
//! [`SECONDS_PER_YEAR`](crate::math::SECONDS_PER_YEAR) when applying them.

use alloy_primitives::U256;

use crate::math::{min, mul_div_down, w_mul_down, zero_floor_sub, WAD};

/// Default base borrow rate (2% annualized)
pub const DEFAULT_BASE_RATE: U256 = U256::from_limbs([20_000_000_000_000_000, 0, 0, 0]);

/// Default optimal utilization (80%)
pub const DEFAULT_OPTIMAL_UTILIZATION: U256 =
    U256::from_limbs([800_000_000_000_000_000, 0, 0, 0]);

/// Default maximum borrow rate (100% annualized)
pub const DEFAULT_MAX_RATE: U256 = WAD;

/// Parameters of the piecewise rate curve for one reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestRateModel {
    /// Borrow rate at zero utilization (WAD, annualized)
    pub base_rate: U256,
    /// Utilization at which the curve kinks (WAD fraction)
    pub optimal_utilization: U256,
    /// Borrow rate cap, reached at 100% utilization (WAD, annualized)
    pub max_rate: U256,
}

impl InterestRateModel {
    pub fn new(base_rate: U256, optimal_utilization: U256, max_rate: U256) -> Self {
        Self {
            base_rate,
            optimal_utilization,
            max_rate,
        }
    }

    /// Whether the parameters describe a well-formed curve
    pub fn is_valid(&self) -> bool {
        !self.optimal_utilization.is_zero()
            && self.optimal_utilization < WAD
            && self.max_rate >= self.base_rate * U256::from(2)
            && self.max_rate <= WAD * U256::from(10)
    }

    /// Annualized borrow rate for the given utilization (both WAD-scaled)
    pub fn borrow_rate(&self, utilization: U256) -> U256 {
        let utilization = min(utilization, WAD);

        if utilization <= self.optimal_utilization {
            let slope = mul_div_down(self.base_rate, utilization, self.optimal_utilization);
            return self.base_rate + slope;
        }

        // Jump segment: from 2 * base at the kink towards max_rate at 100%
        let kink_rate = self.base_rate * U256::from(2);
        let excess = utilization - self.optimal_utilization;
        let span = WAD - self.optimal_utilization;
        let jump = mul_div_down(zero_floor_sub(self.max_rate, kink_rate), excess, span);
        min(kink_rate + jump, self.max_rate)
    }

    /// Annualized deposit rate: borrowers' interest spread over deposits,
    /// net of the protocol fee share
    pub fn liquidity_rate(&self, borrow_rate: U256, utilization: U256, fee_share: U256) -> U256 {
        let gross = w_mul_down(borrow_rate, min(utilization, WAD));
        w_mul_down(gross, zero_floor_sub(WAD, fee_share))
    }
}

impl Default for InterestRateModel {
    fn default() -> Self {
        Self {
            base_rate: DEFAULT_BASE_RATE,
            optimal_utilization: DEFAULT_OPTIMAL_UTILIZATION,
            max_rate: DEFAULT_MAX_RATE,
        }
    }
}
