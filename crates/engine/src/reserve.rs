//! Per-asset reserve ledger and interest accrual.
//!
//! A [`Reserve`] keeps the aggregate state of one supported asset. Deposit
//! and borrow totals are stored *scaled*: normalized by the respective
//! compounding index at the moment of each mutation. The real totals are
//! always re-derived through the current index, so accrued interest reaches
//! every holder in O(1) without iterating over accounts.
//!
//! Accrual is lazy. Every operation that touches a reserve calls
//! [`Reserve::accrue`] first; if time has passed, both indices grow by
//! `1 + rate * elapsed / SECONDS_PER_YEAR` and the current rates are
//! re-derived from post-accrual utilization.

use alloy_primitives::{Address, U256};

use crate::error::EngineError;
use crate::irm::InterestRateModel;
use crate::math::{
    min, mul_div, mul_div_down, w_mul_down, w_mul_up, zero_floor_sub, RoundingDirection,
    SECONDS_PER_YEAR, WAD,
};

/// Risk parameters for one reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveConfig {
    /// Loan-to-value ceiling (WAD fraction, <= 1). Bounds new borrowing.
    pub collateral_factor: U256,
    /// Liquidation threshold (WAD fraction, collateral_factor <= t <= 1).
    /// A position becomes liquidatable when risk-weighted collateral at
    /// this threshold no longer covers the debt.
    pub liquidation_threshold: U256,
    /// Extra collateral fraction paid to liquidators (WAD fraction)
    pub liquidation_bonus: U256,
    /// Inactive reserves refuse all operations
    pub active: bool,
}

impl ReserveConfig {
    pub fn new(
        collateral_factor: U256,
        liquidation_threshold: U256,
        liquidation_bonus: U256,
    ) -> Self {
        Self {
            collateral_factor,
            liquidation_threshold,
            liquidation_bonus,
            active: true,
        }
    }

    /// Validates parameter ranges for registration
    pub fn validate(&self, asset: Address) -> Result<(), EngineError> {
        let in_range = self.collateral_factor <= WAD
            && self.liquidation_threshold <= WAD
            && self.liquidation_threshold >= self.collateral_factor
            && self.liquidation_bonus <= WAD;
        if in_range {
            Ok(())
        } else {
            Err(EngineError::InvalidConfig { asset })
        }
    }
}

/// Aggregate ledger state for one supported asset.
#[derive(Debug, Clone)]
pub struct Reserve {
    /// The underlying asset
    pub asset: Address,
    /// Total deposits, normalized by the liquidity index
    pub scaled_total_deposits: U256,
    /// Total borrows, normalized by the borrow index
    pub scaled_total_borrows: U256,
    /// Protocol-owned slice of `scaled_total_deposits`, grown at accrual
    /// from the borrow interest withheld from depositors
    pub scaled_protocol_fee: U256,
    /// Compounding index for deposits (WAD, never decreases)
    pub liquidity_index: U256,
    /// Compounding index for borrows (WAD, never decreases)
    pub borrow_index: U256,
    /// Timestamp of the last index update
    pub last_accrual: u64,
    /// Current annualized deposit rate, derived at accrual (WAD)
    pub current_liquidity_rate: U256,
    /// Current annualized borrow rate, derived at accrual (WAD)
    pub current_borrow_rate: U256,
    /// Risk parameters
    pub config: ReserveConfig,
    /// Rate curve for this reserve
    pub irm: InterestRateModel,
}

impl Reserve {
    /// Creates an empty reserve with unit indices.
    pub fn new(
        asset: Address,
        config: ReserveConfig,
        irm: InterestRateModel,
        now: u64,
        fee_share: U256,
    ) -> Self {
        let mut reserve = Self {
            asset,
            scaled_total_deposits: U256::ZERO,
            scaled_total_borrows: U256::ZERO,
            scaled_protocol_fee: U256::ZERO,
            liquidity_index: WAD,
            borrow_index: WAD,
            last_accrual: now,
            current_liquidity_rate: U256::ZERO,
            current_borrow_rate: U256::ZERO,
            config,
            irm,
        };
        reserve.refresh_rates(fee_share);
        reserve
    }

    /// Real total deposits at the current liquidity index
    pub fn total_deposits(&self) -> U256 {
        self.from_scaled_deposit(self.scaled_total_deposits, RoundingDirection::Down)
    }

    /// Real total borrows at the current borrow index
    pub fn total_borrows(&self) -> U256 {
        self.from_scaled_borrow(self.scaled_total_borrows, RoundingDirection::Up)
    }

    /// Real value of the protocol's accumulated fee slice
    pub fn protocol_fee_balance(&self) -> U256 {
        self.from_scaled_deposit(self.scaled_protocol_fee, RoundingDirection::Down)
    }

    /// Funds available for borrowing or withdrawal
    pub fn available_liquidity(&self) -> U256 {
        zero_floor_sub(self.total_deposits(), self.total_borrows())
    }

    /// Fraction of deposits currently borrowed (WAD). Zero when the
    /// reserve holds no deposits.
    pub fn utilization(&self) -> U256 {
        let deposits = self.total_deposits();
        if deposits.is_zero() {
            return U256::ZERO;
        }
        min(mul_div_down(self.total_borrows(), WAD, deposits), WAD)
    }

    /// Advances both indices for the time elapsed since the last accrual
    /// and re-derives the current rates from post-accrual utilization.
    ///
    /// A zero elapsed time is a no-op. Fails with
    /// [`EngineError::InvalidTimestamp`] if the clock moved backwards.
    pub fn accrue(&mut self, timestamp: u64, fee_share: U256) -> Result<(), EngineError> {
        if timestamp < self.last_accrual {
            return Err(EngineError::InvalidTimestamp {
                timestamp,
                last_accrual: self.last_accrual,
            });
        }

        let elapsed = timestamp - self.last_accrual;
        if elapsed == 0 {
            return Ok(());
        }

        let deposits_before = self.total_deposits();
        let borrows_before = self.total_borrows();

        let elapsed = U256::from(elapsed);
        let seconds_per_year = U256::from(SECONDS_PER_YEAR);

        // index *= 1 + rate * elapsed / secondsPerYear
        let liquidity_growth =
            WAD + mul_div_down(self.current_liquidity_rate, elapsed, seconds_per_year);
        let borrow_growth =
            WAD + mul_div_down(self.current_borrow_rate, elapsed, seconds_per_year);

        // Deposit side rounds down, borrow side rounds up
        self.liquidity_index = w_mul_down(self.liquidity_index, liquidity_growth);
        self.borrow_index = w_mul_up(self.borrow_index, borrow_growth);
        self.last_accrual = timestamp;

        // Borrow interest not passed through to depositors (the fee share
        // plus rounding dust) is credited to the reserve's own deposit
        // slice; total deposits keep pace with total borrows.
        let interest = zero_floor_sub(self.total_borrows(), borrows_before);
        let to_depositors = zero_floor_sub(self.total_deposits(), deposits_before);
        let withheld = zero_floor_sub(interest, to_depositors);
        if !withheld.is_zero() {
            let scaled_fee = self.to_scaled_deposit(withheld, RoundingDirection::Up);
            self.scaled_total_deposits += scaled_fee;
            self.scaled_protocol_fee += scaled_fee;
        }

        self.refresh_rates(fee_share);
        Ok(())
    }

    /// Re-derives both current rates from the present utilization.
    /// Called at the end of accrual and after every balance mutation.
    pub fn refresh_rates(&mut self, fee_share: U256) {
        let utilization = self.utilization();
        self.current_borrow_rate = self.irm.borrow_rate(utilization);
        self.current_liquidity_rate =
            self.irm
                .liquidity_rate(self.current_borrow_rate, utilization, fee_share);
    }

    // ==================== Scaled ledger conversions ====================

    /// Converts a real deposit amount to its normalized form
    pub fn to_scaled_deposit(&self, amount: U256, rounding: RoundingDirection) -> U256 {
        mul_div(amount, WAD, self.liquidity_index, rounding)
    }

    /// Converts a normalized deposit back to a real amount
    pub fn from_scaled_deposit(&self, scaled: U256, rounding: RoundingDirection) -> U256 {
        mul_div(scaled, self.liquidity_index, WAD, rounding)
    }

    /// Converts a real borrow amount to its normalized form
    pub fn to_scaled_borrow(&self, amount: U256, rounding: RoundingDirection) -> U256 {
        mul_div(amount, WAD, self.borrow_index, rounding)
    }

    /// Converts a normalized borrow back to a real amount
    pub fn from_scaled_borrow(&self, scaled: U256, rounding: RoundingDirection) -> U256 {
        mul_div(scaled, self.borrow_index, WAD, rounding)
    }
}
