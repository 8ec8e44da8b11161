//! The lending pool: public operation surface over reserves and positions.
//!
//! Every mutating operation follows the same sequence: reentrancy and
//! pause checks, input validation, lazy interest accrual for the touched
//! reserve(s), ledger mutation, solvency check where one is required, and
//! only then the external asset transfer. The pool's own state is always
//! fully settled before the transfer collaborator runs, so a reentrant
//! callback can never observe partially-updated ledgers; the reentrancy
//! flag additionally rejects any such call outright.
//!
//! Operations are strictly serial and atomic: a failed check or transfer
//! rolls back every ledger change the operation made (interest accrual
//! excepted, which is time-driven maintenance valid regardless of the
//! request's outcome).

use std::collections::{BTreeMap, HashMap};

use alloy_primitives::{Address, U256};

use crate::error::EngineError;
use crate::event::Event;
use crate::irm::InterestRateModel;
use crate::math::{min, w_div_down, w_mul_down, w_mul_up, zero_floor_sub, RoundingDirection, WAD};
use crate::oracle::{PriceSource, StoredPriceOracle};
use crate::position::Position;
use crate::reserve::{Reserve, ReserveConfig};
use crate::risk::{self, AccountSnapshot, AssetExposure};
use crate::transfer::{AssetTransfer, InMemoryLedger};

/// Share of outstanding debt a single liquidation call may cover (50%)
pub const CLOSE_FACTOR: U256 = U256::from_limbs([500_000_000_000_000_000, 0, 0, 0]);

/// Result of a successful liquidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationOutcome {
    /// Debt actually repaid on the borrower's behalf, after the close
    /// factor cap
    pub debt_covered: U256,
    /// Collateral moved from the borrower to the liquidator, bonus
    /// included
    pub collateral_seized: U256,
}

/// Multi-asset lending pool.
///
/// Generic over the price source and the asset-transfer backend; both are
/// external collaborators specified only at their trait boundary.
#[derive(Debug)]
pub struct LendingPool<O = StoredPriceOracle, T = InMemoryLedger> {
    reserves: BTreeMap<Address, Reserve>,
    positions: HashMap<(Address, Address), Position>,
    oracle: O,
    transfers: T,
    protocol_fee_share: U256,
    paused: bool,
    entered: bool,
    events: Vec<Event>,
}

impl<O: PriceSource, T: AssetTransfer> LendingPool<O, T> {
    /// Creates an empty pool. `protocol_fee_share` is the WAD fraction of
    /// borrow interest withheld from depositors, clamped to 1.0.
    pub fn new(oracle: O, transfers: T, protocol_fee_share: U256) -> Self {
        Self {
            reserves: BTreeMap::new(),
            positions: HashMap::new(),
            oracle,
            transfers,
            protocol_fee_share: min(protocol_fee_share, WAD),
            paused: false,
            entered: false,
            events: Vec::new(),
        }
    }

    // ==================== Admin surface ====================
    //
    // Authorization is the caller's responsibility; the pool trusts
    // whoever holds the mutable reference.

    /// Registers a new asset with its risk parameters and rate curve.
    pub fn register_asset(
        &mut self,
        asset: Address,
        config: ReserveConfig,
        irm: InterestRateModel,
        now: u64,
    ) -> Result<(), EngineError> {
        if asset.is_zero() {
            return Err(EngineError::UnsupportedAsset { asset });
        }
        if self.reserves.contains_key(&asset) {
            return Err(EngineError::AssetAlreadyRegistered { asset });
        }
        config.validate(asset)?;
        if !irm.is_valid() {
            return Err(EngineError::InvalidConfig { asset });
        }

        let reserve = Reserve::new(asset, config, irm, now, self.protocol_fee_share);
        self.reserves.insert(asset, reserve);
        self.events.push(Event::AssetRegistered { asset });
        Ok(())
    }

    /// Activates or deactivates a registered asset.
    pub fn set_asset_active(&mut self, asset: Address, active: bool) -> Result<(), EngineError> {
        let reserve = self
            .reserves
            .get_mut(&asset)
            .ok_or(EngineError::UnsupportedAsset { asset })?;
        reserve.config.active = active;
        Ok(())
    }

    /// Refuses all mutating operations until [`Self::unpause`].
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.events.push(Event::Paused);
        }
    }

    pub fn unpause(&mut self) {
        if self.paused {
            self.paused = false;
            self.events.push(Event::Unpaused);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // ==================== Operations ====================

    /// Deposits `amount` of `asset` for `actor`.
    pub fn deposit(
        &mut self,
        actor: Address,
        asset: Address,
        amount: U256,
        timestamp: u64,
    ) -> Result<(), EngineError> {
        self.begin()?;
        let result = self.deposit_inner(actor, asset, amount, timestamp);
        self.entered = false;
        result
    }

    /// Withdraws `amount` of `asset` for `actor`.
    ///
    /// Fails with [`EngineError::InsufficientCollateral`] and no state
    /// change if the withdrawal would drop the actor's health factor
    /// below 1.0.
    pub fn withdraw(
        &mut self,
        actor: Address,
        asset: Address,
        amount: U256,
        timestamp: u64,
    ) -> Result<(), EngineError> {
        self.begin()?;
        let result = self.withdraw_inner(actor, asset, amount, timestamp);
        self.entered = false;
        result
    }

    /// Borrows `amount` of `asset` for `actor` against their cross-asset
    /// collateral.
    pub fn borrow(
        &mut self,
        actor: Address,
        asset: Address,
        amount: U256,
        timestamp: u64,
    ) -> Result<(), EngineError> {
        self.begin()?;
        let result = self.borrow_inner(actor, asset, amount, timestamp);
        self.entered = false;
        result
    }

    /// Repays up to `amount` of the actor's debt in `asset`.
    ///
    /// The effective amount is capped at the outstanding debt; repaying
    /// more than owed behaves exactly like repaying the debt, and a zero
    /// effective amount is a successful no-op. Returns the amount
    /// actually collected.
    pub fn repay(
        &mut self,
        actor: Address,
        asset: Address,
        amount: U256,
        timestamp: u64,
    ) -> Result<U256, EngineError> {
        self.begin()?;
        let result = self.repay_inner(actor, asset, amount, timestamp);
        self.entered = false;
        result
    }

    /// Liquidates part of an under-collateralized position.
    ///
    /// The liquidator repays up to half of the borrower's outstanding
    /// debt in `debt_asset` and receives collateral in `collateral_asset`
    /// worth the debt covered plus the reserve's liquidation bonus. The
    /// collateral moves between deposit records inside the pool; only the
    /// debt repayment crosses the transfer boundary.
    pub fn liquidate(
        &mut self,
        liquidator: Address,
        borrower: Address,
        debt_asset: Address,
        debt_amount: U256,
        collateral_asset: Address,
        timestamp: u64,
    ) -> Result<LiquidationOutcome, EngineError> {
        self.begin()?;
        let result = self.liquidate_inner(
            liquidator,
            borrower,
            debt_asset,
            debt_amount,
            collateral_asset,
            timestamp,
        );
        self.entered = false;
        result
    }

    // ==================== Queries ====================

    /// The actor's current real deposit balance, derived through the
    /// reserve's index as of its last accrual.
    pub fn deposit_balance(&self, asset: Address, actor: Address) -> Result<U256, EngineError> {
        let reserve = self
            .reserves
            .get(&asset)
            .ok_or(EngineError::UnsupportedAsset { asset })?;
        Ok(self
            .positions
            .get(&(actor, asset))
            .map_or(U256::ZERO, |p| p.deposit_balance(reserve)))
    }

    /// The actor's current real debt, derived through the reserve's index
    /// as of its last accrual.
    pub fn borrow_balance(&self, asset: Address, actor: Address) -> Result<U256, EngineError> {
        let reserve = self
            .reserves
            .get(&asset)
            .ok_or(EngineError::UnsupportedAsset { asset })?;
        Ok(self
            .positions
            .get(&(actor, asset))
            .map_or(U256::ZERO, |p| p.borrow_balance(reserve)))
    }

    /// The reserve's current utilization (WAD fraction)
    pub fn utilization(&self, asset: Address) -> Result<U256, EngineError> {
        self.reserves
            .get(&asset)
            .map(Reserve::utilization)
            .ok_or(EngineError::UnsupportedAsset { asset })
    }

    /// Aggregates the actor's cross-asset risk state as of `timestamp`.
    ///
    /// Accrues every active reserve first so all balances are current;
    /// makes no other state change.
    pub fn account_snapshot(
        &mut self,
        actor: Address,
        timestamp: u64,
    ) -> Result<AccountSnapshot, EngineError> {
        Self::require_actor(actor)?;
        self.snapshot_inner(actor, timestamp)
    }

    /// Read access to a reserve's aggregate state
    pub fn reserve(&self, asset: Address) -> Option<&Reserve> {
        self.reserves.get(&asset)
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn transfers(&self) -> &T {
        &self.transfers
    }

    /// The journal of structured operation records
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Drains the journal, handing the records to the caller
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ==================== Internals ====================

    fn begin(&mut self) -> Result<(), EngineError> {
        if self.entered {
            return Err(EngineError::ReentrantCall);
        }
        if self.paused {
            return Err(EngineError::EnginePaused);
        }
        self.entered = true;
        Ok(())
    }

    fn require_actor(actor: Address) -> Result<(), EngineError> {
        if actor.is_zero() {
            return Err(EngineError::InvalidParticipant { actor });
        }
        Ok(())
    }

    fn require_amount(asset: Address, amount: U256) -> Result<(), EngineError> {
        if amount.is_zero() {
            return Err(EngineError::InvalidAmount { asset });
        }
        Ok(())
    }

    fn active_reserve_mut(&mut self, asset: Address) -> Result<&mut Reserve, EngineError> {
        match self.reserves.get_mut(&asset) {
            Some(reserve) if reserve.config.active => Ok(reserve),
            _ => Err(EngineError::UnsupportedAsset { asset }),
        }
    }

    fn ensure_active(&self, asset: Address) -> Result<(), EngineError> {
        match self.reserves.get(&asset) {
            Some(reserve) if reserve.config.active => Ok(()),
            _ => Err(EngineError::UnsupportedAsset { asset }),
        }
    }

    fn price_of(&self, asset: Address) -> Result<U256, EngineError> {
        self.oracle
            .price(asset)
            .ok_or(EngineError::UnknownPrice { asset })
    }

    fn snapshot_inner(
        &mut self,
        actor: Address,
        timestamp: u64,
    ) -> Result<AccountSnapshot, EngineError> {
        let fee_share = self.protocol_fee_share;
        let mut exposures = Vec::new();

        // The registered asset list is small and admin-curated; a full
        // scan per snapshot is the intended cost model.
        for (asset, reserve) in &mut self.reserves {
            if !reserve.config.active {
                continue;
            }
            reserve.accrue(timestamp, fee_share)?;

            let Some(position) = self.positions.get(&(actor, *asset)) else {
                continue;
            };
            if position.is_empty() {
                continue;
            }

            let price = self
                .oracle
                .price(*asset)
                .ok_or(EngineError::UnknownPrice { asset: *asset })?;
            exposures.push(AssetExposure {
                deposit_value: w_mul_down(position.deposit_balance(reserve), price),
                debt_value: w_mul_up(position.borrow_balance(reserve), price),
                collateral_factor: reserve.config.collateral_factor,
                liquidation_threshold: reserve.config.liquidation_threshold,
            });
        }

        Ok(risk::aggregate(&exposures))
    }

    /// Adds a scaled deposit to both ledgers and refreshes rates
    fn credit_deposit(&mut self, actor: Address, asset: Address, scaled: U256, fee_share: U256) {
        if let Some(reserve) = self.reserves.get_mut(&asset) {
            reserve.scaled_total_deposits += scaled;
            reserve.refresh_rates(fee_share);
        }
        self.positions
            .entry((actor, asset))
            .or_insert_with(|| Position::empty(actor, asset))
            .scaled_deposit += scaled;
    }

    /// Removes a scaled deposit from both ledgers and refreshes rates
    fn debit_deposit(&mut self, actor: Address, asset: Address, scaled: U256, fee_share: U256) {
        if let Some(reserve) = self.reserves.get_mut(&asset) {
            reserve.scaled_total_deposits = zero_floor_sub(reserve.scaled_total_deposits, scaled);
            reserve.refresh_rates(fee_share);
        }
        if let Some(position) = self.positions.get_mut(&(actor, asset)) {
            position.scaled_deposit = zero_floor_sub(position.scaled_deposit, scaled);
        }
    }

    /// Adds a scaled borrow to both ledgers and refreshes rates
    fn credit_borrow(&mut self, actor: Address, asset: Address, scaled: U256, fee_share: U256) {
        if let Some(reserve) = self.reserves.get_mut(&asset) {
            reserve.scaled_total_borrows += scaled;
            reserve.refresh_rates(fee_share);
        }
        self.positions
            .entry((actor, asset))
            .or_insert_with(|| Position::empty(actor, asset))
            .scaled_borrow += scaled;
    }

    /// Removes a scaled borrow from both ledgers and refreshes rates
    fn debit_borrow(&mut self, actor: Address, asset: Address, scaled: U256, fee_share: U256) {
        if let Some(reserve) = self.reserves.get_mut(&asset) {
            reserve.scaled_total_borrows = zero_floor_sub(reserve.scaled_total_borrows, scaled);
            reserve.refresh_rates(fee_share);
        }
        if let Some(position) = self.positions.get_mut(&(actor, asset)) {
            position.scaled_borrow = zero_floor_sub(position.scaled_borrow, scaled);
        }
    }

    /// Moves a scaled deposit between two positions without touching the
    /// reserve totals (an internal transfer)
    fn move_scaled_deposit(&mut self, from: Address, to: Address, asset: Address, scaled: U256) {
        if let Some(position) = self.positions.get_mut(&(from, asset)) {
            position.scaled_deposit = zero_floor_sub(position.scaled_deposit, scaled);
        }
        self.positions
            .entry((to, asset))
            .or_insert_with(|| Position::empty(to, asset))
            .scaled_deposit += scaled;
    }

    fn deposit_inner(
        &mut self,
        actor: Address,
        asset: Address,
        amount: U256,
        timestamp: u64,
    ) -> Result<(), EngineError> {
        Self::require_actor(actor)?;
        Self::require_amount(asset, amount)?;

        let fee_share = self.protocol_fee_share;
        let reserve = self.active_reserve_mut(asset)?;
        reserve.accrue(timestamp, fee_share)?;

        let scaled = reserve.to_scaled_deposit(amount, RoundingDirection::Down);
        if scaled.is_zero() {
            return Err(EngineError::InvalidAmount { asset });
        }

        self.credit_deposit(actor, asset, scaled, fee_share);

        let (liquidity_index, liquidity_rate) = match self.reserves.get(&asset) {
            Some(r) => (r.liquidity_index, r.current_liquidity_rate),
            None => (U256::ZERO, U256::ZERO),
        };

        if self.transfers.transfer_in(asset, actor, amount).is_err() {
            self.debit_deposit(actor, asset, scaled, fee_share);
            return Err(EngineError::TransferFailed { asset, amount });
        }

        self.events.push(Event::Deposit {
            actor,
            asset,
            amount,
            liquidity_index,
            liquidity_rate,
        });
        Ok(())
    }

    fn withdraw_inner(
        &mut self,
        actor: Address,
        asset: Address,
        amount: U256,
        timestamp: u64,
    ) -> Result<(), EngineError> {
        Self::require_actor(actor)?;
        Self::require_amount(asset, amount)?;

        let fee_share = self.protocol_fee_share;
        let reserve = match self.reserves.get_mut(&asset) {
            Some(reserve) if reserve.config.active => reserve,
            _ => return Err(EngineError::UnsupportedAsset { asset }),
        };
        reserve.accrue(timestamp, fee_share)?;

        let available = reserve.available_liquidity();
        let (balance, scaled_held) = match self.positions.get(&(actor, asset)) {
            Some(position) => (position.deposit_balance(reserve), position.scaled_deposit),
            None => (U256::ZERO, U256::ZERO),
        };

        if amount > balance {
            return Err(EngineError::InsufficientBalance {
                actor,
                asset,
                requested: amount,
                available: balance,
            });
        }
        if amount > available {
            return Err(EngineError::InsufficientLiquidity {
                asset,
                requested: amount,
                available,
            });
        }

        // Rounding up burns slightly more of the scaled record; a full
        // withdrawal clears it exactly.
        let scaled = min(
            reserve.to_scaled_deposit(amount, RoundingDirection::Up),
            scaled_held,
        );

        self.debit_deposit(actor, asset, scaled, fee_share);

        // A snapshot failure (another reserve refusing this timestamp, a
        // missing price) restores the debited deposit the same way an
        // unhealthy result does
        let snapshot = match self.snapshot_inner(actor, timestamp) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.credit_deposit(actor, asset, scaled, fee_share);
                return Err(err);
            }
        };
        if !snapshot.is_healthy() {
            self.credit_deposit(actor, asset, scaled, fee_share);
            return Err(EngineError::InsufficientCollateral { actor });
        }

        let (liquidity_index, liquidity_rate) = match self.reserves.get(&asset) {
            Some(r) => (r.liquidity_index, r.current_liquidity_rate),
            None => (U256::ZERO, U256::ZERO),
        };

        if self.transfers.transfer_out(asset, actor, amount).is_err() {
            self.credit_deposit(actor, asset, scaled, fee_share);
            return Err(EngineError::TransferFailed { asset, amount });
        }

        self.events.push(Event::Withdraw {
            actor,
            asset,
            amount,
            liquidity_index,
            liquidity_rate,
        });
        Ok(())
    }

    fn borrow_inner(
        &mut self,
        actor: Address,
        asset: Address,
        amount: U256,
        timestamp: u64,
    ) -> Result<(), EngineError> {
        Self::require_actor(actor)?;
        Self::require_amount(asset, amount)?;
        self.ensure_active(asset)?;

        let fee_share = self.protocol_fee_share;
        let price = self.price_of(asset)?;

        // Accrues every reserve, including this one
        let snapshot = self.snapshot_inner(actor, timestamp)?;

        let required_value = w_mul_up(amount, price);
        if snapshot.available_borrow_value < required_value {
            return Err(EngineError::InsufficientCollateral { actor });
        }

        let (available, scaled) = match self.reserves.get(&asset) {
            Some(reserve) => (
                reserve.available_liquidity(),
                reserve.to_scaled_borrow(amount, RoundingDirection::Up),
            ),
            None => (U256::ZERO, U256::ZERO),
        };
        if amount > available {
            return Err(EngineError::InsufficientLiquidity {
                asset,
                requested: amount,
                available,
            });
        }

        self.credit_borrow(actor, asset, scaled, fee_share);

        let (borrow_index, borrow_rate) = match self.reserves.get(&asset) {
            Some(r) => (r.borrow_index, r.current_borrow_rate),
            None => (U256::ZERO, U256::ZERO),
        };

        if self.transfers.transfer_out(asset, actor, amount).is_err() {
            self.debit_borrow(actor, asset, scaled, fee_share);
            return Err(EngineError::TransferFailed { asset, amount });
        }

        self.events.push(Event::Borrow {
            actor,
            asset,
            amount,
            borrow_index,
            borrow_rate,
        });
        Ok(())
    }

    fn repay_inner(
        &mut self,
        actor: Address,
        asset: Address,
        amount: U256,
        timestamp: u64,
    ) -> Result<U256, EngineError> {
        Self::require_actor(actor)?;
        Self::require_amount(asset, amount)?;

        let fee_share = self.protocol_fee_share;
        let reserve = match self.reserves.get_mut(&asset) {
            Some(reserve) if reserve.config.active => reserve,
            _ => return Err(EngineError::UnsupportedAsset { asset }),
        };
        reserve.accrue(timestamp, fee_share)?;

        let (debt, scaled_held) = match self.positions.get(&(actor, asset)) {
            Some(position) => (position.borrow_balance(reserve), position.scaled_borrow),
            None => (U256::ZERO, U256::ZERO),
        };

        // Over-repay collapses to an exact repay; with no debt at all the
        // call succeeds without collecting anything.
        let effective = min(amount, debt);
        if effective.is_zero() {
            return Ok(U256::ZERO);
        }

        let scaled = if effective == debt {
            scaled_held
        } else {
            reserve.to_scaled_borrow(effective, RoundingDirection::Down)
        };

        self.debit_borrow(actor, asset, scaled, fee_share);

        let (borrow_index, borrow_rate) = match self.reserves.get(&asset) {
            Some(r) => (r.borrow_index, r.current_borrow_rate),
            None => (U256::ZERO, U256::ZERO),
        };

        if self.transfers.transfer_in(asset, actor, effective).is_err() {
            self.credit_borrow(actor, asset, scaled, fee_share);
            return Err(EngineError::TransferFailed {
                asset,
                amount: effective,
            });
        }

        self.events.push(Event::Repay {
            actor,
            asset,
            amount: effective,
            borrow_index,
            borrow_rate,
        });
        Ok(effective)
    }

    fn liquidate_inner(
        &mut self,
        liquidator: Address,
        borrower: Address,
        debt_asset: Address,
        debt_amount: U256,
        collateral_asset: Address,
        timestamp: u64,
    ) -> Result<LiquidationOutcome, EngineError> {
        Self::require_actor(liquidator)?;
        Self::require_actor(borrower)?;
        if liquidator == borrower {
            return Err(EngineError::InvalidParticipant { actor: liquidator });
        }
        Self::require_amount(debt_asset, debt_amount)?;
        self.ensure_active(debt_asset)?;
        self.ensure_active(collateral_asset)?;

        let fee_share = self.protocol_fee_share;

        // Accrues both reserves (and all others) before the health check
        let snapshot = self.snapshot_inner(borrower, timestamp)?;
        if snapshot.is_healthy() {
            return Err(EngineError::HealthyPosition { borrower });
        }

        let debt_price = self.price_of(debt_asset)?;
        let collateral_price = self.price_of(collateral_asset)?;

        let debt = match (
            self.reserves.get(&debt_asset),
            self.positions.get(&(borrower, debt_asset)),
        ) {
            (Some(reserve), Some(position)) => position.borrow_balance(reserve),
            _ => U256::ZERO,
        };
        if debt.is_zero() {
            return Err(EngineError::InsufficientBalance {
                actor: borrower,
                asset: debt_asset,
                requested: debt_amount,
                available: U256::ZERO,
            });
        }

        // Partial-liquidation cap: at most half of the outstanding debt
        let max_cover = w_mul_down(debt, CLOSE_FACTOR);
        let debt_covered = min(debt_amount, max_cover);
        if debt_covered.is_zero() {
            return Err(EngineError::InvalidAmount { asset: debt_asset });
        }

        // seized = covered * debtPrice * (1 + bonus) / collateralPrice
        let bonus = match self.reserves.get(&collateral_asset) {
            Some(reserve) => reserve.config.liquidation_bonus,
            None => U256::ZERO,
        };
        let debt_value = w_mul_down(debt_covered, debt_price);
        let collateral_seized = w_div_down(w_mul_down(debt_value, WAD + bonus), collateral_price);

        let (collateral_balance, scaled_seized) = match (
            self.reserves.get(&collateral_asset),
            self.positions.get(&(borrower, collateral_asset)),
        ) {
            (Some(reserve), Some(position)) => (
                position.deposit_balance(reserve),
                min(
                    reserve.to_scaled_deposit(collateral_seized, RoundingDirection::Up),
                    position.scaled_deposit,
                ),
            ),
            _ => (U256::ZERO, U256::ZERO),
        };
        if collateral_balance < collateral_seized {
            return Err(EngineError::InsufficientCollateral { actor: borrower });
        }

        // The close factor keeps debt_covered strictly below the full
        // debt, so the scaled record is never cleared outright here
        let scaled_covered = match self.reserves.get(&debt_asset) {
            Some(reserve) => reserve.to_scaled_borrow(debt_covered, RoundingDirection::Down),
            None => U256::ZERO,
        };

        // Settle both ledgers before the liquidator's funds move
        self.debit_borrow(borrower, debt_asset, scaled_covered, fee_share);
        self.move_scaled_deposit(borrower, liquidator, collateral_asset, scaled_seized);

        if self
            .transfers
            .transfer_in(debt_asset, liquidator, debt_covered)
            .is_err()
        {
            self.move_scaled_deposit(liquidator, borrower, collateral_asset, scaled_seized);
            self.credit_borrow(borrower, debt_asset, scaled_covered, fee_share);
            return Err(EngineError::TransferFailed {
                asset: debt_asset,
                amount: debt_covered,
            });
        }

        self.events.push(Event::Liquidate {
            liquidator,
            borrower,
            debt_asset,
            collateral_asset,
            debt_covered,
            collateral_seized,
        });
        Ok(LiquidationOutcome {
            debt_covered,
            collateral_seized,
        })
    }
}

impl<T: AssetTransfer> LendingPool<StoredPriceOracle, T> {
    /// Registers an asset and seeds its price in one step.
    pub fn register_asset_with_price(
        &mut self,
        asset: Address,
        config: ReserveConfig,
        irm: InterestRateModel,
        initial_price: U256,
        now: u64,
    ) -> Result<(), EngineError> {
        self.register_asset(asset, config, irm, now)?;
        self.oracle.set_price(asset, initial_price);
        self.events.push(Event::PriceUpdated {
            asset,
            price: initial_price,
        });
        Ok(())
    }

    /// Overwrites the stored price for a registered asset.
    pub fn update_price(&mut self, asset: Address, price: U256) -> Result<(), EngineError> {
        if !self.reserves.contains_key(&asset) {
            return Err(EngineError::UnsupportedAsset { asset });
        }
        self.oracle.set_price(asset, price);
        self.events.push(Event::PriceUpdated { asset, price });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const ASSET_B: Address = address!("00000000000000000000000000000000000000b0");
    const ASSET_C: Address = address!("00000000000000000000000000000000000000c0");
    const ALICE: Address = address!("00000000000000000000000000000000000000a1");

    fn pct(p: u64) -> U256 {
        WAD * U256::from(p) / U256::from(100)
    }

    fn test_pool() -> LendingPool {
        let mut pool = LendingPool::new(StoredPriceOracle::new(), InMemoryLedger::new(), U256::ZERO);
        pool.register_asset_with_price(
            ASSET_B,
            ReserveConfig::new(pct(75), pct(80), pct(5)),
            InterestRateModel::default(),
            WAD,
            1000,
        )
        .unwrap();
        pool
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut pool = test_pool();
        let result = pool.register_asset(
            ASSET_B,
            ReserveConfig::new(pct(75), pct(80), pct(5)),
            InterestRateModel::default(),
            1000,
        );
        assert_eq!(
            result,
            Err(EngineError::AssetAlreadyRegistered { asset: ASSET_B })
        );
    }

    #[test]
    fn test_register_rejects_bad_config() {
        let mut pool = test_pool();
        // Threshold below LTV ceiling
        let result = pool.register_asset(
            ASSET_C,
            ReserveConfig::new(pct(80), pct(75), pct(5)),
            InterestRateModel::default(),
            1000,
        );
        assert_eq!(result, Err(EngineError::InvalidConfig { asset: ASSET_C }));
    }

    #[test]
    fn test_unregistered_asset_is_unsupported() {
        let mut pool = test_pool();
        let result = pool.deposit(ALICE, ASSET_C, WAD, 1000);
        assert_eq!(result, Err(EngineError::UnsupportedAsset { asset: ASSET_C }));
    }

    #[test]
    fn test_inactive_asset_is_unsupported() {
        let mut pool = test_pool();
        pool.set_asset_active(ASSET_B, false).unwrap();
        let result = pool.deposit(ALICE, ASSET_B, WAD, 1000);
        assert_eq!(result, Err(EngineError::UnsupportedAsset { asset: ASSET_B }));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut pool = test_pool();
        let result = pool.deposit(ALICE, ASSET_B, U256::ZERO, 1000);
        assert_eq!(result, Err(EngineError::InvalidAmount { asset: ASSET_B }));
    }

    #[test]
    fn test_zero_address_rejected() {
        let mut pool = test_pool();
        let result = pool.deposit(Address::ZERO, ASSET_B, WAD, 1000);
        assert_eq!(
            result,
            Err(EngineError::InvalidParticipant {
                actor: Address::ZERO
            })
        );
    }

    #[test]
    fn test_paused_pool_refuses_operations() {
        let mut pool = test_pool();
        pool.pause();
        assert!(pool.is_paused());
        let result = pool.deposit(ALICE, ASSET_B, WAD, 1000);
        assert_eq!(result, Err(EngineError::EnginePaused));

        pool.unpause();
        // Deposit without funds fails at the transfer, not the pause gate
        let result = pool.deposit(ALICE, ASSET_B, WAD, 1000);
        assert_eq!(
            result,
            Err(EngineError::TransferFailed {
                asset: ASSET_B,
                amount: WAD
            })
        );
    }

    #[test]
    fn test_failed_transfer_rolls_back_deposit() {
        let mut pool = test_pool();
        // ALICE holds no funds, so the transfer-in is rejected
        let result = pool.deposit(ALICE, ASSET_B, U256::from(100) * WAD, 1000);
        assert!(matches!(result, Err(EngineError::TransferFailed { .. })));

        assert_eq!(pool.deposit_balance(ASSET_B, ALICE).unwrap(), U256::ZERO);
        let reserve = pool.reserve(ASSET_B).unwrap();
        assert_eq!(reserve.total_deposits(), U256::ZERO);
        // Only the registration records remain; the failed deposit left none
        assert_eq!(pool.events().len(), 2);
    }

    #[test]
    fn test_repay_with_no_debt_is_noop() {
        let mut pool = test_pool();
        let collected = pool.repay(ALICE, ASSET_B, U256::from(100) * WAD, 1000).unwrap();
        assert_eq!(collected, U256::ZERO);
    }

    #[test]
    fn test_update_price_requires_registration() {
        let mut pool = test_pool();
        assert_eq!(
            pool.update_price(ASSET_C, WAD),
            Err(EngineError::UnsupportedAsset { asset: ASSET_C })
        );
        pool.update_price(ASSET_B, U256::from(2) * WAD).unwrap();
        assert_eq!(pool.oracle().price(ASSET_B), Some(U256::from(2) * WAD));
    }

    #[test]
    fn test_snapshot_of_untouched_account_is_empty() {
        let mut pool = test_pool();
        let snapshot = pool.account_snapshot(ALICE, 1000).unwrap();
        assert_eq!(snapshot, AccountSnapshot::empty());
    }

    #[test]
    fn test_self_liquidation_rejected() {
        let mut pool = test_pool();
        let result = pool.liquidate(ALICE, ALICE, ASSET_B, WAD, ASSET_B, 1000);
        assert_eq!(result, Err(EngineError::InvalidParticipant { actor: ALICE }));
    }

    #[test]
    fn test_event_journal_drains() {
        let mut pool = test_pool();
        assert_eq!(pool.events().len(), 2); // AssetRegistered + PriceUpdated
        let drained = pool.take_events();
        assert_eq!(drained.len(), 2);
        assert!(pool.events().is_empty());
    }
}
