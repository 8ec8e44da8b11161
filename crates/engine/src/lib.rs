//! Multi-Asset Lending Pool Engine
//!
//! This crate provides the accounting core of a collateralized lending
//! pool: index-based interest accrual, a piecewise utilization-driven rate
//! curve, cross-asset risk aggregation with health factors, and partial
//! liquidation of unhealthy positions.
//!
//! # Overview
//!
//! The engine lets you:
//! - Register assets with per-asset risk parameters and rate curves
//! - Deposit and withdraw interest-bearing collateral
//! - Borrow against cross-asset collateral under per-asset LTV ceilings
//! - Accrue interest lazily through compounding liquidity/borrow indices
//! - Aggregate an account's positions into a single health factor
//! - Partially liquidate unhealthy accounts with a collateral bonus
//!
//! All amounts and fractions are WAD-scaled (1e18) `U256` values; time is
//! an explicit Unix-seconds parameter on every operation, so the engine is
//! fully deterministic and clock-free.
//!
//! # Example
//!
//! ```rust,ignore
//! use lendpool_engine::{
//!     InMemoryLedger, InterestRateModel, LendingPool, ReserveConfig,
//!     StoredPriceOracle, WAD,
//! };
//! use alloy_primitives::U256;
//!
//! let mut pool = LendingPool::new(
//!     StoredPriceOracle::new(),
//!     InMemoryLedger::new(),
//!     U256::ZERO,
//! );
//! pool.register_asset_with_price(usdc, config, InterestRateModel::default(), WAD, now)?;
//!
//! pool.deposit(alice, usdc, U256::from(1_000) * WAD, now)?;
//! pool.borrow(alice, usdc, U256::from(500) * WAD, now)?;
//!
//! let snapshot = pool.account_snapshot(alice, now + 86_400)?;
//! println!("health factor: {}", snapshot.health_factor);
//! ```

pub mod error;
pub mod event;
pub mod irm;
pub mod math;
pub mod oracle;
pub mod pool;
pub mod position;
pub mod reserve;
pub mod risk;
pub mod transfer;

// Re-export commonly used types
pub use error::EngineError;

// Pool exports
pub use pool::{LendingPool, LiquidationOutcome, CLOSE_FACTOR};

// Math exports
pub use math::{RoundingDirection, SECONDS_PER_YEAR, WAD};

// Reserve exports
pub use reserve::{Reserve, ReserveConfig};

// Position and risk exports
pub use position::Position;
pub use risk::{aggregate, AccountSnapshot, AssetExposure};

// IRM exports
pub use irm::{
    InterestRateModel, DEFAULT_BASE_RATE, DEFAULT_MAX_RATE, DEFAULT_OPTIMAL_UTILIZATION,
};

// Collaborator boundaries
pub use event::Event;
pub use oracle::{PriceSource, StoredPriceOracle};
pub use transfer::{AssetTransfer, InMemoryLedger, TransferError};
