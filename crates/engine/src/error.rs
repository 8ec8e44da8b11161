//! Error types for the lending engine.

use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Errors that can abort a pool operation.
///
/// Every validation runs before any state mutation; an error therefore
/// always means the operation had no effect (interest accrual excepted,
/// which is pure maintenance and independent of the failed request).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Asset is not registered with the pool, or has been deactivated
    #[error("asset {asset} is not registered or is inactive")]
    UnsupportedAsset { asset: Address },

    /// Attempt to register an asset twice
    #[error("asset {asset} is already registered")]
    AssetAlreadyRegistered { asset: Address },

    /// Zero or otherwise malformed amount
    #[error("invalid amount for asset {asset}")]
    InvalidAmount { asset: Address },

    /// Zero address, or a participant not allowed in this role
    /// (e.g. a borrower liquidating themselves)
    #[error("invalid participant {actor}")]
    InvalidParticipant { actor: Address },

    /// Withdraw or repay exceeds the actor's recorded balance
    #[error(
        "insufficient balance for {actor} in asset {asset}: requested {requested}, available {available}"
    )]
    InsufficientBalance {
        actor: Address,
        asset: Address,
        requested: U256,
        available: U256,
    },

    /// Borrow or withdraw exceeds the reserve's available funds
    #[error(
        "insufficient liquidity in reserve {asset}: requested {requested}, available {available}"
    )]
    InsufficientLiquidity {
        asset: Address,
        requested: U256,
        available: U256,
    },

    /// Operation would breach the loan-to-value or health-factor threshold
    #[error("insufficient collateral for {actor}: health factor would drop below 1.0")]
    InsufficientCollateral { actor: Address },

    /// Liquidation attempted on a solvent position
    #[error("position of {borrower} is healthy and cannot be liquidated")]
    HealthyPosition { borrower: Address },

    /// Risk parameters out of range (factor above 1.0, threshold below LTV)
    #[error("invalid reserve configuration for asset {asset}")]
    InvalidConfig { asset: Address },

    /// Accrual was attempted with a timestamp before the last accrual
    #[error("invalid accrual timestamp {timestamp}: last accrual at {last_accrual}")]
    InvalidTimestamp { timestamp: u64, last_accrual: u64 },

    /// No price is known for the asset
    #[error("price unknown for asset {asset}")]
    UnknownPrice { asset: Address },

    /// The pool is paused; mutating operations are refused
    #[error("engine is paused")]
    EnginePaused,

    /// A public entry point was re-entered while another operation was live
    #[error("reentrant call rejected")]
    ReentrantCall,

    /// The external asset-transfer collaborator rejected the transfer
    #[error("transfer of {amount} in asset {asset} failed")]
    TransferFailed { asset: Address, amount: U256 },
}
