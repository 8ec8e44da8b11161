//! Asset-transfer boundary.
//!
//! The pool settles its own ledgers completely before calling out through
//! [`AssetTransfer`]; a failed transfer rolls the enclosing operation back.
//! The collaborator may reenter the pool from its callbacks, which is why
//! every public entry point holds the reentrancy flag for its lifetime.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use thiserror::Error;

/// The transfer collaborator rejected the movement of funds.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("transfer rejected by the asset backend")]
pub struct TransferError;

/// External collaborator moving underlying fungible assets.
pub trait AssetTransfer {
    /// Pulls `amount` of `asset` from `from` into the pool
    fn transfer_in(
        &mut self,
        asset: Address,
        from: Address,
        amount: U256,
    ) -> Result<(), TransferError>;

    /// Pushes `amount` of `asset` from the pool to `to`
    fn transfer_out(
        &mut self,
        asset: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TransferError>;
}

/// Book-entry transfer backend tracking wallet and pool balances per asset.
///
/// Used by the test suites and as a reference implementation of the
/// transfer semantics the engine expects.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    wallets: HashMap<(Address, Address), U256>,
    pool: HashMap<Address, U256>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits a wallet with spendable funds
    pub fn mint(&mut self, asset: Address, holder: Address, amount: U256) {
        *self.wallets.entry((asset, holder)).or_default() += amount;
    }

    pub fn balance_of(&self, asset: Address, holder: Address) -> U256 {
        self.wallets
            .get(&(asset, holder))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub fn pool_balance(&self, asset: Address) -> U256 {
        self.pool.get(&asset).copied().unwrap_or(U256::ZERO)
    }
}

impl AssetTransfer for InMemoryLedger {
    fn transfer_in(
        &mut self,
        asset: Address,
        from: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        let balance = self.wallets.entry((asset, from)).or_default();
        if *balance < amount {
            return Err(TransferError);
        }
        *balance -= amount;
        *self.pool.entry(asset).or_default() += amount;
        Ok(())
    }

    fn transfer_out(
        &mut self,
        asset: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        let pool = self.pool.entry(asset).or_default();
        if *pool < amount {
            return Err(TransferError);
        }
        *pool -= amount;
        *self.wallets.entry((asset, to)).or_default() += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::WAD;
    use alloy_primitives::address;

    #[test]
    fn test_transfer_round_trip() {
        let asset = address!("00000000000000000000000000000000000000b0");
        let holder = address!("00000000000000000000000000000000000000a1");
        let mut ledger = InMemoryLedger::new();

        ledger.mint(asset, holder, U256::from(100) * WAD);
        ledger
            .transfer_in(asset, holder, U256::from(60) * WAD)
            .unwrap();
        assert_eq!(ledger.balance_of(asset, holder), U256::from(40) * WAD);
        assert_eq!(ledger.pool_balance(asset), U256::from(60) * WAD);

        ledger
            .transfer_out(asset, holder, U256::from(10) * WAD)
            .unwrap();
        assert_eq!(ledger.balance_of(asset, holder), U256::from(50) * WAD);
        assert_eq!(ledger.pool_balance(asset), U256::from(50) * WAD);
    }

    #[test]
    fn test_transfer_in_insufficient_funds() {
        let asset = address!("00000000000000000000000000000000000000b0");
        let holder = address!("00000000000000000000000000000000000000a1");
        let mut ledger = InMemoryLedger::new();

        let result = ledger.transfer_in(asset, holder, U256::from(1));
        assert_eq!(result, Err(TransferError));
    }

    #[test]
    fn test_transfer_out_exceeds_pool() {
        let asset = address!("00000000000000000000000000000000000000b0");
        let holder = address!("00000000000000000000000000000000000000a1");
        let mut ledger = InMemoryLedger::new();

        let result = ledger.transfer_out(asset, holder, U256::from(1));
        assert_eq!(result, Err(TransferError));
    }
}
