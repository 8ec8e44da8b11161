//! Price source boundary.
//!
//! The engine never caches prices across operations; every valuation calls
//! [`PriceSource::price`] fresh. Aggregation and staleness checks are the
//! oracle's own concern, behind this trait.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

/// External collaborator supplying a current value for each asset in the
/// common valuation unit (WAD-scaled value per whole token).
pub trait PriceSource {
    /// Current price for the asset, `None` when unknown
    fn price(&self, asset: Address) -> Option<U256>;
}

/// Admin-fed price map, the bundled [`PriceSource`].
///
/// Prices are seeded at asset registration and overwritten by the trusted
/// admin through the pool's `update_price`.
#[derive(Debug, Clone, Default)]
pub struct StoredPriceOracle {
    prices: HashMap<Address, U256>,
}

impl StoredPriceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_price(&mut self, asset: Address, price: U256) {
        self.prices.insert(asset, price);
    }
}

impl PriceSource for StoredPriceOracle {
    fn price(&self, asset: Address) -> Option<U256> {
        self.prices.get(&asset).copied()
    }
}
