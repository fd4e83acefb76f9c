//! Stock snapshots.

use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// Available quantity for a product, as reported by the stock service.
///
/// A point-in-time snapshot; the cart never owns or modifies it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockInfo {
    /// Product the stock belongs to.
    pub id: ProductId,
    /// Units available.
    pub amount: i64,
}

impl StockInfo {
    pub fn new(id: ProductId, amount: i64) -> Self {
        Self { id, amount }
    }

    /// Check if a specific quantity is available.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        quantity <= self.amount
    }
}
