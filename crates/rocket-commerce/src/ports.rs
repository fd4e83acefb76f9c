//! Collaborator ports awaited by the cart store.
//!
//! The store depends only on these traits; HTTP, fixtures and test doubles
//! all plug in here.

use async_trait::async_trait;

use crate::catalog::{ProductDetails, StockInfo};
use crate::error::CartError;
use crate::ids::ProductId;

/// Current stock for a product.
#[async_trait]
pub trait StockLookup: Send + Sync {
    /// Fetch the stock snapshot. Implementations report every failure as
    /// [`CartError::RemoteFailure`].
    async fn stock(&self, id: ProductId) -> Result<StockInfo, CartError>;
}

/// Full product details.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Fetch product details. Implementations report every failure as
    /// [`CartError::RemoteFailure`].
    async fn product(&self, id: ProductId) -> Result<ProductDetails, CartError>;
}
