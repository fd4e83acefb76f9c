//! Catalog module.
//!
//! Read-only snapshots returned by the product and stock services.

mod inventory;
mod product;

pub use inventory::StockInfo;
pub use product::ProductDetails;
