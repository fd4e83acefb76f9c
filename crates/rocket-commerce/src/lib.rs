//! Cart domain types and collaborator ports for the RocketShoes storefront.
//!
//! This crate is pure data and logic, with no I/O:
//!
//! - **Catalog**: product details and stock snapshots as the remote services
//!   return them
//! - **Cart**: line items and the copy-on-write transforms that produce the
//!   next cart snapshot
//! - **Ports**: the `StockLookup` / `ProductLookup` traits the cart store
//!   awaits before committing a change
//!
//! # Example
//!
//! ```rust
//! use rocket_commerce::prelude::*;
//!
//! let shoe: ProductDetails = serde_json::from_str(r#"{"id":1,"title":"Shoe"}"#).unwrap();
//! let stock = StockInfo::new(ProductId::new(1), 5);
//!
//! let cart = Cart::new().with_added(shoe.id, &stock, Some(shoe)).unwrap();
//! assert_eq!(cart.amount_of(ProductId::new(1)), Some(1));
//! ```

pub mod error;
pub mod ids;
pub mod ports;

pub mod cart;
pub mod catalog;

pub use error::{CartError, ErrorKind};
pub use ids::ProductId;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CartError, ErrorKind};
    pub use crate::ids::ProductId;
    pub use crate::ports::{ProductLookup, StockLookup};

    pub use crate::cart::{Cart, LineItem};
    pub use crate::catalog::{ProductDetails, StockInfo};
}
