//! Shopping cart module.
//!
//! Contains the cart snapshot and its line items.

mod cart;

pub use cart::{Cart, LineItem};
