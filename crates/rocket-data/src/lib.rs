//! Remote stock and product collaborators.
//!
//! This crate provides:
//! - `FetchClient` - JSON GET client with per-dependency timeout/retry
//! - `DependencyTag` - Semantic dependency categories
//! - `TimeoutConfig` - Per-dependency timeouts
//! - `RetryPolicy` - Retry strategies (disabled by default)
//! - `Transport` - The HTTP seam, with a `reqwest` implementation
//! - `HttpCatalog` - `StockLookup` + `ProductLookup` over the storefront API

mod catalog;
mod client;
mod dependency;
mod error;
mod retry;
mod timeout;
mod transport;

pub use catalog::*;
pub use client::*;
pub use dependency::*;
pub use error::*;
pub use retry::*;
pub use timeout::*;
pub use transport::*;
