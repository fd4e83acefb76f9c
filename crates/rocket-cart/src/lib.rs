//! Observable, persisted shopping-cart store for the RocketShoes storefront.
//!
//! `CartStore` holds the current cart, validates every quantity increase
//! against the stock service, and writes the cart to a durable key-value
//! store after each change. UI layers read the snapshot, subscribe to
//! changes, and render the notices the store emits.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_cart::{CartConfig, CartStore, ChannelNotifier, ProductId, UpdateProductAmount};
//!
//! let config = CartConfig::load("rocket-cart.toml")?.with_env_overrides();
//! rocket_cart::telemetry::init(&config.log);
//!
//! let (notifier, mut notices) = ChannelNotifier::new();
//! let store = CartStore::from_config(&config)?.with_notifier(notifier);
//!
//! store.add_product(ProductId::new(1)).await;
//! store
//!     .update_product_amount(UpdateProductAmount::new(ProductId::new(1), 3))
//!     .await;
//!
//! for line in store.cart().iter() {
//!     println!("{} x{}", line.title().unwrap_or("?"), line.amount);
//! }
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod bootstrap;
mod config;
mod notice;
mod store;
pub mod telemetry;

pub use config::{
    ApiConfig, CartConfig, LogConfig, LogFormat, StorageBackend, StorageConfig, ENV_API_URL,
    ENV_STORAGE_DIR,
};
pub use notice::{ChannelNotifier, LogNotifier, Notice, Notifier, Operation};
pub use store::{CartStore, Outcome, UpdateProductAmount};

pub use rocket_commerce::prelude::*;
