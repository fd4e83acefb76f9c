//! Durable key-value store for persisting cart snapshots.
//!
//! Provides a small, typed API over interchangeable storage backends with
//! automatic JSON serialization:
//!
//! - `MemoryBackend` - process-local map, for tests and ephemeral sessions
//! - `FileBackend` - one file per key in a directory, atomic replace on write
//! - `SpinBackend` - Spin's Key-Value Store (wasm32 only)
//!
//! # Example
//!
//! ```rust
//! use rocket_cache::{cache_key, Cache};
//!
//! let cache = Cache::in_memory();
//! let key = cache_key!("@RocketShoes", "cart");
//!
//! cache.set(&key, &vec![1, 2, 3]).unwrap();
//! let stored: Option<Vec<i32>> = cache.get(&key).unwrap();
//! assert_eq!(stored, Some(vec![1, 2, 3]));
//! ```

mod error;
mod file;
mod kv;
mod memory;
#[cfg(target_arch = "wasm32")]
mod spin;

pub use error::CacheError;
pub use file::FileBackend;
pub use kv::{Cache, KvBackend};
pub use memory::MemoryBackend;
#[cfg(target_arch = "wasm32")]
pub use spin::SpinBackend;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileBackend, KvBackend, MemoryBackend};
}
