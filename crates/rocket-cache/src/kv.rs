//! Key-Value store wrapper with automatic serialization.

use std::path::Path;
use std::sync::Arc;

use crate::{CacheError, FileBackend, MemoryBackend};
use serde::{de::DeserializeOwned, Serialize};

/// Raw byte storage keyed by string.
///
/// Calls are synchronous: a write has completed (or failed) when it returns.
pub trait KvBackend: Send + Sync {
    /// Get the bytes stored under `key`, or `None` if the key doesn't exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store bytes under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }

    /// Get all keys.
    fn keys(&self) -> Result<Vec<String>, CacheError>;
}

/// Type-safe cache over a [`KvBackend`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Cheap to clone; clones share the
/// backend.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn KvBackend>,
}

impl Cache {
    /// Wrap an existing backend.
    pub fn new(backend: impl KvBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Open a process-local cache.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Open a file-backed cache rooted at `dir`, creating it if needed.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open_dir("/var/lib/rocket-cart")?;
    /// ```
    pub fn open_dir(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        Ok(Self::new(FileBackend::open(dir)?))
    }

    /// Open the default Spin Key-Value store.
    #[cfg(target_arch = "wasm32")]
    pub fn open_default() -> Result<Self, CacheError> {
        Ok(Self::new(crate::SpinBackend::open_default()?))
    }

    /// Open a named Spin Key-Value store.
    #[cfg(target_arch = "wasm32")]
    pub fn open(name: &str) -> Result<Self, CacheError> {
        Ok(Self::new(crate::SpinBackend::open(name)?))
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cart: Option<Cart> = cache.get("@RocketShoes:cart")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.backend.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// cache.set("@RocketShoes:cart", &cart)?;
    /// ```
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.set(key, &bytes)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.backend.delete(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.exists(key)
    }

    /// Get all keys in the cache.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.backend.keys()
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust
/// use rocket_cache::cache_key;
///
/// let key = cache_key!("@RocketShoes", "cart");
/// assert_eq!(key, "@RocketShoes:cart");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Line {
        id: i64,
        amount: i64,
    }

    #[test]
    fn test_typed_round_trip() {
        let cache = Cache::in_memory();
        let lines = vec![Line { id: 1, amount: 2 }, Line { id: 2, amount: 1 }];

        cache.set("cart", &lines).unwrap();
        let restored: Option<Vec<Line>> = cache.get("cart").unwrap();

        assert_eq!(restored, Some(lines));
    }

    #[test]
    fn test_missing_key() {
        let cache = Cache::in_memory();
        let value: Option<Vec<Line>> = cache.get("nothing").unwrap();
        assert!(value.is_none());
        assert!(!cache.exists("nothing").unwrap());
    }

    #[test]
    fn test_corrupt_value_is_serialize_error() {
        let backend = MemoryBackend::new();
        backend.set("cart", b"not json").unwrap();
        let cache = Cache::new(backend);

        let err = cache.get::<Vec<Line>>("cart").unwrap_err();
        assert!(matches!(err, CacheError::SerializeError(_)));
    }

    #[test]
    fn test_clones_share_backend() {
        let cache = Cache::in_memory();
        let other = cache.clone();

        cache.set("k", &1).unwrap();
        assert_eq!(other.get::<i32>("k").unwrap(), Some(1));

        other.delete("k").unwrap();
        assert!(!cache.exists("k").unwrap());
    }

    #[test]
    fn test_cache_key_macro() {
        assert_eq!(cache_key!("@RocketShoes", "cart"), "@RocketShoes:cart");
        assert_eq!(cache_key!("cart", "user", 42), "cart:user:42");
    }
}
