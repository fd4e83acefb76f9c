//! In-memory backend.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::{CacheError, KvBackend};

/// Process-local key-value backend (for development/testing).
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Create a new in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        self.entries().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries().remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries().contains_key(key))
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys: Vec<String> = self.entries().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let backend = MemoryBackend::new();
        backend.set("a", b"1").unwrap();

        assert_eq!(backend.get("a").unwrap(), Some(b"1".to_vec()));
        assert!(backend.exists("a").unwrap());

        backend.delete("a").unwrap();
        assert_eq!(backend.get("a").unwrap(), None);
        // Deleting twice is fine
        backend.delete("a").unwrap();
    }

    #[test]
    fn test_overwrite() {
        let backend = MemoryBackend::new();
        backend.set("a", b"1").unwrap();
        backend.set("a", b"2").unwrap();
        assert_eq!(backend.get("a").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_keys_sorted() {
        let backend = MemoryBackend::new();
        backend.set("b", b"").unwrap();
        backend.set("a", b"").unwrap();
        assert_eq!(backend.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }
}
