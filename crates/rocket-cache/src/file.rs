//! File-backed backend: one file per key.

use std::fs;
use std::io::{ErrorKind, Write};

use tempfile::NamedTempFile;
use std::path::{Path, PathBuf};

use crate::{CacheError, KvBackend};

const EXTENSION: &str = "json";

/// Stores each key as `<encoded key>.json` inside a directory.
///
/// Each write goes to its own uniquely named temporary file in the same
/// directory and is renamed into place, so readers see either the old value
/// or the new one, even with concurrent writers. A failed write removes its
/// temporary file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (and create if missing) a store directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            CacheError::OpenError(format!("{}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", encode_key(key), EXTENSION))
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(key);

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        tracing::trace!(key, path = %path.display(), bytes = value.len(), "wrote cache entry");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.path_for(key).is_file())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(key) = decode_key(stem) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Percent-encode everything outside `[A-Za-z0-9_-]`.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

fn decode_key(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_encoding() {
        assert_eq!(encode_key("@RocketShoes:cart"), "%40RocketShoes%3Acart");
        assert_eq!(decode_key("%40RocketShoes%3Acart").as_deref(), Some("@RocketShoes:cart"));
        assert_eq!(decode_key("bad%4"), None);
    }

    #[test]
    fn test_set_get_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set("@RocketShoes:cart", b"[]").unwrap();

        let reopened = FileBackend::open(dir.path()).unwrap();
        assert_eq!(reopened.get("@RocketShoes:cart").unwrap(), Some(b"[]".to_vec()));
        assert!(reopened.exists("@RocketShoes:cart").unwrap());
    }

    #[test]
    fn test_missing_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();

        assert_eq!(backend.get("nope").unwrap(), None);
        backend.delete("nope").unwrap();

        backend.set("k", b"1").unwrap();
        backend.delete("k").unwrap();
        assert!(!backend.exists("k").unwrap());
    }

    #[test]
    fn test_keys_ignores_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();

        backend.set("a:b", b"1").unwrap();
        backend.set("c", b"2").unwrap();
        fs::write(dir.path().join(".stray.tmp"), b"x").unwrap();

        assert_eq!(backend.keys().unwrap(), vec!["a:b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_concurrent_writers_never_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let backend = std::sync::Arc::new(FileBackend::open(dir.path()).unwrap());

        let writers: Vec<_> = (1..=4usize)
            .map(|n| {
                let backend = backend.clone();
                std::thread::spawn(move || {
                    let value = serde_json::to_vec(&vec![n; n * 16]).unwrap();
                    for _ in 0..100 {
                        backend.set("@RocketShoes:cart", &value).unwrap();
                        let stored = backend.get("@RocketShoes:cart").unwrap().unwrap();
                        serde_json::from_slice::<Vec<usize>>(&stored).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let stored = backend.get("@RocketShoes:cart").unwrap().unwrap();
        let lines: Vec<usize> = serde_json::from_slice(&stored).unwrap();
        assert!(lines.iter().all(|&n| n == lines[0]));
        assert_eq!(lines.len(), lines[0] * 16);

        // No temporary files are left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("store");

        let backend = FileBackend::open(&nested).unwrap();
        assert!(backend.dir().is_dir());
    }
}
