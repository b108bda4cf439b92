use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;

struct CacheEntry<T> {
    digest: String,
    value: Arc<T>,
}

/// Parsed files keyed by path and the SHA-256 of their bytes.
///
/// A lookup re-reads the file and reuses the parsed value only while the digest still
/// matches; a changed file replaces its entry.
pub struct TableCache<T> {
    entries: HashMap<PathBuf, CacheEntry<T>>,
    hits: u64,
    misses: u64,
}

impl<T> Default for TableCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

impl<T> TableCache<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached value for `path`, parsing with `load` when the file is new or changed
    pub fn get_or_load<F>(&mut self, path: impl AsRef<Path>, load: F) -> Result<Arc<T>>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let digest = content_digest(&bytes);

        if let Some(entry) = self.entries.get(path) {
            if entry.digest == digest {
                self.hits += 1;
                debug!(path = %path.display(), "Table cache hit");
                return Ok(entry.value.clone());
            }
        }

        self.misses += 1;
        debug!(path = %path.display(), digest = %digest, "Table cache miss");
        let value = Arc::new(load(&bytes)?);
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                digest,
                value: value.clone(),
            },
        );
        Ok(value)
    }

    /// Drop the entry for one path. Returns true if something was cached.
    pub fn invalidate(&mut self, path: impl AsRef<Path>) -> bool {
        self.entries.remove(path.as_ref()).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn count_lines(bytes: &[u8]) -> Result<usize> {
        Ok(bytes.iter().filter(|b| **b == b'\n').count())
    }

    #[test]
    fn test_unchanged_file_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "a\n1\n").unwrap();

        let loads = Cell::new(0);
        let mut cache = TableCache::new();
        for _ in 0..3 {
            let value = cache
                .get_or_load(&path, |b| {
                    loads.set(loads.get() + 1);
                    count_lines(b)
                })
                .unwrap();
            assert_eq!(*value, 2);
        }
        assert_eq!(loads.get(), 1);
        assert_eq!(cache.stats(), (2, 1));
    }

    #[test]
    fn test_changed_content_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "a\n1\n").unwrap();

        let mut cache = TableCache::new();
        assert_eq!(*cache.get_or_load(&path, count_lines).unwrap(), 2);
        fs::write(&path, "a\n1\n2\n").unwrap();
        assert_eq!(*cache.get_or_load(&path, count_lines).unwrap(), 3);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "a\n").unwrap();

        let mut cache = TableCache::new();
        cache.get_or_load(&path, count_lines).unwrap();
        assert!(cache.invalidate(&path));
        assert!(!cache.invalidate(&path));
        assert!(cache.is_empty());
        cache.get_or_load(&path, count_lines).unwrap();
        assert_eq!(cache.stats(), (0, 2));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache: TableCache<usize> = TableCache::new();
        assert!(cache.get_or_load(dir.path().join("nope.csv"), count_lines).is_err());
    }
}
