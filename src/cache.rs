//! Background-removal result cache.
//!
//! Background removal is the slowest step of a run by far: the external
//! model takes seconds per image while every pixel stage together takes
//! milliseconds. Re-processing the same upload with different options
//! (another variant, a thicker border) should not pay for it twice.
//!
//! # Design
//!
//! The cache is **content-addressed**: keys are the SHA-256 hex digest of
//! the input bytes, so renaming or re-reading a file does not matter, only
//! its content does. Values are the adapter's output bytes behind an `Arc`
//! and are never mutated once stored.
//!
//! The map is a [`DashMap`], so lookups from parallel pipeline runs do not
//! contend on a single lock. No lock is held while the adapter runs: two
//! runs that miss on the same key at the same time both compute, and the
//! last insert wins. Since the key is the content hash, both values are
//! equivalent.
//!
//! The cache lives for the process; nothing is written to disk.

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// SHA-256 hash of a byte slice, returned as a hex string.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Process-wide map from input digest to background-removed bytes.
#[derive(Debug, Default)]
pub struct RemovalCache {
    entries: DashMap<String, Arc<Vec<u8>>>,
    hits: AtomicU32,
    misses: AtomicU32,
}

impl RemovalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn insert(&self, key: String, value: Vec<u8>) -> Arc<Vec<u8>> {
        let value = Arc::new(value);
        self.entries.insert(key, Arc::clone(&value));
        value
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the cached value for `input`, or compute, store, and return it.
    ///
    /// `compute` runs without any lock held. Errors are returned as-is and
    /// nothing is cached for that input.
    pub fn get_or_try_insert_with<E>(
        &self,
        input: &[u8],
        compute: impl FnOnce() -> Result<Vec<u8>, E>,
    ) -> Result<Arc<Vec<u8>>, E> {
        let key = hash_bytes(input);
        if let Some(hit) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %&key[..12], "background removal cache hit");
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key = %&key[..12], "background removal cache miss");
        let value = compute()?;
        Ok(self.insert(key, value))
    }

    /// Snapshot of hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Summary of cache performance for a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} removed ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} removed", self.misses)
        }
    }
}
