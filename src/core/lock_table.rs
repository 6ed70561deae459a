//! Lazily populated table of per-key reader/writer locks
//!
//! # Design
//!
//! `LockTable` maps a key to a shared `RwLock`, creating the lock the first
//! time the key is referenced. The lookup uses `DashMap`'s entry API, so
//! "get the lock for this key, creating it if absent" is a single atomic
//! step: two threads racing on a brand-new key always receive the same lock
//! object. Installing two different locks for one key would silently break
//! every serialization guarantee built on top of the table.
//!
//! Locks are never removed; the table only grows.

use dashmap::DashMap;
use parking_lot::RwLock;
use std::hash::Hash;
use std::sync::Arc;

/// Concurrent map from key to a dedicated reader/writer lock
///
/// `T` is the value guarded by each lock and is created with `T::default()`
/// when the lock is first requested.
#[derive(Debug)]
pub struct LockTable<K, T>
where
    K: Eq + Hash,
{
    locks: DashMap<K, Arc<RwLock<T>>>,
}

impl<K, T> LockTable<K, T>
where
    K: Eq + Hash + Clone,
    T: Default,
{
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Get the lock for `key`, creating it if this is the first reference
    ///
    /// The returned `Arc` can be held after the table's internal shard lock
    /// has been released, so callers never block the table while waiting on
    /// the per-key lock.
    pub fn lock_for(&self, key: &K) -> Arc<RwLock<T>> {
        let entry = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::new(T::default())));
        Arc::clone(entry.value())
    }

    /// Whether a lock has been created for `key`
    pub fn contains(&self, key: &K) -> bool {
        self.locks.contains_key(key)
    }

    /// Number of locks created so far
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no lock has been created yet
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl<K, T> Default for LockTable<K, T>
where
    K: Eq + Hash + Clone,
    T: Default,
{
    fn default() -> Self {
        Self::new()
    }
}
