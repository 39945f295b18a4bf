//! # TTL Cache Module
//!
//! A small thread-safe map with lazy expiry, used for memoized artifacts and for
//! rate-limit windows.
//!
//! ## Overview
//!
//! - Entries carry the instant they were stored; an entry is expired once
//!   `now - stored_at >= ttl`.
//! - Expiry is lazy: `get` treats an expired entry as absent and drops it. There is
//!   no background eviction; [`TtlCache::purge_expired`] exists for callers that want
//!   to reclaim memory explicitly.
//! - Keys are structured values (tuples or small structs), never concatenated
//!   strings, so invalidation matches on fields instead of substrings.
//! - Time comes from an injected [`Clock`], which makes expiry testable.
//!
//! ## Usage
//!
//! ```rust
//! use apiforge::cache::TtlCache;
//! use apiforge::clock::SystemClock;
//! use chrono::Duration;
//! use std::sync::Arc;
//!
//! let cache: TtlCache<(String, u32), String> =
//!     TtlCache::new(Duration::seconds(60), Arc::new(SystemClock));
//! cache.insert(("GET_EMP".to_string(), 1), "cached".to_string());
//! assert_eq!(cache.get(&("GET_EMP".to_string(), 1)).as_deref(), Some("cached"));
//! ```

use crate::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// A cached value and the instant it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: DateTime<Utc>,
}

/// Thread-safe TTL map. Cloning shares the underlying storage.
#[derive(Clone)]
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current time according to the cache's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn is_expired(&self, entry: &CacheEntry<V>) -> bool {
        self.clock.now() - entry.stored_at >= self.ttl
    }

    /// Live entry for `key`, if any. Expired entries are removed on the way out.
    pub fn entry(&self, key: &K) -> Option<CacheEntry<V>> {
        let found = {
            let guard = self.entries.read().unwrap_or_else(|e| e.into_inner());
            guard.get(key).cloned()
        };
        match found {
            Some(entry) if self.is_expired(&entry) => {
                debug!("cache entry expired");
                self.invalidate(key);
                None
            }
            other => other,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entry(key).map(|e| e.value)
    }

    /// Store `value` as if it had been written at `stored_at`.
    ///
    /// Rate-limit windows use this to bump a counter without resetting the window.
    pub fn put(&self, key: K, value: V, stored_at: DateTime<Utc>) {
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        guard.insert(key, CacheEntry { value, stored_at });
    }

    /// Store `value` stamped with the clock's current time.
    pub fn insert(&self, key: K, value: V) {
        let now = self.clock.now();
        self.put(key, value, now);
    }

    pub fn invalidate(&self, key: &K) -> Option<V> {
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        guard.remove(key).map(|e| e.value)
    }

    /// Drop every entry whose key matches `pred`. Returns how many were removed.
    pub fn invalidate_where<F>(&self, mut pred: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = guard.len();
        guard.retain(|k, _| !pred(k));
        before - guard.len()
    }

    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let ttl = self.ttl;
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = guard.len();
        guard.retain(|_, e| now - e.stored_at < ttl);
        before - guard.len()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
