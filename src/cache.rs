//! Parsed-design cache
//!
//! Parsing is cheap but not free, and the same design is usually selected
//! many times in one session. Entries are keyed by the content hash of
//! (namespace hint, SVG text), so identical input returns the same
//! `Arc<Design>` and a changed source never hits a stale entry.
//!
//! The cache holds at most [`SharedDesignCache::capacity`] designs; once
//! full, the oldest insertion is evicted first.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::design::{Design, parse_or_fallback};
use crate::hash::StableHasher;

// =============================================================================
// Cache Key
// =============================================================================

/// Content hash of one design source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey(u64);

impl CacheKey {
    /// Key for SVG text parsed under a namespace hint
    pub fn new(namespace_hint: &str, svg: &str) -> Self {
        Self(
            StableHasher::new()
                .update_str(namespace_hint)
                .update_str(svg)
                .finish(),
        )
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

// =============================================================================
// Design Cache
// =============================================================================

/// Non-thread-safe design cache.
pub type DesignCache = FxHashMap<CacheKey, Arc<Design>>;

/// Default number of designs kept by a [`SharedDesignCache`]
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

#[derive(Debug)]
struct CacheState {
    entries: DesignCache,
    /// Keys of `entries`, oldest insertion first
    order: VecDeque<CacheKey>,
    capacity: usize,
}

impl CacheState {
    fn insert(&mut self, key: CacheKey, design: Arc<Design>) -> Arc<Design> {
        if let Some(existing) = self.entries.get(&key) {
            return Arc::clone(existing);
        }
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else { break };
            self.entries.remove(&oldest);
            tracing::debug!(key = %oldest, "design cache full, evicted oldest entry");
        }
        self.order.push_back(key);
        self.entries.insert(key, Arc::clone(&design));
        design
    }
}

/// Thread-safe shared design cache.
///
/// Clones share the same storage, so one cache can serve several sessions.
#[derive(Debug, Clone)]
pub struct SharedDesignCache {
    inner: Arc<RwLock<CacheState>>,
}

impl Default for SharedDesignCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl SharedDesignCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache holding at most `capacity` designs (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheState {
                entries: DesignCache::default(),
                order: VecDeque::new(),
                capacity: capacity.max(1),
            })),
        }
    }

    /// Maximum number of cached designs
    pub fn capacity(&self) -> usize {
        self.inner.read().capacity
    }

    /// Execute a closure with read access to the cache.
    pub fn with_read<R>(&self, f: impl FnOnce(&DesignCache) -> R) -> R {
        let guard = self.inner.read();
        f(&guard.entries)
    }

    /// Parsed design for `svg`, parsing (or falling back) on a miss.
    ///
    /// Fallback designs are not cached, so a later retry with the same text
    /// still goes through the parser and logs again.
    pub fn get_or_parse(&self, namespace_hint: &str, svg: &str) -> Arc<Design> {
        let key = CacheKey::new(namespace_hint, svg);
        if let Some(hit) = self.get(&key) {
            tracing::debug!(design = namespace_hint, %key, "design cache hit");
            return hit;
        }

        let design = Arc::new(parse_or_fallback(svg, namespace_hint));
        if design.is_fallback() {
            return design;
        }
        // Another session may have parsed the same text meanwhile; keep theirs
        self.inner.write().insert(key, design)
    }

    /// Get a cached design.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Design>> {
        self.with_read(|c| c.get(key).cloned())
    }

    /// Insert or replace an entry, evicting the oldest one when full.
    pub fn insert(&self, key: CacheKey, design: Arc<Design>) {
        let mut state = self.inner.write();
        match state.entries.get_mut(&key) {
            Some(slot) => *slot = design,
            None => {
                state.insert(key, design);
            }
        }
    }

    /// Remove an entry from the cache.
    pub fn remove(&self, key: &CacheKey) -> Option<Arc<Design>> {
        let mut state = self.inner.write();
        let removed = state.entries.remove(key)?;
        state.order.retain(|k| k != key);
        Some(removed)
    }

    /// Check if the cache contains a key.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.with_read(|c| c.contains_key(key))
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.with_read(|c| c.len())
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all entries from the cache.
    pub fn clear(&self) {
        let mut state = self.inner.write();
        state.entries.clear();
        state.order.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================
