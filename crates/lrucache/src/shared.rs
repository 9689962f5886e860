//! SharedLruCache: LRU cache behind a single exclusive lock

use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use parking_lot::Mutex;

use crate::error::Result;
use crate::lru::LruCache;
use crate::stats::CacheStats;

/// Thread-safe LRU cache with hit/miss statistics
///
/// One mutex guards the whole cache. A read-write lock would not help here
/// since every hit reorders the recency list. Values are handed out as
/// clones, never as references into the locked cache.
pub struct SharedLruCache<K, V> {
    /// LRU cache for hot data
    cache: Mutex<LruCache<K, V>>,

    /// Cache statistics
    stats: CacheStats,
}

impl<K, V> SharedLruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a new shared cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self::from_cache(LruCache::new(capacity))
    }

    /// Create a new shared cache from any integer capacity
    ///
    /// # Errors
    /// * `Error::InvalidCapacity` - the value is negative or does not fit in `usize`
    pub fn try_new<C>(capacity: C) -> Result<Self>
    where
        C: TryInto<usize> + fmt::Display,
    {
        Ok(Self::from_cache(LruCache::try_new(capacity)?))
    }

    /// Wrap an existing cache; its contents are kept, stats start at zero
    pub fn from_cache(cache: LruCache<K, V>) -> Self {
        Self {
            cache: Mutex::new(cache),
            stats: CacheStats::new(),
        }
    }

    /// Get a value, marking it most recently used
    pub fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.cache.lock();
        match cache.get(key) {
            Some(value) => {
                self.stats.record_hit();
                Some(value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Get a value without changing its recency or the statistics
    pub fn peek(&self, key: &K) -> Option<V> {
        self.cache.lock().peek(key).cloned()
    }

    /// Check whether a key is cached
    pub fn contains(&self, key: &K) -> bool {
        self.cache.lock().contains(key)
    }

    /// Mark a key most recently used; returns false if it is not cached
    pub fn touch(&self, key: &K) -> bool {
        self.cache.lock().touch(key)
    }

    /// Insert a value, returning the previous one if the key was cached
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let mut cache = self.cache.lock();
        self.store(&mut cache, key, value)
    }

    /// Return the cached value, or compute, cache and return it on a miss
    ///
    /// Presence is decided by the key alone, so empty or zero-like values
    /// are ordinary hits. The loader runs with the lock released, so it may
    /// read from or write to this cache. Concurrent callers missing on the
    /// same key may each run their loader; the first value stored wins and
    /// is returned to every caller.
    pub fn get_or_insert_with<F>(&self, key: K, load: F) -> V
    where
        F: FnOnce() -> V,
    {
        match self.try_get_or_insert_with(key, || Ok::<V, Infallible>(load())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`SharedLruCache::get_or_insert_with`] with a fallible loader
    ///
    /// A failed load caches nothing and returns the loader's error.
    pub fn try_get_or_insert_with<F, E>(&self, key: K, load: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = load()?;

        let mut cache = self.cache.lock();
        // Filled by another caller while the loader ran
        if let Some(existing) = cache.get(&key) {
            return Ok(existing.clone());
        }
        self.store(&mut cache, key, value.clone());
        Ok(value)
    }

    /// Remove a key from the cache
    pub fn remove(&self, key: &K) -> Option<V> {
        self.cache.lock().remove(key)
    }

    /// Owned copy of the contents, least to most recently used
    pub fn snapshot(&self) -> Vec<(K, V)> {
        self.cache.lock().snapshot()
    }

    /// Get current number of entries
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Alias for [`SharedLruCache::len`]
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.cache.lock().capacity()
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Clear the cache and reset its statistics
    pub fn clear(&self) {
        let mut cache = self.cache.lock();
        cache.clear();
        self.stats.reset();
    }

    /// Consume the wrapper and return the inner cache
    pub fn into_inner(self) -> LruCache<K, V> {
        self.cache.into_inner()
    }

    fn store(&self, cache: &mut LruCache<K, V>, key: K, value: V) -> Option<V> {
        let existed = cache.contains(&key);
        let displaced = cache.push(key, value);

        if existed {
            self.stats.record_update();
            return displaced.map(|(_, old)| old);
        }

        self.stats.record_insert();
        if displaced.is_some() {
            self.stats.record_eviction();
        }
        None
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SharedLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedLruCache")
            .field("cache", &*self.cache.lock())
            .field("stats", &self.stats)
            .finish()
    }
}
