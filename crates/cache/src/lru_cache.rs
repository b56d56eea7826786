use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("{0} cache capacity must be greater than zero")]
    ZeroCapacity(&'static str),
}

/// A string-keyed LRU map guarded by a single mutex.
///
/// Every read and write takes the same lock. Critical sections are a hash
/// lookup plus a list splice, so the lock is never held across I/O. Values
/// are cloned out; store `Arc`s or small owned values.
#[derive(Debug)]
pub struct KeyedLru<V> {
    name: &'static str,
    inner: Mutex<LruCache<String, V>>,
}

impl<V: Clone> KeyedLru<V> {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// `name` only appears in logs and errors.
    pub fn new(name: &'static str, capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::ZeroCapacity(name))?;
        Ok(Self {
            name,
            inner: Mutex::new(LruCache::new(capacity)),
        })
    }

    // A panic while holding the lock cannot leave the LRU half-updated in a
    // way that matters to callers, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, LruCache<String, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Looks up `key`, marking it most recently used on a hit.
    pub fn get(&self, key: &str) -> Option<V> {
        let hit = self.lock().get(key).cloned();
        tracing::trace!(
            cache = self.name,
            key,
            hit = hit.is_some(),
            "cache lookup"
        );
        hit
    }

    /// Inserts `value` under `key`, evicting the least recently used entry
    /// when the cache is full. Returns the evicted key, if any.
    pub fn put(&self, key: impl Into<String>, value: V) -> Option<String> {
        let key = key.into();
        let mut cache = self.lock();
        let replacing = cache.contains(&key);
        let evicted = cache.push(key, value).map(|(k, _)| k);
        drop(cache);

        if replacing {
            return None;
        }
        if let Some(ref old) = evicted {
            tracing::debug!(cache = self.name, key = %old, "evicted least recently used entry");
        }
        evicted
    }

    /// Checks for `key` without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }
}
