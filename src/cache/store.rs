//! Process-wide store for expensive lookup results.

use dashmap::DashMap;
use std::sync::Arc;

/// A thread-safe key/value cache with no expiry and no eviction.
///
/// Clones share the same underlying map, so one instance built at startup can
/// be handed to every component that needs it. Entries live until they are
/// overwritten or the process exits; a hit is returned as-is.
#[derive(Debug)]
pub struct CacheStore<V> {
    inner: Arc<DashMap<String, V>>,
}

impl<V> Clone for CacheStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheStore<V> {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        tracing::debug!(key = %key, "Value cached");
        self.inner.insert(key, value);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Snapshot of the cached keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        keys
    }
}

impl<V: Clone> CacheStore<V> {
    /// Look up `key`, returning a copy of the complete stored value.
    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key).map(|r| r.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_operations() {
        let cache: CacheStore<String> = CacheStore::new();

        // Initial check
        assert!(cache.get("department:5").is_none());
        assert!(cache.is_empty());

        cache.put("department:5", "Engineering".to_string());
        assert_eq!(cache.get("department:5").as_deref(), Some("Engineering"));

        // Overwrite
        cache.put("department:5", "Platform".to_string());
        assert_eq!(cache.get("department:5").as_deref(), Some("Platform"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clones_share_entries() {
        let cache: CacheStore<u64> = CacheStore::new();
        let other = cache.clone();

        other.put("b", 2);
        cache.put("a", 1);

        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(other.get("a"), Some(1));
        assert_eq!(cache.keys(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_concurrent_writers_never_tear_values() {
        let cache: CacheStore<Vec<u32>> = CacheStore::new();

        let handles: Vec<_> = (0..8u32)
            .map(|n| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        cache.put("shared", vec![n; 16]);
                        if let Some(value) = cache.get("shared") {
                            assert!(value.iter().all(|v| *v == value[0]));
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 1);
    }
}
