//! In-memory object cache with time-to-live and LRU capacity eviction.
//!
//! One [`Cache`] instance exists per entity type, each with its own capacity
//! and TTL. Entries expire lazily: there is no background sweeper, an expired
//! entry is dropped the next time it is looked up. Cache operations never
//! fail; a miss is a normal, silent outcome.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;

/// Lookup key for a cached entity.
///
/// Ids and names live in separate keyspaces (the enum variants), so a
/// character with id `1` can never collide with one named "1". Name keys are
/// lowercase-folded at construction because name lookups are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
  Id(u64),
  Name(String),
}

impl CacheKey {
  pub fn id(id: u64) -> Self {
    CacheKey::Id(id)
  }

  pub fn name(name: &str) -> Self {
    CacheKey::Name(name.to_lowercase())
  }
}

struct Entry<T> {
  value: Arc<T>,
  inserted_at: Instant,
}

/// Bounded, TTL-aware LRU cache, shared across concurrently executing
/// fetches.
///
/// The internal structures are guarded by a plain mutex; no cache operation
/// suspends while holding it, so this is sufficient to keep the recency order
/// and the capacity bound intact under concurrent `get`/`put`.
pub struct Cache<T> {
  inner: Mutex<LruCache<CacheKey, Entry<T>>>,
  ttl: Duration,
}

impl<T> Cache<T> {
  /// Create a cache holding at most `capacity` entries, each valid for
  /// `ttl` after insertion.
  pub fn new(capacity: usize, ttl: Duration) -> Self {
    let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
    Self {
      inner: Mutex::new(LruCache::new(capacity)),
      ttl,
    }
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<CacheKey, Entry<T>>> {
    // A panic while holding the lock cannot leave the map inconsistent, so
    // recover from poisoning instead of propagating it.
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Look up an entry. A hit refreshes its recency; an expired entry is
  /// removed and reported as a miss.
  pub fn get(&self, key: &CacheKey) -> Option<Arc<T>> {
    let mut inner = self.lock();
    let expired = match inner.get(key) {
      Some(entry) => {
        if entry.inserted_at.elapsed() < self.ttl {
          return Some(Arc::clone(&entry.value));
        }
        true
      }
      None => false,
    };
    if expired {
      inner.pop(key);
    }
    None
  }

  /// Insert or overwrite an entry with a fresh timestamp and recency.
  ///
  /// When inserting a new key at capacity, the least-recently-used entry is
  /// evicted first, irrespective of its TTL state.
  pub fn put(&self, key: CacheKey, value: Arc<T>) {
    let entry = Entry {
      value,
      inserted_at: Instant::now(),
    };
    self.lock().put(key, entry);
  }

  /// Whether an entry for `key` is present, without refreshing its recency.
  /// Expired-but-not-yet-dropped entries count as absent.
  pub fn contains(&self, key: &CacheKey) -> bool {
    let inner = self.lock();
    match inner.peek(key) {
      Some(entry) => entry.inserted_at.elapsed() < self.ttl,
      None => false,
    }
  }

  /// Number of entries currently held, including not-yet-collected expired
  /// ones.
  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  /// Drop every entry.
  pub fn clear(&self) {
    self.lock().clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cache_of(capacity: usize) -> Cache<String> {
    Cache::new(capacity, Duration::from_secs(60))
  }

  fn put_str(cache: &Cache<String>, id: u64, value: &str) {
    cache.put(CacheKey::id(id), Arc::new(value.to_string()));
  }

  #[test]
  fn test_get_returns_inserted_value() {
    let cache = cache_of(4);
    put_str(&cache, 1, "vanu");
    assert_eq!(cache.get(&CacheKey::id(1)).as_deref(), Some(&"vanu".to_string()));
    assert!(cache.get(&CacheKey::id(2)).is_none());
  }

  #[test]
  fn test_capacity_evicts_least_recently_used() {
    let cache = cache_of(3);
    put_str(&cache, 0, "a");
    put_str(&cache, 1, "b");
    put_str(&cache, 2, "c");

    // Touch key 0 so key 1 becomes the least recently used
    assert!(cache.get(&CacheKey::id(0)).is_some());

    put_str(&cache, 3, "d");
    assert_eq!(cache.len(), 3);
    assert!(cache.contains(&CacheKey::id(0)));
    assert!(!cache.contains(&CacheKey::id(1)));
    assert!(cache.contains(&CacheKey::id(2)));
    assert!(cache.contains(&CacheKey::id(3)));
  }

  #[test]
  fn test_overwrite_does_not_evict() {
    let cache = cache_of(2);
    put_str(&cache, 1, "old");
    put_str(&cache, 2, "other");
    put_str(&cache, 1, "new");
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get(&CacheKey::id(1)).as_deref(), Some(&"new".to_string()));
    assert!(cache.contains(&CacheKey::id(2)));
  }

  #[test]
  fn test_expired_entry_is_lazily_evicted() {
    let cache: Cache<String> = Cache::new(4, Duration::from_millis(20));
    put_str(&cache, 1, "stale");
    assert!(cache.get(&CacheKey::id(1)).is_some());

    std::thread::sleep(Duration::from_millis(40));
    assert!(cache.get(&CacheKey::id(1)).is_none());
    // The expired entry was removed, not just skipped
    assert_eq!(cache.len(), 0);
  }

  #[test]
  fn test_id_and_name_keyspaces_do_not_collide() {
    let cache = cache_of(4);
    cache.put(CacheKey::id(1), Arc::new("by id".to_string()));
    cache.put(CacheKey::name("1"), Arc::new("by name".to_string()));
    assert_eq!(cache.get(&CacheKey::id(1)).as_deref(), Some(&"by id".to_string()));
    assert_eq!(
      cache.get(&CacheKey::name("1")).as_deref(),
      Some(&"by name".to_string())
    );
  }

  #[test]
  fn test_name_keys_are_lowercase_folded() {
    let cache = cache_of(4);
    cache.put(CacheKey::name("Wrel"), Arc::new("dev".to_string()));
    assert!(cache.get(&CacheKey::name("WREL")).is_some());
    assert!(cache.get(&CacheKey::name("wrel")).is_some());
  }

  #[test]
  fn test_clear_empties_the_cache() {
    let cache = cache_of(4);
    put_str(&cache, 1, "a");
    put_str(&cache, 2, "b");
    cache.clear();
    assert!(cache.is_empty());
    assert!(cache.get(&CacheKey::id(1)).is_none());
  }

  #[test]
  fn test_concurrent_get_and_put_keep_capacity_bound() {
    let cache = Arc::new(Cache::new(8, Duration::from_secs(60)));
    let mut handles = Vec::new();
    for t in 0..4u64 {
      let cache = Arc::clone(&cache);
      handles.push(std::thread::spawn(move || {
        for i in 0..100u64 {
          let key = t * 100 + i;
          cache.put(CacheKey::id(key), Arc::new(format!("v{}", key)));
          cache.get(&CacheKey::id(key));
        }
      }));
    }
    for handle in handles {
      handle.join().unwrap();
    }
    assert!(cache.len() <= 8);
  }
}
