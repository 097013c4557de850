// src/app/cache.rs
//! Bounded in-memory caches.
//!
//! `BoundedCache` keeps at most `capacity` distinct keys. Eviction order is
//! insertion order (FIFO) unless the cache was built with [`Eviction::Lru`],
//! in which case reads and re-inserts move a key to the back of the queue.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use eframe::egui::ColorImage;
use tracing::trace;

pub const DEFAULT_CAPACITY: usize = 256;

/// Logical size a poster is fitted into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// (poster identifier, target size). Two sizes of one poster never alias.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub poster: String,
    pub size: TargetSize,
}

impl CacheKey {
    pub fn new(poster: impl Into<String>, size: TargetSize) -> Self {
        Self {
            poster: poster.into(),
            size,
        }
    }

    /// Stable short name used for GPU texture labels.
    pub fn texture_name(&self) -> String {
        let raw = format!("{}@{}x{}", self.poster, self.size.width, self.size.height);
        format!("poster_{:x}", md5::compute(raw.as_bytes()))
    }
}

/// Decoded RGBA poster, already fitted to its `TargetSize`.
pub type PosterImage = Arc<ColorImage>;

pub type ImageCache = BoundedCache<CacheKey, PosterImage>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Eviction {
    #[default]
    Fifo,
    Lru,
}

#[derive(Debug)]
pub struct BoundedCache<K, V> {
    items: HashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
    eviction: Eviction,
}

impl<K, V> Default for BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self::with_eviction(capacity, Eviction::Fifo)
    }

    pub fn with_eviction(capacity: usize, eviction: Eviction) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
            eviction,
        }
    }

    /// Clone of the stored value. Only moves the key under LRU.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let value = self.items.get(key).cloned()?;
        if self.eviction == Eviction::Lru {
            self.touch(key);
        }
        Some(value)
    }

    /// Lookup that never changes eviction order.
    #[cfg(test)]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.items.get(key)
    }

    pub fn put(&mut self, key: K, value: V) {
        if self.items.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        } else if self.eviction == Eviction::Lru {
            self.touch(&key);
        }

        while self.items.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.items.remove(&oldest);
            trace!("cache evicted oldest entry");
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}

/// Cache handle shared between the UI thread and fetch workers.
#[derive(Debug)]
pub struct SharedCache<K, V> {
    inner: Arc<Mutex<BoundedCache<K, V>>>,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(cache: BoundedCache<K, V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key)
    }

    pub fn put(&self, key: K, value: V) {
        self.lock().put(key, value);
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Entries are independent; a panic mid-put cannot leave a broken invariant.
    fn lock(&self) -> MutexGuard<'_, BoundedCache<K, V>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(i: usize) -> CacheKey {
        CacheKey::new(format!("/p{i}.jpg"), TargetSize::new(140, 200))
    }

    #[test]
    fn never_exceeds_capacity_and_keeps_newest() {
        let cap = 4;
        let mut cache: BoundedCache<CacheKey, usize> = BoundedCache::new(cap);
        for i in 0..20 {
            cache.put(key(i), i);
            assert!(cache.len() <= cap);
            let oldest_kept = (i + 1).saturating_sub(cap);
            for j in 0..=i {
                assert_eq!(cache.contains(&key(j)), j >= oldest_kept, "i={i} j={j}");
            }
        }
    }

    #[test]
    fn get_after_put_returns_value() {
        let mut cache: BoundedCache<CacheKey, &str> = BoundedCache::new(8);
        cache.put(key(1), "one");
        assert_eq!(cache.get(&key(1)), Some("one"));
        assert_eq!(cache.get(&key(2)), None);
    }

    #[test]
    fn sizes_do_not_alias() {
        let mut cache: BoundedCache<CacheKey, u32> = BoundedCache::new(8);
        let small = CacheKey::new("/a.jpg", TargetSize::new(140, 200));
        let large = CacheKey::new("/a.jpg", TargetSize::new(300, 450));
        cache.put(small.clone(), 1);
        assert_eq!(cache.get(&large), None);
        cache.put(large.clone(), 2);
        assert_eq!(cache.get(&small), Some(1));
        assert_eq!(cache.get(&large), Some(2));
        assert_ne!(small.texture_name(), large.texture_name());
    }

    #[test]
    fn fifo_reinsert_does_not_postpone_eviction() {
        let mut cache: BoundedCache<usize, usize> = BoundedCache::new(2);
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(1, 11);
        assert_eq!(cache.get(&1), Some(11));
        cache.put(3, 30);
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn lru_read_postpones_eviction() {
        let mut cache: BoundedCache<usize, usize> = BoundedCache::with_eviction(2, Eviction::Lru);
        cache.put(1, 10);
        cache.put(2, 20);
        assert_eq!(cache.get(&1), Some(10));
        cache.put(3, 30);
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zero_capacity_holds_one() {
        let mut cache: BoundedCache<usize, usize> = BoundedCache::new(0);
        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.peek(&2), Some(&2));
    }

    #[test]
    fn shared_cache_survives_concurrent_puts() {
        let shared: SharedCache<usize, usize> = SharedCache::new(BoundedCache::new(16));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let c = shared.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        c.put(t * 1000 + i, i);
                        let _ = c.get(&(t * 1000 + i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(shared.len(), 16);
    }
}
