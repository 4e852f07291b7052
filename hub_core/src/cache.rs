use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stamped_at: u64,
}

/// Tick-stamped cache with a freshness window and a hard entry bound.
///
/// An entry is fresh while `now - stamped_at < ttl`; stale entries read as
/// absent but stay resident until [`TtlCache::sweep`] drops them once their
/// age exceeds twice the TTL. Inserting past capacity evicts the oldest
/// entry.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    ttl: u64,
    capacity: usize,
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K: Eq + Hash + Clone, V> TtlCache<K, V> {
    pub fn new(ttl: u64, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K, now: u64) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| now.saturating_sub(entry.stamped_at) < self.ttl)
            .map(|entry| &entry.value)
    }

    pub fn is_fresh(&self, key: &K, now: u64) -> bool {
        self.get(key, now).is_some()
    }

    /// Ticks since `key` was stamped, fresh or not.
    pub fn age(&self, key: &K, now: u64) -> Option<u64> {
        self.entries
            .get(key)
            .map(|entry| now.saturating_sub(entry.stamped_at))
    }

    pub fn insert(&mut self, key: K, value: V, now: u64) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stamped_at: now,
            },
        );
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops entries older than twice the TTL and entries whose key is no
    /// longer live. Returns the number of entries removed.
    pub fn sweep(&mut self, now: u64, is_live: impl Fn(&K) -> bool) -> usize {
        let limit = self.ttl.saturating_mul(2);
        let before = self.entries.len();
        self.entries
            .retain(|key, entry| now.saturating_sub(entry.stamped_at) <= limit && is_live(key));
        before - self.entries.len()
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.stamped_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
