//! Domain-keyed cache with a bounded TTL and an injectable clock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

struct Entry<V> {
    value: V,
    inserted: Instant,
}

/// Keys are lowercased. A zero TTL or capacity disables caching.
pub struct TtlCache<V> {
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self::with_clock(ttl, capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            capacity,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        if self.is_disabled() {
            return None;
        }
        let key = key.to_ascii_lowercase();
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        match entries.get(&key) {
            Some(entry) if now.duration_since(entry.inserted) < self.ttl => {
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: &str, value: V) {
        if self.is_disabled() {
            return;
        }
        let now = self.clock.now();
        let ttl = self.ttl;
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| now.duration_since(entry.inserted) < ttl);
        let key = key.to_ascii_lowercase();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key,
            Entry {
                value,
                inserted: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn is_disabled(&self) -> bool {
        self.ttl.is_zero() || self.capacity == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_expire_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::with_clock(Duration::from_secs(60), 10, clock.clone());
        cache.insert("Example.com", 1u32);
        assert_eq!(cache.get("example.com"), Some(1));
        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get("example.com"), Some(1));
        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("example.com"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::with_clock(Duration::from_secs(60), 2, clock.clone());
        cache.insert("a.com", 1u32);
        clock.advance(Duration::from_secs(1));
        cache.insert("b.com", 2);
        clock.advance(Duration::from_secs(1));
        cache.insert("c.com", 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a.com"), None);
        assert_eq!(cache.get("c.com"), Some(3));
    }

    #[test]
    fn zero_ttl_disables_cache() {
        let cache = TtlCache::new(Duration::ZERO, 10);
        cache.insert("a.com", 1u32);
        assert_eq!(cache.get("a.com"), None);
    }
}
