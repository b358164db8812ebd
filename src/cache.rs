//! Keyed TTL cache
//!
//! Explicit cache instances owned by the pipeline wiring; the core logic
//! never touches ambient global state. Expired entries are dropped lazily
//! on read and pruned opportunistically on write.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const PRUNE_THRESHOLD: usize = 1024;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// A named cache with a default entry lifetime
pub struct TtlCache<V> {
    name: &'static str,
    lifetime: Duration,
    inner: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(name: &'static str, lifetime: Duration) -> Self {
        TtlCache {
            name,
            lifetime,
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let mut map = self.inner.lock().unwrap();
        match map.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                map.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: impl Into<String>, value: V) {
        self.put_with_ttl(key, value, self.lifetime);
    }

    pub fn put_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let mut map = self.inner.lock().unwrap();
        if map.len() >= PRUNE_THRESHOLD {
            let now = Instant::now();
            map.retain(|_, entry| entry.expires_at > now);
        }
        map.insert(
            key.into(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn remove(&self, key: &str) {
        self.inner.lock().unwrap().remove(key);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
