//! In-memory TTL cache

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::errors::CacheResult;
use super::value::CachedValue;
use super::QueryCache;

struct Entry {
    value: CachedValue,
    expires_at: Instant,
}

/// Process-local cache. Entries expire lazily on read.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QueryCache for MemoryCache {
    fn get(&self, key: &str) -> Option<CachedValue> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: CachedValue, ttl: Duration) -> CacheResult<()> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn clear(&self) -> CacheResult<()> {
        self.entries.lock().expect("cache lock poisoned").clear();
        Ok(())
    }
}
