//! In-process cache tier.

use crate::pattern::KeyPattern;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::mem;
use std::time::Duration;
use tokio::time::Instant;

/// One cached payload.
#[derive(Debug, Clone)]
struct CacheEntry {
    payload: String,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) > self.ttl
    }

    fn footprint(&self, key: &str) -> usize {
        key.len() + self.payload.len() + mem::size_of::<Self>() + mem::size_of::<String>()
    }
}

/// Local fallback tier: a TTL map guarded by a read/write lock.
///
/// Expired entries are never returned; they are purged when read and by
/// [`cleanup`](Self::cleanup).
#[derive(Debug, Default)]
pub struct MemoryTier {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryTier {
    /// Creates an empty tier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the payload for `key` if present and fresh.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.payload.clone()),
                Some(_) => {}
            }
        }

        // Expired: re-check under the write lock, a concurrent set may have
        // replaced it.
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.payload.clone()),
            None => None,
        }
    }

    /// Stores `payload` under `key`, replacing any previous entry.
    pub fn set(&self, key: &str, payload: String, ttl: Duration) {
        let entry = CacheEntry {
            payload,
            created_at: Instant::now(),
            ttl,
        };
        self.entries.write().insert(key.to_string(), entry);
    }

    /// Removes `key`. Returns true if it existed.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Removes every key matching `pattern`. Returns the count.
    pub fn delete_matching(&self, pattern: &KeyPattern) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !pattern.matches(key));
        before - entries.len()
    }

    /// Removes expired entries. Returns the count.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the tier holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Approximate heap and inline size of all entries, in bytes.
    pub fn memory_footprint(&self) -> usize {
        self.entries
            .read()
            .iter()
            .map(|(key, entry)| entry.footprint(key))
            .sum()
    }
}
