//! In-Process Memory Tier
//!
//! Capacity- and time-bounded hot cache over a concurrent map. Entries
//! expire a fixed duration after write and are reaped lazily on access;
//! when the entry count reaches the configured limit, expired entries are
//! dropped first and the oldest write is evicted if none were.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use bytes::Bytes;
use dashmap::DashMap;

use crate::config::MemoryCacheConfig;

struct MemoryEntry {
    data: Bytes,
    written_at: Instant,
}

/// Memory tier store
pub struct MemoryTierStore {
    entries: DashMap<String, MemoryEntry>,
    config: MemoryCacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryTierStore {
    /// Create a memory store from its configuration
    pub fn new(config: MemoryCacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get a value; absent when missing or expired
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if entry.written_at.elapsed() < self.config.expire_after_write() {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.data.clone());
                }
                true
            }
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Put a value, overwriting unconditionally
    pub fn put(&self, key: &str, data: Bytes) {
        if !self.entries.contains_key(key) && self.entries.len() as u64 >= self.config.size_limit {
            self.evict_one();
        }

        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                data,
                written_at: Instant::now(),
            },
        );
    }

    /// Remove a value; removing an absent key is a no-op
    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Whether a live (non-expired) entry exists for the key
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|entry| entry.written_at.elapsed() < self.config.expire_after_write())
            .unwrap_or(false)
    }

    /// Drop expired entries; if none were expired, evict the oldest write.
    fn evict_one(&self) {
        let ttl = self.config.expire_after_write();
        let mut expired: Vec<String> = Vec::new();
        let mut oldest: Option<(String, Instant)> = None;

        for entry in self.entries.iter() {
            if entry.written_at.elapsed() >= ttl {
                expired.push(entry.key().clone());
            } else if oldest
                .as_ref()
                .map(|(_, at)| entry.written_at < *at)
                .unwrap_or(true)
            {
                oldest = Some((entry.key().clone(), entry.written_at));
            }
        }

        if expired.is_empty() {
            if let Some((key, _)) = oldest {
                self.entries.remove(&key);
            }
        } else {
            for key in expired {
                self.entries.remove(&key);
            }
        }
    }

    /// Number of entries currently held (including not-yet-reaped expired ones)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Hit count
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Miss count
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Tests
// =============================================================================
