//! Hybrid Cache Facade
//!
//! Orchestrates the tier stores into get/set/refresh/remove with a fixed
//! fallback order. Reads probe memory, then the distributed cache (only
//! while its construction-time probe holds), then the object tier, and
//! return on first hit. Writes go through the single placement-resolved
//! tier; distributed-resolved writes keep a hot copy in memory and degrade
//! to the object tier when the remote cache is unreachable.
//!
//! No operation here ever returns an error to the caller: absence and
//! no-op are the only observable failure signals. Every contained tier
//! failure is logged.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::codec;
use crate::config::{EntryOptions, HybridCacheConfig};
use crate::placement::{self, TierAssignment};
use crate::store::{
    DistributedCacheTierStore, InMemoryKvBackend, InMemoryObjectBackend, KvBackend,
    MemoryTierStore, ObjectBackend, ObjectTierStore, StoreMode, DEFAULT_CONTENT_TYPE,
};

/// Expiration window applied by `refresh`
pub const REFRESH_WINDOW: Duration = Duration::from_secs(60);

/// Area used for writes that degrade from the distributed cache to the
/// object tier
const FALLBACK_AREA: &str = "hybridcache";

/// Point-in-time view of the facade's tiers
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Entries currently in the memory tier
    pub memory_entries: usize,
    /// Memory tier hits
    pub memory_hits: u64,
    /// Memory tier misses
    pub memory_misses: u64,
    /// Whether the distributed cache answered its construction-time probe
    pub distributed_reachable: bool,
    /// Mode the object tier resolved to
    pub object_mode: StoreMode,
}

/// A hybrid cache that stores data in memory, on disk, in a distributed
/// object store, or in a distributed cache.
pub struct HybridCache {
    memory: MemoryTierStore,
    distributed: DistributedCacheTierStore,
    object: ObjectTierStore,
}

impl HybridCache {
    /// Build a facade from configuration without remote clients; the
    /// remote tiers degrade to their local fallbacks.
    pub async fn new(config: HybridCacheConfig) -> Self {
        Self::with_backends(config, None, None).await
    }

    /// Build a facade wiring concrete remote backends.
    ///
    /// Construction never fails: backends that cannot be probed are
    /// marked unreachable and the facade degrades around them.
    pub async fn with_backends(
        config: HybridCacheConfig,
        kv_backend: Option<Arc<dyn KvBackend>>,
        object_backend: Option<Arc<dyn ObjectBackend>>,
    ) -> Self {
        Self {
            memory: MemoryTierStore::new(config.memory.clone()),
            distributed: DistributedCacheTierStore::connect(&config.distributed, kv_backend).await,
            object: ObjectTierStore::open(&config.object_store, object_backend).await,
        }
    }

    /// Facade with in-memory remote backends (for testing)
    pub async fn in_memory() -> Self {
        let config = HybridCacheConfig::default();
        let object_backend = InMemoryObjectBackend::with_bucket(&config.object_store.bucket);
        Self::with_backends(
            config,
            Some(Arc::new(InMemoryKvBackend::new())),
            Some(Arc::new(object_backend)),
        )
        .await
    }

    /// Get the raw bytes stored under a key.
    ///
    /// Probes memory, then the distributed cache, then the object tier;
    /// first hit wins.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        if let Some(data) = self.memory.get(key) {
            return Some(data);
        }

        if let Some(data) = self.distributed.get(key).await {
            return Some(data);
        }

        match self.object.get(key).await {
            Ok(Some(data)) => return Some(data),
            Ok(None) => {}
            Err(e) => {
                warn!(key, error = %e, "object tier read failed, treating as absent");
            }
        }

        // Degraded writes live at a deterministic fallback key derived
        // from the caller key.
        match self.object.get(&self.fallback_key(key)).await {
            Ok(data) => data,
            Err(e) => {
                warn!(key, error = %e, "object tier fallback read failed, treating as absent");
                None
            }
        }
    }

    /// Get a string stored under a key.
    ///
    /// Always decodes via the direct UTF-8 path, never the generic
    /// decoder, regardless of which serializer produced the bytes.
    pub async fn get_string(&self, key: &str) -> Option<String> {
        let data = self.get(key).await?;
        match codec::decode_str(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "stored bytes are not valid UTF-8");
                None
            }
        }
    }

    /// Get a typed value stored under a key via the generic decoder.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = self.get(key).await?;
        match codec::decode(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "stored bytes do not match the requested shape");
                None
            }
        }
    }

    /// Set raw bytes under a key (identity encoding).
    pub async fn set(&self, key: &str, value: Bytes, options: EntryOptions) {
        self.set_encoded(key, value, true, options).await;
    }

    /// Set a string under a key via the direct UTF-8 transform.
    pub async fn set_string(&self, key: &str, value: &str, options: EntryOptions) {
        self.set_encoded(key, codec::encode_str(value), true, options)
            .await;
    }

    /// Set a typed value under a key via the generic serializer.
    ///
    /// An absent value is placed in memory regardless of priority. Encode
    /// failures degrade to an empty payload; `set_value` never fails.
    pub async fn set_value<T: Serialize>(&self, key: &str, value: Option<&T>, options: EntryOptions) {
        let data = codec::encode(&value).unwrap_or_else(|e| {
            warn!(key, error = %e, "encode failed, storing empty payload");
            Bytes::new()
        });
        self.set_encoded(key, data, value.is_some(), options).await;
    }

    async fn set_encoded(&self, key: &str, data: Bytes, value_present: bool, options: EntryOptions) {
        let tier = placement::decide(value_present, &options);
        debug!(key, tier = %tier, "placing value");

        match tier {
            TierAssignment::Memory => self.memory.put(key, data),
            TierAssignment::Distributed | TierAssignment::Local => {
                if tier == TierAssignment::Distributed && self.distributed.is_reachable() {
                    self.distributed
                        .put(key, data.clone(), options.absolute_expiration())
                        .await;
                } else if let Err(e) = self
                    .object
                    .put_at(&self.fallback_key(key), data.clone(), DEFAULT_CONTENT_TYPE)
                    .await
                {
                    warn!(key, error = %e, "object tier fallback write failed, value survives in memory only");
                }

                // Hot copy so reads never consult a tier that was never
                // written.
                self.memory.put(key, data);
            }
        }
    }

    /// Refresh the expiration of a key.
    ///
    /// Entries held in memory are not separately refreshed; otherwise the
    /// distributed entry's expiration is extended by [`REFRESH_WINDOW`]
    /// without changing the value.
    pub async fn refresh(&self, key: &str) {
        if self.memory.contains(key) {
            return;
        }
        self.distributed.refresh(key, REFRESH_WINDOW).await;
    }

    /// Remove a key from every tier that may hold authoritative state.
    ///
    /// Memory is always invalidated; additionally the distributed cache
    /// when reachable, else the object tier. Idempotent.
    pub async fn remove(&self, key: &str) {
        self.memory.remove(key);

        if self.distributed.is_reachable() {
            self.distributed.remove(key).await;
        } else if let Err(e) = self.object.remove(&self.fallback_key(key)).await {
            warn!(key, error = %e, "object tier remove failed");
        }
    }

    /// Deterministic object-tier key for writes that degraded from the
    /// distributed cache, so later `get`/`remove` calls with the caller
    /// key can find them.
    fn fallback_key(&self, key: &str) -> String {
        self.object.pinned_key(key, FALLBACK_AREA)
    }

    /// Release remote connections.
    ///
    /// Safe to call even if construction never opened one.
    pub async fn close(&self) {
        self.distributed.close().await;
    }

    /// Point-in-time statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_entries: self.memory.len(),
            memory_hits: self.memory.hits(),
            memory_misses: self.memory.misses(),
            distributed_reachable: self.distributed.is_reachable(),
            object_mode: self.object.mode(),
        }
    }

    /// Memory tier store
    pub fn memory(&self) -> &MemoryTierStore {
        &self.memory
    }

    /// Distributed cache tier store
    pub fn distributed(&self) -> &DistributedCacheTierStore {
        &self.distributed
    }

    /// Object tier store
    pub fn object(&self) -> &ObjectTierStore {
        &self.object
    }
}

// =============================================================================
// Tests
// =============================================================================
