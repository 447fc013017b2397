//! Configuration surface for the hybrid cache
//!
//! All structs are `Default`-able and serde-deserializable so a facade can
//! be built from a plain config file or entirely from defaults. A malformed
//! remote descriptor never fails construction; the affected backend is
//! marked unreachable instead and the facade degrades to its local tiers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::placement::{CacheItemPriority, RequestedPlace, StorePlace};

/// Default absolute expiration for distributed writes (seconds)
pub const DEFAULT_ABSOLUTE_EXPIRATION_SECS: u64 = 30;

/// Top-level configuration for [`HybridCache`](crate::HybridCache)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridCacheConfig {
    /// In-process memory tier
    pub memory: MemoryCacheConfig,
    /// Distributed key-value cache tier
    pub distributed: DistributedCacheConfig,
    /// Disk / object-store tier
    pub object_store: ObjectStoreConfig,
}

/// In-process memory tier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryCacheConfig {
    /// Maximum number of entries held in memory
    pub size_limit: u64,
    /// Time since write after which an entry expires (seconds)
    pub expire_after_write_secs: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            size_limit: 10_000,
            expire_after_write_secs: 600,
        }
    }
}

impl MemoryCacheConfig {
    /// Expire-after-write as a [`Duration`]
    pub fn expire_after_write(&self) -> Duration {
        Duration::from_secs(self.expire_after_write_secs)
    }
}

/// Distributed cache connection descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributedCacheConfig {
    /// `host:port` descriptor of the remote cache, `None` when not configured
    pub connection: Option<String>,
}

/// Object-store connection descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectStoreConfig {
    /// Remote endpoint URL, `None` when only local disk is wanted
    pub endpoint: Option<String>,
    /// Storage region
    pub region: String,
    /// Access credential
    pub auth: Option<String>,
    /// Secret credential
    pub secret: Option<String>,
    /// Bucket name; doubles as the storage root directory in local mode
    pub bucket: String,
    /// Prefix prepended to every routing key this store hands out
    pub key_prefix: Option<String>,
    /// Store-place override
    pub store_place: StorePlace,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: "us-east-1".to_string(),
            auth: None,
            secret: None,
            bucket: "hybridcache".to_string(),
            key_prefix: None,
            store_place: StorePlace::Auto,
        }
    }
}

/// Per-entry write options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryOptions {
    /// Priority hint
    pub priority: CacheItemPriority,
    /// Explicit placement, [`RequestedPlace::Auto`] by default
    pub place: RequestedPlace,
    /// Absolute expiration in seconds for distributed writes,
    /// [`DEFAULT_ABSOLUTE_EXPIRATION_SECS`] when unset
    pub absolute_expiration_secs: Option<u64>,
}

impl EntryOptions {
    /// Set the priority hint
    pub fn priority(mut self, priority: CacheItemPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the explicit placement
    pub fn place(mut self, place: RequestedPlace) -> Self {
        self.place = place;
        self
    }

    /// Set the absolute expiration in seconds
    pub fn absolute_expiration_secs(mut self, secs: u64) -> Self {
        self.absolute_expiration_secs = Some(secs);
        self
    }

    /// Absolute expiration as a [`Duration`], falling back to the default
    pub fn absolute_expiration(&self) -> Duration {
        Duration::from_secs(
            self.absolute_expiration_secs
                .unwrap_or(DEFAULT_ABSOLUTE_EXPIRATION_SECS),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
