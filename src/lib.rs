//! HybridCache - Multi-Tier Cache/Storage Facade
//!
//! A hybrid cache that transparently places a keyed value into one of
//! several backing stores and retrieves it again without the caller
//! knowing which tier holds it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        HybridCache                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Memory Tier          │ Distributed Cache   │ Disk/Object Tier  │
//! │  ┌────────────────┐   │ ┌────────────────┐  │ ┌──────────────┐  │
//! │  │ Concurrent map │   │ │ KvBackend      │  │ │ Local FS or  │  │
//! │  │ capacity + TTL │   │ │ (Redis-shaped) │  │ │ ObjectBackend│  │
//! │  └────────────────┘   │ └────────────────┘  │ └──────────────┘  │
//! │         │             │         │           │        │          │
//! │         └─────────────┴─────────┴───────────┴────────┘          │
//! │                              │                                  │
//! │              Placement / Fallback Engine                        │
//! │   (priority + explicit-place hints, one-time health probes)     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads probe memory, then the distributed cache, then the object tier,
//! returning on first hit. Writes go through the single tier the placement
//! policy resolves; remote backends that fail their construction-time
//! probe are permanently degraded to a local fallback for the facade's
//! lifetime. No facade operation surfaces a backend failure to the
//! caller: absence and no-op are the only failure signals.
//!
//! # Modules
//!
//! - [`codec`] - Value encoding dispatch (bytes / UTF-8 / structured)
//! - [`config`] - Configuration surface
//! - [`error`] - Error types
//! - [`facade`] - The orchestrating `HybridCache`
//! - [`health`] - One-time backend reachability probes
//! - [`placement`] - Placement policy and tier unions
//! - [`router`] - Routing-key generation and resolution
//! - [`store`] - Tier stores and backend traits

pub mod codec;
pub mod config;
pub mod error;
pub mod facade;
pub mod health;
pub mod placement;
pub mod router;
pub mod store;

// Re-export commonly used types
pub use config::{
    DistributedCacheConfig, EntryOptions, HybridCacheConfig, MemoryCacheConfig, ObjectStoreConfig,
};
pub use error::{Error, Result};
pub use facade::{CacheStats, HybridCache, REFRESH_WINDOW};
pub use health::BackendHandle;
pub use placement::{CacheItemPriority, RequestedPlace, StorePlace, TierAssignment};
pub use router::KeyRouter;
pub use store::{
    DistributedCacheTierStore, InMemoryKvBackend, InMemoryObjectBackend, KvBackend,
    MemoryTierStore, ObjectBackend, ObjectTierStore, StoreMode,
};
