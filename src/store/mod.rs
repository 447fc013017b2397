//! Tier Stores
//!
//! One store per physical tier, all exposing the same capability surface
//! over get/put/remove. Remote tiers sit behind pluggable async backend
//! traits with in-memory implementations for testing and for callers that
//! do not wire a real client.

mod distributed;
mod memory;
mod object;

pub use distributed::{DistributedCacheTierStore, InMemoryKvBackend, KvBackend};
pub use memory::MemoryTierStore;
pub use object::{InMemoryObjectBackend, ObjectBackend, ObjectTierStore, StoreMode};

/// Content type used when the caller does not supply one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
