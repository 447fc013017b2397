//! Distributed Cache Tier
//!
//! Redis-shaped keyed put/get/delete service behind a pluggable async
//! backend trait. The store probes the backend exactly once at
//! construction; when the probe fails (or the connection descriptor is
//! malformed) every later call is a no-op or absent-return, never an
//! error surfaced to the facade.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::warn;

use crate::config::DistributedCacheConfig;
use crate::error::{Error, Result};
use crate::health::BackendHandle;

/// Backend name used in health handles and log lines
const BACKEND_NAME: &str = "distributed-cache";

/// Keyed byte store with absolute expiration (Redis-shaped)
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Lightweight connectivity check
    async fn ping(&self) -> Result<()>;

    /// Get a value
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Set a value with an optional absolute expiration
    async fn set(&self, key: &str, value: Bytes, expire_in: Option<Duration>) -> Result<()>;

    /// Remove a value, reporting whether it existed
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Reset the expiration of an existing key without touching the value
    async fn expire(&self, key: &str, expire_in: Duration) -> Result<bool>;

    /// Release the connection
    async fn close(&self) -> Result<()>;
}

struct KvEntry {
    data: Bytes,
    expires_at: Option<Instant>,
}

impl KvEntry {
    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|at| Instant::now() >= at)
            .unwrap_or(false)
    }
}

/// In-memory [`KvBackend`] for testing and client-less deployments
#[derive(Default)]
pub struct InMemoryKvBackend {
    entries: DashMap<String, KvEntry>,
}

impl InMemoryKvBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for InMemoryKvBackend {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if !entry.is_expired() {
                    return Ok(Some(entry.data.clone()));
                }
                true
            }
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Bytes, expire_in: Option<Duration>) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            KvEntry {
                data: value,
                expires_at: expire_in.map(|d| Instant::now() + d),
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn expire(&self, key: &str, expire_in: Duration) -> Result<bool> {
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.expires_at = Some(Instant::now() + expire_in);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Distributed cache tier store
pub struct DistributedCacheTierStore {
    backend: Option<Arc<dyn KvBackend>>,
    handle: BackendHandle,
}

impl DistributedCacheTierStore {
    /// Connect to the distributed cache.
    ///
    /// The descriptor is validated and the backend pinged exactly once; a
    /// malformed descriptor or failed ping marks the store unreachable for
    /// its lifetime instead of failing construction.
    pub async fn connect(
        config: &DistributedCacheConfig,
        backend: Option<Arc<dyn KvBackend>>,
    ) -> Self {
        let Some(backend) = backend else {
            return Self {
                backend: None,
                handle: BackendHandle::unreachable(BACKEND_NAME, "no backend configured"),
            };
        };

        if let Some(connection) = &config.connection {
            if let Err(e) = validate_descriptor(connection) {
                return Self {
                    backend: Some(backend),
                    handle: BackendHandle::unreachable(BACKEND_NAME, e),
                };
            }
        }

        let handle = BackendHandle::probe(BACKEND_NAME, || async { backend.ping().await }).await;
        Self {
            backend: Some(backend),
            handle,
        }
    }

    /// Whether the construction-time probe succeeded
    pub fn is_reachable(&self) -> bool {
        self.handle.is_reachable()
    }

    /// Get a value; absent when unreachable, missing, or errored
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        let backend = self.live_backend()?;
        match backend.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(backend = BACKEND_NAME, key, error = %e, "get failed, treating as absent");
                None
            }
        }
    }

    /// Put a value with an absolute expiration; no-op when unreachable
    pub async fn put(&self, key: &str, value: Bytes, expire_in: Duration) {
        let Some(backend) = self.live_backend() else {
            return;
        };
        if let Err(e) = backend.set(key, value, Some(expire_in)).await {
            warn!(backend = BACKEND_NAME, key, error = %e, "put failed, write dropped");
        }
    }

    /// Remove a value; no-op when unreachable or absent
    pub async fn remove(&self, key: &str) {
        let Some(backend) = self.live_backend() else {
            return;
        };
        if let Err(e) = backend.remove(key).await {
            warn!(backend = BACKEND_NAME, key, error = %e, "remove failed");
        }
    }

    /// Extend the expiration of a key without changing its value
    pub async fn refresh(&self, key: &str, window: Duration) {
        let Some(backend) = self.live_backend() else {
            return;
        };
        if let Err(e) = backend.expire(key, window).await {
            warn!(backend = BACKEND_NAME, key, error = %e, "refresh failed");
        }
    }

    /// Release the connection; safe when none was ever opened
    pub async fn close(&self) {
        if let Some(backend) = &self.backend {
            if let Err(e) = backend.close().await {
                warn!(backend = BACKEND_NAME, error = %e, "close failed");
            }
        }
    }

    fn live_backend(&self) -> Option<&Arc<dyn KvBackend>> {
        if !self.handle.is_reachable() {
            return None;
        }
        self.backend.as_ref()
    }
}

/// Validate a `host:port` connection descriptor.
fn validate_descriptor(descriptor: &str) -> Result<()> {
    let malformed = || {
        Error::Config(format!(
            "invalid connection descriptor '{descriptor}', expected host:port"
        ))
    };

    let (host, port) = descriptor.rsplit_once(':').ok_or_else(malformed)?;
    if host.trim().is_empty() || port.parse::<u16>().is_err() {
        return Err(malformed());
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct FailingKvBackend {
        ping_ok: bool,
    }

    #[async_trait]
    impl KvBackend for FailingKvBackend {
        async fn ping(&self) -> Result<()> {
            if self.ping_ok {
                return Ok(());
            }
            Err(Error::unreachable(BACKEND_NAME, "connection refused"))
        }
        async fn get(&self, _key: &str) -> Result<Option<Bytes>> {
            Err(Error::unreachable(BACKEND_NAME, "connection reset"))
        }
        async fn set(&self, _key: &str, _value: Bytes, _expire_in: Option<Duration>) -> Result<()> {
            Err(Error::unreachable(BACKEND_NAME, "connection reset"))
        }
        async fn remove(&self, _key: &str) -> Result<bool> {
            Err(Error::unreachable(BACKEND_NAME, "connection reset"))
        }
        async fn expire(&self, _key: &str, _expire_in: Duration) -> Result<bool> {
            Err(Error::unreachable(BACKEND_NAME, "connection reset"))
        }
        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    fn config(connection: Option<&str>) -> DistributedCacheConfig {
        DistributedCacheConfig {
            connection: connection.map(str::to_string),
        }
    }

    async fn reachable_store() -> DistributedCacheTierStore {
        DistributedCacheTierStore::connect(
            &config(Some("127.0.0.1:6379")),
            Some(Arc::new(InMemoryKvBackend::new())),
        )
        .await
    }

    #[test]
    fn test_descriptor_validation() {
        assert!(validate_descriptor("127.0.0.1:6379").is_ok());
        assert!(validate_descriptor("redis.internal:7000").is_ok());
        assert_matches!(validate_descriptor("no-port"), Err(Error::Config(_)));
        assert_matches!(validate_descriptor(":6379"), Err(Error::Config(_)));
        assert_matches!(validate_descriptor("host:notaport"), Err(Error::Config(_)));
        assert_matches!(validate_descriptor("host:99999"), Err(Error::Config(_)));
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = reachable_store().await;
        assert!(store.is_reachable());

        store
            .put("key", Bytes::from_static(b"value"), Duration::from_secs(30))
            .await;
        assert_eq!(store.get("key").await.unwrap().as_ref(), b"value");

        store.remove("key").await;
        store.remove("key").await; // idempotent
        assert!(store.get("key").await.is_none());
    }

    #[tokio::test]
    async fn test_absolute_expiration() {
        let store = reachable_store().await;
        let backend = store.backend.as_ref().unwrap();

        backend
            .set(
                "key",
                Bytes::from_static(b"value"),
                Some(Duration::from_millis(20)),
            )
            .await
            .unwrap();
        assert!(store.get("key").await.is_some());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(store.get("key").await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_extends_expiration() {
        let store = reachable_store().await;
        let backend = store.backend.as_ref().unwrap();

        backend
            .set(
                "key",
                Bytes::from_static(b"value"),
                Some(Duration::from_millis(20)),
            )
            .await
            .unwrap();
        store.refresh("key", Duration::from_secs(60)).await;

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(store.get("key").await.is_some());
    }

    #[tokio::test]
    async fn test_malformed_descriptor_marks_unreachable() {
        let store = DistributedCacheTierStore::connect(
            &config(Some("not a descriptor")),
            Some(Arc::new(InMemoryKvBackend::new())),
        )
        .await;

        assert!(!store.is_reachable());
        store
            .put("key", Bytes::from_static(b"value"), Duration::from_secs(30))
            .await;
        assert!(store.get("key").await.is_none());
    }

    #[tokio::test]
    async fn test_failed_probe_makes_all_calls_noops() {
        let store = DistributedCacheTierStore::connect(
            &config(Some("127.0.0.1:6379")),
            Some(Arc::new(FailingKvBackend { ping_ok: false })),
        )
        .await;

        assert!(!store.is_reachable());
        store
            .put("key", Bytes::from_static(b"value"), Duration::from_secs(30))
            .await;
        assert!(store.get("key").await.is_none());
        store.remove("key").await;
        store.refresh("key", Duration::from_secs(60)).await;
        store.close().await;
    }

    #[tokio::test]
    async fn test_runtime_errors_are_swallowed() {
        // Probe succeeds, every later call fails: failures are contained
        // to absent/no-op instead of propagating.
        let store = DistributedCacheTierStore::connect(
            &config(Some("127.0.0.1:6379")),
            Some(Arc::new(FailingKvBackend { ping_ok: true })),
        )
        .await;

        assert!(store.is_reachable());
        store
            .put("key", Bytes::from_static(b"value"), Duration::from_secs(30))
            .await;
        assert!(store.get("key").await.is_none());
        store.remove("key").await;
        store.refresh("key", Duration::from_secs(60)).await;
    }

    #[tokio::test]
    async fn test_unconfigured_backend() {
        let store = DistributedCacheTierStore::connect(&config(None), None).await;
        assert!(!store.is_reachable());
        assert!(store.get("key").await.is_none());
        store.close().await; // safe with no connection ever opened
    }
}
