//! Disk / Object-Store Tier
//!
//! Stores opaque objects either on the local filesystem (bucket name used
//! as the storage root directory) or in a remote object store behind a
//! pluggable async backend trait. The mode is fixed at construction: a
//! requested or auto-selected remote store has its bucket probed once,
//! and a failed probe permanently downgrades the store to local disk.
//!
//! Keys handed out by `put` are routing keys from [`KeyRouter`]; the
//! configured key prefix identifies this store as the producing backend
//! and is stripped before any physical path or bucket key is touched.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::{debug, warn};

use super::DEFAULT_CONTENT_TYPE;
use crate::config::ObjectStoreConfig;
use crate::error::{Error, Result};
use crate::health::BackendHandle;
use crate::placement::StorePlace;
use crate::router::KeyRouter;

/// Backend name used in health handles and log lines
const BACKEND_NAME: &str = "object-store";

/// Keyed object service (S3/MinIO-shaped)
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Whether the bucket exists and is reachable
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// Stream an object fully into memory
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Bytes>>;

    /// Upload an object with a content type
    async fn put(&self, bucket: &str, key: &str, data: Bytes, content_type: &str) -> Result<()>;

    /// Delete an object, reporting whether it existed
    async fn remove(&self, bucket: &str, key: &str) -> Result<bool>;
}

/// In-memory [`ObjectBackend`] for testing
#[derive(Default)]
pub struct InMemoryObjectBackend {
    buckets: DashMap<String, DashMap<String, Bytes>>,
}

impl InMemoryObjectBackend {
    /// Create an empty backend with no buckets
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend with one existing bucket
    pub fn with_bucket(bucket: impl Into<String>) -> Self {
        let backend = Self::new();
        backend.buckets.insert(bucket.into(), DashMap::new());
        backend
    }
}

#[async_trait]
impl ObjectBackend for InMemoryObjectBackend {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        Ok(self.buckets.contains_key(bucket))
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Bytes>> {
        Ok(self
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key).map(|data| data.clone())))
    }

    async fn put(&self, bucket: &str, key: &str, data: Bytes, _content_type: &str) -> Result<()> {
        let objects = self.buckets.entry(bucket.to_string()).or_default();
        objects.insert(key.to_string(), data);
        Ok(())
    }

    async fn remove(&self, bucket: &str, key: &str) -> Result<bool> {
        Ok(self
            .buckets
            .get(bucket)
            .map(|objects| objects.remove(key).is_some())
            .unwrap_or(false))
    }
}

/// Mode the store resolved to at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Local filesystem under the bucket-as-root directory
    Local,
    /// Remote object store
    Distributed,
}

/// Disk / object-store tier store
pub struct ObjectTierStore {
    mode: StoreMode,
    bucket: String,
    router: KeyRouter,
    backend: Option<Arc<dyn ObjectBackend>>,
}

impl ObjectTierStore {
    /// Open the store, resolving local-vs-remote mode.
    ///
    /// [`StorePlace::Local`] skips the backend entirely. Otherwise the
    /// bucket is probed once; a missing bucket, probe error, or absent
    /// backend downgrades the store to local disk for its lifetime.
    pub async fn open(config: &ObjectStoreConfig, backend: Option<Arc<dyn ObjectBackend>>) -> Self {
        let mode = Self::resolve_mode(config, backend.as_deref()).await;
        debug!(backend = BACKEND_NAME, mode = ?mode, bucket = %config.bucket, "object store opened");

        // Local mode embeds the bucket-as-root in the key; remote keys are
        // bucket-relative.
        let root = match mode {
            StoreMode::Local => config.bucket.as_str(),
            StoreMode::Distributed => "",
        };
        Self {
            mode,
            bucket: config.bucket.clone(),
            router: KeyRouter::new(root, config.key_prefix.clone()),
            backend,
        }
    }

    async fn resolve_mode(config: &ObjectStoreConfig, backend: Option<&dyn ObjectBackend>) -> StoreMode {
        if config.store_place == StorePlace::Local {
            return StoreMode::Local;
        }

        let Some(backend) = backend else {
            if config.store_place == StorePlace::Distributed {
                warn!(
                    backend = BACKEND_NAME,
                    "distributed store requested without a backend, using local disk"
                );
            }
            return StoreMode::Local;
        };

        let bucket = config.bucket.clone();
        let handle = BackendHandle::probe(BACKEND_NAME, || async move {
            match backend.bucket_exists(&bucket).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(Error::unreachable(BACKEND_NAME, "bucket not found")),
                Err(e) => Err(e),
            }
        })
        .await;

        if handle.is_reachable() {
            StoreMode::Distributed
        } else {
            StoreMode::Local
        }
    }

    /// Mode the store resolved to
    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    /// Key router for this store
    pub fn router(&self) -> &KeyRouter {
        &self.router
    }

    /// Store an object and return its routing key.
    ///
    /// Parent directories are created as needed in local mode.
    pub async fn put(
        &self,
        filename: &str,
        data: Bytes,
        area: Option<&str>,
        content_type: &str,
    ) -> Result<String> {
        let key = self.router.generate(filename, area);
        self.put_at(&key, data, content_type).await?;
        Ok(key)
    }

    /// Store an object at a caller-supplied routing key, overwriting any
    /// previous object at that key.
    pub async fn put_at(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let path = self.router.resolve(key);

        match self.mode {
            StoreMode::Local => {
                let path = Path::new(path);
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(path, &data).await?;
            }
            StoreMode::Distributed => {
                self.live_backend()?
                    .put(&self.bucket, path, data, content_type)
                    .await?;
            }
        }

        Ok(())
    }

    /// Deterministic routing key for a caller-named object; writes to it
    /// overwrite instead of accumulating copies.
    pub fn pinned_key(&self, filename: &str, area: &str) -> String {
        self.router.pin(filename, area)
    }

    /// Read an object fully into memory; absent when missing
    pub async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let path = self.router.resolve(key);

        match self.mode {
            StoreMode::Local => match tokio::fs::read(path).await {
                Ok(data) => Ok(Some(Bytes::from(data))),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            },
            StoreMode::Distributed => self.live_backend()?.get(&self.bucket, path).await,
        }
    }

    /// Delete an object; deleting an absent key is a no-op
    pub async fn remove(&self, key: &str) -> Result<()> {
        let path = self.router.resolve(key);

        match self.mode {
            StoreMode::Local => match tokio::fs::remove_file(path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
            StoreMode::Distributed => {
                self.live_backend()?.remove(&self.bucket, path).await?;
                Ok(())
            }
        }
    }

    /// Copy an object to a fresh routing key, implemented as put(get(src)).
    ///
    /// Absent source yields `None`.
    pub async fn copy(&self, src_key: &str, dst_filename: &str) -> Result<Option<String>> {
        match self.get(src_key).await? {
            Some(data) => {
                let key = self
                    .put(dst_filename, data, None, DEFAULT_CONTENT_TYPE)
                    .await?;
                Ok(Some(key))
            }
            None => {
                warn!(backend = BACKEND_NAME, src_key, "copy source missing");
                Ok(None)
            }
        }
    }

    fn live_backend(&self) -> Result<&Arc<dyn ObjectBackend>> {
        self.backend
            .as_ref()
            .ok_or_else(|| Error::unreachable(BACKEND_NAME, "no backend configured"))
    }
}

// =============================================================================
// Tests
// =============================================================================
