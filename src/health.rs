//! Backend Reachability
//!
//! One-time connectivity probes for remote backends. A handle carries the
//! probe outcome for the lifetime of the store that owns it: once a backend
//! is marked unreachable at construction, the facade uses its local
//! fallback for that backend until torn down. There is no periodic
//! re-probe; callers wanting recovery must rebuild the facade (or swap in
//! a freshly probed handle from outside).

use std::future::Future;

use tracing::{debug, warn};

use crate::error::Result;

/// Reachability of one remote backend, fixed at construction time
#[derive(Debug, Clone)]
pub struct BackendHandle {
    backend: String,
    reachable: bool,
}

impl BackendHandle {
    /// Probe a backend with a lightweight connectivity check.
    ///
    /// Any error from the check marks the backend unreachable; it is never
    /// propagated.
    pub async fn probe<F, Fut>(backend: impl Into<String>, check: F) -> Self
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let backend = backend.into();
        match check().await {
            Ok(()) => {
                debug!(backend = %backend, "backend reachable");
                Self {
                    backend,
                    reachable: true,
                }
            }
            Err(e) => {
                warn!(backend = %backend, error = %e, "backend unreachable, degrading to local fallback");
                Self {
                    backend,
                    reachable: false,
                }
            }
        }
    }

    /// Handle for a backend that was never probed because it is not
    /// configured or its descriptor is malformed.
    pub fn unreachable(backend: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        let backend = backend.into();
        warn!(backend = %backend, reason = %reason, "backend disabled");
        Self {
            backend,
            reachable: false,
        }
    }

    /// Whether the backend answered the construction-time probe
    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    /// Backend name
    pub fn backend(&self) -> &str {
        &self.backend
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_probe_success() {
        let handle = BackendHandle::probe("redis", || async { Ok(()) }).await;
        assert!(handle.is_reachable());
        assert_eq!(handle.backend(), "redis");
    }

    #[tokio::test]
    async fn test_probe_failure_is_contained() {
        let handle = BackendHandle::probe("redis", || async {
            Err(Error::unreachable("redis", "connection refused"))
        })
        .await;
        assert!(!handle.is_reachable());
    }

    #[test]
    fn test_unreachable_without_probe() {
        let handle = BackendHandle::unreachable("minio", "no endpoint configured");
        assert!(!handle.is_reachable());
        assert_eq!(handle.backend(), "minio");
    }
}
