//! Routing Keys
//!
//! Derives and parses the storage keys handed out by the disk/object tier.
//! A generated key has the shape
//!
//! ```text
//! {prefix}{root}/{area}/{yyyy-mm-dd}/{uuid}/{filename}
//! ```
//!
//! where `root` is the configured storage root in local mode (empty for a
//! remote object store, whose bucket supplies the root) and `prefix` is a
//! short token identifying the backend that produced the key (omitted when
//! unset). The prefix is only ever part of the routing key, never of the
//! physical path: `resolve` strips exactly the prefix that `generate`
//! added, and nothing else.

use chrono::Utc;
use uuid::Uuid;

/// Area used when the caller does not supply one
pub const DEFAULT_AREA: &str = "default";

/// Generates and resolves routing keys for one backend
#[derive(Debug, Clone)]
pub struct KeyRouter {
    /// Storage root, empty when the backend supplies its own (bucket)
    root: String,
    /// Key prefix identifying the backend, `None` when unset or blank
    prefix: Option<String>,
}

impl KeyRouter {
    /// Create a router for one backend's root and key prefix.
    ///
    /// A blank prefix is treated as unset.
    pub fn new(root: impl Into<String>, prefix: Option<String>) -> Self {
        let prefix = prefix.filter(|p| !p.trim().is_empty());
        Self {
            root: root.into(),
            prefix,
        }
    }

    /// Generate a collision-resistant routing key for a file.
    ///
    /// An absent or blank `area` falls back to [`DEFAULT_AREA`]. The UUID
    /// segment keeps keys unique even for identical filename/area pairs.
    pub fn generate(&self, filename: &str, area: Option<&str>) -> String {
        let area = match area {
            Some(a) if !a.trim().is_empty() => a,
            _ => DEFAULT_AREA,
        };
        let date = Utc::now().format("%Y-%m-%d");
        let id = Uuid::new_v4();

        let path = if self.root.is_empty() {
            format!("{area}/{date}/{id}/{filename}")
        } else {
            format!("{}/{area}/{date}/{id}/{filename}", self.root)
        };

        match &self.prefix {
            Some(prefix) => format!("{prefix}{path}"),
            None => path,
        }
    }

    /// Derive a deterministic routing key, without the date and UUID
    /// segments.
    ///
    /// The same filename/area pair always yields the same key, so a later
    /// write for that pair overwrites instead of accumulating copies.
    pub fn pin(&self, filename: &str, area: &str) -> String {
        let area = if area.trim().is_empty() { DEFAULT_AREA } else { area };
        let path = if self.root.is_empty() {
            format!("{area}/{filename}")
        } else {
            format!("{}/{area}/{filename}", self.root)
        };

        match &self.prefix {
            Some(prefix) => format!("{prefix}{path}"),
            None => path,
        }
    }

    /// Resolve a routing key back to the backend-local physical path.
    ///
    /// Strips the configured prefix iff the key starts with it; keys
    /// without the prefix are returned unchanged.
    pub fn resolve<'a>(&self, key: &'a str) -> &'a str {
        match &self.prefix {
            Some(prefix) => key.strip_prefix(prefix.as_str()).unwrap_or(key),
            None => key,
        }
    }

    /// Configured key prefix, if any
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }
}

// =============================================================================
// Tests
// =============================================================================
