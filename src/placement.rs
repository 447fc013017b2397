//! Placement Policy
//!
//! Decides which tier holds a value at write time from its priority and
//! explicit-place hints. The rule table is static, O(1), and side-effect
//! free: no size or load inputs factor into the decision.
//!
//! Requested and resolved placements are separate closed unions, so an
//! unresolved [`RequestedPlace::Auto`] can never leak into a
//! [`TierAssignment`].

use serde::{Deserialize, Serialize};

use crate::config::EntryOptions;

/// Priority hint for a cache entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheItemPriority {
    /// Evictable before normal entries
    Low,
    /// Default priority
    #[default]
    Normal,
    /// Kept in the in-process tier
    High,
    /// Never removed by capacity pressure
    NeverRemove,
}

/// Placement requested by the caller for a cache entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestedPlace {
    /// Let the placement policy choose
    #[default]
    Auto,
    /// Force the in-process memory tier
    Memory,
    /// Force the distributed cache tier
    Distributed,
}

/// Resolved tier assignment for a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierAssignment {
    /// In-process memory tier
    Memory,
    /// Distributed cache tier
    Distributed,
    /// Local disk via the object tier
    Local,
}

impl std::fmt::Display for TierAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TierAssignment::Memory => write!(f, "memory"),
            TierAssignment::Distributed => write!(f, "distributed"),
            TierAssignment::Local => write!(f, "local"),
        }
    }
}

/// Store-place override for the object tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorePlace {
    /// Probe the remote object store and fall back to local disk
    #[default]
    Auto,
    /// Always the local filesystem
    Local,
    /// Always the remote object store (downgrades to local if unreachable)
    Distributed,
}

/// Decide which tier should hold a value.
///
/// Evaluated in this exact order, first match wins:
/// 1. a non-auto explicit place is returned verbatim,
/// 2. an absent value goes to memory,
/// 3. high-priority values go to memory,
/// 4. everything else goes to the distributed tier.
pub fn decide(value_present: bool, options: &EntryOptions) -> TierAssignment {
    match options.place {
        RequestedPlace::Memory => return TierAssignment::Memory,
        RequestedPlace::Distributed => return TierAssignment::Distributed,
        RequestedPlace::Auto => {}
    }

    if !value_present || options.priority == CacheItemPriority::High {
        return TierAssignment::Memory;
    }

    TierAssignment::Distributed
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn options(priority: CacheItemPriority, place: RequestedPlace) -> EntryOptions {
        EntryOptions {
            priority,
            place,
            ..Default::default()
        }
    }

    #[test]
    fn test_explicit_place_overrides_priority() {
        // explicit place wins regardless of priority or value presence
        for priority in [
            CacheItemPriority::Low,
            CacheItemPriority::Normal,
            CacheItemPriority::High,
            CacheItemPriority::NeverRemove,
        ] {
            for present in [true, false] {
                assert_eq!(
                    decide(present, &options(priority, RequestedPlace::Memory)),
                    TierAssignment::Memory
                );
                assert_eq!(
                    decide(present, &options(priority, RequestedPlace::Distributed)),
                    TierAssignment::Distributed
                );
            }
        }
    }

    #[test]
    fn test_absent_value_goes_to_memory() {
        // an absent value is always placed in memory under auto placement
        for priority in [
            CacheItemPriority::Low,
            CacheItemPriority::Normal,
            CacheItemPriority::High,
            CacheItemPriority::NeverRemove,
        ] {
            assert_eq!(
                decide(false, &options(priority, RequestedPlace::Auto)),
                TierAssignment::Memory
            );
        }
    }

    #[test]
    fn test_priority_routing() {
        // high priority stays in memory, everything else is distributed
        assert_eq!(
            decide(true, &options(CacheItemPriority::High, RequestedPlace::Auto)),
            TierAssignment::Memory
        );
        assert_eq!(
            decide(true, &options(CacheItemPriority::Normal, RequestedPlace::Auto)),
            TierAssignment::Distributed
        );
        assert_eq!(
            decide(true, &options(CacheItemPriority::Low, RequestedPlace::Auto)),
            TierAssignment::Distributed
        );
        assert_eq!(
            decide(
                true,
                &options(CacheItemPriority::NeverRemove, RequestedPlace::Auto)
            ),
            TierAssignment::Distributed
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(CacheItemPriority::default(), CacheItemPriority::Normal);
        assert_eq!(RequestedPlace::default(), RequestedPlace::Auto);
        assert_eq!(StorePlace::default(), StorePlace::Auto);
    }

    #[test]
    fn test_tier_assignment_display() {
        assert_eq!(format!("{}", TierAssignment::Memory), "memory");
        assert_eq!(format!("{}", TierAssignment::Distributed), "distributed");
        assert_eq!(format!("{}", TierAssignment::Local), "local");
    }
}
