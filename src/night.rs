//! # Observing nights
//!
//! A [`NightId`] is the immutable identity of one observing night: a single integer,
//! the rounded Modified Julian Date supplied by external analysis. Equal nights share
//! one instance through a [`NightIdCache`] owned by the collection being processed, so
//! night comparisons inside granules reduce to cheap integer (or pointer) comparisons.
//!
//! The cache is an explicit per-collection object, not process-wide state: two
//! independent collections can be processed in parallel with their own caches.
//! Cached instances must never be mutated in place (they are shared via [`Arc`]).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

/// Identity of one observing night (rounded MJD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NightId {
    mjd: i64,
}

impl NightId {
    fn new(mjd: i64) -> Self {
        NightId { mjd }
    }

    /// The rounded MJD of this night.
    pub fn mjd(&self) -> i64 {
        self.mjd
    }
}

impl fmt::Display for NightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mjd)
    }
}

/// Interning cache mapping rounded MJD values to shared [`NightId`] instances.
#[derive(Debug, Clone, Default)]
pub struct NightIdCache {
    nights: HashMap<i64, Arc<NightId>, RandomState>,
}

impl NightIdCache {
    pub fn new() -> Self {
        NightIdCache {
            nights: HashMap::default(),
        }
    }

    /// Get the shared [`NightId`] for a rounded MJD, creating it on first sight.
    ///
    /// Arguments
    /// ---------
    /// * `mjd`: the externally rounded MJD of the night
    ///
    /// Return
    /// ------
    /// * The interned instance; equal inputs return the same `Arc`.
    pub fn intern(&mut self, mjd: i64) -> Arc<NightId> {
        Arc::clone(
            self.nights
                .entry(mjd)
                .or_insert_with(|| Arc::new(NightId::new(mjd))),
        )
    }

    pub fn len(&self) -> usize {
        self.nights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nights.is_empty()
    }

    pub fn clear(&mut self) {
        self.nights.clear();
    }
}

#[cfg(test)]
mod night_test {
    use super::*;

    #[test]
    fn test_interning_shares_instances() {
        let mut cache = NightIdCache::new();
        let a = cache.intern(59215);
        let b = cache.intern(59215);
        let c = cache.intern(59216);

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(a.mjd(), 59215);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_night_ordering_and_display() {
        let mut cache = NightIdCache::new();
        let a = cache.intern(59215);
        let b = cache.intern(59216);
        assert!(a < b);
        assert_eq!(a.to_string(), "59215");
    }

    #[test]
    fn test_clear() {
        let mut cache = NightIdCache::new();
        cache.intern(59215);
        cache.clear();
        assert!(cache.is_empty());
    }
}
