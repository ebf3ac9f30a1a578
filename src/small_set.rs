//! # Small-set membership matcher
//!
//! A [`SmallSetMatcher`] answers "is this id one of ours?" for the small id sets
//! produced by granule selection (e.g. the target ids kept by a query). The
//! singleton case — by far the most common — is a single scalar compare; larger
//! sets use an inline array and a linear scan, which beats hashing at these sizes.

use smallvec::SmallVec;

/// Membership test over a small set of numeric ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmallSetMatcher<T> {
    /// Empty set: matches nothing.
    Empty,
    /// Singleton fast path: one scalar compare.
    Single(T),
    /// Small deduplicated array, scanned linearly.
    Set(SmallVec<[T; 8]>),
}

impl<T: Copy + PartialEq> SmallSetMatcher<T> {
    /// Build a matcher from a list of ids (duplicates are dropped).
    pub fn new(ids: &[T]) -> Self {
        let mut distinct: SmallVec<[T; 8]> = SmallVec::new();
        for &id in ids {
            if !distinct.contains(&id) {
                distinct.push(id);
            }
        }
        match distinct.as_slice() {
            [] => SmallSetMatcher::Empty,
            [only] => SmallSetMatcher::Single(*only),
            _ => SmallSetMatcher::Set(distinct),
        }
    }

    /// True if `id` belongs to the set.
    pub fn matches(&self, id: T) -> bool {
        match self {
            SmallSetMatcher::Empty => false,
            SmallSetMatcher::Single(only) => *only == id,
            SmallSetMatcher::Set(ids) => ids.contains(&id),
        }
    }

    /// True if **every** id of `ids` belongs to the set.
    pub fn matches_all(&self, ids: &[T]) -> bool {
        ids.iter().all(|&id| self.matches(id))
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        match self {
            SmallSetMatcher::Empty => 0,
            SmallSetMatcher::Single(_) => 1,
            SmallSetMatcher::Set(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SmallSetMatcher::Empty)
    }
}
