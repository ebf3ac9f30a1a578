//! # Matching policies
//!
//! A [`Matcher`] is a pluggable equivalence policy between a *pattern* instance (an
//! already-registered canonical entity, or a query) and a *candidate* instance (a
//! freshly parsed local record). The registries scan their canonical entities with a
//! matcher to decide whether a new local record designates an already-known entity.
//!
//! Concrete policies are closed enums selected through explicit configuration at
//! construction time ([`crate::target::TargetMatcher`],
//! [`crate::instrument::InstrumentModeMatcher`],
//! [`crate::instrument::InstrumentNameMatcher`],
//! [`crate::granule::GranuleMatcher`]); no policy is probed from global state.
//!
//! Matchers treat unset optional fields as "don't care", never as mismatches.

/// Equivalence policy between a pattern and a candidate of the same type.
pub trait Matcher<K> {
    /// True if `candidate` designates the same real-world entity as `pattern`.
    fn matches(&self, pattern: &K, candidate: &K) -> bool;
}
