//! # Granules and granule filtering
//!
//! A [`Granule`] is the logical grouping key of observations: one (global target,
//! global instrument mode, observing night) combination, optionally annotated with
//! the coverage actually observed within the group — distinct station names, MJD
//! sub-ranges, and wavelength sub-ranges accumulated while scanning files.
//!
//! Coverage annotations record *incidental* facts, not identity: granule equality and
//! hashing use only the three primary references.
//!
//! ## Filtering
//!
//! A query is compiled once into a [`GranuleMatcher`] carrying the desired MJD and
//! wavelength windows, then applied against many candidate granules; building the
//! range filter once amortizes its cost across a whole granule population. The shared
//! [`GranuleMatcher::like`] singleton serves queries with no range filter.
//!
//! Both the plain "like" comparison and the range filter consult the same candidate
//! coverage accessors: the accumulated MJD range set, and the accumulated wavelength
//! range set with fallback to the instrument mode's nominal wavelength range.
//!
//! ## Summaries
//!
//! [`sorted_distinct_field`] extracts one key field across a granule collection into
//! a deduplicated sorted listing, for per-axis navigation summaries.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use ahash::RandomState;
use itertools::Itertools;
use smallvec::SmallVec;

use crate::instrument::InstrumentMode;
use crate::matcher::Matcher;
use crate::night::NightId;
use crate::range::Range;
use crate::registry::RegistryEntity;
use crate::target::Target;

/// Set of distinct coverage ranges attached to a granule.
pub type RangeSet = HashSet<Range, RandomState>;

/// Set of distinct station names attached to a granule.
pub type StationSet = HashSet<String, RandomState>;

static LIKE_MATCHER: LazyLock<GranuleMatcher> = LazyLock::new(GranuleMatcher::default);

/// Grouping key (target, instrument mode, night) plus optional coverage annotations.
#[derive(Debug, Clone, Default)]
pub struct Granule {
    target: Option<Arc<Target>>,
    ins_mode: Option<Arc<InstrumentMode>>,
    night: Option<Arc<NightId>>,
    stations: StationSet,
    mjd_ranges: RangeSet,
    wavelength_ranges: RangeSet,
}

impl Granule {
    /// Build a granule key from its primary references (each possibly unset).
    pub fn new(
        target: Option<Arc<Target>>,
        ins_mode: Option<Arc<InstrumentMode>>,
        night: Option<Arc<NightId>>,
    ) -> Self {
        Granule {
            target,
            ins_mode,
            night,
            ..Granule::default()
        }
    }

    pub fn target(&self) -> Option<&Arc<Target>> {
        self.target.as_ref()
    }

    pub fn instrument_mode(&self) -> Option<&Arc<InstrumentMode>> {
        self.ins_mode.as_ref()
    }

    pub fn night(&self) -> Option<&Arc<NightId>> {
        self.night.as_ref()
    }

    /// Record a station name observed within this group.
    pub fn add_station(&mut self, name: impl Into<String>) {
        self.stations.insert(name.into());
    }

    /// Record an MJD sub-range observed within this group.
    pub fn add_mjd_range(&mut self, range: Range) {
        self.mjd_ranges.insert(range);
    }

    /// Record a wavelength sub-range observed within this group.
    pub fn add_wavelength_range(&mut self, range: Range) {
        self.wavelength_ranges.insert(range);
    }

    pub fn stations(&self) -> &StationSet {
        &self.stations
    }

    pub fn mjd_ranges(&self) -> &RangeSet {
        &self.mjd_ranges
    }

    pub fn wavelength_ranges(&self) -> &RangeSet {
        &self.wavelength_ranges
    }

    /// True iff all primary fields are unset and no coverage was accumulated.
    pub fn is_empty(&self) -> bool {
        self.target.is_none()
            && self.ins_mode.is_none()
            && self.night.is_none()
            && self.stations.is_empty()
            && self.mjd_ranges.is_empty()
            && self.wavelength_ranges.is_empty()
    }

    /// Wavelength coverage consulted by the matchers: the accumulated sub-ranges, or
    /// the instrument mode's nominal range when none were accumulated.
    fn wavelength_coverage(&self) -> SmallVec<[Range; 2]> {
        if !self.wavelength_ranges.is_empty() {
            self.wavelength_ranges.iter().copied().collect()
        } else if let Some(mode) = &self.ins_mode {
            smallvec::smallvec![*mode.wavelength()]
        } else {
            SmallVec::new()
        }
    }
}

/// Equality over the three primary references only; coverage is incidental.
impl PartialEq for Granule {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.ins_mode == other.ins_mode
            && self.night == other.night
    }
}

impl Eq for Granule {}

impl Hash for Granule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
        self.ins_mode.hash(state);
        self.night.hash(state);
    }
}

impl fmt::Display for Granule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Granule(target: {}, mode: {}, night: {})",
            self.target.as_deref().map_or("-", Target::name),
            self.ins_mode.as_deref().map_or("-", InstrumentMode::name),
            self.night
                .as_deref()
                .map_or_else(|| "-".to_owned(), NightId::to_string),
        )
    }
}

/// A field is compared only when both sides carry it.
fn optional_eq<T: PartialEq>(a: Option<&T>, b: Option<&T>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}

fn range_sets_overlap<'a>(
    a: impl IntoIterator<Item = &'a Range>,
    b: &RangeSet,
) -> bool {
    a.into_iter().any(|range| range.overlaps_any(b.iter()))
}

/// Reusable granule filter: optional-field equality plus prebuilt range windows.
///
/// `matches(pattern, candidate)` first applies the lenient field comparison (a field
/// is compared only when set on both sides; station sets must share a name, declared
/// range sets must overlap), then tests the matcher's own configured windows against
/// the candidate's actual coverage. The directional design lets one matcher built per
/// query be compared against many candidates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GranuleMatcher {
    mjd_ranges: Vec<Range>,
    wavelength_ranges: Vec<Range>,
}

impl GranuleMatcher {
    /// The shared no-filter matcher: pure optional-field ("like") comparison.
    pub fn like() -> &'static GranuleMatcher {
        &LIKE_MATCHER
    }

    /// Build a matcher carrying a query's desired MJD and wavelength windows.
    ///
    /// Returns the shared [`like`](GranuleMatcher::like) instance when both windows
    /// are empty, avoiding a per-query allocation.
    pub fn with_ranges(
        mjd_ranges: Vec<Range>,
        wavelength_ranges: Vec<Range>,
    ) -> std::borrow::Cow<'static, GranuleMatcher> {
        if mjd_ranges.is_empty() && wavelength_ranges.is_empty() {
            std::borrow::Cow::Borrowed(GranuleMatcher::like())
        } else {
            std::borrow::Cow::Owned(GranuleMatcher {
                mjd_ranges,
                wavelength_ranges,
            })
        }
    }

    pub fn mjd_ranges(&self) -> &[Range] {
        &self.mjd_ranges
    }

    pub fn wavelength_ranges(&self) -> &[Range] {
        &self.wavelength_ranges
    }

    /// The lenient field comparison shared by all granule matching paths.
    fn like_match(pattern: &Granule, candidate: &Granule) -> bool {
        if !(optional_eq(pattern.target(), candidate.target())
            && optional_eq(pattern.instrument_mode(), candidate.instrument_mode())
            && optional_eq(pattern.night(), candidate.night()))
        {
            return false;
        }
        // Both sides declare stations: they must share at least one.
        if !pattern.stations.is_empty()
            && !candidate.stations.is_empty()
            && pattern.stations.is_disjoint(&candidate.stations)
        {
            return false;
        }
        // Both sides declare MJD coverage: at least one pair must overlap.
        if !pattern.mjd_ranges.is_empty()
            && !candidate.mjd_ranges.is_empty()
            && !range_sets_overlap(pattern.mjd_ranges.iter(), &candidate.mjd_ranges)
        {
            return false;
        }
        // The pattern declares wavelength windows: the candidate's coverage must
        // overlap them, when the candidate has any.
        if !pattern.wavelength_ranges.is_empty() {
            let coverage = candidate.wavelength_coverage();
            if !coverage.is_empty()
                && !coverage
                    .iter()
                    .any(|range| range.overlaps_any(pattern.wavelength_ranges.iter()))
            {
                return false;
            }
        }
        true
    }
}

impl Matcher<Granule> for GranuleMatcher {
    fn matches(&self, pattern: &Granule, candidate: &Granule) -> bool {
        if !Self::like_match(pattern, candidate) {
            return false;
        }
        // Query windows against the candidate's actual coverage.
        if !self.mjd_ranges.is_empty() && !candidate.mjd_ranges.is_empty() {
            let hit = self
                .mjd_ranges
                .iter()
                .any(|window| window.overlaps_any(candidate.mjd_ranges.iter()));
            if !hit {
                return false;
            }
        }
        if !self.wavelength_ranges.is_empty() {
            let coverage = candidate.wavelength_coverage();
            if !coverage.is_empty() {
                let hit = self
                    .wavelength_ranges
                    .iter()
                    .any(|window| window.overlaps_any(coverage.iter()));
                if !hit {
                    return false;
                }
            }
        }
        true
    }
}

/// One key field of a granule, for per-axis summary extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GranuleField {
    Target,
    InstrumentMode,
    Night,
}

/// Sorted distinct values of one granule field across a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum GranuleFieldValues {
    Targets(Vec<Arc<Target>>),
    InstrumentModes(Vec<Arc<InstrumentMode>>),
    Nights(Vec<Arc<NightId>>),
}

/// Distinct targets across a granule collection, in listing order.
pub fn sorted_distinct_targets<'a>(
    granules: impl IntoIterator<Item = &'a Granule>,
) -> Vec<Arc<Target>> {
    granules
        .into_iter()
        .filter_map(|granule| granule.target().cloned())
        .unique()
        .sorted_by(|a, b| a.cmp_listing(b))
        .collect()
}

/// Distinct instrument modes across a granule collection, in listing order.
pub fn sorted_distinct_instrument_modes<'a>(
    granules: impl IntoIterator<Item = &'a Granule>,
) -> Vec<Arc<InstrumentMode>> {
    granules
        .into_iter()
        .filter_map(|granule| granule.instrument_mode().cloned())
        .unique()
        .sorted_by(|a, b| a.cmp_listing(b))
        .collect()
}

/// Distinct nights across a granule collection, ascending.
pub fn sorted_distinct_nights<'a>(
    granules: impl IntoIterator<Item = &'a Granule>,
) -> Vec<Arc<NightId>> {
    granules
        .into_iter()
        .filter_map(|granule| granule.night().cloned())
        .unique()
        .sorted()
        .collect()
}

/// Extract one key field across a granule collection into a deduplicated sorted
/// listing.
pub fn sorted_distinct_field<'a>(
    granules: impl IntoIterator<Item = &'a Granule>,
    field: GranuleField,
) -> GranuleFieldValues {
    match field {
        GranuleField::Target => GranuleFieldValues::Targets(sorted_distinct_targets(granules)),
        GranuleField::InstrumentMode => {
            GranuleFieldValues::InstrumentModes(sorted_distinct_instrument_modes(granules))
        }
        GranuleField::Night => GranuleFieldValues::Nights(sorted_distinct_nights(granules)),
    }
}
