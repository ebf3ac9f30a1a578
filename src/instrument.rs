//! # Instrument modes and their matching policies
//!
//! An [`InstrumentMode`] is the immutable description of one instrument configuration:
//! name, channel count, wavelength range, resolving power, and minimum channel
//! bandwidth. Local modes are parsed from individual files and resolved onto canonical
//! globals by a [`crate::registry::InstrumentModeRegistry`].
//!
//! ## Matching
//!
//! Files written by different pipelines rarely agree on wavelength tables to the last
//! bit, so the fuzzy policy ([`InstrumentModeMatcher::ByWavelength`]) compares the
//! wavelength bounds within a *dynamic* tolerance: half the smaller of the two modes'
//! minimum channel bandwidths, clamped into
//! [`WAVELENGTH_TOL_MIN`](crate::constants::WAVELENGTH_TOL_MIN)..=[`WAVELENGTH_TOL_MAX`](crate::constants::WAVELENGTH_TOL_MAX).
//! Channel counts must agree exactly, and modes of multi-polarization instruments
//! (name starting with [`POLARIZATION_INSNAME_PREFIX`](crate::constants::POLARIZATION_INSNAME_PREFIX))
//! additionally require exact name equality: polarization channels share a wavelength
//! range but must never be merged.
//!
//! ## Hashing
//!
//! Modes are compared field-by-field, but they sit in hash sets and granule keys, so
//! the hash is computed once on first use and cached.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use once_cell::sync::OnceCell;

use crate::constants::{
    Meter, POLARIZATION_INSNAME_PREFIX, UNDEFINED_NAME, WAVELENGTH_TOL_MAX, WAVELENGTH_TOL_MIN,
};
use crate::granulite_errors::GranuliteError;
use crate::matcher::Matcher;
use crate::range::Range;
use crate::registry::RegistryEntity;
use crate::target::compare_ignore_ascii_case;

static UNDEFINED: LazyLock<Arc<InstrumentMode>> = LazyLock::new(|| {
    Arc::new(InstrumentMode {
        name: UNDEFINED_NAME.to_owned(),
        nb_channels: 0,
        wavelength: Range::zero(),
        resolving_power: ordered_float::NotNan::default(),
        min_channel_bandwidth: ordered_float::NotNan::default(),
        hash: OnceCell::new(),
    })
});

/// Immutable description of one instrument configuration.
#[derive(Debug, Clone)]
pub struct InstrumentMode {
    name: String,
    nb_channels: u32,
    /// Wavelength coverage `[min, max]` in meters.
    wavelength: Range,
    resolving_power: ordered_float::NotNan<f64>,
    /// Smallest channel bandwidth in meters; drives the fuzzy matching tolerance.
    min_channel_bandwidth: ordered_float::NotNan<f64>,
    hash: OnceCell<u64>,
}

impl InstrumentMode {
    /// Build an instrument mode.
    ///
    /// Arguments
    /// ---------
    /// * `name`: instrument setup name as parsed from the file
    /// * `nb_channels`: number of spectral channels
    /// * `wl_min`, `wl_max`: wavelength coverage in meters
    /// * `resolving_power`: spectral resolution λ/Δλ
    /// * `min_channel_bandwidth`: smallest channel bandwidth in meters
    ///
    /// Return
    /// ------
    /// * The mode, or [`GranuliteError`] if the name is empty, a value is NaN, or
    ///   `wl_min > wl_max`.
    pub fn new(
        name: impl Into<String>,
        nb_channels: u32,
        wl_min: Meter,
        wl_max: Meter,
        resolving_power: f64,
        min_channel_bandwidth: Meter,
    ) -> Result<Self, GranuliteError> {
        let name = name.into();
        if name.is_empty() {
            return Err(GranuliteError::EmptyEntityName);
        }
        Ok(InstrumentMode {
            name,
            nb_channels,
            wavelength: Range::new(wl_min, wl_max)?,
            resolving_power: ordered_float::NotNan::new(resolving_power)?,
            min_channel_bandwidth: ordered_float::NotNan::new(min_channel_bandwidth)?,
            hash: OnceCell::new(),
        })
    }

    /// The shared UNDEFINED sentinel, used when a file carries no instrument setup.
    pub fn undefined() -> Arc<InstrumentMode> {
        Arc::clone(&UNDEFINED)
    }

    pub fn is_undefined(&self) -> bool {
        self.name == UNDEFINED_NAME
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nb_channels(&self) -> u32 {
        self.nb_channels
    }

    /// Wavelength coverage in meters.
    pub fn wavelength(&self) -> &Range {
        &self.wavelength
    }

    pub fn resolving_power(&self) -> f64 {
        self.resolving_power.into_inner()
    }

    pub fn min_channel_bandwidth(&self) -> Meter {
        self.min_channel_bandwidth.into_inner()
    }

    fn cached_hash(&self) -> u64 {
        *self.hash.get_or_init(|| {
            let mut hasher = ahash::AHasher::default();
            self.name.hash(&mut hasher);
            self.nb_channels.hash(&mut hasher);
            self.wavelength.hash(&mut hasher);
            self.resolving_power.hash(&mut hasher);
            self.min_channel_bandwidth.hash(&mut hasher);
            hasher.finish()
        })
    }
}

impl PartialEq for InstrumentMode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.nb_channels == other.nb_channels
            && self.wavelength == other.wavelength
            && self.resolving_power == other.resolving_power
            && self.min_channel_bandwidth == other.min_channel_bandwidth
    }
}

impl Eq for InstrumentMode {}

impl Hash for InstrumentMode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.cached_hash());
    }
}

impl fmt::Display for InstrumentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} ch, {}, R={})",
            self.name, self.nb_channels, self.wavelength, self.resolving_power
        )
    }
}

impl RegistryEntity for InstrumentMode {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn clone_with_uid(&self, uid: &str) -> Self {
        InstrumentMode {
            name: uid.to_owned(),
            nb_channels: self.nb_channels,
            wavelength: self.wavelength,
            resolving_power: self.resolving_power,
            min_channel_bandwidth: self.min_channel_bandwidth,
            hash: OnceCell::new(),
        }
    }

    fn cmp_listing(&self, other: &Self) -> Ordering {
        compare_ignore_ascii_case(&self.name, &other.name)
            .then_with(|| self.nb_channels.cmp(&other.nb_channels))
            .then_with(|| self.resolving_power.cmp(&other.resolving_power))
    }
}

/// Instrument-mode matching policy, selected by configuration at registry construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InstrumentModeMatcher {
    /// Case-sensitive name equality.
    ByName,
    /// Wavelength bounds within the dynamic tolerance (see the module docs).
    ByWavelength,
}

impl Matcher<InstrumentMode> for InstrumentModeMatcher {
    fn matches(&self, pattern: &InstrumentMode, candidate: &InstrumentMode) -> bool {
        match self {
            InstrumentModeMatcher::ByName => pattern.name == candidate.name,
            InstrumentModeMatcher::ByWavelength => {
                if pattern.nb_channels != candidate.nb_channels {
                    return false;
                }
                // Polarization setups share a wavelength range: require the exact name.
                if (pattern.name.starts_with(POLARIZATION_INSNAME_PREFIX)
                    || candidate.name.starts_with(POLARIZATION_INSNAME_PREFIX))
                    && pattern.name != candidate.name
                {
                    return false;
                }
                let tolerance = (0.5
                    * pattern
                        .min_channel_bandwidth()
                        .min(candidate.min_channel_bandwidth()))
                .clamp(WAVELENGTH_TOL_MIN, WAVELENGTH_TOL_MAX);
                (pattern.wavelength().min() - candidate.wavelength().min()).abs() <= tolerance
                    && (pattern.wavelength().max() - candidate.wavelength().max()).abs() <= tolerance
            }
        }
    }
}

/// Standalone instrument-name policy: case-insensitive equality or prefix test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentNameMatcher {
    prefix: bool,
}

impl InstrumentNameMatcher {
    /// Case-insensitive full-name equality.
    pub fn exact() -> Self {
        InstrumentNameMatcher { prefix: false }
    }

    /// Case-insensitive prefix test (candidate starts with the pattern).
    pub fn prefix() -> Self {
        InstrumentNameMatcher { prefix: true }
    }
}

impl Matcher<String> for InstrumentNameMatcher {
    fn matches(&self, pattern: &String, candidate: &String) -> bool {
        if self.prefix {
            candidate
                .get(..pattern.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(pattern))
        } else {
            candidate.eq_ignore_ascii_case(pattern)
        }
    }
}
