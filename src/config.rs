//! # Matching configuration
//!
//! The matching behavior of the registries is fixed once per collection, at
//! construction time, through an explicit [`MatchingConfig`] value: exact-name vs
//! fuzzy matching per registry, and the separation threshold of the target distance
//! policy. Nothing is probed from the environment after construction.

use serde::{Deserialize, Serialize};

use crate::constants::{ArcSec, ARCSEC_IN_DEGREES};
use crate::granulite_errors::GranuliteError;
use crate::instrument::InstrumentModeMatcher;
use crate::target::TargetMatcher;

/// Per-collection matching policies, read once at registry construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Policy of the target registry.
    pub target_matching: TargetMatcher,
    /// Policy of the instrument-mode registry.
    pub mode_matching: InstrumentModeMatcher,
}

impl Default for MatchingConfig {
    /// Fuzzy matching everywhere: targets within 1 arcsecond, modes by wavelength.
    fn default() -> Self {
        MatchingConfig {
            target_matching: TargetMatcher::by_default_distance(),
            mode_matching: InstrumentModeMatcher::ByWavelength,
        }
    }
}

impl MatchingConfig {
    /// Deterministic configuration: exact display-name equality everywhere.
    pub fn exact_names() -> Self {
        MatchingConfig {
            target_matching: TargetMatcher::ByName,
            mode_matching: InstrumentModeMatcher::ByName,
        }
    }

    /// Fuzzy configuration with a custom target separation threshold.
    ///
    /// Arguments
    /// ---------
    /// * `arcsec`: separation threshold in arcseconds (finite, strictly positive)
    ///
    /// Return
    /// ------
    /// * The configuration, or [`GranuliteError::InvalidThreshold`].
    pub fn with_target_threshold(arcsec: ArcSec) -> Result<Self, GranuliteError> {
        if !arcsec.is_finite() || arcsec <= 0.0 {
            return Err(GranuliteError::InvalidThreshold(arcsec));
        }
        Ok(MatchingConfig {
            target_matching: TargetMatcher::ByDistance {
                threshold: arcsec * ARCSEC_IN_DEGREES,
            },
            mode_matching: InstrumentModeMatcher::ByWavelength,
        })
    }
}

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn test_default_is_fuzzy() {
        let config = MatchingConfig::default();
        assert!(matches!(
            config.target_matching,
            TargetMatcher::ByDistance { .. }
        ));
        assert_eq!(config.mode_matching, InstrumentModeMatcher::ByWavelength);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(MatchingConfig::with_target_threshold(2.0).is_ok());
        assert!(MatchingConfig::with_target_threshold(0.0).is_err());
        assert!(MatchingConfig::with_target_threshold(-1.0).is_err());
        assert!(MatchingConfig::with_target_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_exact_names_selects_the_name_policy() {
        let config = MatchingConfig::exact_names();
        assert_eq!(config.target_matching, TargetMatcher::ByName);
    }
}
