//! # Targets and the angular-distance matching policy
//!
//! A [`Target`] is an astronomical source as seen by this engine: a display name and
//! epoch coordinates (RA/Dec, degrees). Local targets are parsed from individual files
//! and resolved onto canonical globals by a [`crate::registry::TargetRegistry`]; this
//! module supplies the value type and its matching policies.
//!
//! ## Separation
//!
//! The great-circle separation between two targets is computed from unit vectors with
//! the `atan2(|u × v|, u · v)` formulation, which stays accurate for both very small
//! and near-antipodal separations.
//!
//! ## Matching
//!
//! [`TargetMatcher`] is the closed set of target matching policies:
//! - `ByName`: case-sensitive display-name equality (deterministic fallback mode),
//! - `ByDistance`: separation within a configurable threshold (default 1 arcsecond),
//!   inclusive at the boundary and symmetric in its arguments.

use std::cmp::Ordering;
use std::fmt;

use nalgebra::Vector3;
use ordered_float::NotNan;

use crate::constants::{Degree, Radian, ARCSEC_IN_DEGREES, SAME_TARGET_DISTANCE};
use crate::granulite_errors::GranuliteError;
use crate::matcher::Matcher;
use crate::registry::RegistryEntity;

/// An astronomical source: display name and epoch coordinates in degrees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    name: String,
    ra: NotNan<f64>,
    dec: NotNan<f64>,
}

impl Target {
    /// Build a target from its name and epoch coordinates.
    ///
    /// Arguments
    /// ---------
    /// * `name`: display name as parsed from the file
    /// * `ra`: right ascension in degrees
    /// * `dec`: declination in degrees
    ///
    /// Return
    /// ------
    /// * The target, or [`GranuliteError`] if the name is empty or a coordinate is NaN.
    pub fn new(name: impl Into<String>, ra: Degree, dec: Degree) -> Result<Self, GranuliteError> {
        let name = name.into();
        if name.is_empty() {
            return Err(GranuliteError::EmptyEntityName);
        }
        Ok(Target {
            name,
            ra: NotNan::new(ra)?,
            dec: NotNan::new(dec)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Right ascension in degrees.
    pub fn ra(&self) -> Degree {
        self.ra.into_inner()
    }

    /// Declination in degrees.
    pub fn dec(&self) -> Degree {
        self.dec.into_inner()
    }

    /// Great-circle separation to another target, in degrees.
    ///
    /// Symmetric; numerically stable down to sub-milliarcsecond separations.
    pub fn separation(&self, other: &Target) -> Degree {
        let u = radec_unit_vector(self.ra().to_radians(), self.dec().to_radians());
        let v = radec_unit_vector(other.ra().to_radians(), other.dec().to_radians());
        u.cross(&v).norm().atan2(u.dot(&v)).to_degrees()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.ra, self.dec)
    }
}

impl RegistryEntity for Target {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn clone_with_uid(&self, uid: &str) -> Self {
        Target {
            name: uid.to_owned(),
            ra: self.ra,
            dec: self.dec,
        }
    }

    fn cmp_listing(&self, other: &Self) -> Ordering {
        compare_ignore_ascii_case(&self.name, &other.name)
    }
}

/// Case-insensitive (ASCII) name ordering used by the global listings.
pub(crate) fn compare_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// Unit vector of an (RA, Dec) direction given in radians.
fn radec_unit_vector(ra: Radian, dec: Radian) -> Vector3<f64> {
    let (sin_ra, cos_ra) = ra.sin_cos();
    let (sin_dec, cos_dec) = dec.sin_cos();
    Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
}

/// Target matching policy, selected by configuration at registry construction.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TargetMatcher {
    /// Case-sensitive display-name equality.
    ByName,
    /// Great-circle separation within `threshold` degrees (inclusive).
    ByDistance { threshold: Degree },
}

impl TargetMatcher {
    /// The default fuzzy policy: separation within [`SAME_TARGET_DISTANCE`] arcseconds.
    pub fn by_default_distance() -> Self {
        TargetMatcher::ByDistance {
            threshold: SAME_TARGET_DISTANCE * ARCSEC_IN_DEGREES,
        }
    }
}

impl Matcher<Target> for TargetMatcher {
    fn matches(&self, pattern: &Target, candidate: &Target) -> bool {
        match self {
            TargetMatcher::ByName => pattern.name == candidate.name,
            TargetMatcher::ByDistance { threshold } => {
                pattern.separation(candidate) <= *threshold
            }
        }
    }
}

#[cfg(test)]
mod target_test {
    use approx::assert_relative_eq;

    use super::*;

    fn target(name: &str, ra: Degree, dec: Degree) -> Target {
        Target::new(name, ra, dec).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_inputs() {
        assert!(Target::new("", 0.0, 0.0).is_err());
        assert!(Target::new("X", f64::NAN, 0.0).is_err());
        assert!(Target::new("X", 0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_separation() {
        let a = target("A", 0.0, 0.0);
        let b = target("B", 0.0, 1.0);
        assert_relative_eq!(a.separation(&b), 1.0, max_relative = 1e-12);
        assert_relative_eq!(b.separation(&a), 1.0, max_relative = 1e-12);

        // One arcsecond along declination.
        let c = target("C", 10.0, -45.0);
        let d = target("D", 10.0, -45.0 + ARCSEC_IN_DEGREES);
        assert_relative_eq!(c.separation(&d), ARCSEC_IN_DEGREES, max_relative = 1e-9);

        // Identical coordinates.
        assert_eq!(a.separation(&a), 0.0);
    }

    #[test]
    fn test_distance_matcher_boundary_is_inclusive() {
        let a = target("HD 1234", 56.871, 24.105);
        let b = target("HD_1234", 56.871, 24.105 + 0.8 * ARCSEC_IN_DEGREES);

        // Threshold exactly at the separation: still a match.
        let sep = a.separation(&b);
        let at_boundary = TargetMatcher::ByDistance { threshold: sep };
        assert!(at_boundary.matches(&a, &b));
        assert!(at_boundary.matches(&b, &a));

        // Separation 10% beyond the threshold: no match.
        let beyond = TargetMatcher::ByDistance {
            threshold: sep / 1.1,
        };
        assert!(!beyond.matches(&a, &b));
    }

    #[test]
    fn test_default_distance_matcher() {
        let m = TargetMatcher::by_default_distance();
        let a = target("A", 180.0, 0.0);
        let close = target("A bis", 180.0, 0.5 * ARCSEC_IN_DEGREES);
        let far = target("A ter", 180.0, 2.0 * ARCSEC_IN_DEGREES);
        assert!(m.matches(&a, &close));
        assert!(!m.matches(&a, &far));
    }

    #[test]
    fn test_name_matcher_is_case_sensitive() {
        let m = TargetMatcher::ByName;
        let a = target("Vega", 279.23, 38.78);
        let b = target("Vega", 100.0, -10.0);
        let c = target("VEGA", 279.23, 38.78);
        assert!(m.matches(&a, &b));
        assert!(!m.matches(&a, &c));
    }

    #[test]
    fn test_listing_order_ignores_case() {
        let a = target("vega", 0.0, 0.0);
        let b = target("ALTAIR", 0.0, 0.0);
        assert_eq!(a.cmp_listing(&b), Ordering::Greater);
        assert_eq!(b.cmp_listing(&a), Ordering::Less);
    }
}
