//! # Constants and type definitions for granulite
//!
//! This module centralizes the **unit aliases**, **conversion factors**, and **matching
//! thresholds** used throughout the `granulite` library.
//!
//! ## Overview
//!
//! - Angular unit aliases (degrees, arcseconds, radians)
//! - Wavelength and time aliases (meters, Modified Julian Date)
//! - Default tolerances for the fuzzy matching policies
//! - The reserved instrument-name prefix that disables wavelength-only merging
//!
//! These definitions are used by the matcher policies, the registries, and the granule
//! filtering code.

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Wavelength in meters
pub type Meter = f64;

/// Modified Julian Date (days)
pub type MJD = f64;

// -------------------------------------------------------------------------------------------------
// Conversion factors and thresholds
// -------------------------------------------------------------------------------------------------

/// One arcsecond expressed in degrees
pub const ARCSEC_IN_DEGREES: Degree = 1.0 / 3600.0;

/// Default separation below which two targets are considered the same source (arcseconds)
pub const SAME_TARGET_DISTANCE: ArcSec = 1.0;

/// Lower clamp of the dynamic wavelength matching tolerance (meters)
pub const WAVELENGTH_TOL_MIN: Meter = 1e-10;

/// Upper clamp of the dynamic wavelength matching tolerance (meters)
pub const WAVELENGTH_TOL_MAX: Meter = 1e-7;

/// Instrument-name prefix of multi-polarization instruments.
///
/// Polarization channels of these instruments share one wavelength range, so the
/// wavelength matching policy additionally requires exact name equality for them.
pub const POLARIZATION_INSNAME_PREFIX: &str = "GRAVITY";

/// Display name of the UNDEFINED sentinel entities
pub const UNDEFINED_NAME: &str = "UNDEFINED";
