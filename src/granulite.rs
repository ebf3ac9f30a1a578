//! # Granulite: per-collection identity-resolution context
//!
//! This module defines the [`Granulite`] struct, the central façade that wires
//! together everything one collection merge needs:
//!
//! 1. **Matching configuration** ([`MatchingConfig`](crate::config::MatchingConfig)) — policy selection, read once.
//! 2. **Target registry** — local targets resolved onto canonical globals.
//! 3. **Instrument-mode registry** — seeded with the UNDEFINED sentinel.
//! 4. **Night cache** — interned [`NightId`](crate::night::NightId) instances.
//!
//! One `Granulite` is scoped to one collection: independent collections get
//! independent contexts and can be processed in parallel. Within one context,
//! registration is single-owner and synchronous; once registration is complete,
//! lookups are pure reads.
//!
//! ## Typical usage
//!
//! ```rust
//! use granulite::granule::Granule;
//! use granulite::target::Target;
//! use granulite::{Granulite, MatchingConfig};
//!
//! let mut ctx = Granulite::new(MatchingConfig::default());
//!
//! // While scanning a file:
//! let handle = ctx.register_target(Target::new("HD 1234", 56.871, 24.105)?);
//! let night = ctx.night(59215);
//!
//! // Build a granule key from the resolved global:
//! let target = ctx.targets().global_of(handle).cloned();
//! let granule = Granule::new(target, None, Some(night));
//! assert!(!granule.is_empty());
//! # Ok::<(), granulite::granulite_errors::GranuliteError>(())
//! ```

use std::sync::Arc;

use crate::config::MatchingConfig;
use crate::instrument::InstrumentMode;
use crate::night::{NightId, NightIdCache};
use crate::registry::{InstrumentModeRegistry, LocalHandle, TargetRegistry};
use crate::target::Target;

/// Per-collection context: registries, night cache, and matching configuration.
#[derive(Debug, Clone)]
pub struct Granulite {
    config: MatchingConfig,
    targets: TargetRegistry,
    instrument_modes: InstrumentModeRegistry,
    nights: NightIdCache,
}

impl Granulite {
    /// Build a fresh context with the given matching configuration.
    pub fn new(config: MatchingConfig) -> Self {
        Granulite {
            config,
            targets: TargetRegistry::from_config(&config),
            instrument_modes: InstrumentModeRegistry::from_config(&config),
            nights: NightIdCache::new(),
        }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut TargetRegistry {
        &mut self.targets
    }

    pub fn instrument_modes(&self) -> &InstrumentModeRegistry {
        &self.instrument_modes
    }

    pub fn instrument_modes_mut(&mut self) -> &mut InstrumentModeRegistry {
        &mut self.instrument_modes
    }

    /// Register a locally parsed target.
    pub fn register_target(&mut self, target: Target) -> LocalHandle {
        self.targets.register(target)
    }

    /// Register a locally parsed instrument mode.
    pub fn register_instrument_mode(&mut self, mode: InstrumentMode) -> LocalHandle {
        self.instrument_modes.register(mode)
    }

    /// Intern the night of a rounded MJD.
    pub fn night(&mut self, mjd: i64) -> Arc<NightId> {
        self.nights.intern(mjd)
    }

    pub fn nights(&self) -> &NightIdCache {
        &self.nights
    }

    /// Reset the whole context for a new collection: drop all mappings and re-seed
    /// the UNDEFINED instrument mode.
    pub fn clear(&mut self) {
        self.targets.clear();
        self.instrument_modes.clear();
        self.nights.clear();
    }
}

impl Default for Granulite {
    fn default() -> Self {
        Granulite::new(MatchingConfig::default())
    }
}
