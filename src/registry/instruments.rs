//! Instrument-mode registry: [`EntityRegistry`] specialized for [`InstrumentMode`]
//! entities, seeded with the UNDEFINED sentinel.

use crate::config::MatchingConfig;
use crate::instrument::{InstrumentMode, InstrumentModeMatcher};
use crate::registry::EntityRegistry;

/// Registry resolving local instrument modes onto canonical global modes.
pub type InstrumentModeRegistry = EntityRegistry<InstrumentMode, InstrumentModeMatcher>;

impl InstrumentModeRegistry {
    /// Build an instrument-mode registry with the policy selected by the
    /// configuration, seeded with [`InstrumentMode::undefined`].
    pub fn from_config(config: &MatchingConfig) -> Self {
        EntityRegistry::with_undefined(config.mode_matching, InstrumentMode::undefined())
    }
}
