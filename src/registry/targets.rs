//! Target registry: [`EntityRegistry`] specialized for [`Target`] entities.

use crate::config::MatchingConfig;
use crate::registry::EntityRegistry;
use crate::target::{Target, TargetMatcher};

/// Registry resolving local targets onto canonical global targets.
pub type TargetRegistry = EntityRegistry<Target, TargetMatcher>;

impl TargetRegistry {
    /// Build a target registry with the policy selected by the configuration.
    pub fn from_config(config: &MatchingConfig) -> Self {
        EntityRegistry::new(config.target_matching)
    }
}

#[cfg(test)]
mod targets_test {
    use super::*;
    use crate::constants::ARCSEC_IN_DEGREES;

    #[test]
    fn test_distance_policy_merges_close_targets() {
        let mut registry = TargetRegistry::from_config(&MatchingConfig::default());

        let a = registry.register(Target::new("HD 1234", 56.871, 24.105).unwrap());
        let b = registry
            .register(Target::new("HD_1234", 56.871, 24.105 + 0.5 * ARCSEC_IN_DEGREES).unwrap());
        let c = registry.register(Target::new("HD 9999", 57.0, 24.105).unwrap());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.global_of(a), registry.global_of(b));
        assert_ne!(registry.global_of(a), registry.global_of(c));

        let global = registry.global_of(a).unwrap().as_ref().clone();
        assert_eq!(global.name(), "HD 1234");
        assert_eq!(
            registry.sorted_unique_aliases(&global),
            Some(vec!["HD_1234".to_owned()])
        );
    }

    #[test]
    fn test_name_policy_keeps_distant_homonyms_together() {
        let mut registry = TargetRegistry::from_config(&MatchingConfig::exact_names());

        let a = registry.register(Target::new("Vega", 279.23, 38.78).unwrap());
        let b = registry.register(Target::new("Vega", 100.0, -10.0).unwrap());
        assert_eq!(registry.global_of(a), registry.global_of(b));
        assert_eq!(registry.len(), 1);
    }
}
