use std::sync::Arc;

use granulite::constants::ARCSEC_IN_DEGREES;
use granulite::granule::{
    sorted_distinct_nights, sorted_distinct_targets, Granule, GranuleMatcher,
};
use granulite::index_mask::IndexMask;
use granulite::instrument::InstrumentMode;
use granulite::matcher::Matcher;
use granulite::small_set::SmallSetMatcher;
use granulite::target::Target;
use granulite::{Granulite, MatchingConfig, Range};

fn amber_mode(wl_shift: f64, power: f64) -> InstrumentMode {
    InstrumentMode::new(
        "AMBER",
        512,
        1.9e-6 + wl_shift,
        2.4e-6 + wl_shift,
        power,
        1e-9,
    )
    .unwrap()
}

/// Simulates merging two files that describe the same program with slightly
/// inconsistent metadata, then filtering the granule population with a query.
#[test]
fn test_collection_merge_and_query() {
    let mut ctx = Granulite::new(MatchingConfig::default());

    // File 1: target "HD 1234", AMBER setup, night 59215.
    let t1 = ctx.register_target(Target::new("HD 1234", 56.871, 24.105).unwrap());
    let m1 = ctx.register_instrument_mode(amber_mode(0.0, 12000.0));
    let n1 = ctx.night(59215);

    // File 2: same sky position under another name, wavelength table off by a
    // fraction of a channel, observed two nights later.
    let t2 = ctx.register_target(
        Target::new("HD_1234", 56.871, 24.105 + 0.4 * ARCSEC_IN_DEGREES).unwrap(),
    );
    let m2 = ctx.register_instrument_mode(amber_mode(2e-10, 1500.0));
    let n2 = ctx.night(59217);

    // Both files resolve onto the same globals.
    assert_eq!(ctx.targets().global_of(t1), ctx.targets().global_of(t2));
    assert_eq!(
        ctx.instrument_modes().global_of(m1),
        ctx.instrument_modes().global_of(m2)
    );
    assert_eq!(ctx.targets().len(), 1);
    assert_eq!(ctx.instrument_modes().len(), 2); // UNDEFINED + AMBER

    let global_target = ctx.targets().global_of(t1).cloned();
    let global_mode = ctx.instrument_modes().global_of(m1).cloned();

    // The canonical target reports the alternate spelling as an alias.
    let aliases = ctx
        .targets()
        .sorted_unique_aliases(global_target.as_deref().unwrap())
        .unwrap();
    assert_eq!(aliases, vec!["HD_1234".to_owned()]);

    // One granule per night.
    let mut g1 = Granule::new(global_target.clone(), global_mode.clone(), Some(n1));
    g1.add_station("UT1");
    g1.add_mjd_range(Range::new(59215.1, 59215.3).unwrap());

    let mut g2 = Granule::new(global_target, global_mode, Some(n2));
    g2.add_station("UT4");
    g2.add_mjd_range(Range::new(59217.2, 59217.4).unwrap());

    let granules = vec![g1, g2];

    // Query: first night only.
    let matcher = GranuleMatcher::with_ranges(
        vec![Range::new(59215.0, 59216.0).unwrap()],
        Vec::new(),
    );
    let pattern = Granule::default();
    let selected: Vec<&Granule> = granules
        .iter()
        .filter(|granule| matcher.matches(&pattern, granule))
        .collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].night().unwrap().mjd(), 59215);

    // Materialize the selection into a row mask for downstream accessors.
    let mut mask = IndexMask::new_1d(granules.len());
    for (row, granule) in granules.iter().enumerate() {
        mask.set_accept(row, matcher.matches(&pattern, granule));
    }
    assert_eq!(mask.cardinality(), 1);
    assert_eq!(mask.accepted_rows().collect::<Vec<_>>(), vec![0]);

    // Per-axis summaries.
    assert_eq!(sorted_distinct_targets(&granules).len(), 1);
    let nights = sorted_distinct_nights(&granules);
    assert_eq!(
        nights.iter().map(|night| night.mjd()).collect::<Vec<_>>(),
        vec![59215, 59217]
    );
}

#[test]
fn test_homonym_targets_get_suffixed_uids() {
    // Exact-name matching keeps same-named targets together, but two targets far
    // apart under fuzzy matching must receive distinct synthetic identifiers.
    let mut ctx = Granulite::new(MatchingConfig::default());

    ctx.register_target(Target::new("NGC 7023", 315.403, 68.163).unwrap());
    ctx.register_target(Target::new("NGC 7023", 52.0, -27.8).unwrap());
    ctx.register_target(Target::new("NGC 7023", 210.8, 54.35).unwrap());

    assert_eq!(ctx.targets().len(), 3);
    assert!(ctx.targets().global_by_uid("NGC 7023").is_some());
    assert!(ctx.targets().global_by_uid("NGC 7023_1").is_some());
    assert!(ctx.targets().global_by_uid("NGC 7023_2").is_some());
}

#[test]
fn test_undefined_mode_buckets_files_without_setup() {
    let mut ctx = Granulite::new(MatchingConfig::default());

    let undefined = ctx.instrument_modes().undefined().cloned().unwrap();
    let h = ctx.register_instrument_mode(undefined.as_ref().clone());
    let resolved = ctx.instrument_modes().global_of(h).unwrap();
    assert!(resolved.is_undefined());
    assert!(Arc::ptr_eq(resolved, &undefined));
}

#[test]
fn test_target_id_filtering_with_small_set() {
    // Downstream accessors filter rows by target id after granule selection.
    let matcher = SmallSetMatcher::new(&[2_i32, 5]);
    let row_target_ids = [1_i32, 2, 5, 2, 7];

    let mut mask = IndexMask::new_1d(row_target_ids.len());
    for (row, id) in row_target_ids.iter().enumerate() {
        mask.set_accept(row, matcher.matches(*id));
    }
    assert_eq!(mask.cardinality(), 3);
    assert_eq!(mask.accepted_rows().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(matcher.matches_all(&[2, 5]));
    assert!(!matcher.matches_all(&row_target_ids));
}
