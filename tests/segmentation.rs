//! Tests for the end-to-end segmentation pipeline

use chrono::{TimeZone, Utc};
use gliderseg::synthetic::{DeploymentScenario, LegConfig};
use gliderseg::{
    segment_deployment, BoundingBox, GliderFix, Orientation, SegmentationConfig,
    SegmentationError, SegmentationStrategy,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

fn leg(heading_deg: f64, dive_count: u32) -> LegConfig {
    LegConfig {
        heading_deg,
        dive_count,
        dive_step_deg: 0.01,
        dive_interval_minutes: 60,
    }
}

fn scenario(legs: Vec<LegConfig>) -> DeploymentScenario {
    DeploymentScenario {
        origin_lat: 47.0,
        origin_lon: -125.0,
        start: start(),
        fixes_per_dive: 3,
        legs,
        gps_noise_sigma_deg: 0.0005,
        seed: 42,
    }
}

#[test]
fn test_two_dives_form_one_section() {
    init_logging();
    let fixes = vec![
        GliderFix::new(start(), 47.0, -125.0, 0),
        GliderFix::new(start() + chrono::Duration::hours(6), 47.018, -125.0, 1),
    ];
    let outcome = segment_deployment(&fixes, &SegmentationConfig::default(), None).unwrap();
    assert_eq!(outcome.sections.len(), 1);
    assert_eq!(outcome.boundaries, vec![0, 1]);
    assert_eq!(outcome.sections[0].orientation, Orientation::Latitudinal);
    assert!(outcome.converged);
}

#[test]
fn test_straight_north_run_is_one_latitudinal_section() {
    init_logging();
    let fixes = scenario(vec![leg(0.0, 10)]).generate();
    let outcome = segment_deployment(&fixes, &SegmentationConfig::default(), None).unwrap();
    assert_eq!(outcome.sections.len(), 1);
    assert_eq!(outcome.sections[0].orientation, Orientation::Latitudinal);
    assert_eq!(outcome.sections[0].id, "section_A");
    assert_eq!(outcome.sections[0].label, "A");
}

#[test]
fn test_straight_east_run_is_one_longitudinal_section() {
    init_logging();
    let fixes = scenario(vec![leg(90.0, 10)]).generate();
    let outcome = segment_deployment(&fixes, &SegmentationConfig::default(), None).unwrap();
    assert_eq!(outcome.sections.len(), 1);
    assert_eq!(outcome.sections[0].orientation, Orientation::Longitudinal);
}

#[test]
fn test_zigzag_yields_three_sections() {
    init_logging();
    let fixes = scenario(vec![leg(0.0, 12), leg(90.0, 12), leg(0.0, 12)]).generate();
    let outcome = segment_deployment(&fixes, &SegmentationConfig::default(), None).unwrap();

    assert_eq!(outcome.sections.len(), 3);
    let orientations: Vec<Orientation> =
        outcome.sections.iter().map(|s| s.orientation).collect();
    assert_eq!(
        orientations,
        vec![
            Orientation::Latitudinal,
            Orientation::Longitudinal,
            Orientation::Latitudinal
        ]
    );
    let labels: Vec<&str> = outcome.sections.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["A", "B", "C"]);

    // Boundaries land on the surfacing fixes of the actual turn dives.
    assert_eq!(outcome.boundaries, vec![2, 35, 71, 107]);
}

#[test]
fn test_sections_chain_without_gaps() {
    init_logging();
    let fixes = scenario(vec![leg(0.0, 12), leg(90.0, 12), leg(180.0, 12)]).generate();
    let outcome = segment_deployment(&fixes, &SegmentationConfig::default(), None).unwrap();

    assert!(outcome.boundaries.windows(2).all(|w| w[0] < w[1]));
    for pair in outcome.sections.windows(2) {
        assert_eq!(pair[0].end_index, pair[1].start_index);
    }
    assert_eq!(
        outcome.sections.first().unwrap().start_index,
        *outcome.boundaries.first().unwrap()
    );
    assert_eq!(
        outcome.sections.last().unwrap().end_index,
        *outcome.boundaries.last().unwrap()
    );
}

#[test]
fn test_brief_spur_is_absorbed() {
    init_logging();
    // Two long north legs separated by a ten-minute sideways nudge. The
    // nudge is far below the simplification tolerance and must not
    // produce a section of its own.
    let fixes = scenario(vec![
        leg(0.0, 8),
        LegConfig {
            heading_deg: 90.0,
            dive_count: 1,
            dive_step_deg: 0.002,
            dive_interval_minutes: 10,
        },
        leg(0.0, 8),
    ])
    .generate();
    let outcome = segment_deployment(&fixes, &SegmentationConfig::default(), None).unwrap();
    assert_eq!(outcome.sections.len(), 1);
    assert_eq!(outcome.sections[0].orientation, Orientation::Latitudinal);
}

#[test]
fn test_out_of_bounds_dives_are_excluded() {
    init_logging();
    // A straight run, then a jump far outside the deployment box.
    let mut fixes = scenario(vec![leg(0.0, 10)]).generate();
    for i in 0..3u32 {
        fixes.push(GliderFix::new(
            start() + chrono::Duration::hours(20 + i as i64),
            47.0,
            -120.0,
            100 + i,
        ));
    }

    let config = SegmentationConfig::with_bounds(BoundingBox::new(46.0, 48.0, -126.0, -124.0));
    let outcome = segment_deployment(&fixes, &config, None).unwrap();

    // The section chain stops at the last in-bounds dive.
    let last_valid_fix = 10 * 3 - 1;
    assert_eq!(*outcome.boundaries.last().unwrap(), last_valid_fix);
    assert_eq!(outcome.sections.len(), 1);
}

#[test]
fn test_deterministic_across_runs() {
    init_logging();
    let fixes = scenario(vec![leg(0.0, 12), leg(90.0, 12)]).generate();
    let config = SegmentationConfig::default();
    let a = segment_deployment(&fixes, &config, None).unwrap();
    let b = segment_deployment(&fixes, &config, None).unwrap();
    assert_eq!(a.sections, b.sections);
    assert_eq!(a.boundaries, b.boundaries);
}

#[test]
fn test_bearing_diagnostics_align_with_dives() {
    init_logging();
    let fixes = scenario(vec![leg(0.0, 10)]).generate();
    let outcome = segment_deployment(&fixes, &SegmentationConfig::default(), None).unwrap();
    assert_eq!(outcome.bearing_raw.len(), 10);
    assert_eq!(outcome.bearing_smooth.len(), 10);
    // A northward run reads near zero degrees.
    for i in 1..8 {
        let b = outcome.bearing_smooth[i];
        if b.is_finite() {
            assert!(b.abs() < 45.0, "bearing_smooth[{i}] = {b}");
        }
    }
}

#[test]
fn test_round_capped_pruning_is_flagged_best_effort() {
    init_logging();
    // One round is never enough for the pruner to observe a settled
    // boundary set, so the outcome must carry the best-effort flag while
    // still producing sections.
    let fixes = scenario(vec![leg(0.0, 12), leg(90.0, 12), leg(0.0, 12)]).generate();
    let config = SegmentationConfig {
        max_prune_rounds: 1,
        ..Default::default()
    };
    let outcome = segment_deployment(&fixes, &config, None).unwrap();
    assert!(!outcome.converged);
    assert_eq!(outcome.sections.len(), 3);
}

#[test]
fn test_empty_input_is_an_error() {
    init_logging();
    match segment_deployment(&[], &SegmentationConfig::default(), None) {
        Err(SegmentationError::EmptyTrack { .. }) => {}
        other => panic!("expected EmptyTrack, got {other:?}"),
    }
}

#[test]
fn test_everything_out_of_bounds_is_an_error() {
    init_logging();
    let fixes = scenario(vec![leg(0.0, 5)]).generate();
    let config = SegmentationConfig::with_bounds(BoundingBox::new(0.0, 1.0, 0.0, 1.0));
    match segment_deployment(&fixes, &config, None) {
        Err(SegmentationError::EmptyTrack { .. }) => {}
        other => panic!("expected EmptyTrack, got {other:?}"),
    }
}

#[test]
fn test_single_valid_dive_is_degenerate() {
    init_logging();
    let fixes = vec![
        GliderFix::new(start(), 47.0, -125.0, 0),
        GliderFix::new(start() + chrono::Duration::minutes(30), 47.001, -125.0, 0),
    ];
    match segment_deployment(&fixes, &SegmentationConfig::default(), None) {
        Err(SegmentationError::DegenerateTrack {
            valid_dives: 1,
            minimum_required: 2,
        }) => {}
        other => panic!("expected DegenerateTrack, got {other:?}"),
    }
}

#[test]
fn test_bearing_threshold_strategy_on_zigzag() {
    init_logging();
    let fixes = scenario(vec![leg(0.0, 12), leg(90.0, 12), leg(0.0, 12)]).generate();
    let config = SegmentationConfig {
        strategy: SegmentationStrategy::BearingThreshold,
        ..Default::default()
    };
    let outcome = segment_deployment(&fixes, &config, None).unwrap();

    assert_eq!(outcome.sections.len(), 3);
    let orientations: Vec<Orientation> =
        outcome.sections.iter().map(|s| s.orientation).collect();
    assert_eq!(
        orientations,
        vec![
            Orientation::Latitudinal,
            Orientation::Longitudinal,
            Orientation::Latitudinal
        ]
    );
}

#[test]
fn test_longitude_extrema_strategy_on_east_west_survey() {
    init_logging();
    let fixes = scenario(vec![leg(90.0, 12), leg(270.0, 12)]).generate();
    let config = SegmentationConfig {
        strategy: SegmentationStrategy::LongitudeExtrema,
        ..Default::default()
    };
    let outcome = segment_deployment(&fixes, &config, None).unwrap();

    assert_eq!(outcome.sections.len(), 2);
    for section in &outcome.sections {
        assert_eq!(section.orientation, Orientation::Longitudinal);
    }
}

#[test]
fn test_section_serialization_shape() {
    init_logging();
    let fixes = scenario(vec![leg(0.0, 10)]).generate();
    let outcome = segment_deployment(&fixes, &SegmentationConfig::default(), None).unwrap();
    let json = serde_json::to_value(&outcome.sections[0]).unwrap();
    assert_eq!(json["id"], "section_A");
    assert_eq!(json["orientation"], "latitudinal");
    assert!(json["startIndex"].is_u64());
    assert!(json["endIndex"].is_u64());
}
