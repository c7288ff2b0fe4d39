//! Tests for the bearing estimation module

use chrono::{DateTime, Duration, TimeZone, Utc};
use gliderseg::{estimate_bearing, SegmentationConfig};

fn times(count: usize, spacing: Duration) -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    (0..count).map(|i| start + spacing * i as i32).collect()
}

#[test]
fn test_constant_east_course() {
    let n = 10;
    let t = times(n, Duration::minutes(5));
    let lats = vec![0.0; n];
    let lons: Vec<f64> = (0..n).map(|i| -125.0 + 0.01 * i as f64).collect();

    let series = estimate_bearing(&t, &lats, &lons, &SegmentationConfig::default());

    assert_eq!(series.smooth.len(), n);
    assert_eq!(series.raw.len(), n);
    for i in 0..n - 1 {
        assert!(
            (series.smooth[i] - 90.0).abs() < 1.0,
            "smooth[{i}] = {}",
            series.smooth[i]
        );
    }
    // The trailing sample has no fix-to-fix bearing.
    assert!(series.raw[n - 1].is_nan());
}

#[test]
fn test_unwrap_handles_the_north_seam() {
    // Courses alternating 350 / 10 degrees; on the wrapped axis these
    // differ by 340, on the unwrapped axis by 20. Hourly spacing keeps
    // every smoothing window to a single sample, so the conditioned
    // series reflects the geometry directly.
    let n = 12;
    let t = times(n, Duration::hours(1));
    let mut lats = vec![47.0];
    let mut lons = vec![-125.0];
    for i in 0..n - 1 {
        let heading: f64 = if i % 2 == 0 { 350.0 } else { 10.0 };
        lats.push(lats[i] + 0.02 * heading.to_radians().cos());
        lons.push(lons[i] + 0.02 * heading.to_radians().sin());
    }

    let series = estimate_bearing(&t, &lats, &lons, &SegmentationConfig::default());

    for i in 0..n - 1 {
        let b = series.smooth[i];
        assert!(b.is_finite(), "smooth[{i}] undefined");
        assert!(b.abs() < 45.0, "smooth[{i}] = {b}, expected near due north");
    }
    // Consecutive unwrapped values stay continuous across the seam.
    for pair in series.smooth_unwrapped[..n - 1].windows(2) {
        assert!((pair[1] - pair[0]).abs() < 90.0);
    }
}

#[test]
fn test_undefined_values_are_nan_not_zero() {
    let t = times(1, Duration::minutes(5));
    let series = estimate_bearing(&t, &[47.0], &[-125.0], &SegmentationConfig::default());
    assert_eq!(series.smooth.len(), 1);
    assert!(series.raw[0].is_nan());
    assert!(series.smooth[0].is_nan());
}

#[test]
fn test_position_outlier_is_suppressed() {
    // One wildly displaced surfacing in an otherwise straight north run
    // must not swing the conditioned course.
    let n = 20;
    let t = times(n, Duration::minutes(5));
    let mut lats: Vec<f64> = (0..n).map(|i| 47.0 + 0.001 * i as f64).collect();
    let mut lons = vec![-125.0; n];
    lats[10] += 0.02;
    lons[10] += 0.02;

    let series = estimate_bearing(&t, &lats, &lons, &SegmentationConfig::default());

    for i in 2..n - 2 {
        let b = series.smooth[i];
        if b.is_finite() {
            assert!(b.abs() < 45.0, "smooth[{i}] = {b} swung off course");
        }
    }
}
