//! # Bearing Estimation
//!
//! Turns a noisy dive-position sequence into a stable course-over-ground
//! series. Surfacing positions carry GPS jitter and surface-drift error of
//! the same order as the between-dive displacement, so the raw
//! fix-to-fix bearing is useless without aggressive conditioning:
//!
//! 1. Rolling time-window smoothing of latitude/longitude (three passes)
//!    with neighbor-average outlier nulling between passes
//! 2. Great-circle initial bearing between consecutive smoothed positions
//! 3. Single-sample spike suppression
//! 4. NaN-aware unwrapping (period 360) and three rounds of progressively
//!    wider rolling means with deviation re-nulling
//!
//! Undefined values are `NaN` throughout, never 0: a zero would read as a
//! due-north course.

use chrono::{DateTime, Utc};

use crate::SegmentationConfig;
use crate::geo_utils::{initial_bearing, unwrap_degrees, wrap_signed};

/// Window sequence for the positional smoothing passes, in seconds.
const POSITION_WINDOWS_SECS: [f64; 3] = [300.0, 300.0, 900.0];

/// Window sequence for the unwrapped-bearing smoothing rounds, in seconds.
const BEARING_WINDOWS_SECS: [f64; 3] = [900.0, 900.0, 1800.0];

/// Window for the light reference smoothing used to patch over-smoothed
/// samples, in seconds.
const LIGHT_WINDOW_SECS: f64 = 30.0;

/// Bearing series aligned with the input dive sequence.
///
/// All arrays have the same length as the input; entries that cannot be
/// estimated (trailing sample, nulled outliers with no window support) are
/// `NaN`.
#[derive(Debug, Clone)]
pub struct BearingSeries {
    /// Fix-to-fix bearing from the smoothed positions, wrapped to
    /// (-180, 180]
    pub raw: Vec<f64>,
    /// Fully conditioned bearing, wrapped to (-180, 180]
    pub smooth: Vec<f64>,
    /// Fully conditioned bearing on the continuous (unwrapped) axis
    pub smooth_unwrapped: Vec<f64>,
    /// Smoothed latitude series
    pub lat_smooth: Vec<f64>,
    /// Smoothed longitude series
    pub lon_smooth: Vec<f64>,
}

/// Estimate the course-over-ground series for a dive-position sequence.
///
/// `times`, `lats` and `lons` must have equal length and be sorted by
/// time. Fewer than two samples yields all-NaN bearing arrays.
pub fn estimate_bearing(
    times: &[DateTime<Utc>],
    lats: &[f64],
    lons: &[f64],
    config: &SegmentationConfig,
) -> BearingSeries {
    debug_assert_eq!(times.len(), lats.len());
    debug_assert_eq!(times.len(), lons.len());
    let n = times.len();

    if n < 2 {
        return BearingSeries {
            raw: vec![f64::NAN; n],
            smooth: vec![f64::NAN; n],
            smooth_unwrapped: vec![f64::NAN; n],
            lat_smooth: lats.to_vec(),
            lon_smooth: lons.to_vec(),
        };
    }

    let secs: Vec<f64> = times
        .iter()
        .map(|t| t.timestamp_millis() as f64 / 1000.0)
        .collect();

    // --- Position conditioning ---------------------------------------
    let mut lat_work = lats.to_vec();
    let mut lon_work = lons.to_vec();
    let mut lat_smooth = rolling_time_mean(&secs, &lat_work, POSITION_WINDOWS_SECS[0]);
    let mut lon_smooth = rolling_time_mean(&secs, &lon_work, POSITION_WINDOWS_SECS[0]);

    for window in &POSITION_WINDOWS_SECS[1..] {
        null_position_outliers(
            &mut lat_work,
            &mut lon_work,
            &lat_smooth,
            &lon_smooth,
            config.position_outlier_deg,
        );
        lat_smooth = rolling_time_mean(&secs, &lat_work, *window);
        lon_smooth = rolling_time_mean(&secs, &lon_work, *window);
    }

    // --- Raw bearing --------------------------------------------------
    let mut raw = vec![f64::NAN; n];
    for i in 0..n - 1 {
        let (la1, lo1) = (lat_smooth[i], lon_smooth[i]);
        let (la2, lo2) = (lat_smooth[i + 1], lon_smooth[i + 1]);
        if la1.is_finite() && lo1.is_finite() && la2.is_finite() && lo2.is_finite() {
            raw[i] = initial_bearing(la1, lo1, la2, lo2);
        }
    }

    // --- Spike suppression --------------------------------------------
    let mut work = raw.clone();
    let mut unwrapped = raw.clone();
    unwrap_degrees(&mut unwrapped);
    for i in 1..n - 1 {
        let back = unwrapped[i] - unwrapped[i - 1];
        let span = unwrapped[i + 1] - unwrapped[i - 1];
        if back.abs() > config.spike_step_deg && span.abs() < config.spike_span_deg {
            work[i] = f64::NAN;
        }
    }

    // --- Progressive smoothing on the unwrapped axis -------------------
    let mut u = work.clone();
    unwrap_degrees(&mut u);
    let light = rolling_time_mean(&secs, &u, LIGHT_WINDOW_SECS);

    let mut smooth_unwrapped = vec![f64::NAN; n];
    for (round, window) in BEARING_WINDOWS_SECS.iter().enumerate() {
        let s = rolling_time_mean(&secs, &u, *window);
        if round + 1 < BEARING_WINDOWS_SECS.len() {
            null_deviant_samples(&mut work, &u, &s, config.bearing_outlier_deg);
            u = work.clone();
            unwrap_degrees(&mut u);
        } else {
            smooth_unwrapped = s;
        }
    }

    // A wide window drags the estimate away from the data through sharp
    // real turns; patch those samples with the light reference. Anchors
    // come from the pre-patch series.
    let anchors: Vec<f64> = (0..n)
        .map(|i| {
            if i == 0 || i == n - 1 {
                f64::NAN
            } else {
                (smooth_unwrapped[i - 1] + smooth_unwrapped[i + 1]) / 2.0
            }
        })
        .collect();
    for i in 1..n - 1 {
        if u[i].is_finite()
            && anchors[i].is_finite()
            && (u[i] - anchors[i]).abs() > config.bearing_outlier_deg / 2.0
            && light[i].is_finite()
        {
            smooth_unwrapped[i] = light[i];
        }
    }

    let smooth = smooth_unwrapped.iter().map(|&b| wrap_signed(b)).collect();
    let raw_signed = raw.iter().map(|&b| wrap_signed(b)).collect();

    BearingSeries {
        raw: raw_signed,
        smooth,
        smooth_unwrapped,
        lat_smooth,
        lon_smooth,
    }
}

/// Centered rolling mean over a time window, NaN-skipping.
///
/// For each sample the mean covers every sample whose timestamp lies
/// within `window_secs / 2` of it. A window containing only NaN values
/// yields NaN.
pub fn rolling_time_mean(secs: &[f64], values: &[f64], window_secs: f64) -> Vec<f64> {
    let n = secs.len();
    let half = window_secs / 2.0;
    let mut out = vec![f64::NAN; n];

    let mut lo = 0usize;
    let mut hi = 0usize;
    for i in 0..n {
        while lo < n && secs[lo] < secs[i] - half {
            lo += 1;
        }
        if hi < lo {
            hi = lo;
        }
        while hi < n && secs[hi] <= secs[i] + half {
            hi += 1;
        }

        let mut sum = 0.0;
        let mut count = 0usize;
        for j in lo..hi {
            if values[j].is_finite() {
                sum += values[j];
                count += 1;
            }
        }
        if count > 0 {
            out[i] = sum / count as f64;
        }
    }
    out
}

/// Null working samples that sit far from the average of their smoothed
/// neighbors. Edge samples have no neighbor pair and are never nulled.
fn null_deviant_samples(work: &mut [f64], data: &[f64], smooth: &[f64], threshold_deg: f64) {
    let n = data.len();
    for i in 1..n.saturating_sub(1) {
        let anchor = (smooth[i - 1] + smooth[i + 1]) / 2.0;
        if data[i].is_finite() && anchor.is_finite() && (data[i] - anchor).abs() > threshold_deg {
            work[i] = f64::NAN;
        }
    }
}

/// Null working positions that sit far from the average of their smoothed
/// neighbors. Both axes are nulled together so the pair stays consistent.
fn null_position_outliers(
    lat_work: &mut [f64],
    lon_work: &mut [f64],
    lat_smooth: &[f64],
    lon_smooth: &[f64],
    threshold_deg: f64,
) {
    let n = lat_work.len();
    for i in 1..n.saturating_sub(1) {
        let lat_anchor = (lat_smooth[i - 1] + lat_smooth[i + 1]) / 2.0;
        let lon_anchor = (lon_smooth[i - 1] + lon_smooth[i + 1]) / 2.0;
        if !lat_anchor.is_finite() || !lon_anchor.is_finite() {
            continue;
        }
        let lat_dev = (lat_work[i] - lat_anchor).abs();
        let lon_dev = (lon_work[i] - lon_anchor).abs();
        if lat_dev > threshold_deg || lon_dev > threshold_deg {
            lat_work[i] = f64::NAN;
            lon_work[i] = f64::NAN;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_time_mean_skips_nan() {
        let secs = vec![0.0, 60.0, 120.0];
        let values = vec![1.0, f64::NAN, 3.0];
        let out = rolling_time_mean(&secs, &values, 300.0);
        assert!((out[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_time_mean_respects_window() {
        let secs = vec![0.0, 10.0, 10_000.0];
        let values = vec![1.0, 3.0, 100.0];
        let out = rolling_time_mean(&secs, &values, 60.0);
        assert!((out[0] - 2.0).abs() < 1e-12);
        assert!((out[2] - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_deviation_nulling_uses_neighbor_average_and_spares_edges() {
        let data = vec![100.0, 50.0, 0.0, 0.0, 0.0];
        let smooth = vec![0.0, 0.0, 0.0, 0.0, 0.0];
        let mut work = data.clone();
        null_deviant_samples(&mut work, &data, &smooth, 40.0);
        // Edge samples are spared even when far off the smooth series.
        assert!(work[0].is_finite());
        assert!(work[4].is_finite());
        // Sample 1 sits 50 degrees above its neighbor average.
        assert!(work[1].is_nan());
        assert!(work[2].is_finite());
        assert!(work[3].is_finite());
    }

    #[test]
    fn test_all_nan_window_stays_nan() {
        let secs = vec![0.0, 60.0];
        let values = vec![f64::NAN, f64::NAN];
        let out = rolling_time_mean(&secs, &values, 30.0);
        assert!(out[0].is_nan() && out[1].is_nan());
    }
}
