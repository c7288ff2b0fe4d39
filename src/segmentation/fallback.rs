//! # Bearing-Threshold Fallback
//!
//! Legacy turn detection that works on the smoothed bearing series alone:
//! a lagged difference above the jump threshold marks a turn. Less robust
//! than path simplification on tracks with station keeping, but useful
//! when the spatial geometry is degenerate (e.g. a virtual-mooring
//! deployment that still changes heading on schedule).

use crate::SegmentationConfig;
use crate::geo_utils::wrap_signed;

/// Samples spanned by the lagged bearing difference.
const BEARING_LAG: usize = 10;

/// Candidate boundary indices from lagged jumps in the unwrapped smoothed
/// bearing series. Consecutive candidates collapse to the first of the
/// run. Too-short input yields just the endpoints.
pub fn bearing_jump_candidates(smooth_unwrapped: &[f64], config: &SegmentationConfig) -> Vec<usize> {
    let n = smooth_unwrapped.len();
    if n <= BEARING_LAG {
        return if n < 2 { (0..n).collect() } else { vec![0, n - 1] };
    }

    let mut candidates = Vec::new();
    let mut last_pushed = usize::MAX;
    for i in 0..n - BEARING_LAG {
        let a = smooth_unwrapped[i];
        let b = smooth_unwrapped[i + BEARING_LAG];
        if a.is_finite() && b.is_finite() && (b - a).abs() > config.bearing_jump_deg {
            let idx = i + BEARING_LAG;
            // A real turn produces a run of over-threshold lags; keep the
            // first index of each run.
            if last_pushed == usize::MAX || idx > last_pushed + 1 {
                candidates.push(idx);
            }
            last_pushed = idx;
        }
    }
    candidates
}

/// Drop boundaries between adjacent legs whose endpoint courses agree to
/// within the jump threshold. Runs once after pruning; the pruner already
/// handled duration and distance, this pass handles a turn that was
/// detected but then effectively undone.
pub fn merge_similar_headings(
    boundaries: Vec<usize>,
    leg_bearings: &[f64],
    config: &SegmentationConfig,
) -> Vec<usize> {
    debug_assert_eq!(leg_bearings.len() + 1, boundaries.len().max(1));
    if boundaries.len() <= 3 {
        return boundaries;
    }

    let mut out = vec![boundaries[0]];
    for i in 1..boundaries.len() - 1 {
        let prev = leg_bearings[i - 1];
        let next = leg_bearings[i];
        let agree = prev.is_finite()
            && next.is_finite()
            && wrap_signed(next - prev).abs() < config.bearing_jump_deg;
        if !agree {
            out.push(boundaries[i]);
        }
    }
    out.push(*boundaries.last().unwrap());
    out
}
