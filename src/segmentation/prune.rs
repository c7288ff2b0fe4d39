//! # Segment Pruning
//!
//! Candidate turn points over-segment the track: GPS jitter, station
//! keeping and brief course corrections all masquerade as turns. This
//! module iteratively merges legs that are too short to be real transects,
//! first against absolute floors and then against the deployment's own
//! stabilized leg statistics.

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::SegmentationConfig;
use crate::geo_utils::{haversine_distance, initial_bearing, path_distances, unwrap_degrees};

/// Result of boundary pruning.
#[derive(Debug, Clone)]
pub struct PruneOutcome {
    /// Surviving boundary indices, sorted, first and last always present
    pub boundaries: Vec<usize>,
    /// False when the round cap was hit before the boundary set settled
    pub converged: bool,
}

/// Vertex indices where the between-vertex course changes by more than
/// `turn_angle_deg`.
///
/// Bearings are compared on the unwrapped axis so a 350 -> 10 degree
/// change counts as 20 degrees, not 340. Indices refer to positions in
/// the input arrays; endpoints are never reported.
pub fn turn_candidates(lats: &[f64], lons: &[f64], turn_angle_deg: f64) -> Vec<usize> {
    if lats.len() < 3 {
        return Vec::new();
    }

    let mut bearings: Vec<f64> = (0..lats.len() - 1)
        .map(|i| initial_bearing(lats[i], lons[i], lats[i + 1], lons[i + 1]))
        .collect();
    unwrap_degrees(&mut bearings);

    // Bearing i leaves vertex i, so a change between bearings i-1 and i
    // is a turn at vertex i.
    (1..bearings.len())
        .filter(|&i| (bearings[i] - bearings[i - 1]).abs() > turn_angle_deg)
        .collect()
}

/// Iteratively prune a boundary set until every leg is plausible.
///
/// `boundaries` are sorted indices into the position arrays and must
/// include the first and last index. Each round applies an absolute-floor
/// pass (minimum duration, growing travel-distance floor) and a relative
/// pass (legs under `short_leg_fraction` of the stabilized mean duration
/// AND mean endpoint distance merge into a neighbor). Rounds stop when a
/// pass removes nothing, or at `max_prune_rounds`; the first and last
/// boundary are never removed.
pub fn prune_segments(
    times: &[DateTime<Utc>],
    lats: &[f64],
    lons: &[f64],
    boundaries: Vec<usize>,
    config: &SegmentationConfig,
) -> PruneOutcome {
    let mut boundaries = boundaries;
    boundaries.sort_unstable();
    boundaries.dedup();

    let step_dists = path_distances(lats, lons);
    let mut converged = false;

    for round in 0..config.max_prune_rounds {
        if boundaries.len() <= 2 {
            converged = true;
            break;
        }

        let seg_count = boundaries.len() - 1;
        let durations: Vec<f64> = (0..seg_count)
            .map(|i| {
                (times[boundaries[i + 1]].signed_duration_since(times[boundaries[i]]))
                    .num_milliseconds() as f64
                    / 1000.0
            })
            .collect();
        let endpoint_dists: Vec<f64> = (0..seg_count)
            .map(|i| {
                haversine_distance(
                    lats[boundaries[i]],
                    lons[boundaries[i]],
                    lats[boundaries[i + 1]],
                    lons[boundaries[i + 1]],
                )
            })
            .collect();
        let travel: Vec<f64> = (0..seg_count)
            .map(|i| step_dists[boundaries[i]..boundaries[i + 1]].iter().sum())
            .collect();

        let mut remove = vec![false; boundaries.len()];

        // Absolute-floor pass. The distance floor grows each round so a
        // boundary set that keeps producing slivers gets merged harder.
        if seg_count > 1 {
            let floor = (config.leg_distance_floor_m * (round + 1) as f64)
                .min(config.leg_distance_floor_cap_m);
            for i in 0..seg_count {
                if durations[i] < config.min_leg_duration_secs || travel[i] < floor {
                    let pos = if i == 0 { 1 } else { i };
                    if pos != 0 && pos != boundaries.len() - 1 {
                        remove[pos] = true;
                    }
                }
            }
        }

        // Relative pass against the stabilized long-leg means.
        let (mean_time, mean_dist) = stabilize_means(&durations, &endpoint_dists, config);
        let frac = config.short_leg_fraction;
        let mut good = vec![true; seg_count];
        for i in 1..seg_count.saturating_sub(1) {
            if !good[i] {
                continue;
            }
            let is_candidate = durations[i] < frac * mean_time
                || durations[i] < config.short_leg_duration_secs;
            if is_candidate
                && durations[i] < frac * mean_time
                && endpoint_dists[i] < frac * mean_dist
            {
                // Merge into the preceding leg.
                remove[i] = true;
                good[i] = false;
            }
        }

        let before = boundaries.len();
        boundaries = boundaries
            .iter()
            .enumerate()
            .filter_map(|(pos, &b)| if remove[pos] { None } else { Some(b) })
            .collect();

        debug!(
            "[Prune] Round {}: {} -> {} boundaries",
            round,
            before,
            boundaries.len()
        );

        if boundaries.len() == before && round >= 1 {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            "[Prune] Hit round cap ({}) before boundaries settled; result is best-effort",
            config.max_prune_rounds
        );
    }

    PruneOutcome {
        boundaries,
        converged,
    }
}

/// Mean leg duration and endpoint distance, refined so that short legs do
/// not drag the mean down. Re-averages over legs at least
/// `short_leg_fraction` of the current mean, repeating while the mean
/// keeps growing (bounded by `mean_refine_rounds`).
fn stabilize_means(
    durations: &[f64],
    endpoint_dists: &[f64],
    config: &SegmentationConfig,
) -> (f64, f64) {
    let mut mean_time = mean(durations);
    let mut mean_dist = mean(endpoint_dists);

    for _ in 0..config.mean_refine_rounds {
        let long: Vec<usize> = (0..durations.len())
            .filter(|&i| durations[i] >= config.short_leg_fraction * mean_time)
            .collect();
        if long.is_empty() || long.len() == durations.len() {
            break;
        }
        let new_time = mean(&long.iter().map(|&i| durations[i]).collect::<Vec<_>>());
        if new_time <= mean_time {
            break;
        }
        mean_time = new_time;
        mean_dist = mean(&long.iter().map(|&i| endpoint_dists[i]).collect::<Vec<_>>());
    }

    (mean_time, mean_dist)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
