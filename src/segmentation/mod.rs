//! # Track Segmentation Pipeline
//!
//! Partitions a glider deployment's fix stream into straight-leg transect
//! sections. The pipeline is a fixed forward sequence over the reduced
//! dive positions:
//!
//! 1. Reduce fixes to per-dive surfacing positions
//! 2. Mask dives outside the deployment bounds
//! 3. Place candidate turn points (strategy-dependent)
//! 4. Prune implausibly short legs
//! 5. Classify each surviving leg's orientation
//! 6. Optionally splice onto a previous run's boundaries
//!
//! The whole computation is a pure batch function: no I/O, no state
//! across calls. Rerunning with the same fixes and config reproduces the
//! same sections bit for bit.

pub mod bearing;
pub mod continuity;
pub mod extrema;
pub mod fallback;
pub mod prune;
pub mod simplify;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentationError};
use crate::geo_utils::{initial_bearing, wrap_signed};
use crate::track::{reduce_dives, validity_mask, DivePoint};
use crate::{
    section_id, section_label, GliderFix, Orientation, Section, SegmentationConfig,
    SegmentationStrategy,
};

use self::bearing::{estimate_bearing, BearingSeries};
use self::prune::{prune_segments, turn_candidates, PruneOutcome};

/// Result of segmenting one deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationOutcome {
    /// Ordered sections covering the valid extent of the track
    pub sections: Vec<Section>,
    /// Section boundary indices into the original fix sequence; each is
    /// the representative fix of a valid dive
    pub boundaries: Vec<usize>,
    /// Fix-to-fix bearing aligned with the reduced dive sequence,
    /// (-180, 180], NaN where undefined
    pub bearing_raw: Vec<f64>,
    /// Conditioned bearing aligned with the reduced dive sequence
    pub bearing_smooth: Vec<f64>,
    /// False when pruning hit its round cap; the sections are
    /// best-effort and worth a manual look
    pub converged: bool,
}

/// Segment a deployment's fix stream into transect sections.
///
/// `previous` carries the boundary fix indices of an earlier run over a
/// prefix of the same deployment; when given, published boundaries are
/// preserved and only the live tail is re-segmented.
///
/// Errors with [`SegmentationError::EmptyTrack`] when no fixes are given
/// or no dive lies inside the configured bounds, and with
/// [`SegmentationError::DegenerateTrack`] when fewer than two valid dives
/// remain.
pub fn segment_deployment(
    fixes: &[GliderFix],
    config: &SegmentationConfig,
    previous: Option<&[usize]>,
) -> Result<SegmentationOutcome> {
    let dives = reduce_dives(fixes)?;
    let mask = validity_mask(&dives, &config.bounds);

    let valid: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter_map(|(i, &ok)| if ok { Some(i) } else { None })
        .collect();

    if valid.is_empty() {
        return Err(SegmentationError::EmptyTrack {
            reason: "no dives inside deployment bounds".into(),
        });
    }
    if valid.len() < 2 {
        return Err(SegmentationError::DegenerateTrack {
            valid_dives: valid.len(),
            minimum_required: 2,
        });
    }

    info!(
        "[Segmentation] {} fixes, {} dives, {} inside bounds, strategy {}",
        fixes.len(),
        dives.len(),
        valid.len(),
        config.strategy
    );

    let vtimes: Vec<DateTime<Utc>> = valid.iter().map(|&i| dives[i].time).collect();
    let vlats: Vec<f64> = valid.iter().map(|&i| dives[i].latitude).collect();
    let vlons: Vec<f64> = valid.iter().map(|&i| dives[i].longitude).collect();

    let series = estimate_bearing(&vtimes, &vlats, &vlons, config);
    let (bearing_raw, bearing_smooth) = scatter_bearings(&series, &valid, dives.len());

    // Candidate placement and pruning happen in valid-dive space.
    let pruned = match config.strategy {
        SegmentationStrategy::PathSimplification => {
            place_by_simplification(&dives, &valid, &vtimes, &vlats, &vlons, config)
        }
        SegmentationStrategy::BearingThreshold => {
            place_by_bearing(&series, &vtimes, &vlats, &vlons, config)
        }
        SegmentationStrategy::LongitudeExtrema => {
            place_by_extrema(&vtimes, &vlats, &vlons, config)
        }
    };
    let converged = pruned.converged;

    // Map valid-space boundaries onto fix indices.
    let mut boundaries: Vec<usize> = pruned
        .boundaries
        .iter()
        .map(|&v| dives[valid[v]].fix_index)
        .collect();

    if let Some(prev) = previous {
        boundaries = continuity::merge_boundaries(&boundaries, prev);
    }

    // Boundaries must resolve to valid dive representatives; continuity
    // splicing or a tightened bounding box can leave strays behind.
    let fix_to_valid: std::collections::HashMap<usize, usize> = valid
        .iter()
        .map(|&i| (dives[i].fix_index, i))
        .collect();
    let before = boundaries.len();
    boundaries.retain(|b| fix_to_valid.contains_key(b));
    if boundaries.len() != before {
        debug!(
            "[Segmentation] Dropped {} boundaries no longer valid",
            before - boundaries.len()
        );
    }

    // Coverage: the section chain spans first to last valid dive.
    boundaries.push(dives[valid[0]].fix_index);
    boundaries.push(dives[*valid.last().unwrap()].fix_index);
    boundaries.sort_unstable();
    boundaries.dedup();

    if boundaries.len() < 2 {
        warn!("[Segmentation] Track could not be segmented; using one full-range section");
        boundaries = vec![
            dives[valid[0]].fix_index,
            dives[*valid.last().unwrap()].fix_index,
        ];
    }

    let sections = build_sections(&boundaries, &dives, &fix_to_valid);

    info!(
        "[Segmentation] {} section(s), converged: {}",
        sections.len(),
        converged
    );

    Ok(SegmentationOutcome {
        sections,
        boundaries,
        bearing_raw,
        bearing_smooth,
        converged,
    })
}

/// Spread the valid-dive bearing series back onto the full dive
/// sequence; masked dives read as NaN.
fn scatter_bearings(
    series: &BearingSeries,
    valid: &[usize],
    dive_count: usize,
) -> (Vec<f64>, Vec<f64>) {
    let mut raw = vec![f64::NAN; dive_count];
    let mut smooth = vec![f64::NAN; dive_count];
    for (v, &dive) in valid.iter().enumerate() {
        raw[dive] = series.raw[v];
        smooth[dive] = series.smooth[v];
    }
    (raw, smooth)
}

/// Default strategy: 3-D path simplification, then bearing thresholding
/// between the surviving vertices.
fn place_by_simplification(
    dives: &[DivePoint],
    valid: &[usize],
    vtimes: &[DateTime<Utc>],
    vlats: &[f64],
    vlons: &[f64],
    config: &SegmentationConfig,
) -> PruneOutcome {
    let points: Vec<[f64; 3]> = valid
        .iter()
        .map(|&i| [dives[i].longitude, dives[i].latitude, dives[i].ordinal_days])
        .collect();
    let kept = simplify::simplify_indices(&points, config.simplify_tolerance_deg);

    let klats: Vec<f64> = kept.iter().map(|&k| vlats[k]).collect();
    let klons: Vec<f64> = kept.iter().map(|&k| vlons[k]).collect();
    let turns = turn_candidates(&klats, &klons, config.turn_angle_deg);

    debug!(
        "[Segmentation] Simplified {} dives to {} vertices, {} turn candidate(s)",
        valid.len(),
        kept.len(),
        turns.len()
    );

    let mut candidates: Vec<usize> = turns.iter().map(|&t| kept[t]).collect();
    candidates.push(0);
    candidates.push(valid.len() - 1);

    prune_segments(vtimes, vlats, vlons, candidates, config)
}

/// Fallback strategy: lagged jumps in the smoothed bearing series.
fn place_by_bearing(
    series: &BearingSeries,
    vtimes: &[DateTime<Utc>],
    vlats: &[f64],
    vlons: &[f64],
    config: &SegmentationConfig,
) -> PruneOutcome {
    let mut candidates = fallback::bearing_jump_candidates(&series.smooth_unwrapped, config);
    candidates.push(0);
    candidates.push(vlats.len() - 1);

    let pruned = prune_segments(vtimes, vlats, vlons, candidates, config);

    let leg_bearings: Vec<f64> = pruned
        .boundaries
        .windows(2)
        .map(|w| {
            wrap_signed(initial_bearing(
                vlats[w[0]],
                vlons[w[0]],
                vlats[w[1]],
                vlons[w[1]],
            ))
        })
        .collect();
    let boundaries = fallback::merge_similar_headings(pruned.boundaries, &leg_bearings, config);

    PruneOutcome {
        boundaries,
        converged: pruned.converged,
    }
}

/// Fallback strategy: alternating longitude extrema walk.
fn place_by_extrema(
    vtimes: &[DateTime<Utc>],
    vlats: &[f64],
    vlons: &[f64],
    config: &SegmentationConfig,
) -> PruneOutcome {
    let candidates = extrema::extrema_indices(
        vlons,
        config.extrema_tolerance_deg,
        config.extrema_expected_points,
    );
    prune_segments(vtimes, vlats, vlons, candidates, config)
}

/// Assemble ordered, labeled sections from the final boundary chain.
fn build_sections(
    boundaries: &[usize],
    dives: &[DivePoint],
    fix_to_valid: &std::collections::HashMap<usize, usize>,
) -> Vec<Section> {
    boundaries
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let start = &dives[fix_to_valid[&w[0]]];
            let end = &dives[fix_to_valid[&w[1]]];
            Section {
                id: section_id(i),
                label: section_label(i),
                start_index: w[0],
                end_index: w[1],
                orientation: classify_orientation(
                    start.latitude,
                    start.longitude,
                    end.latitude,
                    end.longitude,
                ),
            }
        })
        .collect()
}

/// Orientation from the endpoint-to-endpoint course.
///
/// A section within 45 degrees of due north or due south spans latitudes;
/// anything else (including an exact 45 degree diagonal) spans longitudes.
fn classify_orientation(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Orientation {
    let course = wrap_signed(initial_bearing(lat1, lon1, lat2, lon2)).abs();
    if course < 45.0 || course > 135.0 {
        Orientation::Latitudinal
    } else {
        Orientation::Longitudinal
    }
}
