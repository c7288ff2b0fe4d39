//! # Track Preparation
//!
//! Reduces the raw fix stream to one representative position per dive and
//! applies the deployment's bounding-box validity filter. Gliders drift
//! while underwater, so the *last* fix of a dive (the surfacing position)
//! is the canonical location of that dive cycle.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentationError};
use crate::{BoundingBox, GliderFix};

/// Milliseconds per day, for the fractional ordinal-day coordinate.
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Representative position for one dive cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivePoint {
    /// Dive/profile cycle id
    pub dive_id: u32,
    /// Index of the representative fix in the original fix sequence
    pub fix_index: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub time: DateTime<Utc>,
    /// Fractional days since the Unix epoch; the time axis used by the
    /// path simplifier so that time and degrees share comparable scales
    pub ordinal_days: f64,
}

/// Reduce a fix sequence to one `DivePoint` per distinct dive id.
///
/// The representative fix is the dive's last fix in time order (ties broken
/// by sequence position, so the result is deterministic under any input
/// order). Output is sorted by representative timestamp.
pub fn reduce_dives(fixes: &[GliderFix]) -> Result<Vec<DivePoint>> {
    if fixes.is_empty() {
        return Err(SegmentationError::EmptyTrack {
            reason: "no fixes supplied".into(),
        });
    }

    // Time order with sequence position as tie-breaker.
    let mut order: Vec<usize> = (0..fixes.len()).collect();
    order.sort_by_key(|&i| (fixes[i].time, i));

    // Walking in time order, the last fix seen for a dive wins.
    let mut representative: std::collections::HashMap<u32, usize> =
        std::collections::HashMap::new();
    for &i in &order {
        representative.insert(fixes[i].dive_id, i);
    }

    let mut dives: Vec<DivePoint> = representative
        .into_iter()
        .map(|(dive_id, fix_index)| {
            let fix = &fixes[fix_index];
            DivePoint {
                dive_id,
                fix_index,
                latitude: fix.latitude,
                longitude: fix.longitude,
                time: fix.time,
                ordinal_days: fix.time.timestamp_millis() as f64 / MILLIS_PER_DAY,
            }
        })
        .collect();
    dives.sort_by_key(|d| (d.time, d.fix_index));

    debug!(
        "[Track] Reduced {} fixes to {} dive positions",
        fixes.len(),
        dives.len()
    );

    Ok(dives)
}

/// Validity mask aligned with the reduced dive sequence.
///
/// A dive is invalid when its representative position falls outside the
/// deployment bounds (boundary inclusive). Invalid dives are never
/// turn-point candidates but stay addressable in the fix sequence.
pub fn validity_mask(dives: &[DivePoint], bounds: &BoundingBox) -> Vec<bool> {
    dives
        .iter()
        .map(|d| bounds.contains(d.latitude, d.longitude))
        .collect()
}
