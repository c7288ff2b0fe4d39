//! # Gliderseg
//!
//! Turning-point detection and transect segmentation for autonomous
//! underwater glider tracks.
//!
//! A glider deployment produces a noisy multi-week stream of GPS fixes
//! tagged with dive numbers. This library partitions that track into an
//! ordered sequence of straight-leg sections, each tagged with a
//! geographic orientation, suitable for downstream transect plotting and
//! metadata generation:
//!
//! - Per-dive position reduction (the surfacing fix represents the dive)
//! - Bounding-box validity filtering
//! - 3-D Ramer-Douglas-Peucker path simplification (lon, lat, time)
//! - Great-circle bearing estimation with progressive smoothing and
//!   outlier suppression
//! - Iterative pruning of short or redundant legs
//! - Orientation classification (latitudinal vs. longitudinal)
//! - Continuity-preserving boundary merging across reruns of an
//!   in-progress deployment
//!
//! The engine is a pure batch computation: it performs no I/O and holds
//! no state across deployments. Data retrieval, plotting and metadata
//! persistence are external collaborators.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use gliderseg::{segment_deployment, GliderFix, SegmentationConfig};
//!
//! let mut fixes = Vec::new();
//! for dive in 0..10u32 {
//!     let t = Utc.with_ymd_and_hms(2024, 3, 1, dive, 0, 0).unwrap();
//!     fixes.push(GliderFix::new(t, 47.0 + 0.01 * dive as f64, -125.0, dive));
//! }
//!
//! let outcome = segment_deployment(&fixes, &SegmentationConfig::default(), None).unwrap();
//! assert_eq!(outcome.sections.len(), 1);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, SegmentationError};

// Geographic utilities (great-circle distance, bearings, angle wrapping)
pub mod geo_utils;

// Dive reduction and bounding-box filtering
pub mod track;
pub use track::{reduce_dives, validity_mask, DivePoint};

// The segmentation engine (simplification, bearing, pruning, continuity)
pub mod segmentation;
pub use segmentation::bearing::{estimate_bearing, BearingSeries};
pub use segmentation::{segment_deployment, SegmentationOutcome};

// Synthetic deployment generator for tests and benchmarks
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// One telemetry sample from the glider data stream.
///
/// Fixes are immutable once loaded; the full fix sequence for a deployment
/// is the unit of input. Timestamps must be monotonically non-decreasing
/// per dive and free of duplicates (upstream responsibility).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GliderFix {
    /// Precise GPS timestamp (UTC)
    pub time: DateTime<Utc>,
    /// Precise latitude in degrees
    pub latitude: f64,
    /// Precise longitude in degrees
    pub longitude: f64,
    /// Dive/profile cycle this fix belongs to
    pub dive_id: u32,
    /// Depth in meters (positive down)
    pub depth: f64,
}

impl GliderFix {
    /// Create a surface fix (depth 0).
    pub fn new(time: DateTime<Utc>, latitude: f64, longitude: f64, dive_id: u32) -> Self {
        Self {
            time,
            latitude,
            longitude,
            dive_id,
            depth: 0.0,
        }
    }

    /// Create a fix with an explicit depth.
    pub fn with_depth(
        time: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        dive_id: u32,
        depth: f64,
    ) -> Self {
        Self {
            time,
            latitude,
            longitude,
            dive_id,
            depth,
        }
    }

    /// Check if the fix has plausible coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Static geographic window for a deployment.
///
/// Dives whose representative position falls strictly outside this box are
/// marked invalid: never turn-point candidates, but not removed from the
/// underlying fix sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    /// True when the position is inside the box (boundary inclusive).
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.lat_min
            && latitude <= self.lat_max
            && longitude >= self.lon_min
            && longitude <= self.lon_max
    }
}

impl Default for BoundingBox {
    /// The whole globe; effectively no filtering.
    fn default() -> Self {
        Self {
            lat_min: -90.0,
            lat_max: 90.0,
            lon_min: -180.0,
            lon_max: 180.0,
        }
    }
}

/// Geographic orientation of a transect section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Glider predominantly moving north-south; the section spans latitudes.
    Latitudinal,
    /// Glider predominantly moving east-west; the section spans longitudes.
    Longitudinal,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Latitudinal => "latitudinal",
            Orientation::Longitudinal => "longitudinal",
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Orientation {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "latitudinal" => Ok(Orientation::Latitudinal),
            "longitudinal" => Ok(Orientation::Longitudinal),
            _ => Err(()),
        }
    }
}

/// One straight-leg section of the glider track.
///
/// `start_index` and `end_index` point into the original fix sequence and
/// always coincide with a dive's representative fix. Consecutive sections
/// share their boundary index: every section's end equals the next
/// section's start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Machine id in traversal order ("section_A", "section_B", ...)
    pub id: String,
    /// Display label ("A", "B", ...)
    pub label: String,
    /// Index of the starting representative fix
    pub start_index: usize,
    /// Index of the ending representative fix
    pub end_index: usize,
    /// Orientation derived from the endpoint-to-endpoint bearing
    pub orientation: Orientation,
}

/// Strategy used to place candidate turn points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationStrategy {
    /// 3-D Ramer-Douglas-Peucker simplification plus bearing thresholding
    /// (the default and recommended strategy).
    PathSimplification,
    /// Legacy fallback: jumps in the smoothed bearing series only.
    BearingThreshold,
    /// Legacy fallback: walk of longitude minima/maxima.
    LongitudeExtrema,
}

impl SegmentationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentationStrategy::PathSimplification => "path_simplification",
            SegmentationStrategy::BearingThreshold => "bearing_threshold",
            SegmentationStrategy::LongitudeExtrema => "longitude_extrema",
        }
    }
}

impl std::fmt::Display for SegmentationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SegmentationStrategy {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "path_simplification" | "rdp" => Ok(SegmentationStrategy::PathSimplification),
            "bearing_threshold" | "bearing" => Ok(SegmentationStrategy::BearingThreshold),
            "longitude_extrema" | "extrema" => Ok(SegmentationStrategy::LongitudeExtrema),
            _ => Ok(SegmentationStrategy::PathSimplification),
        }
    }
}

impl Default for SegmentationStrategy {
    fn default() -> Self {
        SegmentationStrategy::PathSimplification
    }
}

/// Policy parameters for one deployment's segmentation run.
///
/// The numeric defaults are empirically tuned values carried over from
/// years of glider operations. They are policy, not protocol: tune them
/// per transect when a deployment segments badly, but do not expect a
/// derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationConfig {
    /// Valid geographic window; dives outside are never turn candidates
    pub bounds: BoundingBox,

    /// Turn-point placement strategy
    pub strategy: SegmentationStrategy,

    /// Perpendicular deviation tolerance for path simplification, in
    /// degrees over the (lon, lat, ordinal-day) metric. Default: 0.05
    pub simplify_tolerance_deg: f64,

    /// Bearing change between simplified vertices that marks a turn.
    /// Default: 60 degrees
    pub turn_angle_deg: f64,

    /// Bearing jump that marks a turn in the bearing-threshold fallback.
    /// Default: 45 degrees
    pub bearing_jump_deg: f64,

    /// Legs shorter than this are always deleted. Default: 30 minutes
    pub min_leg_duration_secs: f64,

    /// Legs shorter than this are pruning candidates even when the
    /// relative-mean test passes. Default: 6 hours
    pub short_leg_duration_secs: f64,

    /// Travel-distance floor for a leg; grows with each pruning round.
    /// Default: 1000 m
    pub leg_distance_floor_m: f64,

    /// Cap on the per-round distance floor growth. Default: 10 km
    pub leg_distance_floor_cap_m: f64,

    /// A leg below this fraction of the stable mean duration AND mean
    /// distance is merged into its neighbor. Default: 0.25
    pub short_leg_fraction: f64,

    /// Rounds used to stabilize the long-leg mean. Default: 5
    pub mean_refine_rounds: u32,

    /// Cap on pruning rounds; hitting it marks the outcome best-effort.
    /// Default: 10
    pub max_prune_rounds: u32,

    /// Positional deviation from the smoothed neighbor average that marks
    /// a lat/lon outlier. Default: 0.005 degrees
    pub position_outlier_deg: f64,

    /// Deviation from the smoothed neighbor average that marks a bearing
    /// outlier. Default: 40 degrees
    pub bearing_outlier_deg: f64,

    /// One-step bearing change above this is a spike candidate.
    /// Default: 45 degrees
    pub spike_step_deg: f64,

    /// A spike is confirmed when the two-step change stays below this.
    /// Default: 15 degrees
    pub spike_span_deg: f64,

    /// Longitude excursion that opens a new leg in the extrema fallback.
    /// Default: 0.1 degrees
    pub extrema_tolerance_deg: f64,

    /// Expected endpoint count for the extrema fallback. Default: 10
    pub extrema_expected_points: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            bounds: BoundingBox::default(),
            strategy: SegmentationStrategy::default(),
            simplify_tolerance_deg: 0.05,
            turn_angle_deg: 60.0,
            bearing_jump_deg: 45.0,
            min_leg_duration_secs: 30.0 * 60.0,
            short_leg_duration_secs: 6.0 * 3600.0,
            leg_distance_floor_m: 1000.0,
            leg_distance_floor_cap_m: 10_000.0,
            short_leg_fraction: 0.25,
            mean_refine_rounds: 5,
            max_prune_rounds: 10,
            position_outlier_deg: 0.005,
            bearing_outlier_deg: 40.0,
            spike_step_deg: 45.0,
            spike_span_deg: 15.0,
            extrema_tolerance_deg: 0.1,
            extrema_expected_points: 10,
        }
    }
}

impl SegmentationConfig {
    /// Default policy restricted to the given geographic window.
    pub fn with_bounds(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            ..Default::default()
        }
    }
}

/// Section label for the given zero-based position: A..Z, then AA, AB, ...
pub fn section_label(index: usize) -> String {
    let mut n = index;
    let mut label = String::new();
    loop {
        label.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label
}

/// Machine id for the given zero-based section position ("section_A", ...).
pub fn section_id(index: usize) -> String {
    format!("section_{}", section_label(index))
}
