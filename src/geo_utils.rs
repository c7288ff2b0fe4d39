//! # Geographic Utilities
//!
//! Spherical geometry and angle bookkeeping shared by the segmentation
//! stages: haversine distance, great-circle initial bearing, degree
//! wrapping and NaN-aware unwrapping of angle series.

/// Mean Earth radius in meters used for all spherical computations.
pub const EARTH_RADIUS_M: f64 = 6_370_000.0;

/// Great-circle distance between two positions in meters (haversine).
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial great-circle bearing from the first position toward the second,
/// in compass degrees: 0 = north, 90 = east, range [0, 360).
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();

    wrap_positive(y.atan2(x).to_degrees())
}

/// Wrap an angle into [0, 360).
pub fn wrap_positive(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Wrap an angle into (-180, 180].
pub fn wrap_signed(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Unwrap a degree series in place: adjust each value by multiples of 360
/// so consecutive defined samples never differ by more than 180.
///
/// NaN entries are left untouched and skipped as unwrap anchors; the next
/// defined sample unwraps against the last defined one. The period is
/// exactly 360, so the result is continuous across the +-180 seam.
pub fn unwrap_degrees(series: &mut [f64]) {
    let mut prev: Option<f64> = None;
    for value in series.iter_mut() {
        if value.is_nan() {
            continue;
        }
        if let Some(anchor) = prev {
            let mut v = *value;
            while v - anchor > 180.0 {
                v -= 360.0;
            }
            while v - anchor < -180.0 {
                v += 360.0;
            }
            *value = v;
        }
        prev = Some(*value);
    }
}

/// Haversine distance between each consecutive pair of positions.
///
/// Returns `n - 1` step distances for `n` positions (empty for fewer than
/// two).
pub fn path_distances(lats: &[f64], lons: &[f64]) -> Vec<f64> {
    debug_assert_eq!(lats.len(), lons.len());
    if lats.len() < 2 {
        return Vec::new();
    }
    (0..lats.len() - 1)
        .map(|i| haversine_distance(lats[i], lons[i], lats[i + 1], lons[i + 1]))
        .collect()
}
