//! # Path Simplification
//!
//! 3-D Ramer-Douglas-Peucker over (longitude, latitude, ordinal-day)
//! points. Including time as a third coordinate lets the simplifier keep
//! vertices where the glider loitered or reversed along its own path,
//! which a purely spatial pass would collapse.

/// A simplification point: (longitude, latitude, ordinal days).
pub type SimplifyPoint = [f64; 3];

/// Indices of the points kept by Ramer-Douglas-Peucker simplification
/// with tolerance `epsilon`.
///
/// The result is strictly increasing and always contains the first and
/// last index. Empty input yields an empty set; one or two points pass
/// through unchanged.
pub fn simplify_indices(points: &[SimplifyPoint], epsilon: f64) -> Vec<usize> {
    if points.is_empty() {
        return Vec::new();
    }
    if points.len() <= 2 {
        return (0..points.len()).collect();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    rdp_recurse(points, 0, points.len() - 1, epsilon, &mut keep);

    keep.iter()
        .enumerate()
        .filter_map(|(i, &k)| if k { Some(i) } else { None })
        .collect()
}

fn rdp_recurse(points: &[SimplifyPoint], start: usize, end: usize, epsilon: f64, keep: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_index = start;
    for i in start + 1..end {
        let d = line_distance(&points[i], &points[start], &points[end]);
        if d > max_dist {
            max_dist = d;
            max_index = i;
        }
    }

    if max_dist > epsilon {
        keep[max_index] = true;
        rdp_recurse(points, start, max_index, epsilon, keep);
        rdp_recurse(points, max_index, end, epsilon, keep);
    }
}

/// Distance from `point` to the infinite line through `start` and `end`.
///
/// Degenerates to the point-to-point distance when `start == end`.
fn line_distance(point: &SimplifyPoint, start: &SimplifyPoint, end: &SimplifyPoint) -> f64 {
    let d = sub(end, start);
    let len = norm(&d);
    if len == 0.0 {
        return norm(&sub(point, start));
    }
    let v = sub(point, start);
    norm(&cross(&v, &d)) / len
}

fn sub(a: &SimplifyPoint, b: &SimplifyPoint) -> SimplifyPoint {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: &SimplifyPoint, b: &SimplifyPoint) -> SimplifyPoint {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: &SimplifyPoint) -> f64 {
    (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt()
}
