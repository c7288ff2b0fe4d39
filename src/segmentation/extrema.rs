//! # Longitude Extrema Walk
//!
//! Legacy turn detection for strictly east-west surveys: walk the
//! longitude series alternating between a running-maximum and a
//! running-minimum trace, opening a new leg whenever the series retreats
//! from the current extremum by more than the tolerance. Kept as a
//! fallback strategy for deployments where it is known to behave.

/// Boundary indices from the alternating min/max walk of `values`.
///
/// `tolerance` is the excursion (in the series' own units) that confirms
/// a reversal; `expected_points` caps how many endpoints are collected.
/// NaN entries must be removed by the caller. The first and last index
/// are always present.
pub fn extrema_indices(values: &[f64], tolerance: f64, expected_points: usize) -> Vec<usize> {
    if values.len() < 2 {
        return (0..values.len()).collect();
    }
    let last = values.len() - 1;

    // Skip the initial stretch where the series has not yet moved by the
    // tolerance; it fixes the direction of the first trace.
    let mut k = 1;
    while k <= last && (values[k] - values[0]).abs() <= tolerance {
        k += 1;
    }
    if k > last {
        k = last;
    }

    let mut endpoints: Vec<usize> = Vec::with_capacity(expected_points);
    endpoints.push(0);
    endpoints.push(k);

    let mut tracking_max = values[k] > values[0];
    let mut extremum = values[k];

    for j in k..=last {
        if endpoints.len() >= expected_points {
            break;
        }
        if tracking_max {
            if values[j] >= extremum {
                extremum = values[j];
                *endpoints.last_mut().unwrap() = j;
            } else if (extremum - values[j]).abs() >= tolerance {
                extremum = values[j];
                endpoints.push(j);
                tracking_max = false;
            }
        } else if values[j] <= extremum {
            extremum = values[j];
            *endpoints.last_mut().unwrap() = j;
        } else if (values[j] - extremum).abs() >= tolerance {
            extremum = values[j];
            endpoints.push(j);
            tracking_max = true;
        }
    }

    if *endpoints.last().unwrap() < last && endpoints.len() < expected_points {
        endpoints.push(last);
    } else {
        *endpoints.last_mut().unwrap() = last;
    }

    endpoints.sort_unstable();
    endpoints.dedup();
    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_wave_reversals() {
        // Longitude going out 1 degree and back, twice.
        let mut values = Vec::new();
        for i in 0..=10 {
            values.push(i as f64 * 0.1);
        }
        for i in (0..10).rev() {
            values.push(i as f64 * 0.1);
        }
        for i in 1..=10 {
            values.push(i as f64 * 0.1);
        }
        let endpoints = extrema_indices(&values, 0.1, 10);
        assert_eq!(endpoints.first(), Some(&0));
        assert_eq!(endpoints.last(), Some(&(values.len() - 1)));
        // Both reversals (at the peak and at the trough) are endpoints.
        assert!(endpoints.contains(&10), "peak missing: {endpoints:?}");
        assert!(endpoints.contains(&20), "trough missing: {endpoints:?}");
    }

    #[test]
    fn test_monotonic_series_yields_endpoints_only() {
        let values: Vec<f64> = (0..20).map(|i| i as f64 * 0.05).collect();
        assert_eq!(extrema_indices(&values, 0.1, 10), vec![0, 19]);
    }
}
