//! # Continuity Merging
//!
//! An in-progress deployment is re-segmented on every data refresh.
//! Boundaries near the live end of the track are provisional (the next
//! refresh may reveal the "turn" was a loiter), but boundaries of finished
//! legs have already been published to downstream metadata and must not
//! move. This module splices a fresh boundary set onto the retained head
//! of the previous run's boundaries.

use log::debug;

/// Boundaries at the live end of a run that are still allowed to move.
const PROVISIONAL_TAIL: usize = 3;

/// Below this boundary count only the final boundary is provisional.
const TAIL_THRESHOLD: usize = 6;

/// Merge a freshly computed boundary set with the previous run's.
///
/// Everything in `previous` except its provisional tail is retained
/// verbatim. From `new`, only boundaries strictly after the retained
/// anchor are spliced in; the splice starts at the new boundary closest
/// to the anchor. The result is sorted and deduplicated.
pub fn merge_boundaries(new: &[usize], previous: &[usize]) -> Vec<usize> {
    let kept: &[usize] = if previous.is_empty() {
        &[]
    } else if previous.len() > TAIL_THRESHOLD {
        &previous[..previous.len() - PROVISIONAL_TAIL]
    } else {
        &previous[..previous.len() - 1]
    };

    if kept.is_empty() {
        let mut out = new.to_vec();
        out.sort_unstable();
        out.dedup();
        return out;
    }

    let anchor = *kept.last().unwrap();

    // New boundary closest to the anchor; it re-detects the anchor turn,
    // so splicing starts strictly after it.
    let mut start = 0usize;
    let mut best = usize::MAX;
    for (i, &b) in new.iter().enumerate() {
        let dist = b.abs_diff(anchor);
        if dist < best {
            best = dist;
            start = i;
        }
    }

    let mut out: Vec<usize> = kept.to_vec();
    out.extend_from_slice(&new[start + 1..]);
    out.sort_unstable();
    out.dedup();

    debug!(
        "[Continuity] Retained {} previous boundaries, spliced {} new",
        kept.len(),
        new.len().saturating_sub(start + 1)
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_head_is_stable() {
        let previous = vec![0, 10, 20, 30, 40, 50, 60];
        // Re-run moved every turn slightly; the retained head must win.
        let new = vec![0, 11, 21, 31, 41, 51, 70];
        let merged = merge_boundaries(&new, &previous);
        assert!(merged.starts_with(&[0, 10, 20, 30]));
        assert!(merged.contains(&70));
        // Provisional tail boundaries of the previous run are gone.
        assert!(!merged.contains(&40) && !merged.contains(&50));
    }

    #[test]
    fn test_short_previous_keeps_all_but_last() {
        let previous = vec![0, 10, 20];
        let new = vec![0, 21, 35];
        let merged = merge_boundaries(&new, &previous);
        assert!(merged.starts_with(&[0, 10]));
        assert!(merged.contains(&35));
    }

    #[test]
    fn test_empty_previous_passes_new_through() {
        assert_eq!(merge_boundaries(&[5, 0, 5, 9], &[]), vec![0, 5, 9]);
    }
}
