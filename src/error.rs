//! # Error Types
//!
//! Unified error handling for the segmentation engine. A failed deployment
//! aborts only that deployment; callers batching many deployments match on
//! the variant to decide whether to retry, skip or alert.

use thiserror::Error;

/// Errors produced by the segmentation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentationError {
    /// No fixes were supplied, or no dive survived the bounding-box filter.
    #[error("empty track: {reason}")]
    EmptyTrack { reason: String },

    /// Too few valid dives remain to form even one segment.
    #[error("degenerate track: {valid_dives} valid dive(s), need at least {minimum_required}")]
    DegenerateTrack {
        valid_dives: usize,
        minimum_required: usize,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SegmentationError>;
