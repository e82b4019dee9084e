//! Error taxonomy for the segmentation core.
//!
//! Every failure aborts the analysis; nothing here is retried because the
//! fitting step is deterministic for a fixed seed.

use thiserror::Error;

/// Result alias used by the core (curve, elbow, labeling) operations.
pub type Result<T, E = SegmentationError> = std::result::Result<T, E>;

/// Errors raised while building the inertia curve, selecting the cluster
/// count, or labeling segments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentationError {
    /// Candidate range is empty or starts below one cluster.
    #[error("invalid cluster range: k_min={k_min}, k_max={k_max} (need 1 <= k_min <= k_max)")]
    InvalidRange { k_min: usize, k_max: usize },

    /// The clustering algorithm could not produce `k` clusters.
    #[error("failed to fit {k} clusters: {reason}")]
    Fitting { k: usize, reason: String },

    /// The curve holds fewer than three inertia values.
    #[error("inertia curve has {len} values, at least 3 are needed to locate an elbow")]
    InsufficientData { len: usize },

    /// Inertia dropped to zero at cluster count `k`, so the ratio is undefined.
    #[error("inertia is zero at k={k}; every point already sits on a centroid")]
    DegenerateInertia { k: usize },

    /// More clusters than palette entries (or than the configured segment cap).
    #[error("{clusters} clusters found but only {capacity} segment labels are available")]
    PaletteExhausted { clusters: usize, capacity: usize },

    /// The assignment does not cover the point set one-to-one.
    #[error("assignment covers {assignments} points but the point set has {points}")]
    AssignmentMismatch { points: usize, assignments: usize },

    /// No points to cluster.
    #[error("point set is empty")]
    EmptyPointSet,

    /// A coordinate is NaN or infinite.
    #[error("non-finite value at row {row}, column {column}")]
    NonFiniteValue { row: usize, column: usize },

    /// Palette specification could not be parsed.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),
}
