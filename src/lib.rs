//! Segmentor: customer segmentation with automatic cluster-count selection
//!
//! Fits K-Means over a range of cluster counts, picks the count at the elbow
//! of the inertia curve, and ranks the resulting segments by population so
//! they can be labeled and plotted consistently across runs.

pub mod cli;
pub mod curve;
pub mod data;
pub mod elbow;
pub mod error;
pub mod model;
pub mod palette;
pub mod pipeline;
pub mod segments;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use curve::{build_curve, InertiaCurve, InertiaCurveBuilder};
pub use data::{load_points, DelimitedFileSource, PointSet, PointSource};
pub use elbow::{select_cluster_count, ElbowSelector};
pub use error::SegmentationError;
pub use model::{ClusterAssignment, ClusterFit, ClusterFitter, KMeansFitter};
pub use palette::{Palette, PaletteEntry, SegmentColor};
pub use pipeline::{analyze, run_segmentation, Analysis, SegmentationConfig, SegmentationReport};
pub use segments::{label_segments, summarize_segments, RankedSegment, SegmentSummary};
pub use viz::{NoopRenderer, PlottersRenderer, SegmentRenderer};

/// Result type used by the I/O and command-line layers
pub type Result<T> = anyhow::Result<T>;
