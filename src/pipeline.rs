//! Analysis entry point: curve -> elbow -> final fit -> ranked segments
//!
//! Collaborators (point source, fitter, renderer) are passed in explicitly so
//! each stage can be driven with synthetic data.

use crate::curve::{InertiaCurve, InertiaCurveBuilder};
use crate::data::{PointSet, PointSource};
use crate::elbow::{ElbowSelector, DEFAULT_ACCEPTED_VARIANCE};
use crate::error::Result;
use crate::model::{ClusterFit, ClusterFitter};
use crate::palette::Palette;
use crate::segments::{label_segments, summarize_segments, RankedSegment, SegmentSummary};
use crate::viz::SegmentRenderer;
use anyhow::Context;

/// Knobs for one analysis run
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    pub k_min: usize,
    pub k_max: usize,
    /// Elbow sensitivity in percent
    pub accepted_variance: f64,
    /// Cluster count used when no elbow is found; `None` means curve length + 1
    pub default_tie_break: Option<usize>,
    pub palette: Palette,
    pub max_segments: usize,
    /// Fit the candidate cluster counts on the rayon pool
    pub parallel: bool,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        let palette = Palette::default();
        Self {
            k_min: 1,
            k_max: 10,
            accepted_variance: DEFAULT_ACCEPTED_VARIANCE,
            default_tie_break: None,
            max_segments: palette.len(),
            palette,
            parallel: false,
        }
    }
}

impl SegmentationConfig {
    fn selector(&self) -> ElbowSelector {
        ElbowSelector {
            accepted_variance: self.accepted_variance,
            default_tie_break: self.default_tie_break,
        }
    }
}

/// Everything produced by the core for one point set
#[derive(Debug, Clone)]
pub struct Analysis {
    pub curve: InertiaCurve,
    pub cluster_count: usize,
    pub fit: ClusterFit,
    pub segments: Vec<RankedSegment>,
    pub summaries: Vec<SegmentSummary>,
}

/// Run the core analysis on in-memory points; no I/O
pub fn analyze<F: ClusterFitter + ?Sized>(
    points: &PointSet,
    fitter: &F,
    config: &SegmentationConfig,
) -> Result<Analysis> {
    let curve = InertiaCurveBuilder::new()
        .parallel(config.parallel)
        .build_curve(points, fitter, config.k_min, config.k_max)?;

    let cluster_count = config.selector().select_cluster_count(&curve)?;

    let fit = fitter.fit(points, cluster_count)?;
    let segments = label_segments(
        points,
        &fit.assignment,
        &config.palette,
        config.max_segments,
    )?;
    let summaries = summarize_segments(points, &segments);

    Ok(Analysis {
        curve,
        cluster_count,
        fit,
        segments,
        summaries,
    })
}

/// Outcome of a full run, including the points that were analysed
#[derive(Debug, Clone)]
pub struct SegmentationReport {
    pub points: PointSet,
    pub analysis: Analysis,
}

/// Load, analyse and hand the result to the renderer
pub fn run_segmentation<S, F, R>(
    source: &S,
    fitter: &F,
    renderer: &R,
    config: &SegmentationConfig,
) -> anyhow::Result<SegmentationReport>
where
    S: PointSource + ?Sized,
    F: ClusterFitter + ?Sized,
    R: SegmentRenderer + ?Sized,
{
    let points = source.load().context("failed to load points")?;
    tracing::info!(points = points.len(), features = points.n_features(), "analysing");

    let analysis = analyze(&points, fitter, config)?;

    renderer
        .render(
            &points,
            &analysis.curve,
            analysis.cluster_count,
            &analysis.segments,
        )
        .context("failed to render segmentation")?;

    Ok(SegmentationReport { points, analysis })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegmentationError;
    use crate::model::ClusterAssignment;
    use crate::viz::NoopRenderer;
    use ndarray::Array2;

    /// Replays a fixed inertia curve and splits points round-robin into k clusters
    struct CurveFitter {
        inertias: Vec<f64>,
    }

    impl ClusterFitter for CurveFitter {
        fn fit(&self, points: &PointSet, k: usize) -> Result<ClusterFit> {
            let inertia = *self.inertias.get(k - 1).ok_or(SegmentationError::Fitting {
                k,
                reason: "off the scripted curve".to_string(),
            })?;
            // cluster c gets c+1 points, the remainder goes to the last one
            let mut labels = Vec::with_capacity(points.len());
            for c in 0..k {
                labels.extend(std::iter::repeat(c).take(c + 1));
            }
            labels.truncate(points.len());
            labels.resize(points.len(), k - 1);
            Ok(ClusterFit {
                assignment: ClusterAssignment::new(labels),
                inertia,
                centroids: Array2::zeros((k, points.n_features())),
            })
        }
    }

    fn points() -> PointSet {
        let rows: Vec<[f64; 2]> = (0..12).map(|i| [i as f64, 1.0]).collect();
        PointSet::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_analyze_selects_elbow_and_labels() {
        let fitter = CurveFitter {
            inertias: vec![100.0, 50.0, 40.0, 38.0, 37.5],
        };
        let config = SegmentationConfig {
            k_max: 5,
            ..SegmentationConfig::default()
        };

        let analysis = analyze(&points(), &fitter, &config).unwrap();
        assert_eq!(analysis.curve.len(), 5);
        assert_eq!(analysis.cluster_count, 3);

        let populations: Vec<usize> = analysis.segments.iter().map(|s| s.population).collect();
        assert_eq!(populations, vec![1, 2, 9]);
        assert_eq!(analysis.segments[0].label, "Usual");
        assert_eq!(analysis.summaries.len(), 3);
    }

    #[test]
    fn test_fallback_beyond_palette_is_reported() {
        let fitter = CurveFitter {
            inertias: vec![1000.0, 100.0, 50.0, 40.0, 1.0],
        };
        let config = SegmentationConfig {
            k_max: 4,
            ..SegmentationConfig::default()
        };

        let err = analyze(&points(), &fitter, &config).unwrap_err();
        assert_eq!(
            err,
            SegmentationError::PaletteExhausted {
                clusters: 5,
                capacity: 4
            }
        );
    }

    #[test]
    fn test_run_segmentation_with_in_memory_source() {
        let fitter = CurveFitter {
            inertias: vec![100.0, 50.0, 40.0, 38.0, 37.5],
        };
        let config = SegmentationConfig {
            k_max: 5,
            parallel: true,
            ..SegmentationConfig::default()
        };

        let report = run_segmentation(&points(), &fitter, &NoopRenderer, &config).unwrap();
        assert_eq!(report.points.len(), 12);
        assert_eq!(report.analysis.cluster_count, 3);
    }
}
