//! Rendering collaborator: elbow chart and segment scatter plots using Plotters

use crate::curve::InertiaCurve;
use crate::data::PointSet;
use crate::segments::{RankedSegment, SegmentSummary};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// Consumes the analysis output for display; the core never draws by itself
pub trait SegmentRenderer {
    fn render(
        &self,
        points: &PointSet,
        curve: &InertiaCurve,
        cluster_count: usize,
        segments: &[RankedSegment],
    ) -> anyhow::Result<()>;
}

/// Renders nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRenderer;

impl SegmentRenderer for NoopRenderer {
    fn render(
        &self,
        _points: &PointSet,
        _curve: &InertiaCurve,
        _cluster_count: usize,
        _segments: &[RankedSegment],
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Writes the segment scatter to `output` and the elbow chart next to it
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    pub output: PathBuf,
}

impl PlottersRenderer {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }

    /// `segments.png` -> `segments_elbow.png`
    pub fn elbow_path(&self) -> PathBuf {
        let stem = self
            .output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "segments".to_string());
        let extension = self
            .output
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "png".to_string());
        self.output
            .with_file_name(format!("{stem}_elbow.{extension}"))
    }
}

impl SegmentRenderer for PlottersRenderer {
    fn render(
        &self,
        points: &PointSet,
        curve: &InertiaCurve,
        cluster_count: usize,
        segments: &[RankedSegment],
    ) -> anyhow::Result<()> {
        create_elbow_chart(curve, cluster_count, &self.elbow_path())?;
        create_segment_visualization(points, segments, &self.output, None)?;
        Ok(())
    }
}

fn rgb(segment: &RankedSegment) -> RGBColor {
    let (r, g, b) = segment.color.rgb;
    RGBColor(r, g, b)
}

/// Plot inertia against cluster count, highlighting the selected k
pub fn create_elbow_chart(
    curve: &InertiaCurve,
    cluster_count: usize,
    output_path: &Path,
) -> anyhow::Result<()> {
    if curve.is_empty() {
        anyhow::bail!("Cannot plot an empty inertia curve");
    }

    let max_inertia = curve.inertias().iter().copied().fold(0.0, f64::max);
    let x_max = curve.k_max().max(cluster_count) as f64 + 0.5;

    let root = BitMapBackend::new(output_path, (800, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Inertia by cluster count", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (curve.k_min() as f64 - 0.5)..x_max,
            0f64..(max_inertia * 1.1).max(1.0),
        )?;

    chart
        .configure_mesh()
        .x_desc("Number of clusters")
        .y_desc("Inertia")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(LineSeries::new(
        curve.iter().map(|(k, inertia)| (k as f64, inertia)),
        &BLUE,
    ))?;
    chart.draw_series(
        curve
            .iter()
            .map(|(k, inertia)| Circle::new((k as f64, inertia), 3, BLUE.filled())),
    )?;

    // The fallback k may sit past the end of the curve
    if let Some(inertia) = curve.inertia_at(cluster_count) {
        chart
            .draw_series(std::iter::once(Circle::new(
                (cluster_count as f64, inertia),
                6,
                RED.filled(),
            )))?
            .label(format!("Selected k = {cluster_count}"))
            .legend(|(x, y)| Circle::new((x, y), 4, RED.filled()));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    tracing::info!(path = %output_path.display(), "elbow chart saved");

    Ok(())
}

/// Scatter the first two features, one colored series per ranked segment
///
/// # Arguments
/// * `points` - Analysed point set
/// * `segments` - Ranked segments with palette colors and member indices
/// * `output_path` - Path to save the PNG plot
/// * `plot_title` - Title for the plot
pub fn create_segment_visualization(
    points: &PointSet,
    segments: &[RankedSegment],
    output_path: &Path,
    plot_title: Option<&str>,
) -> anyhow::Result<()> {
    let title = plot_title.unwrap_or("Customer segments");

    let x_of = |i: usize| points.point(i)[0];
    let y_of = |i: usize| {
        if points.n_features() > 1 {
            points.point(i)[1]
        } else {
            0.0
        }
    };

    let (x_min, x_max) = padded_bounds((0..points.len()).map(x_of));
    let (y_min, y_max) = padded_bounds((0..points.len()).map(y_of));

    let names = points.feature_names();
    let x_desc = names.first().map(String::as_str).unwrap_or("x");
    let y_desc = names.get(1).map(String::as_str).unwrap_or("y");

    let root = BitMapBackend::new(output_path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for segment in segments {
        let color = rgb(segment);
        chart
            .draw_series(
                segment
                    .members
                    .iter()
                    .map(|&i| Circle::new((x_of(i), y_of(i)), 6, color.mix(0.5).filled())),
            )?
            .label(format!("{} ({})", segment.label, segment.population))
            .legend(move |(x, y)| Circle::new((x + 5, y), 5, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    tracing::info!(path = %output_path.display(), "segment plot saved");

    Ok(())
}

/// Min/max with 5% padding, widened when all values coincide
fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(0.5);
    (min - pad, max + pad)
}

/// Print the segmentation outcome to console
pub fn print_segment_statistics(
    points: &PointSet,
    curve: &InertiaCurve,
    cluster_count: usize,
    final_inertia: f64,
    summaries: &[SegmentSummary],
) {
    println!("\n=== Inertia Curve ===");
    for (k, inertia) in curve.iter() {
        let marker = if k == cluster_count { "  <- selected" } else { "" };
        println!("  k = {:2}: {:12.2}{}", k, inertia, marker);
    }

    println!("\n=== Segment Statistics ===");
    println!("Number of segments: {}", cluster_count);
    println!("Total customers: {}", points.len());
    println!("Within-cluster sum of squares (Inertia): {:.2}", final_inertia);

    println!("\nSegments (smallest first):");
    for summary in summaries {
        println!(
            "  {}. {}: {} customers ({:.1}%)",
            summary.rank + 1,
            summary.label,
            summary.population,
            summary.share
        );
        let means: Vec<String> = points
            .feature_names()
            .iter()
            .zip(&summary.feature_means)
            .map(|(name, mean)| format!("{name}={mean:.2}"))
            .collect();
        println!("     mean: {}", means.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClusterAssignment;
    use crate::palette::Palette;
    use crate::segments::{label_segments, summarize_segments};
    use tempfile::tempdir;

    fn create_test_data() -> (PointSet, InertiaCurve, Vec<RankedSegment>) {
        let points = PointSet::from_rows(&[
            [23.0, 120.0],
            [25.0, 110.0],
            [61.0, 40.0],
            [58.0, 35.0],
            [40.0, 300.0],
            [42.0, 280.0],
        ])
        .unwrap();
        let curve = InertiaCurve::new(1, vec![90000.0, 20000.0, 600.0, 400.0]);
        let assignment = ClusterAssignment::new(vec![0, 0, 1, 1, 2, 2]);
        let segments = label_segments(&points, &assignment, &Palette::default(), 4).unwrap();
        (points, curve, segments)
    }

    #[test]
    fn test_create_elbow_chart() {
        let (_, curve, _) = create_test_data();
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("elbow.png");

        create_elbow_chart(&curve, 3, &output_path).unwrap();
        assert!(output_path.exists());
    }

    #[test]
    fn test_elbow_chart_with_fallback_k() {
        let (_, curve, _) = create_test_data();
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("elbow.png");

        create_elbow_chart(&curve, curve.len() + 1, &output_path).unwrap();
        assert!(output_path.exists());
    }

    #[test]
    fn test_create_segment_visualization() {
        let (points, _, segments) = create_test_data();
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("segments.png");

        create_segment_visualization(&points, &segments, &output_path, Some("Test")).unwrap();
        assert!(output_path.exists());
    }

    #[test]
    fn test_plotters_renderer_writes_both_charts() {
        let (points, curve, segments) = create_test_data();
        let temp_dir = tempdir().unwrap();
        let renderer = PlottersRenderer::new(temp_dir.path().join("report.png"));

        renderer.render(&points, &curve, 3, &segments).unwrap();
        assert!(renderer.output.exists());
        assert!(renderer.elbow_path().exists());
        assert!(renderer.elbow_path().ends_with("report_elbow.png"));
    }

    #[test]
    fn test_padded_bounds() {
        assert_eq!(padded_bounds([5.0, 5.0].into_iter()), (4.5, 5.5));
        assert_eq!(padded_bounds(std::iter::empty()), (0.0, 1.0));
        let (lo, hi) = padded_bounds([0.0, 100.0].into_iter());
        assert_eq!((lo, hi), (-5.0, 105.0));
    }

    #[test]
    fn test_print_segment_statistics() {
        let (points, curve, segments) = create_test_data();
        let summaries = summarize_segments(&points, &segments);
        print_segment_statistics(&points, &curve, 3, 600.0, &summaries);
    }
}
