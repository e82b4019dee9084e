//! Ranking clusters by population and attaching presentation labels

use crate::data::PointSet;
use crate::error::{Result, SegmentationError};
use crate::model::ClusterAssignment;
use crate::palette::{Palette, SegmentColor};

/// A cluster with its population and the palette entry it was given
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSegment {
    /// Position in ascending-population order (0 = smallest)
    pub rank: usize,
    pub cluster_id: usize,
    pub population: usize,
    pub label: String,
    pub color: SegmentColor,
    /// Indices into the point set
    pub members: Vec<usize>,
}

/// Rank the clusters of `assignment` by ascending population and label them
/// positionally from `palette`.
///
/// Ties in population are broken by ascending cluster id. Fails when there are
/// more clusters than `min(palette.len(), max_segments)`.
pub fn label_segments(
    points: &PointSet,
    assignment: &ClusterAssignment,
    palette: &Palette,
    max_segments: usize,
) -> Result<Vec<RankedSegment>> {
    if assignment.len() != points.len() {
        return Err(SegmentationError::AssignmentMismatch {
            points: points.len(),
            assignments: assignment.len(),
        });
    }

    // BTreeMap iterates by ascending id; the stable sort keeps that order on ties
    let mut ranked: Vec<(usize, usize)> = assignment.populations().into_iter().collect();

    let capacity = palette.len().min(max_segments);
    if ranked.len() > capacity {
        return Err(SegmentationError::PaletteExhausted {
            clusters: ranked.len(),
            capacity,
        });
    }

    ranked.sort_by_key(|&(_, population)| population);

    let segments: Vec<RankedSegment> = ranked
        .into_iter()
        .zip(palette.entries())
        .enumerate()
        .map(|(rank, ((cluster_id, population), entry))| RankedSegment {
            rank,
            cluster_id,
            population,
            label: entry.label.clone(),
            color: entry.color.clone(),
            members: assignment
                .labels()
                .iter()
                .enumerate()
                .filter(|(_, &label)| label == cluster_id)
                .map(|(i, _)| i)
                .collect(),
        })
        .collect();

    for segment in &segments {
        tracing::info!(
            rank = segment.rank,
            cluster_id = segment.cluster_id,
            population = segment.population,
            label = %segment.label,
            "labeled segment"
        );
    }

    Ok(segments)
}

/// Descriptive statistics for one ranked segment
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSummary {
    pub rank: usize,
    pub label: String,
    pub population: usize,
    /// Percentage of all points
    pub share: f64,
    /// Mean of every feature over the segment's members
    pub feature_means: Vec<f64>,
}

/// Population share and per-feature means for each segment
pub fn summarize_segments(points: &PointSet, segments: &[RankedSegment]) -> Vec<SegmentSummary> {
    let total = points.len() as f64;

    segments
        .iter()
        .map(|segment| {
            let mut feature_means = vec![0.0; points.n_features()];
            for &i in &segment.members {
                for (sum, &value) in feature_means.iter_mut().zip(points.point(i).iter()) {
                    *sum += value;
                }
            }
            if !segment.members.is_empty() {
                let n = segment.members.len() as f64;
                feature_means.iter_mut().for_each(|sum| *sum /= n);
            }

            SegmentSummary {
                rank: segment.rank,
                label: segment.label.clone(),
                population: segment.population,
                share: segment.population as f64 / total * 100.0,
                feature_means,
            }
        })
        .collect()
}
