//! Cluster fitting: the capability interface and its K-Means implementation

use crate::data::PointSet;
use crate::error::{Result, SegmentationError};
use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_isaac::Isaac64Rng;
use std::collections::BTreeMap;

/// Point index -> cluster id. Ids carry no meaning across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
}

impl ClusterAssignment {
    pub fn new(labels: Vec<usize>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn cluster_of(&self, point: usize) -> Option<usize> {
        self.labels.get(point).copied()
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Population per cluster id, keyed in ascending id order
    pub fn populations(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for &label in &self.labels {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }
}

impl From<Vec<usize>> for ClusterAssignment {
    fn from(labels: Vec<usize>) -> Self {
        Self::new(labels)
    }
}

/// Outcome of fitting k clusters
#[derive(Debug, Clone)]
pub struct ClusterFit {
    pub assignment: ClusterAssignment,
    /// Within-cluster sum of squares
    pub inertia: f64,
    /// One row per cluster id
    pub centroids: Array2<f64>,
}

/// Fits `k` clusters to a point set.
///
/// Implementations must be deterministic for a fixed configuration so that the
/// selected cluster count is reproducible, and `Sync` so the inertia curve can
/// be built on a worker pool.
pub trait ClusterFitter: Sync {
    fn fit(&self, points: &PointSet, k: usize) -> Result<ClusterFit>;
}

impl<T: ClusterFitter + ?Sized> ClusterFitter for &T {
    fn fit(&self, points: &PointSet, k: usize) -> Result<ClusterFit> {
        (**self).fit(points, k)
    }
}

/// Seeded K-Means (k-means++ initialisation) backed by linfa
#[derive(Debug, Clone)]
pub struct KMeansFitter {
    pub max_iterations: u64,
    pub tolerance: f64,
    pub seed: u64,
}

impl Default for KMeansFitter {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-4,
            seed: 42,
        }
    }
}

impl KMeansFitter {
    pub fn new(max_iterations: u64, tolerance: f64, seed: u64) -> Self {
        Self {
            max_iterations,
            tolerance,
            seed,
        }
    }
}

impl ClusterFitter for KMeansFitter {
    fn fit(&self, points: &PointSet, k: usize) -> Result<ClusterFit> {
        if k == 0 {
            return Err(SegmentationError::Fitting {
                k,
                reason: "cluster count must be at least 1".to_string(),
            });
        }

        let distinct = points.distinct_count();
        if k > distinct {
            return Err(SegmentationError::Fitting {
                k,
                reason: format!("only {distinct} distinct points available"),
            });
        }

        let dataset = DatasetBase::from(points.values().clone());

        // Fresh RNG per fit so each k is independent of the order it is tried in
        let rng = Isaac64Rng::seed_from_u64(self.seed);
        let model = KMeans::params_with(k, rng, L2Dist)
            .max_n_iterations(self.max_iterations)
            .tolerance(self.tolerance)
            .fit(&dataset)
            .map_err(|e| SegmentationError::Fitting {
                k,
                reason: e.to_string(),
            })?;

        let labels: Array1<usize> = model.predict(points.values());
        let centroids = model.centroids().clone();
        let inertia = compute_inertia(points.values(), &labels, &centroids);

        tracing::debug!(k, inertia, "fitted k-means");

        Ok(ClusterFit {
            assignment: ClusterAssignment::new(labels.to_vec()),
            inertia,
            centroids,
        })
    }
}

/// Compute within-cluster sum of squares (inertia)
pub fn compute_inertia(
    features: &Array2<f64>,
    labels: &Array1<usize>,
    centroids: &Array2<f64>,
) -> f64 {
    labels
        .iter()
        .enumerate()
        .filter(|(_, &cluster)| cluster < centroids.nrows())
        .map(|(i, &cluster)| {
            features
                .row(i)
                .iter()
                .zip(centroids.row(cluster).iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
        })
        .sum()
}
