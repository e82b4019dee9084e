//! Inertia curve over a range of candidate cluster counts

use crate::data::PointSet;
use crate::error::{Result, SegmentationError};
use crate::model::ClusterFitter;
use rayon::prelude::*;

/// Inertia per cluster count, starting at `k_min` and increasing by one
#[derive(Debug, Clone, PartialEq)]
pub struct InertiaCurve {
    k_min: usize,
    inertias: Vec<f64>,
}

impl InertiaCurve {
    pub fn new(k_min: usize, inertias: Vec<f64>) -> Self {
        Self { k_min, inertias }
    }

    pub fn k_min(&self) -> usize {
        self.k_min
    }

    /// Largest cluster count on the curve (`k_min - 1` when empty)
    pub fn k_max(&self) -> usize {
        (self.k_min + self.inertias.len()).saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.inertias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inertias.is_empty()
    }

    pub fn inertias(&self) -> &[f64] {
        &self.inertias
    }

    pub fn inertia_at(&self, k: usize) -> Option<f64> {
        k.checked_sub(self.k_min)
            .and_then(|i| self.inertias.get(i))
            .copied()
    }

    /// `(cluster_count, inertia)` pairs in increasing cluster count
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.inertias
            .iter()
            .enumerate()
            .map(move |(i, &inertia)| (self.k_min + i, inertia))
    }

    /// True when inertia never rises as k grows
    pub fn is_monotonic(&self) -> bool {
        self.inertias.windows(2).all(|w| w[1] <= w[0])
    }
}

/// Fits every candidate cluster count and records the resulting inertia
///
/// There is no per-fit timeout: each fit runs until the fitter returns, so the
/// total time is bounded only by the fitter's own limits (for
/// [`KMeansFitter`](crate::model::KMeansFitter), `max_iterations`). Callers
/// that need a deadline should bound the fitter or run the build on a thread
/// they can abandon.
#[derive(Debug, Clone, Copy, Default)]
pub struct InertiaCurveBuilder {
    parallel: bool,
}

impl InertiaCurveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the fits on the rayon pool instead of one after another
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fit `k_min..=k_max` clusters and collect one inertia per k.
    ///
    /// Fitting errors are propagated as-is. When several k fail, the smallest
    /// one is reported regardless of execution order.
    pub fn build_curve<F: ClusterFitter + ?Sized>(
        &self,
        points: &PointSet,
        fitter: &F,
        k_min: usize,
        k_max: usize,
    ) -> Result<InertiaCurve> {
        if k_min < 1 || k_max < k_min {
            return Err(SegmentationError::InvalidRange { k_min, k_max });
        }

        let fit_one = |k: usize| fitter.fit(points, k).map(|fit| fit.inertia);

        // collect() into Result keeps index order, so inertias line up with k
        let inertias: Vec<f64> = if self.parallel {
            (k_min..=k_max)
                .into_par_iter()
                .map(fit_one)
                .collect::<Vec<_>>()
                .into_iter()
                .collect::<Result<_>>()?
        } else {
            (k_min..=k_max).map(fit_one).collect::<Result<_>>()?
        };

        let curve = InertiaCurve::new(k_min, inertias);
        if !curve.is_monotonic() {
            tracing::warn!(
                k_min,
                k_max,
                "inertia rises with k somewhere on the curve; the fitter may be stuck in a local optimum"
            );
        }

        Ok(curve)
    }
}

/// Build a sequential curve for `k_min..=k_max`
pub fn build_curve<F: ClusterFitter + ?Sized>(
    points: &PointSet,
    fitter: &F,
    k_min: usize,
    k_max: usize,
) -> Result<InertiaCurve> {
    InertiaCurveBuilder::new().build_curve(points, fitter, k_min, k_max)
}
