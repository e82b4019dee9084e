//! Elbow detection over an inertia curve.
//!
//! Each step of the curve is summarised by the ratio `inertia[k] / inertia[k+1]`.
//! While adding clusters still pays off, consecutive ratios differ a lot; once
//! they flatten out, extra clusters only shave a roughly constant fraction off
//! the error. The elbow is the first place where two consecutive ratios differ
//! by no more than `accepted_variance` percent.
//!
//! The scan is greedy: the first qualifying position wins even if a sharper
//! elbow appears later on the curve.

use crate::curve::InertiaCurve;
use crate::error::{Result, SegmentationError};

/// Default sensitivity, in percent of ratio difference
pub const DEFAULT_ACCEPTED_VARIANCE: f64 = 25.0;

/// Minimum curve length: two ratios are needed to form one difference
pub const MIN_CURVE_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElbowSelector {
    pub accepted_variance: f64,
    /// Returned when no elbow is found; `None` means `curve.len() + 1`
    pub default_tie_break: Option<usize>,
}

impl Default for ElbowSelector {
    fn default() -> Self {
        Self {
            accepted_variance: DEFAULT_ACCEPTED_VARIANCE,
            default_tie_break: None,
        }
    }
}

impl ElbowSelector {
    pub fn new(accepted_variance: f64) -> Self {
        Self {
            accepted_variance,
            ..Self::default()
        }
    }

    pub fn with_default_tie_break(mut self, k: usize) -> Self {
        self.default_tie_break = Some(k);
        self
    }

    /// Pick the cluster count at the first flattening of the ratio series
    pub fn select_cluster_count(&self, curve: &InertiaCurve) -> Result<usize> {
        if curve.len() < MIN_CURVE_LEN {
            return Err(SegmentationError::InsufficientData { len: curve.len() });
        }

        let ratios = ratio_series(curve)?;

        let elbow = ratios
            .windows(2)
            .position(|pair| (pair[0] - pair[1]).abs() * 100.0 <= self.accepted_variance);

        match elbow {
            // ratio i compares k_min+i with k_min+i+1; the latter is the elbow
            Some(i) => {
                let k = curve.k_min() + i + 1;
                tracing::info!(k, accepted_variance = self.accepted_variance, "elbow found");
                Ok(k)
            }
            None => {
                let k = self.default_tie_break.unwrap_or(curve.len() + 1);
                tracing::info!(
                    k,
                    accepted_variance = self.accepted_variance,
                    "no elbow within tolerance, using fallback cluster count"
                );
                Ok(k)
            }
        }
    }
}

/// `inertia[i] / inertia[i + 1]` for every adjacent pair on the curve
pub fn ratio_series(curve: &InertiaCurve) -> Result<Vec<f64>> {
    curve
        .inertias()
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            if pair[1] == 0.0 {
                Err(SegmentationError::DegenerateInertia {
                    k: curve.k_min() + i + 1,
                })
            } else {
                Ok(pair[0] / pair[1])
            }
        })
        .collect()
}

/// Select with the default sensitivity and fallback
pub fn select_cluster_count(curve: &InertiaCurve) -> Result<usize> {
    ElbowSelector::default().select_cluster_count(curve)
}
