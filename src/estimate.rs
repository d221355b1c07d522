// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Estimator aggregation.
//!
//! Pure reductions: per-trial weights (Rosenbluth, PERM) or per-step
//! atmosphere counts (pivot) in, one [`Estimate`] out. No sampling happens
//! here.

use serde::{Deserialize, Serialize};

use crate::weight::{LogSumExp, LogWeight};

// ---------------------------------------------------------------------------
// Estimate
// ---------------------------------------------------------------------------

/// A scalar estimate with the sample bookkeeping needed for error analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Arithmetic mean of the samples.
    pub value: f64,
    /// Natural log of `value`; stays finite when `value` overflows `f64`.
    pub ln_value: f64,
    /// Number of samples (root trials, or measured chain steps).
    pub samples: usize,
    /// Unbiased sample variance of a single sample.
    pub variance: f64,
    /// Natural log of `variance`; `-inf` when the variance is zero.
    pub ln_variance: f64,
    /// Kish effective sample size, `(sum w)^2 / sum w^2`.
    pub effective_samples: f64,
}

impl Estimate {
    /// Standard error of the mean.
    pub fn std_error(&self) -> f64 {
        self.ln_std_error().exp()
    }

    /// Natural log of the standard error; finite even when `std_error`
    /// overflows.
    pub fn ln_std_error(&self) -> f64 {
        if self.samples == 0 || self.ln_variance == f64::NEG_INFINITY {
            return f64::NEG_INFINITY;
        }
        0.5 * (self.ln_variance - (self.samples as f64).ln())
    }

    /// Standard error over the mean, or `None` for a zero estimate.
    pub fn relative_std_error(&self) -> Option<f64> {
        if self.ln_value == f64::NEG_INFINITY {
            return None;
        }
        Some((self.ln_std_error() - self.ln_value).exp())
    }

    /// `c_L^(1/L)`, the finite-length connectivity constant implied by a
    /// count estimate.
    pub fn mu_estimate(&self, length: usize) -> Option<f64> {
        if length == 0 || !(self.value > 0.0) {
            return None;
        }
        Some((self.ln_value / length as f64).exp())
    }
}

// ---------------------------------------------------------------------------
// WeightAccumulator
// ---------------------------------------------------------------------------

/// Mean and variance of log-domain weights.
///
/// First and second moments are both kept as [`LogSumExp`] so that a run
/// mixing `10^30` weights with zeros never loses precision.
#[derive(Debug, Clone, Default)]
pub struct WeightAccumulator {
    sum: LogSumExp,
    sum_sq: LogSumExp,
    samples: usize,
    nonzero: usize,
    /// Smallest and largest `ln w` pushed, zeros included.
    ln_range: Option<(f64, f64)>,
}

impl WeightAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one trial's total weight. Zero weights count as samples.
    pub fn push(&mut self, weight: LogWeight) {
        self.samples += 1;
        let ln = weight.ln();
        self.ln_range = Some(match self.ln_range {
            Some((lo, hi)) => (lo.min(ln), hi.max(ln)),
            None => (ln, ln),
        });
        if weight.is_zero() {
            return;
        }
        self.nonzero += 1;
        self.sum.add(weight);
        self.sum_sq.add(weight.squared());
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Samples that carried a positive weight.
    pub fn nonzero(&self) -> usize {
        self.nonzero
    }

    pub fn mean(&self) -> LogWeight {
        if self.samples == 0 {
            return LogWeight::ZERO;
        }
        LogWeight::from_ln(self.sum.total().ln() - (self.samples as f64).ln())
    }

    /// Every pushed weight was identical. Rounding in the moment ratio would
    /// otherwise leave a tiny positive variance that overflows for huge weights.
    fn is_constant(&self) -> bool {
        matches!(self.ln_range, Some((lo, hi)) if lo == hi)
    }

    pub fn finish(&self) -> Estimate {
        let mean = self.mean();
        let n = self.samples as f64;

        let (ln_variance, effective_samples) = if mean.is_zero() {
            (f64::NEG_INFINITY, 0.0)
        } else {
            let ln_sum = self.sum.total().ln();
            let ln_sum_sq = self.sum_sq.total().ln();
            // Var / E[w]^2 = E[w^2] / E[w]^2 - 1, a plain ratio of order n at most.
            let relative = (ln_sum_sq - n.ln() - 2.0 * mean.ln()).exp() - 1.0;
            let ln_variance = if self.samples > 1 && relative > 0.0 && !self.is_constant() {
                2.0 * mean.ln() + relative.ln() + (n / (n - 1.0)).ln()
            } else {
                f64::NEG_INFINITY
            };
            (ln_variance, (2.0 * ln_sum - ln_sum_sq).exp())
        };

        Estimate {
            value: mean.value(),
            ln_value: mean.ln(),
            samples: self.samples,
            variance: ln_variance.exp(),
            ln_variance,
            effective_samples,
        }
    }
}

// ---------------------------------------------------------------------------
// RunningMean
// ---------------------------------------------------------------------------

/// Welford running mean and variance for plain-valued samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMean {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningMean {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        if self.count > 1 {
            self.m2 / (self.count - 1) as f64
        } else {
            0.0
        }
    }

    /// Chain samples are correlated, so `effective_samples` reports the raw
    /// count rather than an autocorrelation-corrected one.
    pub fn finish(&self) -> Estimate {
        Estimate {
            value: self.mean,
            ln_value: if self.mean > 0.0 {
                self.mean.ln()
            } else {
                f64::NEG_INFINITY
            },
            samples: self.count,
            variance: self.variance(),
            ln_variance: self.variance().ln(),
            effective_samples: self.count as f64,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
