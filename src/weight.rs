// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Log-domain weights.
//!
//! Rosenbluth and PERM weights span dozens of orders of magnitude for long
//! walks (`c_71` is above `10^30`), so they are carried as `ln w` and only
//! exponentiated when an [`Estimate`](crate::estimate::Estimate) is built.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::f64::consts::LN_2;
use std::fmt;

// ---------------------------------------------------------------------------
// LogWeight
// ---------------------------------------------------------------------------

/// A non-negative weight stored as its natural logarithm.
///
/// Zero is `ln w = -inf`; arithmetic on it stays at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogWeight(f64);

impl LogWeight {
    pub const ZERO: Self = Self(f64::NEG_INFINITY);
    pub const ONE: Self = Self(0.0);

    pub fn from_ln(ln: f64) -> Self {
        Self(ln)
    }

    /// Convert a plain weight. Negative and NaN inputs map to zero.
    pub fn from_value(value: f64) -> Self {
        if value > 0.0 {
            Self(value.ln())
        } else {
            Self::ZERO
        }
    }

    pub fn ln(self) -> f64 {
        self.0
    }

    pub fn value(self) -> f64 {
        self.0.exp()
    }

    pub fn is_zero(self) -> bool {
        self.0 == f64::NEG_INFINITY
    }

    /// Multiply by a candidate count (the Rosenbluth factor).
    pub fn scaled(self, factor: usize) -> Self {
        if factor == 0 {
            Self::ZERO
        } else {
            Self(self.0 + (factor as f64).ln())
        }
    }

    pub fn doubled(self) -> Self {
        Self(self.0 + LN_2)
    }

    pub fn halved(self) -> Self {
        Self(self.0 - LN_2)
    }

    /// `self / other` as a plain number. Zero over anything is zero.
    pub fn ratio(self, other: LogWeight) -> f64 {
        if self.is_zero() {
            0.0
        } else {
            (self.0 - other.0).exp()
        }
    }

    /// Square of the weight, used for second moments.
    pub fn squared(self) -> Self {
        Self(2.0 * self.0)
    }
}

impl Default for LogWeight {
    fn default() -> Self {
        Self::ONE
    }
}

impl PartialOrd for LogWeight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl fmt::Display for LogWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exp({:.6})", self.0)
    }
}

// ---------------------------------------------------------------------------
// LogSumExp
// ---------------------------------------------------------------------------

/// Streaming sum of [`LogWeight`]s.
///
/// Holds the running maximum and the sum of `exp(ln w - max)`, rescaling when
/// a new maximum arrives, so no term is ever exponentiated at full magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogSumExp {
    max: f64,
    scaled_sum: f64,
}

impl LogSumExp {
    pub fn new() -> Self {
        Self {
            max: f64::NEG_INFINITY,
            scaled_sum: 0.0,
        }
    }

    pub fn add(&mut self, w: LogWeight) {
        if w.is_zero() {
            return;
        }
        if w.0 <= self.max {
            self.scaled_sum += (w.0 - self.max).exp();
        } else {
            self.scaled_sum = self.scaled_sum * (self.max - w.0).exp() + 1.0;
            self.max = w.0;
        }
    }

    pub fn total(&self) -> LogWeight {
        if self.scaled_sum > 0.0 {
            LogWeight(self.max + self.scaled_sum.ln())
        } else {
            LogWeight::ZERO
        }
    }
}

impl Default for LogSumExp {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn scaling_multiplies() {
        let w = LogWeight::ONE.scaled(4).scaled(3).scaled(3);
        assert!(close(w.value(), 36.0));
        assert!(LogWeight::ONE.scaled(0).is_zero());
    }

    #[test]
    fn zero_absorbs_arithmetic() {
        let z = LogWeight::ZERO;
        assert!(z.doubled().is_zero());
        assert!(z.scaled(4).is_zero());
        assert_eq!(z.value(), 0.0);
        assert_eq!(z.ratio(LogWeight::ONE), 0.0);
    }

    #[test]
    fn double_then_halve_round_trips() {
        let w = LogWeight::from_value(17.5);
        assert!(close(w.doubled().halved().value(), 17.5));
        assert!(close(w.doubled().value(), 35.0));
    }

    #[test]
    fn log_sum_exp_matches_plain_sum() {
        let mut acc = LogSumExp::new();
        for v in [3.0, 0.0, 1e-3, 250.0, 7.25] {
            acc.add(LogWeight::from_value(v));
        }
        assert!(close(acc.total().value(), 260.251));
    }

    #[test]
    fn log_sum_exp_survives_huge_magnitudes() {
        // 4^600 overflows f64; its log does not.
        let big = LogWeight::ONE;
        let big = (0..600).fold(big, |w, _| w.scaled(4));
        let mut acc = LogSumExp::new();
        acc.add(big);
        acc.add(big);
        let expected = 600.0 * 4f64.ln() + LN_2;
        assert!(close(acc.total().ln(), expected));
    }

    #[test]
    fn empty_sum_is_zero() {
        assert!(LogSumExp::new().total().is_zero());
    }
}
