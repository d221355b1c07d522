// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Post-processing of estimates against exact counts and across lengths.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SawError};
use crate::exact::exact_count;

/// `|estimate - c_L| / c_L` against the tabulated count.
pub fn relative_deviation(estimate: f64, length: usize) -> Result<f64> {
    let reference = exact_count(length).ok_or(SawError::NoExactValue(length))? as f64;
    Ok((estimate - reference).abs() / reference)
}

/// Straight-line fit of `μ_n` against `1/n`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extrapolation {
    /// Intercept at `1/n = 0`.
    pub mu_infinity: f64,
    /// Leading finite-size correction.
    pub slope: f64,
    /// Number of `(n, μ_n)` points used.
    pub points: usize,
}

/// Least-squares extrapolation of finite-`n` estimates `(n, μ_n)` to
/// `n → ∞`, assuming `μ_n ≈ μ + a/n`.
///
/// Needs at least two distinct, non-zero walk lengths.
pub fn extrapolate_mu(estimates: &[(usize, f64)]) -> Result<Extrapolation> {
    let xs: Vec<(f64, f64)> = estimates
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|&(n, mu)| (1.0 / n as f64, mu))
        .collect();

    let mut distinct: Vec<usize> = estimates.iter().map(|&(n, _)| n).filter(|&n| n > 0).collect();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() < 2 {
        return Err(SawError::NotEnoughPoints(distinct.len()));
    }

    let count = xs.len() as f64;
    let mean_x = xs.iter().map(|(x, _)| x).sum::<f64>() / count;
    let mean_y = xs.iter().map(|(_, y)| y).sum::<f64>() / count;
    let (sxy, sxx) = xs.iter().fold((0.0, 0.0), |(sxy, sxx), &(x, y)| {
        let dx = x - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });
    let slope = sxy / sxx;

    Ok(Extrapolation {
        mu_infinity: mean_y - slope * mean_x,
        slope,
        points: xs.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deviation_against_table() {
        let dev = relative_deviation(45_000.0, 10).expect("tabulated");
        assert!((dev - 900.0 / 44_100.0).abs() < 1e-12);
        assert_eq!(relative_deviation(12.0, 2), Ok(0.0));
        assert_eq!(
            relative_deviation(1.0, 72),
            Err(SawError::NoExactValue(72))
        );
    }

    #[test]
    fn exact_line_is_recovered() {
        let points: Vec<_> = [10, 20, 40, 80]
            .into_iter()
            .map(|n| (n, 2.638 + 0.5 / n as f64))
            .collect();
        let fit = extrapolate_mu(&points).expect("enough points");
        assert!((fit.mu_infinity - 2.638).abs() < 1e-12);
        assert!((fit.slope - 0.5).abs() < 1e-9);
        assert_eq!(fit.points, 4);
    }

    #[test]
    fn tabulated_ratios_extrapolate_near_mu() {
        let points: Vec<_> = (30..71)
            .map(|n| {
                let ratio = crate::exact::EXACT_COUNTS[n + 1] as f64
                    / crate::exact::EXACT_COUNTS[n] as f64;
                (n, ratio)
            })
            .collect();
        let fit = extrapolate_mu(&points).expect("enough points");
        assert!((fit.mu_infinity - 2.638).abs() < 0.01, "got {}", fit.mu_infinity);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert_eq!(extrapolate_mu(&[]), Err(SawError::NotEnoughPoints(0)));
        assert_eq!(
            extrapolate_mu(&[(10, 2.7), (10, 2.71)]),
            Err(SawError::NotEnoughPoints(1))
        );
    }
}
