// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Estimator configuration and seeding.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SawError};

/// Seed used when a caller does not supply one. There is no entropy source:
/// an unseeded run is as reproducible as a seeded one.
pub const DEFAULT_SEED: u64 = 42;

/// Deterministic generator for a run.
pub fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed.unwrap_or(DEFAULT_SEED))
}

// ---------------------------------------------------------------------------
// SamplerConfig (naive and Rosenbluth)
// ---------------------------------------------------------------------------

/// Parameters shared by the independent-trial estimators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Target walk length `L` (number of steps).
    pub length: usize,
    /// Number of independent trials.
    pub trials: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            length: 10,
            trials: 100_000,
            seed: None,
        }
    }
}

impl SamplerConfig {
    pub fn new(length: usize, trials: usize, seed: Option<u64>) -> Self {
        Self {
            length,
            trials,
            seed,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_length_and_trials(self.length, self.trials)
    }
}

fn validate_length_and_trials(length: usize, trials: usize) -> Result<()> {
    if length == 0 {
        return Err(SawError::InvalidLength(length));
    }
    if trials == 0 {
        return Err(SawError::InvalidTrials(trials));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PermConfig
// ---------------------------------------------------------------------------

/// How PERM redistributes weight among partial walks at each depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlStrategy {
    /// Prune below `c_minus * W̄_d`, enrich above `c_plus * W̄_d`.
    Threshold { c_minus: f64, c_plus: f64 },
    /// Stochastic copy count with mean `w / Ŵ_d`, each copy carrying `Ŵ_d`,
    /// where `Ŵ_d = Z_d / tours` is the weight at depth `d` per root tour.
    Ratio,
}

impl Default for ControlStrategy {
    fn default() -> Self {
        ControlStrategy::Threshold {
            c_minus: 0.2,
            c_plus: 3.0,
        }
    }
}

impl ControlStrategy {
    pub fn validate(&self) -> Result<()> {
        match *self {
            ControlStrategy::Threshold { c_minus, c_plus } => {
                let ordered = c_minus > 0.0 && c_minus < 1.0 && c_plus > 1.0;
                if !ordered || !c_plus.is_finite() {
                    return Err(SawError::InvalidThresholds { c_minus, c_plus });
                }
                Ok(())
            }
            ControlStrategy::Ratio => Ok(()),
        }
    }
}

/// Parameters for a PERM run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PermConfig {
    pub length: usize,
    /// Number of root trials; clones created by enrichment are not counted.
    pub trials: usize,
    #[serde(default)]
    pub control: ControlStrategy,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PermConfig {
    fn default() -> Self {
        Self {
            length: 10,
            trials: 100_000,
            control: ControlStrategy::default(),
            seed: None,
        }
    }
}

impl PermConfig {
    pub fn threshold(length: usize, trials: usize, c_minus: f64, c_plus: f64) -> Self {
        Self {
            length,
            trials,
            control: ControlStrategy::Threshold { c_minus, c_plus },
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_length_and_trials(self.length, self.trials)?;
        self.control.validate()
    }
}

// ---------------------------------------------------------------------------
// PivotConfig
// ---------------------------------------------------------------------------

/// Parameters for one pivot chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotConfig {
    /// Fixed walk length `n` (number of steps).
    pub steps: usize,
    /// Measured chain steps after burn-in.
    pub pivot_attempts: usize,
    /// Discarded chain steps before measurement.
    #[serde(default)]
    pub burn_in: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            steps: 100,
            pivot_attempts: 20_000,
            burn_in: 2_000,
            seed: None,
        }
    }
}

impl PivotConfig {
    pub fn new(steps: usize, pivot_attempts: usize, burn_in: usize, seed: Option<u64>) -> Self {
        Self {
            steps,
            pivot_attempts,
            burn_in,
            seed,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.steps < 2 {
            return Err(SawError::InvalidWalkLength(self.steps));
        }
        if self.pivot_attempts == 0 {
            return Err(SawError::InvalidPivotAttempts(self.pivot_attempts));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn sampler_rejects_zero_length_and_trials() {
        assert_eq!(
            SamplerConfig::new(0, 10, None).validate(),
            Err(SawError::InvalidLength(0))
        );
        assert_eq!(
            SamplerConfig::new(5, 0, None).validate(),
            Err(SawError::InvalidTrials(0))
        );
        assert!(SamplerConfig::default().validate().is_ok());
    }

    #[test]
    fn thresholds_must_bracket_one() {
        for (c_minus, c_plus) in [(0.5, 0.5), (1.0, 3.0), (0.2, 1.0), (3.0, 0.2), (0.0, 2.0)] {
            let err = ControlStrategy::Threshold { c_minus, c_plus }.validate();
            assert!(
                matches!(err, Err(SawError::InvalidThresholds { .. })),
                "({c_minus}, {c_plus}) should be rejected"
            );
        }
        assert!(ControlStrategy::Threshold {
            c_minus: 0.2,
            c_plus: f64::INFINITY
        }
        .validate()
        .is_err());
        assert!(ControlStrategy::Threshold {
            c_minus: f64::NAN,
            c_plus: 3.0
        }
        .validate()
        .is_err());
        assert!(ControlStrategy::default().validate().is_ok());
        assert!(ControlStrategy::Ratio.validate().is_ok());
    }

    #[test]
    fn pivot_rejects_unpivotable_lengths() {
        for steps in [0, 1] {
            assert_eq!(
                PivotConfig::new(steps, 100, 0, None).validate(),
                Err(SawError::InvalidWalkLength(steps))
            );
        }
        assert_eq!(
            PivotConfig::new(10, 0, 0, None).validate(),
            Err(SawError::InvalidPivotAttempts(0))
        );
        assert!(PivotConfig::new(2, 1, 0, None).validate().is_ok());
    }

    #[test]
    fn missing_seed_falls_back_to_default() {
        let a: u64 = seeded_rng(None).gen();
        let b: u64 = seeded_rng(Some(DEFAULT_SEED)).gen();
        let c: u64 = seeded_rng(Some(DEFAULT_SEED + 1)).gen();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
