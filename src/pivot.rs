// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Pivot Markov chain over self-avoiding walks of fixed length.
//!
//! A move picks an interior site `i` and a non-identity lattice symmetry and
//! applies the symmetry to every site after `i`, holding site `i` fixed. The
//! move is accepted exactly when the result is self-avoiding, which leaves
//! the uniform distribution over `n`-step walks invariant. After burn-in the
//! chain measures the atmosphere at the free end; its mean estimates
//! `c_{n+1} / c_n`, the finite-`n` connectivity constant.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::{seeded_rng, PivotConfig};
use crate::error::{Result, SawError};
use crate::estimate::{Estimate, RunningMean};
use crate::lattice::{LatticePoint, Symmetry};
use crate::walk::{atmosphere, Occupancy};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Result of one chain step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotOutcome {
    Accepted,
    Rejected,
}

/// Result of a pivot run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotReport {
    /// Mean atmosphere over the measurement phase.
    pub estimate: Estimate,
    pub steps: usize,
    pub burn_in: usize,
    /// Accepted moves over burn-in and measurement together.
    pub accepted: u64,
    pub rejected: u64,
}

impl PivotReport {
    pub fn acceptance_rate(&self) -> f64 {
        let total = self.accepted + self.rejected;
        if total == 0 {
            return 0.0;
        }
        self.accepted as f64 / total as f64
    }
}

// ---------------------------------------------------------------------------
// PivotChain
// ---------------------------------------------------------------------------

/// Chain state: the current walk plus a site → index map used both as the
/// occupancy set and to tell prefix collisions from suffix overlaps.
#[derive(Debug, Clone)]
pub struct PivotChain {
    points: Vec<LatticePoint>,
    index: HashMap<LatticePoint, usize>,
    scratch: Vec<LatticePoint>,
    accepted: u64,
    rejected: u64,
}

impl PivotChain {
    /// Straight rod along the x-axis from the origin.
    pub fn straight(steps: usize) -> Result<Self> {
        if steps < 2 {
            return Err(SawError::InvalidWalkLength(steps));
        }
        let last = i32::try_from(steps).map_err(|_| SawError::InvalidWalkLength(steps))?;
        let points: Vec<_> = (0..=last)
            .map(|x| LatticePoint::new(x, 0))
            .collect();
        Ok(Self::from_sites(points))
    }

    fn from_sites(points: Vec<LatticePoint>) -> Self {
        let index = points.iter().enumerate().map(|(i, &p)| (p, i)).collect();
        Self {
            scratch: Vec::with_capacity(points.len()),
            points,
            index,
            accepted: 0,
            rejected: 0,
        }
    }

    pub fn steps(&self) -> usize {
        self.points.len() - 1
    }

    pub fn points(&self) -> &[LatticePoint] {
        &self.points
    }

    pub fn endpoint(&self) -> LatticePoint {
        self.points[self.points.len() - 1]
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Free single-step elongations at the free end.
    pub fn atmosphere(&self) -> usize {
        atmosphere(self.endpoint(), &self.index)
    }

    /// Attempt a specific pivot move.
    ///
    /// The transformed suffix is a lattice isometry of a self-avoiding piece,
    /// so it cannot overlap itself; only collisions with sites `0..=pivot`
    /// need checking. Pivots at either end are rejected as no-ops.
    pub fn try_pivot(&mut self, pivot: usize, symmetry: Symmetry) -> PivotOutcome {
        let n = self.steps();
        if pivot == 0 || pivot >= n {
            self.rejected += 1;
            return PivotOutcome::Rejected;
        }

        let center = self.points[pivot];
        self.scratch.clear();
        for &p in &self.points[pivot + 1..] {
            let q = symmetry.apply_about(center, p);
            if matches!(self.index.get(&q), Some(&j) if j <= pivot) {
                self.rejected += 1;
                return PivotOutcome::Rejected;
            }
            self.scratch.push(q);
        }

        for p in &self.points[pivot + 1..] {
            self.index.remove(p);
        }
        for (offset, &q) in self.scratch.iter().enumerate() {
            let i = pivot + 1 + offset;
            self.points[i] = q;
            self.index.insert(q, i);
        }
        self.accepted += 1;
        PivotOutcome::Accepted
    }

    /// One chain step with a uniformly drawn pivot site and symmetry.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PivotOutcome {
        let pivot = rng.gen_range(1..self.steps());
        let symmetry = Symmetry::NON_IDENTITY[rng.gen_range(0..Symmetry::NON_IDENTITY.len())];
        self.try_pivot(pivot, symmetry)
    }
}

impl Occupancy for PivotChain {
    fn is_occupied(&self, point: LatticePoint) -> bool {
        self.index.contains_key(&point)
    }
}

// ---------------------------------------------------------------------------
// Estimators
// ---------------------------------------------------------------------------

/// Run a pivot chain: `burn_in` discarded steps, then `pivot_attempts`
/// measured steps.
#[instrument(level = "debug", skip_all, fields(steps = config.steps, attempts = config.pivot_attempts, burn_in = config.burn_in))]
pub fn run_pivot(config: &PivotConfig) -> Result<PivotReport> {
    config.validate()?;
    let mut rng = seeded_rng(config.seed);
    let mut chain = PivotChain::straight(config.steps)?;

    for _ in 0..config.burn_in {
        chain.step(&mut rng);
    }
    debug!(
        accepted = chain.accepted(),
        rejected = chain.rejected(),
        "burn-in finished"
    );

    let mut atmospheres = RunningMean::new();
    for _ in 0..config.pivot_attempts {
        chain.step(&mut rng);
        atmospheres.push(chain.atmosphere() as f64);
    }

    let report = PivotReport {
        estimate: atmospheres.finish(),
        steps: config.steps,
        burn_in: config.burn_in,
        accepted: chain.accepted(),
        rejected: chain.rejected(),
    };
    debug!(
        mu = report.estimate.value,
        acceptance_rate = report.acceptance_rate(),
        "pivot run finished"
    );
    Ok(report)
}

/// Pivot estimate of `μ_n` for walks of `steps` steps.
pub fn run_pivot_get_mu_estimate(
    steps: usize,
    pivot_attempts: usize,
    burn_in: usize,
    seed: Option<u64>,
) -> Result<Estimate> {
    let config = PivotConfig::new(steps, pivot_attempts, burn_in, seed);
    Ok(run_pivot(&config)?.estimate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
