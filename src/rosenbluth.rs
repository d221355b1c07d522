// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Sequential growth with importance weights.
//!
//! Two proposal rules share one grower:
//!
//! - [`Proposal::Rosenbluth`] picks uniformly among the free neighbours and
//!   multiplies the weight by their count `k`, so the mean weight over trials
//!   is an unbiased estimate of `c_L`.
//! - [`Proposal::Blind`] picks uniformly among all four directions; a walk
//!   that steps onto itself dies, one that survives carries `4^L`.
//!
//! Trapped or collided trials contribute a zero weight but still count as
//! trials.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::{seeded_rng, SamplerConfig};
use crate::error::Result;
use crate::estimate::{Estimate, WeightAccumulator};
use crate::lattice::{LatticePoint, COORDINATION, STEPS};
use crate::walk::Walk;
use crate::weight::LogWeight;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Rule for proposing the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proposal {
    Blind,
    Rosenbluth,
}

/// How a single growth attempt ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrowthOutcome {
    /// Reached the target length carrying this weight.
    Completed(LogWeight),
    /// No free neighbour after `steps` steps.
    Trapped { steps: usize },
    /// A blind step landed on an occupied site after `steps` steps.
    Collided { steps: usize },
}

impl GrowthOutcome {
    /// The trial's contribution to the `c_L` estimate.
    pub fn weight(&self) -> LogWeight {
        match self {
            GrowthOutcome::Completed(w) => *w,
            GrowthOutcome::Trapped { .. } | GrowthOutcome::Collided { .. } => LogWeight::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Grower
// ---------------------------------------------------------------------------

/// Extend `walk` in place until it has `target` steps.
///
/// The returned weight covers only the steps added by this call.
pub fn grow<R: Rng + ?Sized>(
    walk: &mut Walk,
    target: usize,
    proposal: Proposal,
    rng: &mut R,
) -> GrowthOutcome {
    let mut weight = LogWeight::ONE;
    while walk.steps() < target {
        match proposal {
            Proposal::Rosenbluth => {
                let candidates = walk.candidates();
                if candidates.is_empty() {
                    return GrowthOutcome::Trapped {
                        steps: walk.steps(),
                    };
                }
                let k = candidates.len();
                let next = candidates.as_slice()[rng.gen_range(0..k)];
                weight = weight.scaled(k);
                let extended = walk.extend(next);
                debug_assert!(extended, "enumerator offered an occupied site");
            }
            Proposal::Blind => {
                let next = walk.endpoint() + STEPS[rng.gen_range(0..COORDINATION)];
                if !walk.extend(next) {
                    return GrowthOutcome::Collided {
                        steps: walk.steps(),
                    };
                }
                weight = weight.scaled(COORDINATION);
            }
        }
    }
    GrowthOutcome::Completed(weight)
}

// ---------------------------------------------------------------------------
// Estimators
// ---------------------------------------------------------------------------

/// Run `config.trials` independent growths from the origin and average their
/// weights.
#[instrument(level = "debug", skip_all, fields(length = config.length, trials = config.trials, ?proposal))]
pub fn estimate_with(config: &SamplerConfig, proposal: Proposal) -> Result<Estimate> {
    config.validate()?;
    let mut rng = seeded_rng(config.seed);
    let mut acc = WeightAccumulator::new();
    let mut walk = Walk::with_capacity(LatticePoint::ORIGIN, config.length);
    let mut failed = 0usize;

    for _ in 0..config.trials {
        while walk.retract().is_some() {}
        let outcome = grow(&mut walk, config.length, proposal, &mut rng);
        if !matches!(outcome, GrowthOutcome::Completed(_)) {
            failed += 1;
        }
        acc.push(outcome.weight());
    }

    let estimate = acc.finish();
    debug!(
        value = estimate.value,
        std_error = estimate.std_error(),
        failed,
        "growth run finished"
    );
    if acc.nonzero() == 0 {
        warn!(
            length = config.length,
            trials = config.trials,
            "every trial failed; estimate is zero"
        );
    }
    Ok(estimate)
}

/// Blind random-walk estimate of `c_L`: the surviving fraction times `4^L`.
pub fn estimate_cl_naive(length: usize, trials: usize, seed: Option<u64>) -> Result<Estimate> {
    estimate_with(&SamplerConfig::new(length, trials, seed), Proposal::Blind)
}

/// Rosenbluth-weighted estimate of `c_L`.
pub fn rosenbluth_estimate_cl(length: usize, trials: usize, seed: Option<u64>) -> Result<Estimate> {
    estimate_with(&SamplerConfig::new(length, trials, seed), Proposal::Rosenbluth)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
