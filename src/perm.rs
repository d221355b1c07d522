// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Pruned-Enriched Rosenbluth Method.
//!
//! Each root trial grows a tree of partial walks. After every Rosenbluth
//! step the node's weight is compared against the running mean weight
//! `W̄_d` at its depth and the node is pruned, enriched or left alone. Every
//! decision preserves the expected weight, so the mean over root trials of
//! the summed leaf weights remains an unbiased estimate of `c_L`.
//!
//! The tree is explored depth-first from an explicit stack. Clones produced
//! by enrichment own a copy of the walk; nothing is shared between branches.
//! [`DepthStatistics`] persists across all trials of a run.
//!
//! Threshold control compares against the mean weight per visit at a depth.
//! Ratio control compares against the weight per root tour, `Z_d / tours`,
//! so that a depth visited many times within one tour raises its own bar and
//! the population per tour stays flat.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::config::{seeded_rng, ControlStrategy, PermConfig};
use crate::error::Result;
use crate::estimate::{Estimate, WeightAccumulator};
use crate::lattice::LatticePoint;
use crate::walk::Walk;
use crate::weight::{LogSumExp, LogWeight};

// ---------------------------------------------------------------------------
// Running depth statistics
// ---------------------------------------------------------------------------

/// Per-depth observation count and weight sum for one PERM run.
#[derive(Debug, Clone)]
pub struct DepthStatistics {
    counts: Vec<u64>,
    sums: Vec<LogSumExp>,
    tours: u64,
}

impl DepthStatistics {
    /// Statistics for depths `0..=max_depth`.
    pub fn new(max_depth: usize) -> Self {
        Self {
            counts: vec![0; max_depth + 1],
            sums: vec![LogSumExp::new(); max_depth + 1],
            tours: 0,
        }
    }

    /// Mark the start of a new root tour.
    pub fn begin_tour(&mut self) {
        self.tours += 1;
    }

    pub fn tours(&self) -> u64 {
        self.tours
    }

    pub fn record(&mut self, depth: usize, weight: LogWeight) {
        self.counts[depth] += 1;
        self.sums[depth].add(weight);
    }

    pub fn count(&self, depth: usize) -> u64 {
        self.counts.get(depth).copied().unwrap_or(0)
    }

    /// Mean weight at `depth`, or `None` before the first observation.
    pub fn mean(&self, depth: usize) -> Option<LogWeight> {
        let count = self.count(depth);
        if count == 0 {
            return None;
        }
        let total = self.sums[depth].total();
        Some(LogWeight::from_ln(total.ln() - (count as f64).ln()))
    }

    /// Weight at `depth` per root tour, `Z_d / tours`, or `None` before the
    /// first observation.
    pub fn per_tour(&self, depth: usize) -> Option<LogWeight> {
        if self.count(depth) == 0 || self.tours == 0 {
            return None;
        }
        let total = self.sums[depth].total();
        Some(LogWeight::from_ln(total.ln() - (self.tours as f64).ln()))
    }
}

// ---------------------------------------------------------------------------
// Population control
// ---------------------------------------------------------------------------

/// Outcome of a population-control decision for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Carry on as a single successor.
    Continue { weight: LogWeight },
    /// Under-weight node that won the pruning coin; its weight is doubled.
    Survived { weight: LogWeight },
    /// Under-weight node that lost the pruning coin.
    Killed,
    /// Replace the node by `copies` independent successors.
    Enriched { copies: usize, weight: LogWeight },
}

impl Decision {
    /// Number of successors and the weight each one carries.
    pub fn successors(&self) -> (usize, LogWeight) {
        match *self {
            Decision::Continue { weight } | Decision::Survived { weight } => (1, weight),
            Decision::Killed => (0, LogWeight::ZERO),
            Decision::Enriched { copies, weight } => (copies, weight),
        }
    }
}

/// Threshold rule with the pruning coin supplied by the caller.
///
/// Below `c_minus * mean` the node survives with doubled weight when
/// `survive` is true and dies otherwise. Above `c_plus * mean` it splits into
/// two halves. In between it is left alone.
pub fn threshold_decision(
    weight: LogWeight,
    mean: LogWeight,
    c_minus: f64,
    c_plus: f64,
    survive: bool,
) -> Decision {
    if weight.ln() < mean.ln() + c_minus.ln() {
        if survive {
            Decision::Survived {
                weight: weight.doubled(),
            }
        } else {
            Decision::Killed
        }
    } else if weight.ln() > mean.ln() + c_plus.ln() {
        Decision::Enriched {
            copies: 2,
            weight: weight.halved(),
        }
    } else {
        Decision::Continue { weight }
    }
}

/// Ratio rule: `floor(w / mean + uniform)` copies, each carrying `mean`.
///
/// `uniform` must lie in `[0, 1)`; the copy count then has expectation
/// `w / mean`.
pub fn ratio_decision(weight: LogWeight, mean: LogWeight, uniform: f64) -> Decision {
    let copies = (weight.ratio(mean) + uniform).floor() as usize;
    match copies {
        0 => Decision::Killed,
        1 => Decision::Continue { weight: mean },
        copies => Decision::Enriched {
            copies,
            weight: mean,
        },
    }
}

impl ControlStrategy {
    /// Reference weight this strategy compares a node at `depth` against.
    pub fn reference(&self, stats: &DepthStatistics, depth: usize) -> Option<LogWeight> {
        match self {
            ControlStrategy::Threshold { .. } => stats.mean(depth),
            ControlStrategy::Ratio => stats.per_tour(depth),
        }
    }

    /// Decide a node's fate. With no statistics yet at its depth the node
    /// continues unchanged and no randomness is consumed.
    pub fn decide<R: Rng + ?Sized>(
        &self,
        weight: LogWeight,
        mean: Option<LogWeight>,
        rng: &mut R,
    ) -> Decision {
        let Some(mean) = mean else {
            return Decision::Continue { weight };
        };
        match *self {
            ControlStrategy::Threshold { c_minus, c_plus } => {
                let under = weight.ln() < mean.ln() + c_minus.ln();
                let survive = under && rng.gen_bool(0.5);
                threshold_decision(weight, mean, c_minus, c_plus, survive)
            }
            ControlStrategy::Ratio => ratio_decision(weight, mean, rng.gen::<f64>()),
        }
    }
}

// ---------------------------------------------------------------------------
// Growth tree
// ---------------------------------------------------------------------------

/// Node of the growth tree. Its depth is `walk.steps()`.
#[derive(Debug, Clone)]
pub struct GrowthNode {
    pub walk: Walk,
    pub weight: LogWeight,
}

/// Event counters for a PERM run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermCounters {
    /// Leaves that reached the target length.
    pub completed: u64,
    /// Nodes with no free neighbour.
    pub trapped: u64,
    /// Nodes killed by pruning.
    pub killed: u64,
    /// Nodes that survived pruning with doubled weight.
    pub survived: u64,
    /// Enrichment events.
    pub enriched: u64,
    /// Extra successors created by enrichment.
    pub clones: u64,
    /// Largest number of pending nodes on the work stack.
    pub peak_stack: usize,
}

impl PermCounters {
    fn tally(&mut self, decision: &Decision) {
        match *decision {
            Decision::Continue { .. } => {}
            Decision::Survived { .. } => self.survived += 1,
            Decision::Killed => self.killed += 1,
            Decision::Enriched { copies, .. } => {
                self.enriched += 1;
                self.clones += copies.saturating_sub(1) as u64;
            }
        }
    }
}

/// Run-scoped state threaded through every growth tree of one PERM run.
#[derive(Debug, Clone)]
pub struct PermContext {
    target: usize,
    strategy: ControlStrategy,
    stats: DepthStatistics,
    counters: PermCounters,
}

impl PermContext {
    pub fn new(target: usize, strategy: ControlStrategy) -> Self {
        Self {
            target,
            strategy,
            stats: DepthStatistics::new(target),
            counters: PermCounters::default(),
        }
    }

    pub fn stats(&self) -> &DepthStatistics {
        &self.stats
    }

    pub fn counters(&self) -> &PermCounters {
        &self.counters
    }

    /// Grow the tree rooted at `root` to completion and return the summed
    /// weight of its leaves at the target length.
    pub fn grow_tree<R: Rng + ?Sized>(&mut self, root: Walk, rng: &mut R) -> LogWeight {
        self.stats.begin_tour();
        let mut total = LogSumExp::new();
        let mut stack = vec![GrowthNode {
            walk: root,
            weight: LogWeight::ONE,
        }];

        while let Some(GrowthNode { mut walk, weight }) = stack.pop() {
            if walk.steps() >= self.target {
                self.counters.completed += 1;
                total.add(weight);
                continue;
            }

            let candidates = walk.candidates();
            if candidates.is_empty() {
                self.counters.trapped += 1;
                continue;
            }
            let k = candidates.len();
            let extended = walk.extend(candidates.as_slice()[rng.gen_range(0..k)]);
            debug_assert!(extended, "enumerator offered an occupied site");
            let weight = weight.scaled(k);
            let depth = walk.steps();
            self.stats.record(depth, weight);

            // Leaves are not controlled: there is nothing left to grow.
            let decision = if depth == self.target {
                Decision::Continue { weight }
            } else {
                let reference = self.strategy.reference(&self.stats, depth);
                self.strategy.decide(weight, reference, rng)
            };
            self.counters.tally(&decision);

            let (copies, weight) = decision.successors();
            for _ in 1..copies {
                stack.push(GrowthNode {
                    walk: walk.clone(),
                    weight,
                });
            }
            if copies > 0 {
                stack.push(GrowthNode { walk, weight });
            }
            self.counters.peak_stack = self.counters.peak_stack.max(stack.len());
        }

        total.total()
    }
}

// ---------------------------------------------------------------------------
// Estimators
// ---------------------------------------------------------------------------

/// Result of a PERM run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PermReport {
    pub estimate: Estimate,
    pub counters: PermCounters,
}

/// Run PERM as configured.
#[instrument(level = "debug", skip_all, fields(length = config.length, trials = config.trials))]
pub fn perm_run(config: &PermConfig) -> Result<PermReport> {
    config.validate()?;
    let mut rng = seeded_rng(config.seed);
    let mut ctx = PermContext::new(config.length, config.control);
    let mut acc = WeightAccumulator::new();

    for trial in 0..config.trials {
        let root = Walk::with_capacity(LatticePoint::ORIGIN, config.length);
        let contribution = ctx.grow_tree(root, &mut rng);
        trace!(trial, ln_weight = contribution.ln(), "root trial finished");
        acc.push(contribution);
    }

    let report = PermReport {
        estimate: acc.finish(),
        counters: ctx.counters,
    };
    debug!(
        value = report.estimate.value,
        std_error = report.estimate.std_error(),
        completed = report.counters.completed,
        trapped = report.counters.trapped,
        killed = report.counters.killed,
        enriched = report.counters.enriched,
        peak_stack = report.counters.peak_stack,
        "PERM run finished"
    );
    if acc.nonzero() == 0 {
        warn!(length = config.length, "no PERM trial reached the target length");
    }
    Ok(report)
}

/// PERM estimate of `c_L` with threshold population control.
pub fn perm_estimate_cl(
    length: usize,
    trials: usize,
    c_minus: f64,
    c_plus: f64,
    seed: Option<u64>,
) -> Result<Estimate> {
    let config = PermConfig::threshold(length, trials, c_minus, c_plus).with_seed(seed);
    Ok(perm_run(&config)?.estimate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
