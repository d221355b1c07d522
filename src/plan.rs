// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Batch run plans loaded from TOML.
//!
//! ```toml
//! base_seed = 7
//! repeats = 4
//!
//! [[jobs]]
//! method = "rosenbluth"
//! length = 10
//! trials = 20000
//!
//! [[jobs]]
//! method = "perm"
//! length = 30
//! trials = 2000
//! control = { kind = "threshold", c_minus = 0.2, c_plus = 3.0 }
//!
//! [[jobs]]
//! method = "pivot"
//! steps = 50
//! pivot_attempts = 20000
//! burn_in = 2000
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::relative_deviation;
use crate::config::{PermConfig, PivotConfig, SamplerConfig, DEFAULT_SEED};
use crate::error::SawError;
use crate::estimate::Estimate;
use crate::exact::exact_ratio;
use crate::perm::{perm_run, PermCounters};
use crate::pivot::run_pivot;
use crate::rosenbluth::{estimate_with, Proposal};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read run plan '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse run plan: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("job {index} is invalid: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: SawError,
    },

    #[error("run plan has no jobs")]
    Empty,
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

fn default_repeats() -> usize {
    1
}

/// A list of estimator jobs, each repeated over consecutive seeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPlan {
    /// First seed of each job's repeat sequence, unless the job fixes its own.
    #[serde(default)]
    pub base_seed: Option<u64>,
    #[serde(default = "default_repeats")]
    pub repeats: usize,
    pub jobs: Vec<Job>,
}

/// One estimator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Job {
    Naive(SamplerConfig),
    Rosenbluth(SamplerConfig),
    Perm(PermConfig),
    Pivot(PivotConfig),
}

/// Outcome of a single job run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    pub method: &'static str,
    /// `L` for count estimators, `n` for the pivot chain.
    pub length: usize,
    pub seed: u64,
    pub estimate: Estimate,
    /// Connectivity constant implied by the estimate: `c_L^(1/L)`, or the
    /// pivot mean itself.
    pub mu: Option<f64>,
    /// Relative deviation from the tabulated exact value, when one exists.
    pub deviation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perm: Option<PermCounters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_rate: Option<f64>,
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::Naive(_) => "naive",
            Job::Rosenbluth(_) => "rosenbluth",
            Job::Perm(_) => "perm",
            Job::Pivot(_) => "pivot",
        }
    }

    pub fn length(&self) -> usize {
        match self {
            Job::Naive(c) | Job::Rosenbluth(c) => c.length,
            Job::Perm(c) => c.length,
            Job::Pivot(c) => c.steps,
        }
    }

    pub fn seed(&self) -> Option<u64> {
        match self {
            Job::Naive(c) | Job::Rosenbluth(c) => c.seed,
            Job::Perm(c) => c.seed,
            Job::Pivot(c) => c.seed,
        }
    }

    pub fn with_seed(self, seed: Option<u64>) -> Self {
        match self {
            Job::Naive(c) => Job::Naive(SamplerConfig { seed, ..c }),
            Job::Rosenbluth(c) => Job::Rosenbluth(SamplerConfig { seed, ..c }),
            Job::Perm(c) => Job::Perm(c.with_seed(seed)),
            Job::Pivot(c) => Job::Pivot(PivotConfig { seed, ..c }),
        }
    }

    pub fn validate(&self) -> Result<(), SawError> {
        match self {
            Job::Naive(c) | Job::Rosenbluth(c) => c.validate(),
            Job::Perm(c) => c.validate(),
            Job::Pivot(c) => c.validate(),
        }
    }

    pub fn run(&self) -> Result<JobReport, SawError> {
        let length = self.length();
        let seed = self.seed().unwrap_or(DEFAULT_SEED);
        let mut perm = None;
        let mut acceptance_rate = None;

        let (estimate, mu, deviation) = match self {
            Job::Naive(c) | Job::Rosenbluth(c) => {
                let proposal = match self {
                    Job::Naive(_) => Proposal::Blind,
                    _ => Proposal::Rosenbluth,
                };
                let est = estimate_with(c, proposal)?;
                (est, est.mu_estimate(length), relative_deviation(est.value, length).ok())
            }
            Job::Perm(c) => {
                let report = perm_run(c)?;
                perm = Some(report.counters);
                let est = report.estimate;
                (est, est.mu_estimate(length), relative_deviation(est.value, length).ok())
            }
            Job::Pivot(c) => {
                let report = run_pivot(c)?;
                acceptance_rate = Some(report.acceptance_rate());
                let est = report.estimate;
                let deviation = exact_ratio(length).map(|r| (est.value - r).abs() / r);
                (est, Some(est.value), deviation)
            }
        };

        Ok(JobReport {
            method: self.name(),
            length,
            seed,
            estimate,
            mu,
            deviation,
            perm,
            acceptance_rate,
        })
    }
}

// ---------------------------------------------------------------------------
// RunPlan
// ---------------------------------------------------------------------------

impl RunPlan {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let plan: RunPlan = toml::from_str(content)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading run plan from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs.is_empty() {
            return Err(ConfigError::Empty);
        }
        for (index, job) in self.jobs.iter().enumerate() {
            job.validate()
                .map_err(|source| ConfigError::Invalid { index, source })?;
        }
        Ok(())
    }

    /// Seeds for each repeat of `job`: consecutive from the job's own seed,
    /// else from `base_seed`, else from [`DEFAULT_SEED`].
    pub fn seeds_for(&self, job: &Job) -> Vec<u64> {
        let base = job.seed().or(self.base_seed).unwrap_or(DEFAULT_SEED);
        (0..self.repeats.max(1) as u64)
            .map(|r| base.wrapping_add(r))
            .collect()
    }

    /// Run every job for every repeat, in plan order.
    pub fn run(&self) -> Result<Vec<Vec<JobReport>>, SawError> {
        self.jobs
            .iter()
            .map(|job| {
                info!(method = job.name(), length = job.length(), "running job");
                self.seeds_for(job)
                    .into_iter()
                    .map(|seed| job.with_seed(Some(seed)).run())
                    .collect()
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlStrategy;
    use std::io::Write;

    const PLAN: &str = r#"
base_seed = 7
repeats = 2

[[jobs]]
method = "rosenbluth"
length = 3
trials = 100

[[jobs]]
method = "perm"
length = 3
trials = 50
control = { kind = "ratio" }

[[jobs]]
method = "pivot"
steps = 10
pivot_attempts = 500
seed = 100
"#;

    #[test]
    fn plan_parses_tagged_jobs() {
        let plan = RunPlan::from_toml_str(PLAN).expect("valid plan");
        assert_eq!(plan.base_seed, Some(7));
        assert_eq!(plan.repeats, 2);
        assert_eq!(
            plan.jobs[0],
            Job::Rosenbluth(SamplerConfig::new(3, 100, None))
        );
        match plan.jobs[1] {
            Job::Perm(c) => assert_eq!(c.control, ControlStrategy::Ratio),
            other => panic!("expected perm job, got {other:?}"),
        }
        match plan.jobs[2] {
            Job::Pivot(c) => {
                assert_eq!(c.burn_in, 0);
                assert_eq!(c.seed, Some(100));
            }
            other => panic!("expected pivot job, got {other:?}"),
        }
    }

    #[test]
    fn seeds_follow_job_then_plan_then_default() {
        let plan = RunPlan::from_toml_str(PLAN).expect("valid plan");
        assert_eq!(plan.seeds_for(&plan.jobs[0]), vec![7, 8]);
        assert_eq!(plan.seeds_for(&plan.jobs[2]), vec![100, 101]);

        let unseeded = RunPlan {
            base_seed: None,
            ..plan.clone()
        };
        assert_eq!(
            unseeded.seeds_for(&unseeded.jobs[0]),
            vec![DEFAULT_SEED, DEFAULT_SEED + 1]
        );
    }

    #[test]
    fn plan_runs_every_repeat() {
        let plan = RunPlan::from_toml_str(PLAN).expect("valid plan");
        let reports = plan.run().expect("valid jobs");
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.len() == 2));

        let rosenbluth = &reports[0][0];
        assert_eq!(rosenbluth.method, "rosenbluth");
        assert_eq!(rosenbluth.seed, 7);
        assert!((rosenbluth.estimate.value - 36.0).abs() < 1e-9);
        assert!(rosenbluth.deviation.expect("tabulated") < 1e-9);

        assert!(reports[1][0].perm.is_some());
        assert!(reports[2][1].acceptance_rate.is_some());
        assert_eq!(reports[2][1].seed, 101);
    }

    #[test]
    fn invalid_job_reports_its_index() {
        let content = r#"
[[jobs]]
method = "naive"
length = 5
trials = 10

[[jobs]]
method = "perm"
length = 5
trials = 10
control = { kind = "threshold", c_minus = 2.0, c_plus = 3.0 }
"#;
        let err = RunPlan::from_toml_str(content).expect_err("bad thresholds");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                index: 1,
                source: SawError::InvalidThresholds { .. }
            }
        ));
    }

    #[test]
    fn unknown_method_and_empty_plans_fail() {
        let err = RunPlan::from_toml_str("[[jobs]]\nmethod = \"exhaustive\"\nlength = 3\n")
            .expect_err("unknown method");
        assert!(matches!(err, ConfigError::Parse(_)));
        let err = RunPlan::from_toml_str("jobs = []\n").expect_err("no jobs");
        assert!(matches!(err, ConfigError::Empty));
    }

    #[test]
    fn plan_loads_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("plan.toml");
        let mut file = std::fs::File::create(&path).expect("create plan file");
        file.write_all(PLAN.as_bytes()).expect("write plan file");

        let plan = RunPlan::from_path(&path).expect("valid plan file");
        assert_eq!(plan.jobs.len(), 3);

        let missing = RunPlan::from_path(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
