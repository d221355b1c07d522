// Monte Carlo driver: each job runs once per seed in its repeat sequence,
// then the per-seed estimates are aggregated into mean ± 95% CI.

use std::time::Instant;

use saw_engine::analysis::{extrapolate_mu, Extrapolation};
use saw_engine::plan::{Job, RunPlan};
use saw_engine::SawError;
use tracing::{debug, warn};

use crate::report::*;

/// Run a single job with a specific seed.
pub fn run_single(job: &Job, seed: u64) -> Result<RunResult, SawError> {
    let start = Instant::now();
    let report = job.with_seed(Some(seed)).run()?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    debug!(method = report.method, seed, value = report.estimate.value, elapsed_ms, "run finished");

    Ok(RunResult {
        seed,
        value: report.estimate.value,
        ln_value: report.estimate.ln_value,
        std_error: report.estimate.std_error(),
        relative_error: report.estimate.relative_std_error(),
        effective_samples: report.estimate.effective_samples,
        mu: report.mu,
        deviation: report.deviation,
        elapsed_ms,
        perm: report.perm,
        acceptance_rate: report.acceptance_rate,
    })
}

/// Run every job of `plan` over its seed sequence.
pub fn run_monte_carlo(plan: &RunPlan) -> Result<Vec<MonteCarloReport>, SawError> {
    plan.jobs
        .iter()
        .map(|job| {
            let results = plan
                .seeds_for(job)
                .into_iter()
                .map(|seed| run_single(job, seed))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(aggregate(job, results))
        })
        .collect()
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(job: &Job, results: Vec<RunResult>) -> MonteCarloReport {
    let value = Stats::from_samples(&results.iter().map(|r| r.value).collect::<Vec<_>>());
    let mu = optional_stats(results.iter().map(|r| r.mu));
    let deviation = optional_stats(results.iter().map(|r| r.deviation));
    let elapsed_ms = Stats::from_samples(&results.iter().map(|r| r.elapsed_ms).collect::<Vec<_>>());

    if value.mean.is_infinite() {
        warn!(method = job.name(), length = job.length(), "estimate overflows f64; see ln_value");
    }

    MonteCarloReport {
        method: job.name(),
        length: job.length(),
        n_runs: results.len(),
        value,
        mu,
        deviation,
        elapsed_ms,
        individual_runs: results,
    }
}

/// Stats over a per-run optional metric, or `None` if any run lacks it.
fn optional_stats(values: impl Iterator<Item = Option<f64>>) -> Option<Stats> {
    let samples = values.collect::<Option<Vec<_>>>()?;
    Some(Stats::from_samples(&samples))
}

/// Extrapolate pivot `μ_n` means when the plan covers two or more lengths.
pub fn extrapolate_pivot(reports: &[MonteCarloReport]) -> Option<Extrapolation> {
    let points: Vec<(usize, f64)> = reports
        .iter()
        .filter(|r| r.method == "pivot")
        .map(|r| (r.length, r.value.mean))
        .collect();
    extrapolate_mu(&points).ok()
}
