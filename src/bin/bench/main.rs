// SAW Estimator Bench Runner
// Runs the c_L / μ estimators over repeated seeds and reports mean ± 95% CI.
//
// Usage:
//   cargo run --release --bin bench -- rosenbluth --length 20 --trials 100000
//   cargo run --release --bin bench -- --repeats 10 perm --length 50 --trials 5000
//   cargo run --release --bin bench -- pivot --steps 100 --steps 200 --steps 400
//   cargo run --release --bin bench -- exact --length 12 --enumerate
//   cargo run --release --bin bench -- --json out.json plan jobs.toml

mod error;
mod logging;
mod monte_carlo;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use clap::{Args, Parser, Subcommand};
use saw_engine::config::{ControlStrategy, PermConfig, PivotConfig, SamplerConfig};
use saw_engine::exact::{count_saws, exact_count, MAX_TABULATED_LENGTH};
use saw_engine::plan::{Job, RunPlan};
use tracing::{error, info};

use error::{BenchError, Result};
use report::*;

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Monte Carlo estimators for square-lattice self-avoiding walks."
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base seed; repeat r runs with seed base + r. Defaults to 42.
    #[arg(long, global = true, value_name = "SEED")]
    seed: Option<u64>,

    /// Independent runs per job.
    #[arg(short, long, global = true, value_name = "N")]
    repeats: Option<usize>,

    /// Write the full report as JSON.
    #[arg(long, global = true, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Blind random walks: survivors score 4^L.
    Naive(SamplerArgs),
    /// Rosenbluth-weighted growth.
    Rosenbluth(SamplerArgs),
    /// Pruned-enriched Rosenbluth method.
    Perm(PermArgs),
    /// Pivot chain estimate of μ_n = c_{n+1} / c_n.
    Pivot(PivotArgs),
    /// Print exact counts, optionally checked by enumeration.
    Exact(ExactArgs),
    /// Run a TOML run plan.
    Plan {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct SamplerArgs {
    /// Walk length L.
    #[arg(short, long, default_value_t = 10)]
    length: usize,
    /// Trials per run.
    #[arg(short, long, default_value_t = 100_000)]
    trials: usize,
}

#[derive(Args, Debug)]
struct PermArgs {
    #[command(flatten)]
    sampler: SamplerArgs,
    /// Prune below c_minus times the depth mean.
    #[arg(long, default_value_t = 0.2)]
    c_minus: f64,
    /// Enrich above c_plus times the depth mean.
    #[arg(long, default_value_t = 3.0)]
    c_plus: f64,
    /// Use stochastic ratio control instead of thresholds.
    #[arg(long, conflicts_with_all = ["c_minus", "c_plus"])]
    ratio: bool,
}

#[derive(Args, Debug)]
struct PivotArgs {
    /// Walk length n; repeat the flag to extrapolate μ over several lengths.
    #[arg(short, long = "steps", default_values_t = [100])]
    steps: Vec<usize>,
    /// Measured chain steps after burn-in.
    #[arg(short, long, default_value_t = 20_000)]
    attempts: usize,
    /// Discarded chain steps before measurement.
    #[arg(short, long, default_value_t = 2_000)]
    burn_in: usize,
}

#[derive(Args, Debug)]
struct ExactArgs {
    /// Largest length to print.
    #[arg(short, long, default_value_t = 20)]
    length: usize,
    /// Also count by backtracking (slow beyond L = 16).
    #[arg(long)]
    enumerate: bool,
}

impl Cli {
    /// Turn an estimator subcommand into a run plan.
    fn plan(&self) -> Result<Option<RunPlan>> {
        let jobs = match &self.command {
            Command::Naive(a) => vec![Job::Naive(SamplerConfig::new(a.length, a.trials, None))],
            Command::Rosenbluth(a) => {
                vec![Job::Rosenbluth(SamplerConfig::new(a.length, a.trials, None))]
            }
            Command::Perm(a) => {
                let control = if a.ratio {
                    ControlStrategy::Ratio
                } else {
                    ControlStrategy::Threshold { c_minus: a.c_minus, c_plus: a.c_plus }
                };
                vec![Job::Perm(PermConfig {
                    length: a.sampler.length,
                    trials: a.sampler.trials,
                    control,
                    seed: None,
                })]
            }
            Command::Pivot(a) => a
                .steps
                .iter()
                .map(|&n| Job::Pivot(PivotConfig::new(n, a.attempts, a.burn_in, None)))
                .collect(),
            Command::Plan { path } => {
                let mut plan = RunPlan::from_path(path)?;
                if self.seed.is_some() {
                    plan.base_seed = self.seed;
                }
                if let Some(repeats) = self.repeats {
                    plan.repeats = repeats;
                }
                return Ok(Some(plan));
            }
            Command::Exact(_) => return Ok(None),
        };

        let plan = RunPlan {
            base_seed: self.seed,
            repeats: self.repeats.unwrap_or(1),
            jobs,
        };
        plan.validate()?;
        Ok(Some(plan))
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Command::Exact(args) = &cli.command {
        print_exact(args);
        return Ok(());
    }
    let Some(plan) = cli.plan()? else {
        return Ok(());
    };

    println!("\n  SAW Estimator Bench");
    println!(
        "  PRNG: ChaCha8Rng | Runs/job: {} | Base seed: {}",
        plan.repeats.max(1),
        plan.base_seed.map_or_else(|| "default".to_string(), |s| s.to_string())
    );
    println!("  Running {} job(s)...\n", plan.jobs.len());
    println!(
        "  {:<11} {:>5} {:>5} {:>26} {:>10} {:>9} {:>9}",
        "Method", "L", "Runs", "Estimate", "μ", "Dev%", "Time"
    );
    println!("  {}", "-".repeat(82));

    let suite_start = Instant::now();
    let reports = monte_carlo::run_monte_carlo(&plan)?;
    for report in &reports {
        print_row(report);
    }
    println!("  {}", "-".repeat(82));
    println!("  Suite time: {:.1}s\n", suite_start.elapsed().as_secs_f64());

    let extrapolation = monte_carlo::extrapolate_pivot(&reports);
    if let Some(fit) = &extrapolation {
        println!(
            "  μ extrapolated over {} lengths: {:.5} (slope {:.4})\n",
            fit.points, fit.mu_infinity, fit.slope
        );
    }

    if let Some(path) = &cli.json {
        let report = BenchReport {
            timestamp: timestamp(),
            version: env!("CARGO_PKG_VERSION"),
            prng: "ChaCha8Rng",
            jobs: reports,
            extrapolation,
        };
        write_json(path, &report)?;
        println!("  Results saved to: {}\n", path.display());
    }
    Ok(())
}

fn print_row(report: &MonteCarloReport) {
    let value = &report.value;
    let estimate = if value.n > 1 {
        format!("{:.6e} ± {:.1e}", value.mean, value.half_width())
    } else {
        format!("{:.6e}", value.mean)
    };
    let mu = report
        .mu
        .as_ref()
        .map_or_else(|| "-".to_string(), |s| format!("{:.5}", s.mean));
    let dev = report
        .deviation
        .as_ref()
        .map_or_else(|| "-".to_string(), |s| format!("{:.3}", s.mean * 100.0));
    println!(
        "  {:<11} {:>5} {:>5} {:>26} {:>10} {:>9} {:>7.0}ms",
        report.method, report.length, report.n_runs, estimate, mu, dev, report.elapsed_ms.mean
    );
}

fn print_exact(args: &ExactArgs) {
    let max = args.length.min(MAX_TABULATED_LENGTH);
    if args.length > MAX_TABULATED_LENGTH {
        info!(requested = args.length, max, "exact table ends at c_{max}");
    }
    println!("\n  {:>3} {:>34} {:>10}", "L", "c_L", "μ_L");
    for length in 0..=max {
        let Some(count) = exact_count(length) else {
            break;
        };
        let mu = if length == 0 {
            "-".to_string()
        } else {
            format!("{:.5}", (count as f64).powf(1.0 / length as f64))
        };
        print!("  {:>3} {:>34} {:>10}", length, count, mu);
        if args.enumerate {
            let start = Instant::now();
            let counted = count_saws(length);
            let status = if counted as u128 == count { "ok" } else { "MISMATCH" };
            print!("  {} ({:.0}ms)", status, start.elapsed().as_secs_f64() * 1000.0);
        }
        println!();
    }
    println!();
}

fn timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().to_string())
        .unwrap_or_default()
}

fn write_json(path: &Path, report: &BenchReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(|source| BenchError::Write {
        path: path.to_path_buf(),
        source,
    })
}
