#[cfg(test)]
mod tests {
    use saw_engine::exact::{count_saws, exact_count, exact_ratio};
    use saw_engine::plan::{Job, RunPlan};
    use saw_engine::{
        estimate_cl_naive, perm_estimate_cl, perm_run, rosenbluth_estimate_cl,
        run_pivot_get_mu_estimate, ControlStrategy, PermConfig, SawError,
    };

    fn mean_over_seeds(seeds: std::ops::Range<u64>, f: impl Fn(u64) -> f64) -> f64 {
        let n = seeds.end - seeds.start;
        seeds.map(f).sum::<f64>() / n as f64
    }

    // ========== Agreement With Exact Counts ==========

    #[test]
    fn count_estimators_agree_with_exact_c8() {
        let exact = exact_count(8).expect("tabulated") as f64;

        let naive = mean_over_seeds(0..5, |s| {
            estimate_cl_naive(8, 20_000, Some(s)).expect("valid").value
        });
        let rosenbluth = mean_over_seeds(0..5, |s| {
            rosenbluth_estimate_cl(8, 5_000, Some(s)).expect("valid").value
        });
        let perm = mean_over_seeds(0..5, |s| {
            perm_estimate_cl(8, 1_000, 0.2, 3.0, Some(s)).expect("valid").value
        });

        for (name, value) in [("naive", naive), ("rosenbluth", rosenbluth), ("perm", perm)] {
            let dev = (value - exact).abs() / exact;
            assert!(dev < 0.05, "{name}: {value} vs {exact} (dev {dev})");
        }
    }

    #[test]
    fn perm_c2_scenario() {
        assert_eq!(count_saws(2), 12);
        let est = perm_estimate_cl(2, 1_000, 0.2, 3.0, None).expect("valid");
        assert!((est.value - 12.0).abs() < 1e-9);
    }

    #[test]
    fn perm_reaches_lengths_rosenbluth_struggles_with() {
        let exact = exact_count(40).expect("tabulated") as f64;
        let report = perm_run(&PermConfig {
            length: 40,
            trials: 2_000,
            control: ControlStrategy::default(),
            seed: Some(17),
        })
        .expect("valid");
        let dev = (report.estimate.value - exact).abs() / exact;
        assert!(dev < 0.15, "c_40 = {} vs {exact}", report.estimate.value);
        assert!(report.counters.enriched > 0);
        assert_eq!(report.estimate.samples, 2_000);
        let mu = report.estimate.mu_estimate(40).expect("positive");
        assert!(mu > 2.6 && mu < 2.9);
    }

    #[test]
    fn pivot_matches_exact_ratio() {
        let exact = exact_ratio(30).expect("tabulated");
        let mu = mean_over_seeds(0..3, |s| {
            run_pivot_get_mu_estimate(30, 20_000, 2_000, Some(s))
                .expect("valid")
                .value
        });
        assert!((mu - exact).abs() < 0.06, "μ_30 = {mu} vs {exact}");
    }

    // ========== Determinism ==========

    #[test]
    fn every_estimator_is_reproducible() {
        let seed = Some(2718);
        assert_eq!(
            estimate_cl_naive(7, 2_000, seed),
            estimate_cl_naive(7, 2_000, seed)
        );
        assert_eq!(
            rosenbluth_estimate_cl(25, 2_000, seed),
            rosenbluth_estimate_cl(25, 2_000, seed)
        );
        assert_eq!(
            perm_estimate_cl(25, 300, 0.2, 3.0, seed),
            perm_estimate_cl(25, 300, 0.2, 3.0, seed)
        );
        assert_eq!(
            run_pivot_get_mu_estimate(50, 2_000, 500, seed),
            run_pivot_get_mu_estimate(50, 2_000, 500, seed)
        );
    }

    #[test]
    fn different_seeds_differ() {
        let a = rosenbluth_estimate_cl(25, 500, Some(1)).expect("valid");
        let b = rosenbluth_estimate_cl(25, 500, Some(2)).expect("valid");
        assert_ne!(a.value, b.value);
    }

    // ========== Parameter Validation ==========

    #[test]
    fn invalid_parameters_fail_before_sampling() {
        assert_eq!(estimate_cl_naive(0, 10, None), Err(SawError::InvalidLength(0)));
        assert_eq!(rosenbluth_estimate_cl(5, 0, None), Err(SawError::InvalidTrials(0)));
        assert_eq!(
            perm_estimate_cl(5, 10, 3.0, 0.2, None),
            Err(SawError::InvalidThresholds { c_minus: 3.0, c_plus: 0.2 })
        );
        assert_eq!(
            run_pivot_get_mu_estimate(1, 10, 0, None),
            Err(SawError::InvalidWalkLength(1))
        );
        assert_eq!(
            run_pivot_get_mu_estimate(10, 0, 10, None),
            Err(SawError::InvalidPivotAttempts(0))
        );
    }

    // ========== Run Plans ==========

    #[test]
    fn plan_jobs_reproduce_direct_calls() {
        let plan = RunPlan::from_toml_str(
            r#"
[[jobs]]
method = "naive"
length = 6
trials = 1000
seed = 5

[[jobs]]
method = "perm"
length = 12
trials = 200
seed = 5
"#,
        )
        .expect("valid plan");
        let reports = plan.run().expect("valid jobs");

        let naive = estimate_cl_naive(6, 1_000, Some(5)).expect("valid");
        assert_eq!(reports[0][0].estimate, naive);

        let perm = perm_estimate_cl(12, 200, 0.2, 3.0, Some(5)).expect("valid");
        assert_eq!(reports[1][0].estimate, perm);
        assert!(matches!(plan.jobs[1], Job::Perm(_)));
    }
}
