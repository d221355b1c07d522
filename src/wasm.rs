// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Browser bindings.

use wasm_bindgen::prelude::*;

use crate::analysis::relative_deviation;
use crate::config::{ControlStrategy, PermConfig, PivotConfig, SamplerConfig};
use crate::error::Result;
use crate::estimate::Estimate;
use crate::exact::exact_count;
use crate::perm::{perm_run, PermReport};
use crate::pivot::{run_pivot, PivotReport};
use crate::rosenbluth::{estimate_with, Proposal};

/// Estimator handle for JavaScript callers. Every call reseeds from the
/// handle's seed, so repeated calls with the same arguments agree.
#[wasm_bindgen]
pub struct SawEstimator {
    seed: Option<u64>,
}

#[wasm_bindgen]
impl SawEstimator {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u64>) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        Self { seed }
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn naive(&self, length: usize, trials: usize) -> std::result::Result<JsValue, JsError> {
        to_js(&self.sampler(length, trials, Proposal::Blind)?)
    }

    pub fn rosenbluth(&self, length: usize, trials: usize) -> std::result::Result<JsValue, JsError> {
        to_js(&self.sampler(length, trials, Proposal::Rosenbluth)?)
    }

    pub fn perm(
        &self,
        length: usize,
        trials: usize,
        c_minus: f64,
        c_plus: f64,
    ) -> std::result::Result<JsValue, JsError> {
        let control = ControlStrategy::Threshold { c_minus, c_plus };
        to_js(&self.perm_report(length, trials, control)?)
    }

    pub fn perm_ratio(&self, length: usize, trials: usize) -> std::result::Result<JsValue, JsError> {
        to_js(&self.perm_report(length, trials, ControlStrategy::Ratio)?)
    }

    pub fn pivot(
        &self,
        steps: usize,
        pivot_attempts: usize,
        burn_in: usize,
    ) -> std::result::Result<JsValue, JsError> {
        to_js(&self.pivot_report(steps, pivot_attempts, burn_in)?)
    }

    /// Exact `c_L` as a decimal string; JavaScript numbers cannot hold it.
    pub fn exact_count(&self, length: usize) -> Option<String> {
        exact_count(length).map(|c| c.to_string())
    }

    pub fn deviation(&self, estimate: f64, length: usize) -> std::result::Result<f64, JsError> {
        Ok(relative_deviation(estimate, length)?)
    }
}

impl SawEstimator {
    fn sampler(&self, length: usize, trials: usize, proposal: Proposal) -> Result<Estimate> {
        estimate_with(&SamplerConfig::new(length, trials, self.seed), proposal)
    }

    fn perm_report(&self, length: usize, trials: usize, control: ControlStrategy) -> Result<PermReport> {
        perm_run(&PermConfig {
            length,
            trials,
            control,
            seed: self.seed,
        })
    }

    fn pivot_report(&self, steps: usize, pivot_attempts: usize, burn_in: usize) -> Result<PivotReport> {
        run_pivot(&PivotConfig::new(steps, pivot_attempts, burn_in, self.seed))
    }
}

fn to_js<T: serde::Serialize>(value: &T) -> std::result::Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}
