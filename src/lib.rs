// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Monte Carlo estimation of self-avoiding walk counts `c_L` and the
//! connectivity constant `μ` on the square lattice.
//!
//! Three count estimators share one walk representation and step candidate
//! enumerator: blind random walks ([`estimate_cl_naive`]), Rosenbluth
//! importance sampling ([`rosenbluth_estimate_cl`]) and PERM with depth-wise
//! population control ([`perm_estimate_cl`]). The pivot chain
//! ([`run_pivot_get_mu_estimate`]) samples fixed-length walks uniformly and
//! estimates `μ_n = c_{n+1} / c_n` from the endpoint atmosphere.

pub mod lattice;
pub mod walk;
pub mod weight;
pub mod estimate;
pub mod error;
pub mod config;
pub mod rosenbluth;
pub mod perm;
pub mod pivot;
pub mod exact;
pub mod analysis;
pub mod plan;
pub mod wasm;

pub use config::{ControlStrategy, PermConfig, PivotConfig, SamplerConfig, DEFAULT_SEED};
pub use error::{Result, SawError};
pub use estimate::Estimate;
pub use lattice::{LatticePoint, Symmetry};
pub use perm::{perm_estimate_cl, perm_run, PermReport};
pub use pivot::{run_pivot, run_pivot_get_mu_estimate, PivotReport};
pub use rosenbluth::{estimate_cl_naive, rosenbluth_estimate_cl};
pub use walk::Walk;
pub use weight::LogWeight;
