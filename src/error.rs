// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Parameter validation errors.
//!
//! Trapped walks and rejected pivots are ordinary sampling outcomes and never
//! surface here; only bad inputs do, and they are caught before the first
//! random draw.

/// Errors raised by the estimators' parameter checks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SawError {
    #[error("walk length must be at least 1, got {0}")]
    InvalidLength(usize),

    #[error("trial count must be at least 1, got {0}")]
    InvalidTrials(usize),

    #[error("PERM thresholds must satisfy 0 < c_minus < 1 < c_plus (got c_minus = {c_minus}, c_plus = {c_plus})")]
    InvalidThresholds { c_minus: f64, c_plus: f64 },

    #[error("pivot walks need at least 2 steps, got {0}")]
    InvalidWalkLength(usize),

    #[error("pivot measurement phase needs at least 1 attempt, got {0}")]
    InvalidPivotAttempts(usize),

    #[error("no exact value available for c_{0}")]
    NoExactValue(usize),

    #[error("extrapolation needs at least 2 distinct walk lengths, got {0}")]
    NotEnoughPoints(usize),
}

pub type Result<T> = std::result::Result<T, SawError>;
