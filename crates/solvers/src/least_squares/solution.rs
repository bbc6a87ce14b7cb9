use std::time::Duration;

use pdecon_core::{EvalCounts, Status};

/// The result of a least-squares solve.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Final solver status.
    pub status: Status,

    /// Final iterate.
    pub x: Vec<f64>,

    /// `‖F(x)‖₂` at the final iterate.
    pub residual_norm: f64,

    /// `‖F(x₀)‖₂` at the starting point.
    pub initial_residual_norm: f64,

    /// `‖J(x)ᵀF(x)‖₂` at the final iterate.
    pub gradient_norm: f64,

    /// Iteration count when the solver finished.
    pub iters: usize,

    /// Wall-clock time spent in the solver.
    pub elapsed: Duration,

    /// Evaluations recorded by the problem's counters when the solver finished.
    pub counters: EvalCounts,
}
