use std::time::Duration;

use pdecon_core::Status;

/// The result of a bound-constrained solve.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Final solver status.
    pub status: Status,

    /// Final iterate, always within the bounds.
    pub x: Vec<f64>,

    /// Objective value at the final iterate.
    pub objective: f64,

    /// Gradient at the final iterate.
    pub gradient: Vec<f64>,

    /// `‖P(x − ∇f) − x‖∞` at the final iterate.
    pub projected_gradient: f64,

    /// Iteration count when the solver finished.
    pub iters: usize,

    /// Total CG iterations over all subproblems.
    pub inner_iters: usize,

    /// Wall-clock time spent in the solver.
    pub elapsed: Duration,
}
