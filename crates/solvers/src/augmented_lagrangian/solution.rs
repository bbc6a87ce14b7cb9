use std::time::Duration;

use pdecon_core::{EvalCounts, Stats, Status};

/// The result of an augmented-Lagrangian solve.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Final solver status.
    pub status: Status,

    /// Final iterate, always within the variable bounds.
    pub x: Vec<f64>,

    /// Constraint multipliers `y` in `L = f + yᵀc`.
    pub multipliers: Vec<f64>,

    /// Objective value at the final iterate.
    pub objective: f64,

    /// `‖c(x) − b‖∞` at the final iterate.
    pub primal_feas: f64,

    /// `‖P(x − ∇ₓL) − x‖∞` at the final iterate.
    pub dual_feas: f64,

    /// Final penalty parameter.
    pub penalty: f64,

    /// Outer iteration count when the solver finished.
    pub iters: usize,

    /// Total subproblem iterations.
    pub inner_iters: usize,

    /// Wall-clock time spent in the solver.
    pub elapsed: Duration,

    /// Evaluations recorded by the model's counters when the solver finished.
    pub counters: EvalCounts,
}

impl From<Solution> for Stats {
    fn from(solution: Solution) -> Self {
        Stats {
            solver: super::NAME.to_owned(),
            status: solution.status,
            solution: solution.x,
            multipliers: solution.multipliers,
            objective: solution.objective,
            primal_feas: solution.primal_feas,
            dual_feas: solution.dual_feas,
            iterations: solution.iters,
            elapsed: solution.elapsed,
            counters: solution.counters,
        }
    }
}
