use pdecon_core::Status;

/// Event emitted by the augmented-Lagrangian solver after each outer iteration.
#[derive(Debug, Clone)]
pub struct Event<'a> {
    /// Outer iteration number, starting at 1.
    pub iter: usize,

    /// The subproblem solution.
    pub x: &'a [f64],

    /// Objective value `f(x)`.
    pub objective: f64,

    /// `‖c(x) − b‖∞`.
    pub primal_feas: f64,

    /// `‖P(x − ∇ₓL(x, y)) − x‖∞` with the updated multipliers.
    pub dual_feas: f64,

    /// Penalty parameter for the next subproblem.
    pub penalty: f64,

    /// Whether the multipliers were updated (otherwise the penalty grew).
    pub multipliers_updated: bool,

    /// Iterations taken by the subproblem solver.
    pub inner_iters: usize,

    /// How the subproblem solver stopped.
    pub inner_status: Status,
}
