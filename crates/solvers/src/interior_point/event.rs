/// Event emitted by the interior-point solver after each accepted step.
#[derive(Debug, Clone)]
pub struct Event<'a> {
    /// Iteration number, starting at 1.
    pub iter: usize,

    /// The new iterate.
    pub x: &'a [f64],

    /// Objective value at the new iterate.
    pub objective: f64,

    /// `‖c(x) − b‖∞` at the new iterate.
    pub primal_feas: f64,

    /// Lagrangian stationarity `‖∇f + Jᵀy − z_L + z_U‖∞` at the new iterate.
    pub dual_feas: f64,

    /// Barrier parameter used for the step.
    pub mu: f64,

    /// Primal step length.
    pub step: f64,

    /// Hessian regularization added to obtain the right inertia.
    pub regularization: f64,

    /// Number of backtracking trials in the line search.
    pub trials: usize,
}
