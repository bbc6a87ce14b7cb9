/// Event emitted by the bound-constrained solver after each trust-region step.
#[derive(Debug, Clone)]
pub struct Event<'a> {
    /// Iteration number, starting at 1.
    pub iter: usize,

    /// The current iterate, after the accept/reject decision.
    pub x: &'a [f64],

    /// Objective value at the current iterate.
    pub objective: f64,

    /// `‖P(x − ∇f) − x‖∞` at the current iterate.
    pub projected_gradient: f64,

    /// Trust-region radius for the next step.
    pub radius: f64,

    /// Ratio of actual to predicted reduction of the trial step.
    pub ratio: f64,

    /// Whether the trial step was accepted.
    pub accepted: bool,

    /// CG iterations spent on the trial step.
    pub inner_iters: usize,
}
