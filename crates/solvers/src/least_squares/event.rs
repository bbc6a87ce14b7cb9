/// Event emitted by the least-squares solver after each trust-region step.
///
/// Rejected steps are reported too; `x` is the iterate after the decision.
#[derive(Debug, Clone)]
pub struct Event<'a> {
    /// Iteration number, starting at 1.
    pub iter: usize,

    /// The current iterate.
    pub x: &'a [f64],

    /// `‖F(x)‖₂` at the current iterate.
    pub residual_norm: f64,

    /// `‖J(x)ᵀF(x)‖₂` at the current iterate.
    pub gradient_norm: f64,

    /// Trust-region radius for the next step.
    pub radius: f64,

    /// Ratio of actual to predicted reduction of the trial step.
    pub ratio: f64,

    /// Whether the trial step was accepted.
    pub accepted: bool,

    /// CGLS iterations spent on the trial step.
    pub inner_iters: usize,
}
