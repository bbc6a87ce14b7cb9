use pdecon_core::{FeasibilityResidual, NlpModel};
use pdecon_solvers::least_squares;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Error, SolverObserver};

/// Outcome of the feasibility phase.
#[derive(Debug, Clone)]
pub struct FeasibilityReport {
    /// The point handed to the constrained solvers.
    pub point: Vec<f64>,

    /// `‖c(x₀) − b‖₂` at the model's initial point.
    pub initial_violation: f64,

    /// `‖c(x) − b‖₂` at [`point`](Self::point).
    pub final_violation: f64,

    /// The least-squares solver's own record.
    pub solution: least_squares::Solution,
}

/// Serializable digest of a [`FeasibilityReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilitySummary {
    pub initial_violation: f64,
    pub final_violation: f64,
    pub status: pdecon_core::Status,
    pub iterations: usize,
    pub elapsed_secs: f64,
}

impl FeasibilityReport {
    #[must_use]
    pub fn summary(&self) -> FeasibilitySummary {
        FeasibilitySummary {
            initial_violation: self.initial_violation,
            final_violation: self.final_violation,
            status: self.solution.status,
            iterations: self.solution.iters,
            elapsed_secs: self.solution.elapsed.as_secs_f64(),
        }
    }
}

/// Moves the model's initial point toward the constraint manifold.
///
/// Minimizes `½‖c(x) − b‖²` from `meta().x0`. No threshold is enforced: the
/// returned violation is never above the initial one, and how small it got is
/// reported, not checked.
///
/// # Errors
///
/// Returns an error if a constraint is not an equality or a model evaluation
/// fails.
pub fn initialize<M, Obs>(
    model: &M,
    config: &least_squares::Config,
    observer: Obs,
) -> Result<FeasibilityReport, Error>
where
    M: NlpModel,
    Obs: SolverObserver,
{
    initialize_from(model, &model.meta().x0, config, observer)
}

/// Like [`initialize`], starting from `x0` instead of the model's initial point.
///
/// # Errors
///
/// Returns an error if a constraint is not an equality, `x0` has the wrong
/// length, or a model evaluation fails.
pub fn initialize_from<M, Obs>(
    model: &M,
    x0: &[f64],
    config: &least_squares::Config,
    observer: Obs,
) -> Result<FeasibilityReport, Error>
where
    M: NlpModel,
    Obs: SolverObserver,
{
    let residual = FeasibilityResidual::new(model)?;
    let solution = least_squares::solve(&residual, x0, config, observer)?;

    info!(
        status = %solution.status,
        iterations = solution.iters,
        initial = solution.initial_residual_norm,
        last = solution.residual_norm,
        "feasibility phase finished"
    );

    Ok(FeasibilityReport {
        point: solution.x.clone(),
        initial_violation: solution.initial_residual_norm,
        final_violation: solution.residual_norm,
        solution,
    })
}
