use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::EvalCounts;

/// Why a solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// First-order optimality conditions hold within the requested tolerances.
    FirstOrder,

    /// Tolerances were met only at a relaxed, acceptable level.
    Acceptable,

    /// Reached the iteration limit.
    MaxIters,

    /// Reached the wall-clock limit.
    MaxTime,

    /// The step or trust region became too small to make progress.
    SmallStep,

    /// The solver detected a locally infeasible problem.
    Infeasible,

    /// A linear algebra kernel failed even after regularization.
    NumericalFailure,

    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

impl Status {
    /// True for statuses that certify a (possibly relaxed) solution.
    #[must_use]
    pub fn is_converged(self) -> bool {
        matches!(self, Self::FirstOrder | Self::Acceptable)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FirstOrder => "first-order stationary",
            Self::Acceptable => "acceptable",
            Self::MaxIters => "maximum iterations",
            Self::MaxTime => "maximum time",
            Self::SmallStep => "step too small",
            Self::Infeasible => "infeasible",
            Self::NumericalFailure => "numerical failure",
            Self::StoppedByObserver => "stopped by observer",
        };
        f.write_str(text)
    }
}

/// The record one solver run produces.
///
/// A record is returned whether or not the solver converged. Inspect
/// [`Stats::status`] or call [`Stats::satisfies`] before trusting the values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Name of the solver that produced this record.
    pub solver: String,

    /// Final solver status.
    pub status: Status,

    /// Final iterate.
    pub solution: Vec<f64>,

    /// Final constraint multipliers (`L = f + yᵀc`).
    pub multipliers: Vec<f64>,

    /// Objective value at the final iterate.
    pub objective: f64,

    /// Constraint violation `‖c(x) − b‖∞` at the final iterate.
    pub primal_feas: f64,

    /// Stationarity measure of the Lagrangian at the final iterate.
    pub dual_feas: f64,

    /// Iteration count when the solver finished.
    pub iterations: usize,

    /// Wall-clock time spent in the solver.
    pub elapsed: Duration,

    /// Model evaluations performed during this run only.
    pub counters: EvalCounts,
}

impl Stats {
    /// True if the status certifies a solution.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.status.is_converged()
    }

    /// Explicit threshold check on both feasibility measures.
    ///
    /// This ignores the status; callers decide which thresholds matter.
    #[must_use]
    pub fn satisfies(&self, primal_tol: f64, dual_tol: f64) -> bool {
        self.primal_feas <= primal_tol && self.dual_feas <= dual_tol
    }
}
