use std::fmt;

use pdecon_core::{EvalCounts, Stats, Status};
use serde::{Deserialize, Serialize};

use crate::Error;

/// One solver's line in a [`Comparison`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub solver: String,
    pub status: Status,
    pub elapsed_secs: f64,
    pub objective: f64,
    pub primal_feas: f64,
    pub dual_feas: f64,
    pub iterations: usize,
    pub evaluations: EvalCounts,
}

impl From<&Stats> for Row {
    fn from(stats: &Stats) -> Self {
        Self {
            solver: stats.solver.clone(),
            status: stats.status,
            elapsed_secs: stats.elapsed.as_secs_f64(),
            objective: stats.objective,
            primal_feas: stats.primal_feas,
            dual_feas: stats.dual_feas,
            iterations: stats.iterations,
            evaluations: stats.counters,
        }
    }
}

/// Side-by-side summary of solver runs on the same model.
///
/// The comparison only reports. Deciding what a disagreement between solvers
/// means is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    rows: Vec<Row>,
}

impl Comparison {
    /// Builds a comparison of `stats`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyComparison`] if `stats` is empty.
    pub fn new(stats: &[Stats]) -> Result<Self, Error> {
        if stats.is_empty() {
            return Err(Error::EmptyComparison);
        }
        Ok(Self {
            rows: stats.iter().map(Row::from).collect(),
        })
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Largest pairwise objective difference relative to the larger magnitude.
    ///
    /// Zero for a single finite run or when every objective is zero. `NaN` if
    /// any objective is not finite, so a diverged run never reads as agreement.
    #[must_use]
    pub fn max_relative_objective_gap(&self) -> f64 {
        if self.rows.iter().any(|row| !row.objective.is_finite()) {
            return f64::NAN;
        }
        let (lo, hi) = self
            .rows
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), row| {
                (lo.min(row.objective), hi.max(row.objective))
            });
        let scale = lo.abs().max(hi.abs());
        if scale == 0.0 { 0.0 } else { (hi - lo) / scale }
    }

    /// True if every run ended with `primal_feas ≤ threshold`.
    #[must_use]
    pub fn all_feasible(&self, threshold: f64) -> bool {
        self.rows.iter().all(|row| row.primal_feas <= threshold)
    }

    /// True if every run reported a converged status.
    #[must_use]
    pub fn all_converged(&self) -> bool {
        self.rows.iter().all(|row| row.status.is_converged())
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|row| row.solver.len())
            .max()
            .unwrap_or(0)
            .max("solver".len());

        writeln!(
            f,
            "{:<width$}  {:<22}  {:>10}  {:>14}  {:>10}  {:>10}  {:>6}  {:>7}  {:>7}  {:>7}",
            "solver", "status", "time [s]", "objective", "inf_pr", "inf_du", "iters", "#f", "#c",
            "#evals",
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<width$}  {:<22}  {:>10.3}  {:>14.7e}  {:>10.2e}  {:>10.2e}  {:>6}  {:>7}  {:>7}  {:>7}",
                row.solver,
                row.status.to_string(),
                row.elapsed_secs,
                row.objective,
                row.primal_feas,
                row.dual_feas,
                row.iterations,
                row.evaluations.obj,
                row.evaluations.cons,
                row.evaluations.total(),
            )?;
        }
        Ok(())
    }
}
