use std::fmt;
use std::str::FromStr;

use pdecon_core::{NlpModel, Observer, Stats};
use pdecon_solvers::{augmented_lagrangian, interior_point, least_squares};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{Error, ExperimentConfig};

/// The constrained solvers the tutorial compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    InteriorPoint,
    AugmentedLagrangian,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::InteriorPoint, Backend::AugmentedLagrangian];

    /// The solver name recorded in [`Stats::solver`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::InteriorPoint => interior_point::NAME,
            Self::AugmentedLagrangian => augmented_lagrangian::NAME,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown backend `{0}` (expected `interior-point` or `augmented-lagrangian`)")]
pub struct UnknownBackend(pub String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interior-point" | "ipm" => Ok(Self::InteriorPoint),
            "augmented-lagrangian" | "al" => Ok(Self::AugmentedLagrangian),
            other => Err(UnknownBackend(other.to_owned())),
        }
    }
}

/// An observer every solver in the pipeline can report to.
///
/// Implemented automatically; `()`, [`LogObserver`] and [`History`] qualify.
///
/// [`LogObserver`]: pdecon_observers::LogObserver
/// [`History`]: pdecon_observers::History
pub trait SolverObserver:
    for<'a> Observer<least_squares::Event<'a>, least_squares::Action>
    + for<'a> Observer<interior_point::Event<'a>, interior_point::Action>
    + for<'a> Observer<augmented_lagrangian::Event<'a>, augmented_lagrangian::Action>
{
}

impl<T> SolverObserver for T where
    T: for<'a> Observer<least_squares::Event<'a>, least_squares::Action>
        + for<'a> Observer<interior_point::Event<'a>, interior_point::Action>
        + for<'a> Observer<augmented_lagrangian::Event<'a>, augmented_lagrangian::Action>
{
}

/// Runs one backend on `model` from `x0`.
///
/// The model's counters are reset first, so [`Stats::counters`] covers this
/// run only. Tolerances and limits come from `config`.
///
/// # Errors
///
/// Returns an error if the solver settings are invalid or the solver hits a
/// hard failure. Non-convergence is reported through [`Stats::status`].
pub fn run_solver<M, Obs>(
    model: &M,
    x0: &[f64],
    backend: Backend,
    config: &ExperimentConfig,
    observer: Obs,
) -> Result<Stats, Error>
where
    M: NlpModel,
    Obs: SolverObserver,
{
    model.reset_counters();

    let stats = match backend {
        Backend::InteriorPoint => {
            let settings = config.interior_point()?;
            Stats::from(interior_point::solve(model, x0, &settings, observer)?)
        }
        Backend::AugmentedLagrangian => {
            let settings = config.augmented_lagrangian()?;
            Stats::from(augmented_lagrangian::solve(model, x0, &settings, observer)?)
        }
    };

    info!(
        solver = %backend,
        status = %stats.status,
        iterations = stats.iterations,
        objective = stats.objective,
        primal_feas = stats.primal_feas,
        dual_feas = stats.dual_feas,
        elapsed = ?stats.elapsed,
        "solver finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backends_parse_from_their_names() {
        for backend in Backend::ALL {
            assert_eq!(backend.to_string().parse::<Backend>(), Ok(backend));
        }
        assert_eq!("ipm".parse::<Backend>(), Ok(Backend::InteriorPoint));
        assert_eq!("al".parse::<Backend>(), Ok(Backend::AugmentedLagrangian));
        assert!("newton".parse::<Backend>().is_err());
    }

    #[test]
    fn serde_and_display_agree() {
        for backend in Backend::ALL {
            let json = serde_json::to_string(&backend).unwrap();
            assert_eq!(json, format!("\"{backend}\""));
        }
    }
}
