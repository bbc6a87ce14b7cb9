use pdecon_core::FeasibilityError;
use pdecon_fem::BuildError;
use pdecon_solvers::{augmented_lagrangian, interior_point, least_squares};
use thiserror::Error;

use crate::ConfigError;

/// Errors that stop an experiment.
///
/// A solver that fails to converge is not an error; its status is reported.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("model construction failed: {0}")]
    Build(#[from] BuildError),

    #[error("feasibility problem: {0}")]
    Feasibility(#[from] FeasibilityError),

    #[error("least-squares solver failed: {0}")]
    LeastSquares(#[from] least_squares::Error),

    #[error("interior-point solver failed: {0}")]
    InteriorPoint(#[from] interior_point::Error),

    #[error("augmented-Lagrangian solver failed: {0}")]
    AugmentedLagrangian(#[from] augmented_lagrangian::Error),

    #[error("nothing to compare: no solver statistics were given")]
    EmptyComparison,
}
