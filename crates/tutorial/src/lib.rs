//! The pdecon tutorial: distributed control of a semilinear Poisson equation.
//!
//! The pipeline is linear:
//!
//! 1. [`build_model`] discretizes the control problem with finite elements
//! 2. [`initialize`] moves the initial point toward feasibility by least squares
//! 3. [`run_solver`] solves the constrained problem with each [`Backend`]
//! 4. [`Comparison`] reports the runs side by side
//!
//! [`Experiment::run`] chains the four steps for an [`ExperimentConfig`].
//!
//! ```no_run
//! use pdecon_tutorial::{Experiment, ExperimentConfig};
//!
//! let config = ExperimentConfig {
//!     cells: [16, 16],
//!     ..ExperimentConfig::default()
//! };
//! let report = Experiment::run(&config, |_| ()).unwrap();
//! println!("{report}");
//! ```

mod config;
mod error;
mod experiment;
mod initialize;
mod problem;
mod report;
mod runner;

pub use config::{ConfigError, ExperimentConfig, FeasibilitySettings, SolverLimits};
pub use error::Error;
pub use experiment::{Experiment, ExperimentReport, FieldNorms, Stage};
pub use initialize::{FeasibilityReport, FeasibilitySummary, initialize, initialize_from};
pub use problem::{Field, MODEL_NAME, TutorialModel, build_model, forcing, target};
pub use report::{Comparison, Row};
pub use runner::{Backend, SolverObserver, UnknownBackend, run_solver};
