use std::fmt;

use pdecon_core::vector::norm_inf;
use pdecon_core::{NlpModel, Stats};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Backend, Comparison, Error, ExperimentConfig, FeasibilitySummary, SolverObserver, TutorialModel,
    build_model, initialize, run_solver,
};

/// A pipeline stage, passed to the observer factory of [`Experiment::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Feasibility,
    Solve(Backend),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feasibility => f.write_str("feasibility"),
            Self::Solve(backend) => backend.fmt(f),
        }
    }
}

/// Everything one run of the pipeline produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub model: String,
    pub cells: [usize; 2],
    pub nvar: usize,
    pub ncon: usize,
    pub feasibility: FeasibilitySummary,
    pub comparison: Comparison,

    /// Size of the computed fields, one entry per solver run.
    pub fields: Vec<FieldNorms>,
}

/// Max-norms of the state and control parts of a solver's final iterate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldNorms {
    pub solver: String,
    pub state: f64,
    pub control: f64,
}

impl FieldNorms {
    fn of(model: &TutorialModel, stats: &Stats) -> Self {
        let (state, control) = model.split(&stats.solution);
        Self {
            solver: stats.solver.clone(),
            state: norm_inf(state),
            control: norm_inf(control),
        }
    }
}

/// The build, initialize, solve, compare pipeline.
#[derive(Debug, Clone, Copy)]
pub struct Experiment;

impl Experiment {
    /// Runs the pipeline described by `config`.
    ///
    /// `observer_for` is called once per stage; return `()` for quiet runs or a
    /// [`LogObserver`](pdecon_observers::LogObserver) for iteration logs.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the model cannot be
    /// built, or a solver hits a hard failure.
    pub fn run<F, Obs>(config: &ExperimentConfig, mut observer_for: F) -> Result<ExperimentReport, Error>
    where
        F: FnMut(Stage) -> Obs,
        Obs: SolverObserver,
    {
        config.validate()?;

        let model = build_model(config)?;
        info!(
            model = %model.meta().name,
            cells = ?config.cells,
            nvar = model.nvar(),
            ncon = model.ncon(),
            "model built"
        );

        let feasibility = initialize(
            &model,
            &config.least_squares()?,
            observer_for(Stage::Feasibility),
        )?;

        let mut runs = Vec::with_capacity(config.backends.len());
        for &backend in &config.backends {
            info!(solver = %backend, "solving");
            let stats = run_solver(
                &model,
                &feasibility.point,
                backend,
                config,
                observer_for(Stage::Solve(backend)),
            )?;
            runs.push(stats);
        }

        let comparison = Comparison::new(&runs)?;
        let fields = runs.iter().map(|stats| FieldNorms::of(&model, stats)).collect();
        info!(
            gap = comparison.max_relative_objective_gap(),
            converged = comparison.all_converged(),
            "comparison ready"
        );

        Ok(ExperimentReport {
            model: model.meta().name.clone(),
            cells: config.cells,
            nvar: model.nvar(),
            ncon: model.ncon(),
            feasibility: feasibility.summary(),
            comparison,
            fields,
        })
    }
}

impl fmt::Display for ExperimentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} on {}x{} cells: {} variables, {} constraints",
            self.model, self.cells[0], self.cells[1], self.nvar, self.ncon
        )?;
        writeln!(
            f,
            "feasibility: ‖c‖ {:.3e} -> {:.3e} ({}, {} iterations)",
            self.feasibility.initial_violation,
            self.feasibility.final_violation,
            self.feasibility.status,
            self.feasibility.iterations
        )?;
        writeln!(f)?;
        write!(f, "{}", self.comparison)?;
        for field in &self.fields {
            writeln!(
                f,
                "{}: ‖y‖∞ {:.4e}, ‖u‖∞ {:.4e}",
                field.solver, field.state, field.control
            )?;
        }
        write!(
            f,
            "max relative objective gap: {:.3e}",
            self.comparison.max_relative_objective_gap()
        )
    }
}
