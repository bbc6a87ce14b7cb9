use std::f64::consts::PI;
use std::time::Duration;

use pdecon_solvers::{augmented_lagrangian, interior_point, least_squares};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Backend;

/// Everything that defines one tutorial run.
///
/// Every field has a default, so a JSON file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Side length of the square domain.
    pub side: f64,

    /// Center of the square domain.
    pub center: [f64; 2],

    /// Cells along each axis.
    pub cells: [usize; 2],

    /// Lagrange order of the state field.
    pub state_order: usize,

    /// Lagrange order of the control field.
    pub control_order: usize,

    /// Gauss points per axis, or `None` to pick from the element orders.
    pub quadrature_points: Option<usize>,

    /// Control cost weight `α`.
    pub alpha: f64,

    /// Frequency `ω` of the forcing `h = −sin(ω x₁) sin(ω x₂)`.
    pub omega: f64,

    /// Coefficient `κ` of the cubic reaction term.
    pub reaction: f64,

    /// Tolerance passed to both constrained solvers.
    pub tolerance: f64,

    /// Settings of the feasibility phase.
    pub feasibility: FeasibilitySettings,

    /// Limits shared by the constrained solvers.
    pub limits: SolverLimits,

    /// Backends to run, in order.
    pub backends: Vec<Backend>,
}

/// Settings of the least-squares feasibility phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeasibilitySettings {
    pub max_iters: usize,
    pub atol: f64,
    pub rtol: f64,

    /// Stop once `‖JᵀF‖` falls to this value.
    pub gtol: f64,
}

/// Iteration and time limits of a constrained solver run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverLimits {
    pub max_iters: usize,

    /// Wall-clock limit in seconds.
    pub max_time: Option<f64>,
}

/// Errors raised by [`ExperimentConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("side must be finite and positive, got {0}")]
    Side(f64),

    #[error("cells must be positive along both axes, got {0:?}")]
    Cells([usize; 2]),

    #[error("alpha must be finite and positive, got {0}")]
    Alpha(f64),

    #[error("omega and reaction must be finite")]
    Coefficients,

    #[error("max_time must be positive and representable as a duration, got {0}")]
    MaxTime(f64),

    #[error("at least one backend is required")]
    NoBackends,

    #[error("feasibility settings: {0}")]
    LeastSquares(#[from] least_squares::ConfigError),

    #[error("interior-point settings: {0}")]
    InteriorPoint(#[from] interior_point::ConfigError),

    #[error("augmented-Lagrangian settings: {0}")]
    AugmentedLagrangian(#[from] augmented_lagrangian::ConfigError),
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            side: 2.0,
            center: [0.0, 0.0],
            cells: [100, 100],
            state_order: 1,
            control_order: 1,
            quadrature_points: None,
            alpha: 0.01,
            omega: PI - 1.0 / 8.0,
            reaction: 1.0,
            tolerance: 1e-5,
            feasibility: FeasibilitySettings::default(),
            limits: SolverLimits::default(),
            backends: vec![Backend::InteriorPoint, Backend::AugmentedLagrangian],
        }
    }
}

impl Default for FeasibilitySettings {
    fn default() -> Self {
        Self {
            max_iters: 200,
            atol: 1e-10,
            rtol: 1e-10,
            gtol: 1e-12,
        }
    }
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            max_iters: 500,
            max_time: None,
        }
    }
}

impl ExperimentConfig {
    /// Checks every setting that can be checked before a model is built.
    ///
    /// Element orders and quadrature sizes are checked by the model builder.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.side.is_finite() || self.side <= 0.0 {
            return Err(ConfigError::Side(self.side));
        }
        if self.cells.contains(&0) {
            return Err(ConfigError::Cells(self.cells));
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(ConfigError::Alpha(self.alpha));
        }
        if !self.omega.is_finite() || !self.reaction.is_finite() {
            return Err(ConfigError::Coefficients);
        }
        if self.backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }
        self.least_squares()?;
        self.interior_point()?;
        self.augmented_lagrangian()?;
        Ok(())
    }

    /// Least-squares solver config for the feasibility phase.
    ///
    /// # Errors
    ///
    /// Returns an error if a feasibility tolerance is invalid.
    pub fn least_squares(&self) -> Result<least_squares::Config, ConfigError> {
        let f = &self.feasibility;
        let config = least_squares::Config::new(f.max_iters, f.atol, f.rtol)?.with_gtol(f.gtol)?;
        Ok(match self.max_time()? {
            Some(limit) => config.with_max_time(limit),
            None => config,
        })
    }

    /// Interior-point config using `tolerance` as both `atol` and `rtol`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerance or time limit is invalid.
    pub fn interior_point(&self) -> Result<interior_point::Config, ConfigError> {
        let config =
            interior_point::Config::new(self.limits.max_iters, self.tolerance, self.tolerance)?;
        Ok(match self.max_time()? {
            Some(limit) => config.with_max_time(limit),
            None => config,
        })
    }

    /// Augmented-Lagrangian config using `tolerance` as both `atol` and `rtol`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerance or time limit is invalid.
    pub fn augmented_lagrangian(&self) -> Result<augmented_lagrangian::Config, ConfigError> {
        let config = augmented_lagrangian::Config::new(
            self.limits.max_iters,
            self.tolerance,
            self.tolerance,
        )?;
        Ok(match self.max_time()? {
            Some(limit) => config.with_max_time(limit),
            None => config,
        })
    }

    fn max_time(&self) -> Result<Option<Duration>, ConfigError> {
        match self.limits.max_time {
            None => Ok(None),
            Some(secs) if secs > 0.0 => Duration::try_from_secs_f64(secs)
                .map(Some)
                .map_err(|_| ConfigError::MaxTime(secs)),
            Some(secs) => Err(ConfigError::MaxTime(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_reference_problem() {
        let config = ExperimentConfig::default();

        assert_eq!(config.cells, [100, 100]);
        assert_eq!(config.side, 2.0);
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.omega, PI - 0.125);
        assert_eq!(config.tolerance, 1e-5);
        assert_eq!(config.backends.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ExperimentConfig =
            serde_json::from_str(r#"{ "cells": [10, 12], "backends": ["interior-point"] }"#)
                .unwrap();

        assert_eq!(config.cells, [10, 12]);
        assert_eq!(config.backends, vec![Backend::InteriorPoint]);
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.feasibility, FeasibilitySettings::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<ExperimentConfig, _> = serde_json::from_str(r#"{ "cels": [10, 10] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_settings_are_reported() {
        let mut config = ExperimentConfig {
            cells: [0, 4],
            ..ExperimentConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Cells([0, 4])));

        config.cells = [4, 4];
        config.tolerance = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InteriorPoint(_))
        ));

        config.tolerance = 1e-6;
        config.limits.max_time = Some(0.0);
        assert_eq!(config.validate(), Err(ConfigError::MaxTime(0.0)));

        config.limits.max_time = Some(1e30);
        assert_eq!(config.validate(), Err(ConfigError::MaxTime(1e30)));

        config.limits.max_time = Some(f64::INFINITY);
        assert_eq!(config.validate(), Err(ConfigError::MaxTime(f64::INFINITY)));

        config.limits.max_time = Some(3600.0);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.interior_point().unwrap().max_time(),
            Some(Duration::from_secs(3600))
        );

        config.limits.max_time = None;
        config.feasibility.gtol = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LeastSquares(_))
        ));

        config.feasibility.gtol = 1e-9;
        assert_eq!(config.least_squares().unwrap().gtol(), 1e-9);

        config.limits.max_time = None;
        config.backends.clear();
        assert_eq!(config.validate(), Err(ConfigError::NoBackends));
    }
}
