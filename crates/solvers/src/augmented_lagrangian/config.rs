use std::time::Duration;

use thiserror::Error;

/// Configuration for the augmented-Lagrangian solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    max_time: Option<Duration>,
    atol: f64,
    rtol: f64,
    initial_penalty: f64,
    max_penalty: f64,
    max_inner_iters: usize,
}

/// Errors that can occur when validating an augmented-Lagrangian config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("atol must be finite and non-negative")]
    Atol,

    #[error("rtol must be finite and non-negative")]
    Rtol,

    #[error("initial_penalty must be finite and greater than 1")]
    InitialPenalty,

    #[error("max_penalty must be finite and above initial_penalty")]
    MaxPenalty,

    #[error("max_inner_iters must be positive")]
    MaxInnerIters,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(100, 1e-8, 1e-8).unwrap()
    }
}

impl Config {
    /// Creates a config with the given outer iteration limit and tolerances.
    ///
    /// The solver stops once `‖c(x) − b‖∞` and the projected Lagrangian
    /// gradient are both at most `atol + rtol` times their values at `x₀`.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance is negative or non-finite.
    pub fn new(max_iters: usize, atol: f64, rtol: f64) -> Result<Self, ConfigError> {
        if !atol.is_finite() || atol < 0.0 {
            return Err(ConfigError::Atol);
        }
        if !rtol.is_finite() || rtol < 0.0 {
            return Err(ConfigError::Rtol);
        }

        Ok(Self {
            max_iters,
            max_time: None,
            atol,
            rtol,
            initial_penalty: 10.0,
            max_penalty: 1e12,
            max_inner_iters: 500,
        })
    }

    /// Stops with [`Status::MaxTime`](pdecon_core::Status::MaxTime) once `limit` has elapsed.
    #[must_use]
    pub fn with_max_time(mut self, limit: Duration) -> Self {
        self.max_time = Some(limit);
        self
    }

    /// Sets the initial penalty and the penalty beyond which the problem is
    /// declared locally infeasible.
    ///
    /// # Errors
    ///
    /// Returns an error unless `1 < initial < max` and both are finite.
    pub fn with_penalty(mut self, initial: f64, max: f64) -> Result<Self, ConfigError> {
        if !initial.is_finite() || initial <= 1.0 {
            return Err(ConfigError::InitialPenalty);
        }
        if !max.is_finite() || max <= initial {
            return Err(ConfigError::MaxPenalty);
        }
        self.initial_penalty = initial;
        self.max_penalty = max;
        Ok(self)
    }

    /// Sets the iteration limit of each subproblem solve.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_inner_iters` is zero.
    pub fn with_max_inner_iters(mut self, max_inner_iters: usize) -> Result<Self, ConfigError> {
        if max_inner_iters == 0 {
            return Err(ConfigError::MaxInnerIters);
        }
        self.max_inner_iters = max_inner_iters;
        Ok(self)
    }

    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    #[must_use]
    pub fn max_time(&self) -> Option<Duration> {
        self.max_time
    }

    #[must_use]
    pub fn atol(&self) -> f64 {
        self.atol
    }

    #[must_use]
    pub fn rtol(&self) -> f64 {
        self.rtol
    }

    #[must_use]
    pub fn initial_penalty(&self) -> f64 {
        self.initial_penalty
    }

    #[must_use]
    pub fn max_penalty(&self) -> f64 {
        self.max_penalty
    }

    #[must_use]
    pub fn max_inner_iters(&self) -> usize {
        self.max_inner_iters
    }
}
