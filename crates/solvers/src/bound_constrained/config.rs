use std::time::Duration;

use thiserror::Error;

/// Configuration for the bound-constrained trust-region Newton–CG solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    max_time: Option<Duration>,
    atol: f64,
    rtol: f64,
    initial_radius: f64,
    min_radius: f64,
    cg_max_iters: usize,
}

/// Errors that can occur when validating a bound-constrained solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("atol must be finite and non-negative")]
    Atol,

    #[error("rtol must be finite and non-negative")]
    Rtol,

    #[error("initial_radius must be finite and positive")]
    InitialRadius,

    #[error("min_radius must be finite, non-negative and below initial_radius")]
    MinRadius,

    #[error("cg_max_iters must be positive")]
    CgMaxIters,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(500, 1e-8, 1e-8).unwrap()
    }
}

impl Config {
    /// Creates a config that stops once the projected gradient satisfies
    /// `‖P(x − ∇f) − x‖∞ ≤ atol + rtol ‖P(x₀ − ∇f₀) − x₀‖∞`.
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
            initial_radius: 1.0,
            min_radius: 1e-14,
            cg_max_iters: 1000,
        })
    }

    #[must_use]
    pub fn with_max_time(mut self, limit: Duration) -> Self {
        self.max_time = Some(limit);
        self
    }

    /// Sets the initial and minimum trust-region radii.
    ///
    /// # Errors
    ///
    /// Returns an error unless `0 <= min < initial` and both are finite.
    pub fn with_radius(mut self, initial: f64, min: f64) -> Result<Self, ConfigError> {
        if !initial.is_finite() || initial <= 0.0 {
            return Err(ConfigError::InitialRadius);
        }
        if !min.is_finite() || min < 0.0 || min >= initial {
            return Err(ConfigError::MinRadius);
        }
        self.initial_radius = initial;
        self.min_radius = min;
        Ok(self)
    }

    /// Caps the CG iterations spent on one trust-region subproblem.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_iters` is zero.
    pub fn with_cg_max_iters(mut self, max_iters: usize) -> Result<Self, ConfigError> {
        if max_iters == 0 {
            return Err(ConfigError::CgMaxIters);
        }
        self.cg_max_iters = max_iters;
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
    pub fn initial_radius(&self) -> f64 {
        self.initial_radius
    }

    #[must_use]
    pub fn min_radius(&self) -> f64 {
        self.min_radius
    }

    #[must_use]
    pub fn cg_max_iters(&self) -> usize {
        self.cg_max_iters
    }
}
