use std::time::Duration;

use thiserror::Error;

/// Configuration for the interior-point solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    max_time: Option<Duration>,
    atol: f64,
    rtol: f64,
    acceptable_factor: f64,
    mu_init: f64,
}

/// Errors that can occur when validating an interior-point solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("atol must be finite and non-negative")]
    Atol,

    #[error("rtol must be finite and non-negative")]
    Rtol,

    #[error("acceptable_factor must be finite and at least 1")]
    AcceptableFactor,

    #[error("mu_init must be finite and positive")]
    MuInit,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(200, 1e-8, 1e-8).unwrap()
    }
}

impl Config {
    /// Creates a config with the given iteration limit and tolerances.
    ///
    /// The solver stops once the constraint violation is at most
    /// `atol + rtol ‖c(x₀) − b‖∞` and the Lagrangian stationarity and
    /// complementarity are at most `atol + rtol` times their initial value.
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
            acceptable_factor: 100.0,
            mu_init: 0.1,
        })
    }

    /// Stops with [`Status::MaxTime`](pdecon_core::Status::MaxTime) once `limit` has elapsed.
    #[must_use]
    pub fn with_max_time(mut self, limit: Duration) -> Self {
        self.max_time = Some(limit);
        self
    }

    /// Reports [`Status::Acceptable`](pdecon_core::Status::Acceptable) when the
    /// solver stalls within `factor` times the requested tolerances.
    ///
    /// # Errors
    ///
    /// Returns an error if `factor` is below 1 or non-finite.
    pub fn with_acceptable_factor(mut self, factor: f64) -> Result<Self, ConfigError> {
        if !factor.is_finite() || factor < 1.0 {
            return Err(ConfigError::AcceptableFactor);
        }
        self.acceptable_factor = factor;
        Ok(self)
    }

    /// Sets the initial barrier parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if `mu` is not finite and positive.
    pub fn with_mu_init(mut self, mu: f64) -> Result<Self, ConfigError> {
        if !mu.is_finite() || mu <= 0.0 {
            return Err(ConfigError::MuInit);
        }
        self.mu_init = mu;
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
    pub fn acceptable_factor(&self) -> f64 {
        self.acceptable_factor
    }

    #[must_use]
    pub fn mu_init(&self) -> f64 {
        self.mu_init
    }
}
