use std::time::Duration;

use thiserror::Error;

/// Configuration for the trust-region Gauss–Newton solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    max_time: Option<Duration>,
    atol: f64,
    rtol: f64,
    gtol: f64,
    initial_radius: f64,
    min_radius: f64,
    cg_rtol: f64,
    cg_max_iters: usize,
}

/// Errors that can occur when validating a least-squares solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("atol must be finite and non-negative")]
    Atol,

    #[error("rtol must be finite and non-negative")]
    Rtol,

    #[error("gtol must be finite and non-negative")]
    Gtol,

    #[error("initial_radius must be finite and positive")]
    InitialRadius,

    #[error("min_radius must be finite, non-negative and below initial_radius")]
    MinRadius,

    #[error("cg_rtol must lie in (0, 1)")]
    CgRtol,

    #[error("cg_max_iters must be positive")]
    CgMaxIters,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(200, 1e-8, 1e-8).unwrap()
    }
}

impl Config {
    /// Creates a config that stops once `‖F‖ ≤ atol + rtol ‖F(x₀)‖`.
    ///
    /// Other settings take their default values and can be changed with the
    /// `with_*` methods.
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
            gtol: 1e-12,
            initial_radius: 1.0,
            min_radius: 1e-12,
            cg_rtol: 1e-6,
            cg_max_iters: 500,
        })
    }

    /// Stops with [`Status::MaxTime`](pdecon_core::Status::MaxTime) once `limit` has elapsed.
    #[must_use]
    pub fn with_max_time(mut self, limit: Duration) -> Self {
        self.max_time = Some(limit);
        self
    }

    /// Declares stationarity once `‖JᵀF‖ ≤ gtol`.
    ///
    /// # Errors
    ///
    /// Returns an error if `gtol` is negative or non-finite.
    pub fn with_gtol(mut self, gtol: f64) -> Result<Self, ConfigError> {
        if !gtol.is_finite() || gtol < 0.0 {
            return Err(ConfigError::Gtol);
        }
        self.gtol = gtol;
        Ok(self)
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

    /// Sets the relative tolerance and iteration limit of the CGLS subproblem.
    ///
    /// # Errors
    ///
    /// Returns an error if `rtol` is outside `(0, 1)` or `max_iters` is zero.
    pub fn with_cg(mut self, rtol: f64, max_iters: usize) -> Result<Self, ConfigError> {
        if !(rtol > 0.0 && rtol < 1.0) {
            return Err(ConfigError::CgRtol);
        }
        if max_iters == 0 {
            return Err(ConfigError::CgMaxIters);
        }
        self.cg_rtol = rtol;
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
    pub fn gtol(&self) -> f64 {
        self.gtol
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
    pub fn cg_rtol(&self) -> f64 {
        self.cg_rtol
    }

    #[must_use]
    pub fn cg_max_iters(&self) -> usize {
        self.cg_max_iters
    }
}
