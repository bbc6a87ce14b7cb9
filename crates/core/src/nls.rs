use crate::Counters;

/// A nonlinear least-squares problem `min ½‖F(x)‖²`.
///
/// Only residual values and Jacobian-vector products are required, so solvers
/// built on this trait are matrix-free.
pub trait NlsModel {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Number of variables.
    fn nvar(&self) -> usize;

    /// Number of residual equations.
    fn nequ(&self) -> usize;

    /// Default starting point (length `nvar`).
    fn x0(&self) -> &[f64];

    /// The problem's evaluation counters.
    fn counters(&self) -> &Counters;

    /// Writes `F(x)` (length `nequ`) into `r`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the residual cannot be evaluated at `x`.
    fn residual(&self, x: &[f64], r: &mut [f64]) -> Result<(), Self::Error>;

    /// Writes `J_F(x) v` (length `nequ`) into `jv`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the product cannot be evaluated.
    fn jprod_residual(&self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<(), Self::Error>;

    /// Writes `J_F(x)ᵀ v` (length `nvar`) into `jtv`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the product cannot be evaluated.
    fn jtprod_residual(&self, x: &[f64], v: &[f64], jtv: &mut [f64]) -> Result<(), Self::Error>;

    /// Zeroes the evaluation counters.
    fn reset_counters(&self) {
        self.counters().reset();
    }
}
