use sprs::TriMat;
use thiserror::Error;

use crate::Counters;

/// Size and bound metadata of a nonlinear program.
///
/// The program is
///
/// ```text
/// minimize    f(x)
/// subject to  lcon ≤ c(x) ≤ ucon
///             lvar ≤ x    ≤ uvar
/// ```
///
/// Constraints with `lcon[i] == ucon[i]` are equalities. Unbounded entries use
/// `f64::NEG_INFINITY` / `f64::INFINITY`.
#[derive(Debug, Clone, PartialEq)]
pub struct NlpMeta {
    pub name: String,
    pub nvar: usize,
    pub ncon: usize,
    pub x0: Vec<f64>,
    pub lvar: Vec<f64>,
    pub uvar: Vec<f64>,
    pub y0: Vec<f64>,
    pub lcon: Vec<f64>,
    pub ucon: Vec<f64>,
}

/// Errors raised while assembling [`NlpMeta`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetaError {
    #[error("{field} has length {found}, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{field} bounds are inverted at index {index}")]
    InvertedBounds { field: &'static str, index: usize },
}

impl NlpMeta {
    /// Creates metadata for an unbounded problem with `ncon` equality
    /// constraints `c(x) = 0`, starting from the origin.
    #[must_use]
    pub fn new(name: impl Into<String>, nvar: usize, ncon: usize) -> Self {
        Self {
            name: name.into(),
            nvar,
            ncon,
            x0: vec![0.0; nvar],
            lvar: vec![f64::NEG_INFINITY; nvar],
            uvar: vec![f64::INFINITY; nvar],
            y0: vec![0.0; ncon],
            lcon: vec![0.0; ncon],
            ucon: vec![0.0; ncon],
        }
    }

    /// Replaces the initial point.
    ///
    /// # Errors
    ///
    /// Returns [`MetaError::LengthMismatch`] if `x0.len() != nvar`.
    pub fn with_x0(mut self, x0: Vec<f64>) -> Result<Self, MetaError> {
        check_len("x0", self.nvar, x0.len())?;
        self.x0 = x0;
        Ok(self)
    }

    /// Replaces the variable bounds.
    ///
    /// # Errors
    ///
    /// Returns an error on a length mismatch or if `lvar[i] > uvar[i]`.
    pub fn with_bounds(mut self, lvar: Vec<f64>, uvar: Vec<f64>) -> Result<Self, MetaError> {
        check_len("lvar", self.nvar, lvar.len())?;
        check_len("uvar", self.nvar, uvar.len())?;
        check_order("variable", &lvar, &uvar)?;
        self.lvar = lvar;
        self.uvar = uvar;
        Ok(self)
    }

    /// Replaces the constraint bounds.
    ///
    /// # Errors
    ///
    /// Returns an error on a length mismatch or if `lcon[i] > ucon[i]`.
    pub fn with_constraint_bounds(
        mut self,
        lcon: Vec<f64>,
        ucon: Vec<f64>,
    ) -> Result<Self, MetaError> {
        check_len("lcon", self.ncon, lcon.len())?;
        check_len("ucon", self.ncon, ucon.len())?;
        check_order("constraint", &lcon, &ucon)?;
        self.lcon = lcon;
        self.ucon = ucon;
        Ok(self)
    }

    /// True when every constraint is an equality.
    #[must_use]
    pub fn is_equality_constrained(&self) -> bool {
        self.lcon.iter().zip(&self.ucon).all(|(l, u)| l == u)
    }

    /// True when at least one variable has a finite bound.
    #[must_use]
    pub fn has_bounds(&self) -> bool {
        self.lvar.iter().any(|l| l.is_finite()) || self.uvar.iter().any(|u| u.is_finite())
    }
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), MetaError> {
    if expected == found {
        Ok(())
    } else {
        Err(MetaError::LengthMismatch {
            field,
            expected,
            found,
        })
    }
}

fn check_order(field: &'static str, lower: &[f64], upper: &[f64]) -> Result<(), MetaError> {
    match lower.iter().zip(upper).position(|(l, u)| l > u) {
        Some(index) => Err(MetaError::InvertedBounds { field, index }),
        None => Ok(()),
    }
}

/// A smooth nonlinear program evaluated through `&self`.
///
/// Implementations record every evaluation in [`NlpModel::counters`]. The
/// Lagrangian convention is `L(x, y) = σ f(x) + yᵀ c(x)`.
///
/// Output buffers are provided by the caller and have the documented length;
/// implementations overwrite them.
pub trait NlpModel {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sizes, bounds, and the default starting point.
    fn meta(&self) -> &NlpMeta;

    /// The model's evaluation counters.
    fn counters(&self) -> &Counters;

    /// Objective value `f(x)`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the objective cannot be evaluated at `x`.
    fn obj(&self, x: &[f64]) -> Result<f64, Self::Error>;

    /// Writes `∇f(x)` (length `nvar`) into `g`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the gradient cannot be evaluated at `x`.
    fn grad(&self, x: &[f64], g: &mut [f64]) -> Result<(), Self::Error>;

    /// Writes `c(x)` (length `ncon`) into `c`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the constraints cannot be evaluated at `x`.
    fn cons(&self, x: &[f64], c: &mut [f64]) -> Result<(), Self::Error>;

    /// Writes `J(x) v` (length `ncon`) into `jv`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the product cannot be evaluated.
    fn jprod(&self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<(), Self::Error>;

    /// Writes `J(x)ᵀ v` (length `nvar`) into `jtv`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the product cannot be evaluated.
    fn jtprod(&self, x: &[f64], v: &[f64], jtv: &mut [f64]) -> Result<(), Self::Error>;

    /// The constraint Jacobian in coordinate form (`ncon × nvar`).
    ///
    /// Duplicate entries are allowed and summed.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the Jacobian cannot be evaluated.
    fn jac(&self, x: &[f64]) -> Result<TriMat<f64>, Self::Error>;

    /// The Hessian of the Lagrangian `σ ∇²f + Σ yᵢ ∇²cᵢ` in coordinate form.
    ///
    /// Both triangles are stored. Duplicate entries are allowed and summed.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the Hessian cannot be evaluated.
    fn hess(&self, x: &[f64], y: &[f64], obj_weight: f64) -> Result<TriMat<f64>, Self::Error>;

    /// Writes the Hessian-of-the-Lagrangian product `H v` into `hv`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the product cannot be evaluated.
    fn hprod(
        &self,
        x: &[f64],
        y: &[f64],
        obj_weight: f64,
        v: &[f64],
        hv: &mut [f64],
    ) -> Result<(), Self::Error>;

    /// Number of variables.
    fn nvar(&self) -> usize {
        self.meta().nvar
    }

    /// Number of constraints.
    fn ncon(&self) -> usize {
        self.meta().ncon
    }

    /// Zeroes the evaluation counters.
    fn reset_counters(&self) {
        self.counters().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_meta_is_unbounded_equality_problem() {
        let meta = NlpMeta::new("demo", 3, 2);

        assert_eq!(meta.x0, vec![0.0; 3]);
        assert!(meta.is_equality_constrained());
        assert!(!meta.has_bounds());
    }

    #[test]
    fn x0_length_is_checked() {
        let err = NlpMeta::new("demo", 3, 0).with_x0(vec![1.0; 2]).unwrap_err();
        assert_eq!(
            err,
            MetaError::LengthMismatch {
                field: "x0",
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = NlpMeta::new("demo", 2, 0)
            .with_bounds(vec![0.0, 1.0], vec![1.0, 0.0])
            .unwrap_err();
        assert_eq!(
            err,
            MetaError::InvertedBounds {
                field: "variable",
                index: 1
            }
        );
    }

    #[test]
    fn inequality_rows_are_detected() {
        let meta = NlpMeta::new("demo", 1, 2)
            .with_constraint_bounds(vec![0.0, -1.0], vec![0.0, 1.0])
            .unwrap();
        assert!(!meta.is_equality_constrained());
    }
}
