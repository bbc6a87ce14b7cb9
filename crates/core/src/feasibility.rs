use thiserror::Error;

use crate::{Counters, EvalKind, NlpModel, NlsModel};

/// Views the constraints of an [`NlpModel`] as a least-squares residual.
///
/// The residual is `F(x) = c(x) − lcon`, so `½‖F(x)‖²` is zero exactly on
/// the feasible set. The view only reads from the parent model: residuals and
/// Jacobian products are delegated to `cons`, `jprod`, and `jtprod`. It keeps
/// its own counters for the least-squares evaluations; the parent still counts
/// the delegated calls on its side.
///
/// Only equality-constrained models are supported.
#[derive(Debug)]
pub struct FeasibilityResidual<'a, M> {
    model: &'a M,
    counters: Counters,
}

/// Errors raised when building a [`FeasibilityResidual`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FeasibilityError {
    #[error("constraint {index} is not an equality")]
    NotAnEquality { index: usize },
}

impl<'a, M: NlpModel> FeasibilityResidual<'a, M> {
    /// Wraps `model`.
    ///
    /// # Errors
    ///
    /// Returns [`FeasibilityError::NotAnEquality`] for the first constraint
    /// whose lower and upper bounds differ.
    pub fn new(model: &'a M) -> Result<Self, FeasibilityError> {
        let meta = model.meta();
        if let Some(index) = meta
            .lcon
            .iter()
            .zip(&meta.ucon)
            .position(|(l, u)| l != u)
        {
            return Err(FeasibilityError::NotAnEquality { index });
        }
        Ok(Self {
            model,
            counters: Counters::new(),
        })
    }

    /// The wrapped model.
    #[must_use]
    pub fn model(&self) -> &'a M {
        self.model
    }
}

impl<M: NlpModel> NlsModel for FeasibilityResidual<'_, M> {
    type Error = M::Error;

    fn nvar(&self) -> usize {
        self.model.nvar()
    }

    fn nequ(&self) -> usize {
        self.model.ncon()
    }

    fn x0(&self) -> &[f64] {
        &self.model.meta().x0
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn residual(&self, x: &[f64], r: &mut [f64]) -> Result<(), Self::Error> {
        self.counters.record(EvalKind::Residual);
        self.model.cons(x, r)?;
        for (ri, li) in r.iter_mut().zip(&self.model.meta().lcon) {
            *ri -= li;
        }
        Ok(())
    }

    fn jprod_residual(&self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<(), Self::Error> {
        self.counters.record(EvalKind::JprodResidual);
        self.model.jprod(x, v, jv)
    }

    fn jtprod_residual(&self, x: &[f64], v: &[f64], jtv: &mut [f64]) -> Result<(), Self::Error> {
        self.counters.record(EvalKind::JtprodResidual);
        self.model.jtprod(x, v, jtv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;
    use sprs::TriMat;

    use crate::NlpMeta;

    /// `c(x) = [x₀ + x₁, x₀ x₁]`.
    #[derive(Debug)]
    struct TwoConstraints {
        meta: NlpMeta,
        counters: Counters,
    }

    impl TwoConstraints {
        fn new(lcon: Vec<f64>, ucon: Vec<f64>) -> Self {
            let meta = NlpMeta::new("two", 2, 2)
                .with_constraint_bounds(lcon, ucon)
                .unwrap();
            Self {
                meta,
                counters: Counters::new(),
            }
        }
    }

    impl NlpModel for TwoConstraints {
        type Error = Infallible;

        fn meta(&self) -> &NlpMeta {
            &self.meta
        }

        fn counters(&self) -> &Counters {
            &self.counters
        }

        fn obj(&self, _x: &[f64]) -> Result<f64, Self::Error> {
            Ok(0.0)
        }

        fn grad(&self, _x: &[f64], g: &mut [f64]) -> Result<(), Self::Error> {
            g.fill(0.0);
            Ok(())
        }

        fn cons(&self, x: &[f64], c: &mut [f64]) -> Result<(), Self::Error> {
            self.counters.record(EvalKind::Cons);
            c[0] = x[0] + x[1];
            c[1] = x[0] * x[1];
            Ok(())
        }

        fn jprod(&self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<(), Self::Error> {
            self.counters.record(EvalKind::Jprod);
            jv[0] = v[0] + v[1];
            jv[1] = x[1] * v[0] + x[0] * v[1];
            Ok(())
        }

        fn jtprod(&self, x: &[f64], v: &[f64], jtv: &mut [f64]) -> Result<(), Self::Error> {
            self.counters.record(EvalKind::Jtprod);
            jtv[0] = v[0] + x[1] * v[1];
            jtv[1] = v[0] + x[0] * v[1];
            Ok(())
        }

        fn jac(&self, _x: &[f64]) -> Result<TriMat<f64>, Self::Error> {
            Ok(TriMat::new((2, 2)))
        }

        fn hess(&self, _x: &[f64], _y: &[f64], _w: f64) -> Result<TriMat<f64>, Self::Error> {
            Ok(TriMat::new((2, 2)))
        }

        fn hprod(
            &self,
            _x: &[f64],
            _y: &[f64],
            _w: f64,
            _v: &[f64],
            hv: &mut [f64],
        ) -> Result<(), Self::Error> {
            hv.fill(0.0);
            Ok(())
        }
    }

    #[test]
    fn residual_is_shifted_constraints() {
        let model = TwoConstraints::new(vec![1.0, 2.0], vec![1.0, 2.0]);
        let nls = FeasibilityResidual::new(&model).unwrap();

        let mut r = vec![0.0; 2];
        nls.residual(&[1.0, 2.0], &mut r).unwrap();

        assert_relative_eq!(r[0], 2.0);
        assert_relative_eq!(r[1], 0.0);
    }

    #[test]
    fn products_delegate_to_parent() {
        let model = TwoConstraints::new(vec![0.0, 0.0], vec![0.0, 0.0]);
        let nls = FeasibilityResidual::new(&model).unwrap();

        let mut jv = vec![0.0; 2];
        nls.jprod_residual(&[2.0, 3.0], &[1.0, 0.0], &mut jv).unwrap();
        assert_relative_eq!(jv[1], 3.0);

        let mut jtv = vec![0.0; 2];
        nls.jtprod_residual(&[2.0, 3.0], &[0.0, 1.0], &mut jtv).unwrap();
        assert_relative_eq!(jtv[1], 2.0);
    }

    #[test]
    fn keeps_separate_counters() {
        let model = TwoConstraints::new(vec![0.0, 0.0], vec![0.0, 0.0]);
        let nls = FeasibilityResidual::new(&model).unwrap();

        let mut r = vec![0.0; 2];
        nls.residual(&[0.0, 0.0], &mut r).unwrap();
        nls.residual(&[0.0, 0.0], &mut r).unwrap();

        assert_eq!(nls.counters().get(EvalKind::Residual), 2);
        assert_eq!(nls.counters().get(EvalKind::Cons), 0);
        assert_eq!(model.counters().get(EvalKind::Cons), 2);

        nls.reset_counters();
        assert_eq!(nls.counters().get(EvalKind::Residual), 0);
        assert_eq!(model.counters().get(EvalKind::Cons), 2);
    }

    #[test]
    fn inequality_constraints_are_rejected() {
        let model = TwoConstraints::new(vec![0.0, 0.0], vec![0.0, 1.0]);
        let err = FeasibilityResidual::new(&model).unwrap_err();
        assert_eq!(err, FeasibilityError::NotAnEquality { index: 1 });
    }
}
