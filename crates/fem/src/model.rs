use std::cell::RefCell;

use pdecon_core::sparse::{compress, mul_vec, mul_vec_transpose};
use pdecon_core::{Counters, EvalKind, NlpMeta, NlpModel};
use sprs::{CsMat, TriMat};

use crate::assembly::Discretization;
use crate::space::DofMap;
use crate::{CartesianMesh, EvalError, Objective, StateEquation};

/// A discretized PDE-constrained optimization problem.
///
/// Variables are the free state DOFs followed by the free control DOFs, and
/// there is one equality constraint per free state DOF. Built by
/// [`ModelBuilder`](crate::ModelBuilder).
///
/// Jacobian and Hessian products reuse the last assembled matrix while the
/// evaluation point is unchanged.
#[derive(Debug)]
pub struct PdeModel<O, E> {
    meta: NlpMeta,
    discretization: Discretization,
    objective: O,
    equation: E,
    counters: Counters,
    jacobian: RefCell<Option<Cached>>,
    hessian: RefCell<Option<Cached>>,
}

#[derive(Debug)]
struct Cached {
    key: Vec<f64>,
    matrix: CsMat<f64>,
}

impl<O, E> PdeModel<O, E>
where
    O: Objective,
    E: StateEquation,
{
    pub(crate) fn new(
        meta: NlpMeta,
        discretization: Discretization,
        objective: O,
        equation: E,
    ) -> Self {
        Self {
            meta,
            discretization,
            objective,
            equation,
            counters: Counters::new(),
            jacobian: RefCell::new(None),
            hessian: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn mesh(&self) -> &CartesianMesh {
        self.discretization.mesh()
    }

    /// DOF map of the state field.
    #[must_use]
    pub fn state(&self) -> &DofMap {
        self.discretization.state()
    }

    /// DOF map of the control field.
    #[must_use]
    pub fn control(&self) -> &DofMap {
        self.discretization.control()
    }

    /// Splits a variable vector into its state and control parts.
    #[must_use]
    pub fn split<'a>(&self, x: &'a [f64]) -> (&'a [f64], &'a [f64]) {
        x.split_at(self.state().num_dofs())
    }

    fn check_x(&self, x: &[f64]) -> Result<(), EvalError> {
        EvalError::check("x", self.meta.nvar, x.len())
    }

    fn with_jacobian<R>(&self, x: &[f64], f: impl FnOnce(&CsMat<f64>) -> R) -> R {
        let mut cache = self.jacobian.borrow_mut();
        if cache.as_ref().is_some_and(|c| c.key != x) {
            *cache = None;
        }
        let cached = cache.get_or_insert_with(|| Cached {
            key: x.to_vec(),
            matrix: compress(&self.discretization.jacobian(&self.equation, x)),
        });
        f(&cached.matrix)
    }

    fn with_hessian<R>(
        &self,
        x: &[f64],
        y: &[f64],
        obj_weight: f64,
        f: impl FnOnce(&CsMat<f64>) -> R,
    ) -> R {
        let mut key = Vec::with_capacity(x.len() + y.len() + 1);
        key.extend_from_slice(x);
        key.extend_from_slice(y);
        key.push(obj_weight);

        let mut cache = self.hessian.borrow_mut();
        if cache.as_ref().is_some_and(|c| c.key != key) {
            *cache = None;
        }
        let cached = cache.get_or_insert_with(|| Cached {
            matrix: compress(&self.assemble_hessian(x, y, obj_weight)),
            key,
        });
        f(&cached.matrix)
    }

    fn assemble_hessian(&self, x: &[f64], y: &[f64], obj_weight: f64) -> TriMat<f64> {
        self.discretization
            .hessian(&self.objective, &self.equation, x, y, obj_weight)
    }
}

impl<O, E> NlpModel for PdeModel<O, E>
where
    O: Objective,
    E: StateEquation,
{
    type Error = EvalError;

    fn meta(&self) -> &NlpMeta {
        &self.meta
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn obj(&self, x: &[f64]) -> Result<f64, EvalError> {
        self.check_x(x)?;
        self.counters.record(EvalKind::Obj);
        Ok(self.discretization.objective(&self.objective, x))
    }

    fn grad(&self, x: &[f64], g: &mut [f64]) -> Result<(), EvalError> {
        self.check_x(x)?;
        EvalError::check("gradient", self.meta.nvar, g.len())?;
        self.counters.record(EvalKind::Grad);
        self.discretization.gradient(&self.objective, x, g);
        Ok(())
    }

    fn cons(&self, x: &[f64], c: &mut [f64]) -> Result<(), EvalError> {
        self.check_x(x)?;
        EvalError::check("constraints", self.meta.ncon, c.len())?;
        self.counters.record(EvalKind::Cons);
        self.discretization.residual(&self.equation, x, c);
        Ok(())
    }

    fn jprod(&self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<(), EvalError> {
        self.check_x(x)?;
        EvalError::check("v", self.meta.nvar, v.len())?;
        EvalError::check("jv", self.meta.ncon, jv.len())?;
        self.counters.record(EvalKind::Jprod);
        self.with_jacobian(x, |jac| mul_vec(jac, v, jv));
        Ok(())
    }

    fn jtprod(&self, x: &[f64], v: &[f64], jtv: &mut [f64]) -> Result<(), EvalError> {
        self.check_x(x)?;
        EvalError::check("v", self.meta.ncon, v.len())?;
        EvalError::check("jtv", self.meta.nvar, jtv.len())?;
        self.counters.record(EvalKind::Jtprod);
        self.with_jacobian(x, |jac| mul_vec_transpose(jac, v, jtv));
        Ok(())
    }

    fn jac(&self, x: &[f64]) -> Result<TriMat<f64>, EvalError> {
        self.check_x(x)?;
        self.counters.record(EvalKind::Jac);
        Ok(self.discretization.jacobian(&self.equation, x))
    }

    fn hess(&self, x: &[f64], y: &[f64], obj_weight: f64) -> Result<TriMat<f64>, EvalError> {
        self.check_x(x)?;
        EvalError::check("y", self.meta.ncon, y.len())?;
        self.counters.record(EvalKind::Hess);
        Ok(self.assemble_hessian(x, y, obj_weight))
    }

    fn hprod(
        &self,
        x: &[f64],
        y: &[f64],
        obj_weight: f64,
        v: &[f64],
        hv: &mut [f64],
    ) -> Result<(), EvalError> {
        self.check_x(x)?;
        EvalError::check("y", self.meta.ncon, y.len())?;
        EvalError::check("v", self.meta.nvar, v.len())?;
        EvalError::check("hv", self.meta.nvar, hv.len())?;
        self.counters.record(EvalKind::Hprod);
        self.with_hessian(x, y, obj_weight, |hess| mul_vec(hess, v, hv));
        Ok(())
    }
}
