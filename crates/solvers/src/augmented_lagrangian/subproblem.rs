use std::cell::RefCell;

use pdecon_core::NlpModel;
use pdecon_core::vector::axpy;

use crate::bound_constrained::Problem;

/// `φ(x) = f(x) + yᵀc̃(x) + ½ρ‖c̃(x)‖²` with `c̃ = c − b`, over the variable bounds.
///
/// Only products with the constraint Jacobian and the Lagrangian Hessian are
/// used. Constraint values are cached for the last point evaluated.
pub(super) struct Subproblem<'a, M> {
    model: &'a M,
    multipliers: Vec<f64>,
    penalty: f64,
    cache: RefCell<Option<Cached>>,
}

struct Cached {
    x: Vec<f64>,
    /// `c(x) − b`.
    cons: Vec<f64>,
    /// `y + ρ c̃(x)`.
    shifted: Vec<f64>,
}

impl<'a, M: NlpModel> Subproblem<'a, M> {
    pub(super) fn new(model: &'a M, multipliers: Vec<f64>, penalty: f64) -> Self {
        Self {
            model,
            multipliers,
            penalty,
            cache: RefCell::new(None),
        }
    }

    pub(super) fn multipliers(&self) -> &[f64] {
        &self.multipliers
    }

    pub(super) fn penalty(&self) -> f64 {
        self.penalty
    }

    /// `y ← y + ρ c̃(x)`.
    pub(super) fn update_multipliers(&mut self, x: &[f64]) -> Result<(), M::Error> {
        let shifted = self.with_cache(x, |cached| Ok(cached.shifted.clone()))?;
        self.multipliers = shifted;
        self.cache.take();
        Ok(())
    }

    pub(super) fn set_penalty(&mut self, penalty: f64) {
        self.penalty = penalty;
        self.cache.take();
    }

    /// `c(x) − b`.
    pub(super) fn constraints(&self, x: &[f64]) -> Result<Vec<f64>, M::Error> {
        self.with_cache(x, |cached| Ok(cached.cons.clone()))
    }

    fn with_cache<T>(
        &self,
        x: &[f64],
        f: impl FnOnce(&Cached) -> Result<T, M::Error>,
    ) -> Result<T, M::Error> {
        let mut slot = self.cache.borrow_mut();
        let cached = match slot.take() {
            Some(cached) if cached.x == x => cached,
            _ => self.evaluate(x)?,
        };
        f(slot.insert(cached))
    }

    fn evaluate(&self, x: &[f64]) -> Result<Cached, M::Error> {
        let meta = self.model.meta();
        let mut cons = vec![0.0; meta.ncon];
        self.model.cons(x, &mut cons)?;
        for (c, b) in cons.iter_mut().zip(&meta.lcon) {
            *c -= b;
        }
        let mut shifted = self.multipliers.clone();
        axpy(self.penalty, &cons, &mut shifted);
        Ok(Cached {
            x: x.to_vec(),
            cons,
            shifted,
        })
    }
}

impl<M: NlpModel> Problem for Subproblem<'_, M> {
    type Error = M::Error;

    fn nvar(&self) -> usize {
        self.model.nvar()
    }

    fn lower(&self) -> &[f64] {
        &self.model.meta().lvar
    }

    fn upper(&self) -> &[f64] {
        &self.model.meta().uvar
    }

    fn value(&self, x: &[f64]) -> Result<f64, M::Error> {
        let f = self.model.obj(x)?;
        self.with_cache(x, |cached| {
            let coupling: f64 = cached
                .cons
                .iter()
                .zip(&self.multipliers)
                .map(|(c, y)| c * (y + 0.5 * self.penalty * c))
                .sum();
            Ok(f + coupling)
        })
    }

    fn gradient(&self, x: &[f64], g: &mut [f64]) -> Result<(), M::Error> {
        self.model.grad(x, g)?;
        self.with_cache(x, |cached| {
            let mut jtv = vec![0.0; g.len()];
            self.model.jtprod(x, &cached.shifted, &mut jtv)?;
            axpy(1.0, &jtv, g);
            Ok(())
        })
    }

    fn hessian_product(&self, x: &[f64], v: &[f64], hv: &mut [f64]) -> Result<(), M::Error> {
        self.with_cache(x, |cached| {
            self.model.hprod(x, &cached.shifted, 1.0, v, hv)?;
            let mut jv = vec![0.0; cached.cons.len()];
            self.model.jprod(x, v, &mut jv)?;
            let mut jtjv = vec![0.0; hv.len()];
            self.model.jtprod(x, &jv, &mut jtjv)?;
            axpy(self.penalty, &jtjv, hv);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::test_problems::TestProblem;

    #[test]
    fn value_and_gradient_match_definition() {
        let model = TestProblem::circle();
        let sub = Subproblem::new(&model, vec![0.5], 10.0);
        let x = [-0.5, -1.5];

        // c̃ = 0.25 + 2.25 − 2 = 0.5, so φ = −2 + 0.5·0.5 + 5·0.25.
        assert_relative_eq!(sub.value(&x).unwrap(), -0.5);

        let mut g = [0.0; 2];
        sub.gradient(&x, &mut g).unwrap();
        // ∇φ = 1 + (0.5 + 5)·2x.
        assert_relative_eq!(g[0], 1.0 - 5.5);
        assert_relative_eq!(g[1], 1.0 - 16.5);
    }

    #[test]
    fn hessian_product_matches_finite_differences() {
        let model = TestProblem::circle();
        let sub = Subproblem::new(&model, vec![0.3], 4.0);
        let x = [0.7, -1.1];
        let v = [0.4, 0.9];
        let h = 1e-6;

        let mut hv = [0.0; 2];
        sub.hessian_product(&x, &v, &mut hv).unwrap();

        let shifted: Vec<f64> = x.iter().zip(&v).map(|(xi, vi)| xi + h * vi).collect();
        let (mut g0, mut g1) = ([0.0; 2], [0.0; 2]);
        sub.gradient(&x, &mut g0).unwrap();
        sub.gradient(&shifted, &mut g1).unwrap();
        for i in 0..2 {
            assert_relative_eq!(hv[i], (g1[i] - g0[i]) / h, epsilon = 1e-4);
        }
    }

    #[test]
    fn constraints_are_cached_per_point() {
        let model = TestProblem::circle();
        let sub = Subproblem::new(&model, vec![0.0], 1.0);
        let x = [1.0, 1.0];

        sub.value(&x).unwrap();
        sub.constraints(&x).unwrap();
        let mut g = [0.0; 2];
        sub.gradient(&x, &mut g).unwrap();

        assert_eq!(model.counters().get(pdecon_core::EvalKind::Cons), 1);
    }

    #[test]
    fn multiplier_update_uses_current_constraints() {
        let model = TestProblem::circle();
        let mut sub = Subproblem::new(&model, vec![0.5], 10.0);

        sub.update_multipliers(&[-0.5, -1.5]).unwrap();
        sub.set_penalty(100.0);

        assert_relative_eq!(sub.multipliers()[0], 5.5);
        assert_relative_eq!(sub.penalty(), 100.0);
    }
}
