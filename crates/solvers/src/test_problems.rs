//! Small programs with known solutions shared by the solver tests.

use std::convert::Infallible;

use pdecon_core::{Counters, EvalKind, NlpMeta, NlpModel};
use sprs::TriMat;

type Entries = Vec<(usize, usize, f64)>;

pub(crate) struct TestProblem {
    pub(crate) meta: NlpMeta,
    pub(crate) counters: Counters,
    objective: fn(&[f64]) -> f64,
    gradient: fn(&[f64]) -> Vec<f64>,
    constraints: fn(&[f64]) -> Vec<f64>,
    jacobian: fn(&[f64]) -> Entries,
    hessian: fn(&[f64], &[f64], f64) -> Entries,
}

impl TestProblem {
    /// `(x₁ − 1)² + (x₂ − 2)²` subject to `x₁ + x₂ = 1`.
    ///
    /// Solution `(0, 1)` with multiplier 2 and objective 2.
    pub(crate) fn equality_qp() -> Self {
        Self {
            meta: NlpMeta::new("equality_qp", 2, 1)
                .with_constraint_bounds(vec![1.0], vec![1.0])
                .unwrap(),
            counters: Counters::new(),
            objective: |x| (x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2),
            gradient: |x| vec![2.0 * (x[0] - 1.0), 2.0 * (x[1] - 2.0)],
            constraints: |x| vec![x[0] + x[1]],
            jacobian: |_| vec![(0, 0, 1.0), (0, 1, 1.0)],
            hessian: |_, _, sigma| vec![(0, 0, 2.0 * sigma), (1, 1, 2.0 * sigma)],
        }
    }

    /// `x₁ + x₂` subject to `x₁² + x₂² = 2`.
    ///
    /// Solution `(−1, −1)` with multiplier ½ and objective −2.
    pub(crate) fn circle() -> Self {
        Self {
            meta: NlpMeta::new("circle", 2, 1)
                .with_x0(vec![-0.5, -1.5])
                .and_then(|meta| meta.with_constraint_bounds(vec![2.0], vec![2.0]))
                .unwrap(),
            counters: Counters::new(),
            objective: |x| x[0] + x[1],
            gradient: |_| vec![1.0, 1.0],
            constraints: |x| vec![x[0] * x[0] + x[1] * x[1]],
            jacobian: |x| vec![(0, 0, 2.0 * x[0]), (0, 1, 2.0 * x[1])],
            hessian: |_, y, _| vec![(0, 0, 2.0 * y[0]), (1, 1, 2.0 * y[0])],
        }
    }

    /// `½(x₁ + 1)² + ½(x₂ − 3)²` subject to `x₁ + x₂ = 1`, `x ≥ 0`.
    ///
    /// The bound on `x₁` is active: solution `(0, 1)` with constraint
    /// multiplier 2, bound multiplier 3 and objective 2.5.
    pub(crate) fn bounded() -> Self {
        Self {
            meta: NlpMeta::new("bounded", 2, 1)
                .with_x0(vec![0.5, 0.5])
                .and_then(|meta| meta.with_bounds(vec![0.0; 2], vec![f64::INFINITY; 2]))
                .and_then(|meta| meta.with_constraint_bounds(vec![1.0], vec![1.0]))
                .unwrap(),
            counters: Counters::new(),
            objective: |x| 0.5 * (x[0] + 1.0).powi(2) + 0.5 * (x[1] - 3.0).powi(2),
            gradient: |x| vec![x[0] + 1.0, x[1] - 3.0],
            constraints: |x| vec![x[0] + x[1]],
            jacobian: |_| vec![(0, 0, 1.0), (0, 1, 1.0)],
            hessian: |_, _, sigma| vec![(0, 0, sigma), (1, 1, sigma)],
        }
    }

    /// Turns the first constraint into the range `lcon ≤ c₁ ≤ lcon + 1`.
    pub(crate) fn with_range_constraint(mut self) -> Self {
        self.meta.ucon[0] += 1.0;
        self
    }
}

impl NlpModel for TestProblem {
    type Error = Infallible;

    fn meta(&self) -> &NlpMeta {
        &self.meta
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn obj(&self, x: &[f64]) -> Result<f64, Infallible> {
        self.counters.record(EvalKind::Obj);
        Ok((self.objective)(x))
    }

    fn grad(&self, x: &[f64], g: &mut [f64]) -> Result<(), Infallible> {
        self.counters.record(EvalKind::Grad);
        g.copy_from_slice(&(self.gradient)(x));
        Ok(())
    }

    fn cons(&self, x: &[f64], c: &mut [f64]) -> Result<(), Infallible> {
        self.counters.record(EvalKind::Cons);
        c.copy_from_slice(&(self.constraints)(x));
        Ok(())
    }

    fn jprod(&self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<(), Infallible> {
        self.counters.record(EvalKind::Jprod);
        jv.fill(0.0);
        for (i, j, value) in (self.jacobian)(x) {
            jv[i] += value * v[j];
        }
        Ok(())
    }

    fn jtprod(&self, x: &[f64], v: &[f64], jtv: &mut [f64]) -> Result<(), Infallible> {
        self.counters.record(EvalKind::Jtprod);
        jtv.fill(0.0);
        for (i, j, value) in (self.jacobian)(x) {
            jtv[j] += value * v[i];
        }
        Ok(())
    }

    fn jac(&self, x: &[f64]) -> Result<TriMat<f64>, Infallible> {
        self.counters.record(EvalKind::Jac);
        Ok(triplets((self.meta.ncon, self.meta.nvar), (self.jacobian)(x)))
    }

    fn hess(&self, x: &[f64], y: &[f64], obj_weight: f64) -> Result<TriMat<f64>, Infallible> {
        self.counters.record(EvalKind::Hess);
        let n = self.meta.nvar;
        Ok(triplets((n, n), (self.hessian)(x, y, obj_weight)))
    }

    fn hprod(
        &self,
        x: &[f64],
        y: &[f64],
        obj_weight: f64,
        v: &[f64],
        hv: &mut [f64],
    ) -> Result<(), Infallible> {
        self.counters.record(EvalKind::Hprod);
        hv.fill(0.0);
        for (i, j, value) in (self.hessian)(x, y, obj_weight) {
            hv[i] += value * v[j];
        }
        Ok(())
    }
}

fn triplets(shape: (usize, usize), entries: Entries) -> TriMat<f64> {
    let mut t = TriMat::new(shape);
    for (i, j, value) in entries {
        t.add_triplet(i, j, value);
    }
    t
}
