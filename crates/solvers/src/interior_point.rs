//! Primal–dual interior-point method for equality-constrained programs.
//!
//! # Algorithm
//!
//! The solver targets
//!
//! ```text
//! minimize    f(x)
//! subject to  c(x) = b
//!             l ≤ x ≤ u
//! ```
//!
//! by approximately solving a sequence of barrier problems
//! `f(x) − μ Σ ln(x − l) − μ Σ ln(u − x)` for a decreasing barrier parameter
//! `μ` (Fiacco–McCormick). Each iteration takes a Newton step on the
//! primal-dual optimality conditions, eliminating the bound multipliers and
//! factorizing the symmetric indefinite system
//!
//! ```text
//! [ W + Σ + δw I     Jᵀ   ] [ dx ]     [ ∇φμ + Jᵀy ]
//! [      J        −δc I  ] [ dy ] = − [  c(x) − b  ]
//! ```
//!
//! with a sparse LDLᵀ factorization. The primal regularization `δw` is raised
//! until the factorization reports `n` positive and `m` negative pivots. The
//! step is cut by the fraction-to-boundary rule and then by backtracking on an
//! ℓ1 merit function, with one second-order correction per iteration.
//!
//! Constraint multipliers start from a least-squares estimate.
//!
//! # Termination
//!
//! - [`Status::FirstOrder`] once the constraint violation, the Lagrangian
//!   stationarity and the complementarity are within tolerance
//! - [`Status::Acceptable`] when the solver stalls or hits its iteration limit
//!   within [`Config::acceptable_factor`] times the tolerances
//! - [`Status::SmallStep`] when backtracking fails
//! - [`Status::NumericalFailure`] when no regularization yields the right inertia
//! - [`Status::MaxIters`] and [`Status::MaxTime`] at the configured limits
//! - [`Status::StoppedByObserver`] when an observer returns [`Action::StopEarly`]

mod action;
mod bounds;
mod config;
mod error;
mod event;
mod kkt;
mod solution;


pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use solution::Solution;

use std::time::Instant;

use pdecon_core::sparse::{compress, mul_vec_transpose};
use pdecon_core::vector::{dot, norm_inf};
use pdecon_core::{NlpModel, Observer, Status};
use sprs::{CsMat, TriMat};

use bounds::{Bounds, max_dual_step};
use kkt::Regularizer;

/// Name recorded in [`Stats`](pdecon_core::Stats) produced by this solver.
pub const NAME: &str = "interior-point";

const KAPPA_EPS: f64 = 10.0;
const KAPPA_MU: f64 = 0.2;
const THETA_MU: f64 = 1.5;
const TAU_MIN: f64 = 0.99;
const KAPPA_SIGMA: f64 = 1e10;
const ARMIJO: f64 = 1e-4;
const MIN_STEP: f64 = 1e-14;
const MAX_INITIAL_MULTIPLIER: f64 = 1e3;

/// Solves the model's program starting from `x0`.
///
/// `x0` is moved strictly inside the variable bounds first. The observer
/// receives an [`Event`] after every accepted step and may return
/// [`Action::StopEarly`].
///
/// # Errors
///
/// Returns an error if `x0` has the wrong length, a constraint is not an
/// equality, or a model evaluation fails.
pub fn solve<M, Obs>(
    model: &M,
    x0: &[f64],
    config: &Config,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    M: NlpModel,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let start = Instant::now();
    let meta = model.meta();
    let (n, m) = (meta.nvar, meta.ncon);
    if x0.len() != n {
        return Err(Error::InitialPoint {
            expected: n,
            found: x0.len(),
        });
    }
    if let Some(index) = meta.lcon.iter().zip(&meta.ucon).position(|(l, u)| l != u) {
        return Err(Error::UnsupportedConstraints { index });
    }
    let bounds = Bounds::new(&meta.lvar, &meta.uvar);

    let mut x = x0.to_vec();
    bounds.push_interior(&mut x);
    let mut it = Iterate::new(model, x, bounds)?;
    it.lambda = initial_multipliers(&it);
    it.update_dual_residual();

    let tol_p = config.atol() + config.rtol() * it.primal_feas();
    let tol_d = config.atol() + config.rtol() * it.dual_feas().max(it.complementarity(0.0));
    let mu_min = (tol_p.min(tol_d) / (KAPPA_EPS + 1.0)).max(f64::MIN_POSITIVE);
    let mut mu = if bounds.any() { config.mu_init() } else { 0.0 };
    let mut tau = (1.0 - mu).max(TAU_MIN);
    let mut penalty: f64 = 0.0;
    let mut regularizer = Regularizer::default();

    let within = |it: &Iterate<'_, M>, factor: f64| {
        it.primal_feas() <= factor * tol_p
            && it.dual_feas() <= factor * tol_d
            && it.complementarity(0.0) <= factor * tol_d
    };
    let stalled = |it: &Iterate<'_, M>, otherwise| {
        if within(it, config.acceptable_factor()) {
            Status::Acceptable
        } else {
            otherwise
        }
    };

    for iter in 0..config.max_iters() {
        if within(&it, 1.0) {
            return Ok(it.finish(Status::FirstOrder, iter, start));
        }
        if config.max_time().is_some_and(|limit| start.elapsed() >= limit) {
            return Ok(it.finish(Status::MaxTime, iter, start));
        }

        if bounds.any() {
            while mu > mu_min && it.barrier_error(mu) <= KAPPA_EPS * mu {
                mu = (KAPPA_MU * mu).min(mu.powf(THETA_MU)).max(mu_min);
                tau = (1.0 - mu).max(TAU_MIN);
            }
        }

        let hess = compress(&model.hess(&it.x, &it.lambda, 1.0).map_err(Error::model)?);
        let sigma = it.sigma();
        let Some(factorized) = regularizer.factorize(&hess, &it.jac, &sigma) else {
            let status = stalled(&it, Status::NumericalFailure);
            return Ok(it.finish(status, iter, start));
        };

        // Newton direction for the barrier problem.
        let grad_phi = it.barrier_gradient(mu);
        let mut rhs_x = vec![0.0; n];
        mul_vec_transpose(&it.jac, &it.lambda, &mut rhs_x);
        for (r, gp) in rhs_x.iter_mut().zip(&grad_phi) {
            *r = -(*r + gp);
        }
        let mut rhs = rhs_x.clone();
        rhs.extend(it.cons.iter().map(|c| -c));
        let direction = factorized.solve(&rhs);
        let (dx, dlambda) = direction.split_at(n);
        let (dz_lower, dz_upper) = it.bound_multiplier_steps(dx, mu);

        let alpha_max = bounds.max_step(&it.x, dx, tau);
        let alpha_z = max_dual_step(&it.z_lower, &dz_lower, tau)
            .min(max_dual_step(&it.z_upper, &dz_upper, tau));

        // ℓ1 merit with a penalty above the next multiplier estimate.
        let next_multiplier = it
            .lambda
            .iter()
            .zip(dlambda)
            .map(|(l, d)| (l + d).abs())
            .fold(0.0, f64::max);
        penalty = penalty.max(2.0 * next_multiplier);
        let violation = norm1(&it.cons);
        let slope_phi = dot(&grad_phi, dx);
        if slope_phi - penalty * violation >= 0.0 && violation > 0.0 {
            penalty = 2.0 * slope_phi / violation;
        }
        let slope = slope_phi - penalty * violation;
        let merit = |f: f64, x: &[f64], cons: &[f64]| {
            f + mu * bounds.log_barrier(x) + penalty * norm1(cons)
        };
        let merit0 = merit(it.objective, &it.x, &it.cons);

        let mut alpha = alpha_max;
        let mut trials = 0;
        let accepted = loop {
            trials += 1;
            let trial = Trial::along(model, &it.x, dx, alpha, &meta.lcon)?;
            let sufficient = |t: &Trial| {
                merit(t.objective, &t.x, &t.cons) <= merit0 + ARMIJO * alpha * slope
            };
            if slope >= 0.0 || sufficient(&trial) {
                break Some(trial);
            }

            if trials == 1 && m > 0 && norm1(&trial.cons) >= violation {
                // Second-order correction against the constraint curvature.
                let mut rhs_soc = rhs_x.clone();
                rhs_soc.extend(it.cons.iter().zip(&trial.cons).map(|(c, ct)| -(alpha * c + ct)));
                let correction = factorized.solve(&rhs_soc);
                let dx_soc = &correction[..n];
                let alpha_soc = bounds.max_step(&it.x, dx_soc, tau);
                let soc = Trial::along(model, &it.x, dx_soc, alpha_soc, &meta.lcon)?;
                if sufficient(&soc) {
                    break Some(soc);
                }
            }

            alpha *= 0.5;
            if alpha < MIN_STEP {
                break None;
            }
        };

        let Some(trial) = accepted else {
            let status = stalled(&it, Status::SmallStep);
            return Ok(it.finish(status, iter, start));
        };

        it.accept(trial, alpha, dlambda, alpha_z, &dz_lower, &dz_upper, mu)?;
        it.update_dual_residual();

        let event = Event {
            iter: iter + 1,
            x: &it.x,
            objective: it.objective,
            primal_feas: it.primal_feas(),
            dual_feas: it.dual_feas(),
            mu,
            step: alpha,
            regularization: factorized.regularization,
            trials,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(it.finish(Status::StoppedByObserver, iter + 1, start));
        }
    }

    let status = if within(&it, 1.0) {
        Status::FirstOrder
    } else {
        stalled(&it, Status::MaxIters)
    };
    Ok(it.finish(status, config.max_iters(), start))
}

/// Solves without observer support.
///
/// This is a convenience wrapper around [`solve`] that uses a no-op observer.
///
/// # Errors
///
/// Returns an error if `x0` has the wrong length, a constraint is not an
/// equality, or a model evaluation fails.
pub fn solve_unobserved<M: NlpModel>(
    model: &M,
    x0: &[f64],
    config: &Config,
) -> Result<Solution, Error> {
    solve(model, x0, config, ())
}

/// Primal-dual state at the current point.
struct Iterate<'a, M> {
    model: &'a M,
    bounds: Bounds<'a>,
    x: Vec<f64>,
    lambda: Vec<f64>,
    z_lower: Vec<f64>,
    z_upper: Vec<f64>,
    objective: f64,
    grad: Vec<f64>,
    /// `c(x) − b`.
    cons: Vec<f64>,
    jac: CsMat<f64>,
    /// `∇f + Jᵀy − z_L + z_U`.
    dual: Vec<f64>,
}

impl<'a, M: NlpModel> Iterate<'a, M> {
    fn new(model: &'a M, x: Vec<f64>, bounds: Bounds<'a>) -> Result<Self, Error> {
        let n = x.len();
        let trial = Trial::at(model, x, &model.meta().lcon)?;
        let unit = |present: bool| if present { 1.0 } else { 0.0 };
        let mut it = Self {
            model,
            bounds,
            z_lower: (0..n).map(|i| unit(bounds.has_lower(i))).collect(),
            z_upper: (0..n).map(|i| unit(bounds.has_upper(i))).collect(),
            lambda: vec![0.0; model.ncon()],
            objective: trial.objective,
            x: trial.x,
            cons: trial.cons,
            grad: vec![0.0; n],
            jac: CsMat::zero((model.ncon(), n)),
            dual: vec![0.0; n],
        };
        it.update_derivatives()?;
        it.update_dual_residual();
        Ok(it)
    }

    fn update_derivatives(&mut self) -> Result<(), Error> {
        self.model.grad(&self.x, &mut self.grad).map_err(Error::model)?;
        self.jac = compress(&self.model.jac(&self.x).map_err(Error::model)?);
        Ok(())
    }

    fn update_dual_residual(&mut self) {
        mul_vec_transpose(&self.jac, &self.lambda, &mut self.dual);
        for i in 0..self.x.len() {
            self.dual[i] += self.grad[i] - self.z_lower[i] + self.z_upper[i];
        }
    }

    fn primal_feas(&self) -> f64 {
        norm_inf(&self.cons)
    }

    fn dual_feas(&self) -> f64 {
        norm_inf(&self.dual)
    }

    /// `max |sᵢ zᵢ − μ|` over the finite bounds.
    fn complementarity(&self, mu: f64) -> f64 {
        let mut worst: f64 = 0.0;
        for i in 0..self.x.len() {
            if self.bounds.has_lower(i) {
                worst = worst.max((self.bounds.lower_slack(&self.x, i) * self.z_lower[i] - mu).abs());
            }
            if self.bounds.has_upper(i) {
                worst = worst.max((self.bounds.upper_slack(&self.x, i) * self.z_upper[i] - mu).abs());
            }
        }
        worst
    }

    fn barrier_error(&self, mu: f64) -> f64 {
        self.primal_feas()
            .max(self.dual_feas())
            .max(self.complementarity(mu))
    }

    /// Diagonal `Σ = Z_L S_L⁻¹ + Z_U S_U⁻¹`.
    fn sigma(&self) -> Vec<f64> {
        (0..self.x.len())
            .map(|i| {
                let mut s = 0.0;
                if self.bounds.has_lower(i) {
                    s += self.z_lower[i] / self.bounds.lower_slack(&self.x, i);
                }
                if self.bounds.has_upper(i) {
                    s += self.z_upper[i] / self.bounds.upper_slack(&self.x, i);
                }
                s
            })
            .collect()
    }

    /// Gradient of `f − μ Σ ln s`.
    fn barrier_gradient(&self, mu: f64) -> Vec<f64> {
        let mut g = self.grad.clone();
        for (i, gi) in g.iter_mut().enumerate() {
            if self.bounds.has_lower(i) {
                *gi -= mu / self.bounds.lower_slack(&self.x, i);
            }
            if self.bounds.has_upper(i) {
                *gi += mu / self.bounds.upper_slack(&self.x, i);
            }
        }
        g
    }

    /// Bound multiplier steps recovered from the eliminated rows.
    fn bound_multiplier_steps(&self, dx: &[f64], mu: f64) -> (Vec<f64>, Vec<f64>) {
        let n = self.x.len();
        let (mut dz_lower, mut dz_upper) = (vec![0.0; n], vec![0.0; n]);
        for i in 0..n {
            if self.bounds.has_lower(i) {
                let s = self.bounds.lower_slack(&self.x, i);
                dz_lower[i] = mu / s - self.z_lower[i] - self.z_lower[i] / s * dx[i];
            }
            if self.bounds.has_upper(i) {
                let s = self.bounds.upper_slack(&self.x, i);
                dz_upper[i] = mu / s - self.z_upper[i] + self.z_upper[i] / s * dx[i];
            }
        }
        (dz_lower, dz_upper)
    }

    #[allow(clippy::too_many_arguments)]
    fn accept(
        &mut self,
        trial: Trial,
        alpha: f64,
        dlambda: &[f64],
        alpha_z: f64,
        dz_lower: &[f64],
        dz_upper: &[f64],
        mu: f64,
    ) -> Result<(), Error> {
        self.x = trial.x;
        self.objective = trial.objective;
        self.cons = trial.cons;
        for (l, d) in self.lambda.iter_mut().zip(dlambda) {
            *l += alpha * d;
        }

        for i in 0..self.x.len() {
            if self.bounds.has_lower(i) {
                let s = self.bounds.lower_slack(&self.x, i);
                self.z_lower[i] = safeguard(self.z_lower[i] + alpha_z * dz_lower[i], s, mu);
            }
            if self.bounds.has_upper(i) {
                let s = self.bounds.upper_slack(&self.x, i);
                self.z_upper[i] = safeguard(self.z_upper[i] + alpha_z * dz_upper[i], s, mu);
            }
        }

        self.update_derivatives()
    }

    fn finish(self, status: Status, iters: usize, start: Instant) -> Solution {
        Solution {
            status,
            primal_feas: self.primal_feas(),
            dual_feas: self.dual_feas(),
            objective: self.objective,
            x: self.x,
            multipliers: self.lambda,
            z_lower: self.z_lower,
            z_upper: self.z_upper,
            iters,
            elapsed: start.elapsed(),
            counters: self.model.counters().snapshot(),
        }
    }
}

/// A trial point with its objective and shifted constraint values.
struct Trial {
    x: Vec<f64>,
    objective: f64,
    cons: Vec<f64>,
}

impl Trial {
    fn at<M: NlpModel>(model: &M, x: Vec<f64>, rhs: &[f64]) -> Result<Self, Error> {
        let objective = model.obj(&x).map_err(Error::model)?;
        let mut cons = vec![0.0; rhs.len()];
        model.cons(&x, &mut cons).map_err(Error::model)?;
        for (c, b) in cons.iter_mut().zip(rhs) {
            *c -= b;
        }
        Ok(Self { x, objective, cons })
    }

    fn along<M: NlpModel>(
        model: &M,
        x: &[f64],
        dx: &[f64],
        alpha: f64,
        rhs: &[f64],
    ) -> Result<Self, Error> {
        let point = x.iter().zip(dx).map(|(xi, di)| xi + alpha * di).collect();
        Self::at(model, point, rhs)
    }
}

/// Least-squares multipliers from `[I Jᵀ; J 0] [w; y] = [−(∇f − z_L + z_U); 0]`.
///
/// Falls back to zero when the estimate is unreasonably large.
fn initial_multipliers<M: NlpModel>(it: &Iterate<'_, M>) -> Vec<f64> {
    let (n, m) = (it.x.len(), it.lambda.len());
    if m == 0 {
        return vec![];
    }

    let mut identity = TriMat::with_capacity((n, n), n);
    for i in 0..n {
        identity.add_triplet(i, i, 1.0);
    }
    let Some(factorized) =
        Regularizer::default().factorize(&identity.to_csr(), &it.jac, &vec![0.0; n])
    else {
        return vec![0.0; m];
    };

    let mut rhs: Vec<f64> = (0..n)
        .map(|i| -(it.grad[i] - it.z_lower[i] + it.z_upper[i]))
        .collect();
    rhs.resize(n + m, 0.0);
    let solution = factorized.solve(&rhs);
    let lambda = solution[n..].to_vec();

    if norm_inf(&lambda) > MAX_INITIAL_MULTIPLIER {
        vec![0.0; m]
    } else {
        lambda
    }
}

/// Keeps `z` within a factor of its complementarity target `μ / s`.
fn safeguard(z: f64, s: f64, mu: f64) -> f64 {
    if mu == 0.0 {
        return z.max(0.0);
    }
    let target = mu / s;
    z.clamp(target / KAPPA_SIGMA, target * KAPPA_SIGMA)
}

fn norm1(x: &[f64]) -> f64 {
    x.iter().map(|v| v.abs()).sum()
}
