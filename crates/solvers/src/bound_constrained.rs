//! Projected trust-region Newton–CG for bound-constrained minimization.
//!
//! # Algorithm
//!
//! The solver minimizes a smooth function over a box `l ≤ x ≤ u`. At each
//! iterate it freezes the variables that sit on a bound with the gradient
//! pushing outward, solves the trust-region subproblem on the remaining free
//! variables with Steihaug–Toint CG, and projects the step back into the box.
//! If projection spoils the predicted decrease, the step falls back to the
//! projected Cauchy point along the steepest-descent direction.
//!
//! Only Hessian-vector products are required.
//!
//! # Termination
//!
//! - [`Status::FirstOrder`] once `‖P(x − ∇f) − x‖∞ ≤ atol + rtol ‖P(x₀ − ∇f₀) − x₀‖∞`
//! - [`Status::SmallStep`] when the radius shrinks below its minimum
//! - [`Status::MaxIters`] and [`Status::MaxTime`] at the configured limits
//! - [`Status::StoppedByObserver`] when an observer returns [`Action::StopEarly`]

mod action;
mod config;
mod error;
mod event;
mod solution;


pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use solution::Solution;

use std::time::Instant;

use pdecon_core::vector::{axpy, dot, norm2, project, projected_gradient_norm};
use pdecon_core::{Observer, Status};

use crate::krylov::steihaug;

const ACCEPT_RATIO: f64 = 1e-4;

/// Reductions this close to the predicted one, relative to `|f|`, are
/// indistinguishable from rounding.
const ROUNDOFF: f64 = 10.0 * f64::EPSILON;

/// A smooth objective over a box, evaluated through `&self`.
pub trait Problem {
    type Error: std::error::Error + Send + Sync + 'static;

    fn nvar(&self) -> usize;

    /// Lower bounds, `f64::NEG_INFINITY` where unbounded.
    fn lower(&self) -> &[f64];

    /// Upper bounds, `f64::INFINITY` where unbounded.
    fn upper(&self) -> &[f64];

    /// Objective value at `x`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the objective cannot be evaluated.
    fn value(&self, x: &[f64]) -> Result<f64, Self::Error>;

    /// Writes the gradient at `x` into `g`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the gradient cannot be evaluated.
    fn gradient(&self, x: &[f64], g: &mut [f64]) -> Result<(), Self::Error>;

    /// Writes `∇²f(x) v` into `hv`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the product cannot be evaluated.
    fn hessian_product(&self, x: &[f64], v: &[f64], hv: &mut [f64]) -> Result<(), Self::Error>;
}

/// Minimizes the problem's objective over its box, starting from `x0`.
///
/// `x0` is projected into the box first. The observer receives an [`Event`]
/// after every trial step and may return [`Action::StopEarly`].
///
/// # Errors
///
/// Returns an error if `x0` has the wrong length or an evaluation fails.
pub fn solve<P, Obs>(
    problem: &P,
    x0: &[f64],
    config: &Config,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    P: Problem,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let start = Instant::now();
    let n = problem.nvar();
    if x0.len() != n {
        return Err(Error::InitialPoint {
            expected: n,
            found: x0.len(),
        });
    }
    let (lower, upper) = (problem.lower(), problem.upper());

    let mut x = x0.to_vec();
    project(&mut x, lower, upper);
    let mut f = problem.value(&x).map_err(Error::model)?;
    let mut g = vec![0.0; n];
    problem.gradient(&x, &mut g).map_err(Error::model)?;

    let mut pg = projected_gradient_norm(&x, &g, lower, upper);
    let target = config.atol() + config.rtol() * pg;
    let mut radius = config.initial_radius();
    let mut inner_iters = 0;

    let mut free = vec![true; n];
    let mut g_free = vec![0.0; n];
    let mut trial = vec![0.0; n];
    let mut d = vec![0.0; n];
    let mut hd = vec![0.0; n];

    let finish = |status, x, f, g, pg, iters, inner_iters| Solution {
        status,
        x,
        objective: f,
        gradient: g,
        projected_gradient: pg,
        iters,
        inner_iters,
        elapsed: start.elapsed(),
    };

    for iter in 0..config.max_iters() {
        if pg <= target {
            return Ok(finish(Status::FirstOrder, x, f, g, pg, iter, inner_iters));
        }
        if config.max_time().is_some_and(|limit| start.elapsed() >= limit) {
            return Ok(finish(Status::MaxTime, x, f, g, pg, iter, inner_iters));
        }
        if radius < config.min_radius() {
            return Ok(finish(Status::SmallStep, x, f, g, pg, iter, inner_iters));
        }

        for i in 0..n {
            let blocked = (x[i] <= lower[i] && g[i] > 0.0) || (x[i] >= upper[i] && g[i] < 0.0);
            free[i] = !blocked;
            g_free[i] = if blocked { 0.0 } else { g[i] };
        }

        let mut v_free = vec![0.0; n];
        let step = steihaug(
            |v, hv| {
                mask(v, &free, &mut v_free);
                problem.hessian_product(&x, &v_free, hv)?;
                for (h, &keep) in hv.iter_mut().zip(&free) {
                    if !keep {
                        *h = 0.0;
                    }
                }
                Ok(())
            },
            &g_free,
            radius,
            config.cg_max_iters(),
        )
        .map_err(Error::model::<P::Error>)?;
        inner_iters += step.iterations;

        let mut predicted = projected_step(problem, &x, &step.step, &g, &mut trial, &mut d, &mut hd)?;

        if predicted <= 0.0 {
            // Projected Cauchy point along the free steepest-descent direction.
            let gg = dot(&g_free, &g_free);
            problem
                .hessian_product(&x, &g_free, &mut hd)
                .map_err(Error::model)?;
            let curvature = dot(&g_free, &hd);
            let mut t = radius / gg.sqrt();
            if curvature > 0.0 {
                t = t.min(gg / curvature);
            }
            let cauchy: Vec<f64> = g_free.iter().map(|gi| -t * gi).collect();
            predicted = projected_step(problem, &x, &cauchy, &g, &mut trial, &mut d, &mut hd)?;
        }

        let step_norm = norm2(&d);
        let (ratio, f_trial) = if predicted > 0.0 {
            let f_trial = problem.value(&trial).map_err(Error::model)?;
            let actual = f - f_trial;
            if (actual - predicted).abs() <= ROUNDOFF * f.abs().max(1.0) {
                (1.0, f_trial)
            } else {
                (actual / predicted, f_trial)
            }
        } else {
            (f64::NEG_INFINITY, f)
        };
        let accepted = ratio > ACCEPT_RATIO && f_trial <= f;

        if ratio < 0.25 {
            radius = 0.25 * if step_norm > 0.0 { step_norm.min(radius) } else { radius };
        } else if ratio > 0.75 && step_norm >= 0.99 * radius {
            radius *= 2.0;
        }

        if accepted {
            std::mem::swap(&mut x, &mut trial);
            f = f_trial;
            problem.gradient(&x, &mut g).map_err(Error::model)?;
            pg = projected_gradient_norm(&x, &g, lower, upper);
        }

        let event = Event {
            iter: iter + 1,
            x: &x,
            objective: f,
            projected_gradient: pg,
            radius,
            ratio,
            accepted,
            inner_iters: step.iterations,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(finish(
                Status::StoppedByObserver,
                x,
                f,
                g,
                pg,
                iter + 1,
                inner_iters,
            ));
        }
    }

    let status = if pg <= target {
        Status::FirstOrder
    } else {
        Status::MaxIters
    };
    Ok(finish(status, x, f, g, pg, config.max_iters(), inner_iters))
}

/// Minimizes without observer support.
///
/// This is a convenience wrapper around [`solve`] that uses a no-op observer.
///
/// # Errors
///
/// Returns an error if `x0` has the wrong length or an evaluation fails.
pub fn solve_unobserved<P: Problem>(
    problem: &P,
    x0: &[f64],
    config: &Config,
) -> Result<Solution, Error> {
    solve(problem, x0, config, ())
}

/// Projects `x + step` into the box, storing the point in `trial` and the
/// effective step in `d`, and returns the decrease the quadratic model predicts.
fn projected_step<P: Problem>(
    problem: &P,
    x: &[f64],
    step: &[f64],
    g: &[f64],
    trial: &mut [f64],
    d: &mut [f64],
    hd: &mut [f64],
) -> Result<f64, Error> {
    trial.copy_from_slice(x);
    axpy(1.0, step, trial);
    project(trial, problem.lower(), problem.upper());
    for ((di, ti), xi) in d.iter_mut().zip(trial.iter()).zip(x) {
        *di = ti - xi;
    }
    problem.hessian_product(x, d, hd).map_err(Error::model)?;
    Ok(-(dot(g, d) + 0.5 * dot(d, hd)))
}

fn mask(v: &[f64], keep: &[bool], out: &mut [f64]) {
    for ((o, &vi), &k) in out.iter_mut().zip(v).zip(keep) {
        *o = if k { vi } else { 0.0 };
    }
}
