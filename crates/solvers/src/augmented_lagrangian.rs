//! Bound-constrained augmented-Lagrangian method for equality-constrained programs.
//!
//! # Algorithm
//!
//! Each outer iteration approximately minimizes
//!
//! ```text
//! φ(x) = f(x) + yᵀ(c(x) − b) + ½ρ‖c(x) − b‖²   subject to   l ≤ x ≤ u
//! ```
//!
//! with the [`bound_constrained`](crate::bound_constrained) trust-region
//! Newton–CG solver to a tolerance `ω`. If the constraint violation is below
//! a target `η`, the multipliers take the first-order update `y ← y + ρ c̃`
//! and both targets tighten; otherwise the penalty grows tenfold and the
//! targets reset (the LANCELOT schedule). Only Jacobian and Hessian products
//! are needed, so the method is matrix-free.
//!
//! Initial multipliers solve `min ‖∇f(x₀) + J(x₀)ᵀy‖` with CGLS.
//!
//! # Termination
//!
//! - [`Status::FirstOrder`] once `‖c(x) − b‖∞` and `‖P(x − ∇ₓL) − x‖∞` are both
//!   within `atol + rtol` times their initial values
//! - [`Status::Infeasible`] when the penalty exceeds its maximum while the
//!   constraints are still violated
//! - [`Status::MaxIters`] and [`Status::MaxTime`] at the configured limits
//! - [`Status::StoppedByObserver`] when an observer returns [`Action::StopEarly`]

mod action;
mod config;
mod error;
mod event;
mod solution;
mod subproblem;


pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use solution::Solution;

use std::time::Instant;

use pdecon_core::vector::{axpy, norm_inf, project, projected_gradient_norm};
use pdecon_core::{NlpModel, Observer, Status};

use crate::bound_constrained;
use crate::krylov::cgls;

use subproblem::Subproblem;

/// Name recorded in [`Stats`](pdecon_core::Stats) produced by this solver.
pub const NAME: &str = "augmented-lagrangian";

const PENALTY_GROWTH: f64 = 10.0;
const MAX_INITIAL_MULTIPLIER: f64 = 1e3;
const MULTIPLIER_CG_RTOL: f64 = 1e-8;

/// Solves the model's program starting from `x0`.
///
/// `x0` is projected into the variable bounds first. The observer receives an
/// [`Event`] after every outer iteration and may return [`Action::StopEarly`].
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
    let n = meta.nvar;
    if x0.len() != n {
        return Err(Error::InitialPoint {
            expected: n,
            found: x0.len(),
        });
    }
    if let Some(index) = meta.lcon.iter().zip(&meta.ucon).position(|(l, u)| l != u) {
        return Err(Error::UnsupportedConstraints { index });
    }

    let mut x = x0.to_vec();
    project(&mut x, &meta.lvar, &meta.uvar);

    let multipliers = initial_multipliers(model, &x)?;
    let mut sub = Subproblem::new(model, multipliers, config.initial_penalty());

    let mut primal_feas = norm_inf(&sub.constraints(&x).map_err(Error::model)?);
    let mut dual_feas = stationarity(model, &x, sub.multipliers())?;
    let tol_p = config.atol() + config.rtol() * primal_feas;
    let tol_d = config.atol() + config.rtol() * dual_feas;

    let mut penalty = config.initial_penalty();
    let mut eta = penalty.powf(-0.1).max(tol_p);
    let mut omega = (1.0 / penalty).max(tol_d);
    let mut inner_iters = 0;

    let finish = |status,
                  x: Vec<f64>,
                  sub: Subproblem<'_, M>,
                  primal_feas,
                  dual_feas,
                  iters,
                  inner_iters|
     -> Result<Solution, Error> {
        let objective = model.obj(&x).map_err(Error::model)?;
        Ok(Solution {
            status,
            multipliers: sub.multipliers().to_vec(),
            penalty: sub.penalty(),
            x,
            objective,
            primal_feas,
            dual_feas,
            iters,
            inner_iters,
            elapsed: start.elapsed(),
            counters: model.counters().snapshot(),
        })
    };

    for iter in 0..config.max_iters() {
        if primal_feas <= tol_p && dual_feas <= tol_d {
            return finish(Status::FirstOrder, x, sub, primal_feas, dual_feas, iter, inner_iters);
        }
        let remaining = config
            .max_time()
            .map(|limit| limit.saturating_sub(start.elapsed()));
        if remaining.is_some_and(|left| left.is_zero()) {
            return finish(Status::MaxTime, x, sub, primal_feas, dual_feas, iter, inner_iters);
        }

        let mut inner_config =
            bound_constrained::Config::new(config.max_inner_iters(), omega, 0.0)?;
        if let Some(left) = remaining {
            inner_config = inner_config.with_max_time(left);
        }
        let inner = bound_constrained::solve_unobserved(&sub, &x, &inner_config)?;
        inner_iters += inner.iters;
        x = inner.x;

        primal_feas = norm_inf(&sub.constraints(&x).map_err(Error::model)?);
        let multipliers_updated = primal_feas <= eta;
        if multipliers_updated {
            sub.update_multipliers(&x).map_err(Error::model)?;
            eta = (eta / penalty.powf(0.9)).max(tol_p);
            omega = (omega / penalty).max(tol_d);
        } else {
            penalty *= PENALTY_GROWTH;
            sub.set_penalty(penalty);
            eta = penalty.powf(-0.1).max(tol_p);
            omega = (1.0 / penalty).max(tol_d);
        }
        dual_feas = stationarity(model, &x, sub.multipliers())?;

        if penalty > config.max_penalty() && primal_feas > tol_p {
            return finish(
                Status::Infeasible,
                x,
                sub,
                primal_feas,
                dual_feas,
                iter + 1,
                inner_iters,
            );
        }

        let objective = model.obj(&x).map_err(Error::model)?;
        let event = Event {
            iter: iter + 1,
            x: &x,
            objective,
            primal_feas,
            dual_feas,
            penalty,
            multipliers_updated,
            inner_iters: inner.iters,
            inner_status: inner.status,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return finish(
                Status::StoppedByObserver,
                x,
                sub,
                primal_feas,
                dual_feas,
                iter + 1,
                inner_iters,
            );
        }
    }

    let status = if primal_feas <= tol_p && dual_feas <= tol_d {
        Status::FirstOrder
    } else {
        Status::MaxIters
    };
    finish(
        status,
        x,
        sub,
        primal_feas,
        dual_feas,
        config.max_iters(),
        inner_iters,
    )
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

/// Least-squares multipliers `argmin ‖∇f(x) + J(x)ᵀy‖`, or zero if the
/// estimate is unreasonably large.
fn initial_multipliers<M: NlpModel>(model: &M, x: &[f64]) -> Result<Vec<f64>, Error> {
    let m = model.ncon();
    if m == 0 {
        return Ok(vec![]);
    }

    let mut g = vec![0.0; x.len()];
    model.grad(x, &mut g).map_err(Error::model)?;
    let estimate = cgls(
        |v, out| model.jtprod(x, v, out),
        |w, out| model.jprod(x, w, out),
        &g,
        m,
        f64::INFINITY,
        MULTIPLIER_CG_RTOL,
        2 * m + 10,
    )
    .map_err(Error::model)?;

    if norm_inf(&estimate.step) > MAX_INITIAL_MULTIPLIER {
        Ok(vec![0.0; m])
    } else {
        Ok(estimate.step)
    }
}

/// `‖P(x − ∇ₓL(x, y)) − x‖∞` with `∇ₓL = ∇f + Jᵀy`.
fn stationarity<M: NlpModel>(model: &M, x: &[f64], multipliers: &[f64]) -> Result<f64, Error> {
    let meta = model.meta();
    let mut g = vec![0.0; x.len()];
    model.grad(x, &mut g).map_err(Error::model)?;
    if !multipliers.is_empty() {
        let mut jty = vec![0.0; x.len()];
        model.jtprod(x, multipliers, &mut jty).map_err(Error::model)?;
        axpy(1.0, &jty, &mut g);
    }
    Ok(projected_gradient_norm(x, &g, &meta.lvar, &meta.uvar))
}
