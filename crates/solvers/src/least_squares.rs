//! Trust-region Gauss–Newton for nonlinear least squares.
//!
//! # Algorithm
//!
//! Each iteration approximately solves the linearized subproblem
//!
//! ```text
//! minimize ‖J(x) s + F(x)‖   subject to ‖s‖ ≤ Δ
//! ```
//!
//! with CGLS truncated at the trust-region boundary, then compares the actual
//! decrease of `½‖F‖²` with the decrease the linearization predicted. Only
//! products with `J` and `Jᵀ` are needed, so the solver is matrix-free.
//!
//! A trial step is accepted only if it strictly decreases `‖F‖`, so the
//! returned residual norm never exceeds the starting one.
//!
//! # Termination
//!
//! - [`Status::FirstOrder`] once `‖F‖ ≤ atol + rtol ‖F(x₀)‖` or `‖JᵀF‖ ≤ gtol`
//! - [`Status::SmallStep`] when the radius shrinks below its minimum
//! - [`Status::MaxIters`] and [`Status::MaxTime`] at the configured limits
//! - [`Status::StoppedByObserver`] when an observer returns [`Action::StopEarly`]

mod action;
mod config;
mod error;
mod event;
mod solution;

#[cfg(test)]
mod tests;

pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use solution::Solution;

use std::time::Instant;

use pdecon_core::vector::{axpy, norm2};
use pdecon_core::{NlsModel, Observer, Status};

use crate::krylov::cgls;

/// Minimum ratio of actual to predicted reduction for a step to be accepted.
const ACCEPT_RATIO: f64 = 1e-4;

/// Minimizes `½‖F(x)‖²` starting from `x0`.
///
/// The observer receives an [`Event`] after every trial step and may return
/// [`Action::StopEarly`].
///
/// # Errors
///
/// Returns an error if `x0` has the wrong length or a model evaluation fails.
pub fn solve<M, Obs>(
    model: &M,
    x0: &[f64],
    config: &Config,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    M: NlsModel,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let start = Instant::now();
    let (n, m) = (model.nvar(), model.nequ());
    if x0.len() != n {
        return Err(Error::InitialPoint {
            expected: n,
            found: x0.len(),
        });
    }

    let mut x = x0.to_vec();
    let mut r = vec![0.0; m];
    model.residual(&x, &mut r).map_err(Error::model)?;
    let mut g = vec![0.0; n];
    model.jtprod_residual(&x, &r, &mut g).map_err(Error::model)?;

    let initial_residual_norm = norm2(&r);
    let mut residual_norm = initial_residual_norm;
    let mut gradient_norm = norm2(&g);
    let target = config.atol() + config.rtol() * initial_residual_norm;
    let mut radius = config.initial_radius();

    let mut trial = vec![0.0; n];
    let mut r_trial = vec![0.0; m];
    let mut js = vec![0.0; m];

    let finish = |status, x: Vec<f64>, residual_norm, gradient_norm, iters| Solution {
        status,
        x,
        residual_norm,
        initial_residual_norm,
        gradient_norm,
        iters,
        elapsed: start.elapsed(),
        counters: model.counters().snapshot(),
    };

    for iter in 0..config.max_iters() {
        if residual_norm <= target || gradient_norm <= config.gtol() {
            return Ok(finish(Status::FirstOrder, x, residual_norm, gradient_norm, iter));
        }
        if config.max_time().is_some_and(|limit| start.elapsed() >= limit) {
            return Ok(finish(Status::MaxTime, x, residual_norm, gradient_norm, iter));
        }
        if radius < config.min_radius() {
            return Ok(finish(Status::SmallStep, x, residual_norm, gradient_norm, iter));
        }

        let step = cgls(
            |v, out| model.jprod_residual(&x, v, out),
            |w, out| model.jtprod_residual(&x, w, out),
            &r,
            n,
            radius,
            config.cg_rtol(),
            config.cg_max_iters(),
        )
        .map_err(Error::model)?;
        let step_norm = norm2(&step.step);

        // Predicted decrease of ½‖F‖² from the linearization.
        model
            .jprod_residual(&x, &step.step, &mut js)
            .map_err(Error::model)?;
        axpy(1.0, &r, &mut js);
        let predicted = 0.5 * (residual_norm.powi(2) - norm2(&js).powi(2));

        trial.copy_from_slice(&x);
        axpy(1.0, &step.step, &mut trial);
        model.residual(&trial, &mut r_trial).map_err(Error::model)?;
        let trial_norm = norm2(&r_trial);
        let actual = 0.5 * (residual_norm.powi(2) - trial_norm.powi(2));

        let ratio = if predicted > 0.0 {
            actual / predicted
        } else {
            f64::NEG_INFINITY
        };
        let accepted = ratio > ACCEPT_RATIO && trial_norm < residual_norm;

        if ratio < 0.25 {
            radius = 0.25 * step_norm.min(radius);
        } else if ratio > 0.75 && step_norm >= 0.99 * radius {
            radius *= 2.0;
        }

        if accepted {
            std::mem::swap(&mut x, &mut trial);
            std::mem::swap(&mut r, &mut r_trial);
            residual_norm = trial_norm;
            model.jtprod_residual(&x, &r, &mut g).map_err(Error::model)?;
            gradient_norm = norm2(&g);
        }

        let event = Event {
            iter: iter + 1,
            x: &x,
            residual_norm,
            gradient_norm,
            radius,
            ratio,
            accepted,
            inner_iters: step.iterations,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(finish(
                Status::StoppedByObserver,
                x,
                residual_norm,
                gradient_norm,
                iter + 1,
            ));
        }
    }

    let status = if residual_norm <= target || gradient_norm <= config.gtol() {
        Status::FirstOrder
    } else {
        Status::MaxIters
    };
    Ok(finish(status, x, residual_norm, gradient_norm, config.max_iters()))
}

/// Minimizes `½‖F(x)‖²` without observer support.
///
/// This is a convenience wrapper around [`solve`] that uses a no-op observer.
///
/// # Errors
///
/// Returns an error if `x0` has the wrong length or a model evaluation fails.
pub fn solve_unobserved<M: NlsModel>(
    model: &M,
    x0: &[f64],
    config: &Config,
) -> Result<Solution, Error> {
    solve(model, x0, config, ())
}
