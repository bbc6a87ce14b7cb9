//! Numerical solvers for pdecon.
//!
//! Every solver module has the same shape: a validated `Config`, an `Event`
//! emitted to an [`Observer`](pdecon_core::Observer) each iteration, an
//! `Action` the observer may return, and a `Solution` whose status reports
//! how the run ended. Failing to converge is never an error.
//!
//! # Solvers
//!
//! - [`least_squares`] — trust-region Gauss–Newton for `min ½‖F(x)‖²`
//! - [`bound_constrained`] — projected trust-region Newton–CG over a box
//! - [`interior_point`] — primal–dual barrier method with sparse LDLᵀ
//! - [`augmented_lagrangian`] — matrix-free method of multipliers
//!
//! The constrained solvers accept equality constraints and variable bounds.
//! Their solutions convert into [`Stats`](pdecon_core::Stats).

pub mod augmented_lagrangian;
pub mod bound_constrained;
pub mod interior_point;
pub mod krylov;
pub mod least_squares;

#[cfg(test)]
mod test_problems;
