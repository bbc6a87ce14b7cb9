//! Capability traits for cross-solver observers.
//!
//! These traits abstract over solver-specific event and action types, enabling
//! observers to work generically across different solvers.
//!
//! # Event traits
//!
//! - [`HasIteration`] — events numbered by iteration
//! - [`HasObjective`] — events that carry an objective value
//! - [`HasFeasibility`] — events that carry primal and dual feasibility measures
//!
//! # Action traits
//!
//! - [`CanStopEarly`] — actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use pdecon_core::Observer;
//! use pdecon_observers::traits::{CanStopEarly, HasFeasibility};
//!
//! struct FeasibleEnough {
//!     tolerance: f64,
//! }
//!
//! impl<E: HasFeasibility, A: CanStopEarly> Observer<E, A> for FeasibleEnough {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.primal_feas() < self.tolerance).then(A::stop_early)
//!     }
//! }
//! ```

use pdecon_solvers::{augmented_lagrangian, bound_constrained, interior_point, least_squares};

/// An event numbered by solver iteration.
pub trait HasIteration {
    /// Returns the iteration this event belongs to, starting at 1.
    fn iteration(&self) -> usize;
}

/// An event that carries an objective value.
pub trait HasObjective {
    /// Returns the objective at the event's iterate.
    fn objective(&self) -> f64;
}

/// An event that carries feasibility measures.
pub trait HasFeasibility {
    /// Returns the constraint violation at the event's iterate.
    fn primal_feas(&self) -> f64;

    /// Returns the stationarity measure at the event's iterate.
    fn dual_feas(&self) -> f64;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the solver early.
    fn stop_early() -> Self;
}

// --- least_squares ---
//
// The objective is ½‖F‖²; feasibility is ‖F‖ and stationarity is ‖JᵀF‖.

impl HasIteration for least_squares::Event<'_> {
    fn iteration(&self) -> usize {
        self.iter
    }
}

impl HasObjective for least_squares::Event<'_> {
    fn objective(&self) -> f64 {
        0.5 * self.residual_norm * self.residual_norm
    }
}

impl HasFeasibility for least_squares::Event<'_> {
    fn primal_feas(&self) -> f64 {
        self.residual_norm
    }

    fn dual_feas(&self) -> f64 {
        self.gradient_norm
    }
}

// --- bound_constrained ---

impl HasIteration for bound_constrained::Event<'_> {
    fn iteration(&self) -> usize {
        self.iter
    }
}

impl HasObjective for bound_constrained::Event<'_> {
    fn objective(&self) -> f64 {
        self.objective
    }
}

impl HasFeasibility for bound_constrained::Event<'_> {
    fn primal_feas(&self) -> f64 {
        0.0
    }

    fn dual_feas(&self) -> f64 {
        self.projected_gradient
    }
}

// --- interior_point ---

impl HasIteration for interior_point::Event<'_> {
    fn iteration(&self) -> usize {
        self.iter
    }
}

impl HasObjective for interior_point::Event<'_> {
    fn objective(&self) -> f64 {
        self.objective
    }
}

impl HasFeasibility for interior_point::Event<'_> {
    fn primal_feas(&self) -> f64 {
        self.primal_feas
    }

    fn dual_feas(&self) -> f64 {
        self.dual_feas
    }
}

// --- augmented_lagrangian ---

impl HasIteration for augmented_lagrangian::Event<'_> {
    fn iteration(&self) -> usize {
        self.iter
    }
}

impl HasObjective for augmented_lagrangian::Event<'_> {
    fn objective(&self) -> f64 {
        self.objective
    }
}

impl HasFeasibility for augmented_lagrangian::Event<'_> {
    fn primal_feas(&self) -> f64 {
        self.primal_feas
    }

    fn dual_feas(&self) -> f64 {
        self.dual_feas
    }
}

// --- CanStopEarly impls ---

impl CanStopEarly for least_squares::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for bound_constrained::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for interior_point::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for augmented_lagrangian::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
