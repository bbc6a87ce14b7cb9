//! Core traits and types for pdecon.
//!
//! This crate defines the shared abstractions that models, solvers, and
//! observers build on:
//!
//! - [`NlpModel`] — a constrained nonlinear program with evaluation counters
//! - [`NlsModel`] — a nonlinear least-squares problem
//! - [`FeasibilityResidual`] — views an [`NlpModel`]'s constraints as an
//!   [`NlsModel`] residual
//! - [`Counters`] — resettable per-run evaluation accounting
//! - [`Stats`] — the record every solver run produces
//! - [`Observer`] — receives solver events and optionally returns control actions

mod counters;
mod feasibility;
mod nlp;
mod nls;
mod observer;
mod stats;

pub mod sparse;
pub mod vector;

pub use counters::{Counters, EvalCounts, EvalKind};
pub use feasibility::{FeasibilityError, FeasibilityResidual};
pub use nlp::{MetaError, NlpMeta, NlpModel};
pub use nls::NlsModel;
pub use observer::Observer;
pub use stats::{Stats, Status};
