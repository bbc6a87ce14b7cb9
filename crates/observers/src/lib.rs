//! Reusable observers for pdecon solvers.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work across the solvers in `pdecon-solvers`.
//!
//! # Modules
//!
//! - [`traits`] — Capability traits for cross-solver observers
//!   ([`HasIteration`], [`HasObjective`], [`HasFeasibility`], [`CanStopEarly`])
//!
//! # Observers
//!
//! - [`LogObserver`] — writes one `tracing` line per iteration
//! - [`History`] — records every iteration for later inspection
//!
//! [`Observer`]: pdecon_core::Observer
//! [`HasIteration`]: traits::HasIteration
//! [`HasObjective`]: traits::HasObjective
//! [`HasFeasibility`]: traits::HasFeasibility
//! [`CanStopEarly`]: traits::CanStopEarly

mod history;
mod log;

pub mod traits;

pub use history::{History, Record};
pub use log::LogObserver;
