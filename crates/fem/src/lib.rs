//! Finite-element discretization of PDE-constrained optimal control problems.
//!
//! The crate turns a continuous problem
//!
//! ```text
//! minimize    ∫ j(x, y, u) dΩ
//! subject to  ∫ a ∇v·∇y + v g(x, y, u) dΩ = 0   for every test function v
//! ```
//!
//! into a [`PdeModel`], an [`NlpModel`] whose variables are the free degrees of
//! freedom of the state field `y` followed by those of the control field `u`.
//!
//! - [`Rectangle`] and [`CartesianMesh`] describe the geometry
//! - [`FeSpace`] picks a Lagrange order and a boundary condition per field
//! - [`Objective`] and [`StateEquation`] are pointwise integrands;
//!   [`TrackingObjective`] and [`SemilinearPoisson`] are the stock choices
//! - [`ModelBuilder`] validates everything and assembles the model
//!
//! [`NlpModel`]: pdecon_core::NlpModel

mod assembly;
mod builder;
mod domain;
mod element;
mod error;
mod integrand;
mod mesh;
mod model;
mod quadrature;
mod space;

pub use builder::ModelBuilder;
pub use domain::Rectangle;
pub use error::{BuildError, EvalError};
pub use integrand::{FieldValues, Objective, Partials, SemilinearPoisson, StateEquation, TrackingObjective};
pub use mesh::CartesianMesh;
pub use model::PdeModel;
pub use quadrature::MAX_POINTS as MAX_QUADRATURE_POINTS;
pub use space::{Boundary, DofMap, FeSpace, MAX_ORDER};
