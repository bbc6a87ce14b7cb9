//! The tutorial's control problem.
//!
//! ```text
//! minimize    ½‖y − y_d‖² + ½α‖u‖²
//! subject to  −Δy + κ y³ = u + h   in Ω,   y = u = 0 on ∂Ω
//! ```
//!
//! with `y_d(x) = −x₁²` and `h(x) = −sin(ω x₁) sin(ω x₂)`.

use pdecon_fem::{
    BuildError, FeSpace, ModelBuilder, PdeModel, Rectangle, SemilinearPoisson, TrackingObjective,
};

use crate::ExperimentConfig;

/// Name recorded in the model metadata.
pub const MODEL_NAME: &str = "semilinear-poisson-control";

/// A scalar field over the domain.
pub type Field = Box<dyn Fn([f64; 2]) -> f64>;

/// The assembled tutorial model.
pub type TutorialModel = PdeModel<TrackingObjective<Field>, SemilinearPoisson<Field>>;

/// Desired state `y_d(x) = −x₁²`.
#[must_use]
pub fn target(x: [f64; 2]) -> f64 {
    -x[0] * x[0]
}

/// Forcing `h(x) = −sin(ω x₁) sin(ω x₂)`.
pub fn forcing(omega: f64) -> impl Fn([f64; 2]) -> f64 + Copy {
    move |x| -(omega * x[0]).sin() * (omega * x[1]).sin()
}

/// Builds the discretized model described by `config`.
///
/// # Errors
///
/// Returns a [`BuildError`] for an invalid domain, partition, element order,
/// or quadrature size.
pub fn build_model(config: &ExperimentConfig) -> Result<TutorialModel, BuildError> {
    let domain = Rectangle::square(config.side, config.center)?;
    let objective = TrackingObjective::new(Box::new(target) as Field, config.alpha);
    let equation =
        SemilinearPoisson::new(Box::new(forcing(config.omega)) as Field, config.reaction);

    let mut builder = ModelBuilder::new(domain, config.cells, objective, equation)
        .name(MODEL_NAME)
        .state_space(FeSpace::homogeneous_dirichlet(config.state_order))
        .control_space(FeSpace::homogeneous_dirichlet(config.control_order));
    if let Some(points) = config.quadrature_points {
        builder = builder.quadrature_points(points);
    }
    builder.build()
}
