use pdecon_core::NlpMeta;

use crate::assembly::Discretization;
use crate::quadrature::GaussLegendre;
use crate::{BuildError, CartesianMesh, FeSpace, Objective, PdeModel, Rectangle, StateEquation};

/// Assembles a [`PdeModel`] from a domain, a partition, two function spaces
/// and the problem integrands.
///
/// Both spaces default to order-1 elements vanishing on the boundary.
///
/// # Example
///
/// ```
/// use pdecon_core::NlpModel;
/// use pdecon_fem::{ModelBuilder, Rectangle, SemilinearPoisson, TrackingObjective};
///
/// let domain = Rectangle::square(2.0, [0.0, 0.0]).unwrap();
/// let model = ModelBuilder::new(
///     domain,
///     [4, 4],
///     TrackingObjective::new(|x: [f64; 2]| -x[0] * x[0], 0.01),
///     SemilinearPoisson::new(|_: [f64; 2]| 1.0, 0.0),
/// )
/// .build()
/// .unwrap();
///
/// assert_eq!(model.nvar(), 2 * 9);
/// assert_eq!(model.ncon(), 9);
/// ```
#[derive(Debug, Clone)]
pub struct ModelBuilder<O, E> {
    name: String,
    domain: Rectangle,
    cells: [usize; 2],
    objective: O,
    equation: E,
    state: FeSpace,
    control: FeSpace,
    x0: Option<Vec<f64>>,
    quadrature_points: Option<usize>,
}

impl<O, E> ModelBuilder<O, E>
where
    O: Objective,
    E: StateEquation,
{
    pub fn new(domain: Rectangle, cells: [usize; 2], objective: O, equation: E) -> Self {
        Self {
            name: "pde".into(),
            domain,
            cells,
            objective,
            equation,
            state: FeSpace::homogeneous_dirichlet(1),
            control: FeSpace::homogeneous_dirichlet(1),
            x0: None,
            quadrature_points: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn state_space(mut self, space: FeSpace) -> Self {
        self.state = space;
        self
    }

    #[must_use]
    pub fn control_space(mut self, space: FeSpace) -> Self {
        self.control = space;
        self
    }

    /// Uses `x0` as the initial point instead of zeros.
    #[must_use]
    pub fn initial_point(mut self, x0: Vec<f64>) -> Self {
        self.x0 = Some(x0);
        self
    }

    /// Overrides the number of Gauss points per direction.
    ///
    /// The default is two more than the highest element order, capped at
    /// [`MAX_QUADRATURE_POINTS`](crate::MAX_QUADRATURE_POINTS).
    #[must_use]
    pub fn quadrature_points(mut self, points: usize) -> Self {
        self.quadrature_points = Some(points);
        self
    }

    /// Validates the inputs and assembles the model.
    ///
    /// The initial point length is checked against the combined DOF count
    /// before any element data or DOF map is allocated.
    ///
    /// # Errors
    ///
    /// - [`BuildError::EmptyPartition`] if a direction has no cells
    /// - [`BuildError::UnsupportedOrder`] if either space has an invalid order
    /// - [`BuildError::NoStateDofs`] if the state space has no unknowns
    /// - [`BuildError::DofMismatch`] if the initial point has the wrong length
    /// - [`BuildError::InvalidQuadrature`] if the quadrature override is out of range
    pub fn build(self) -> Result<PdeModel<O, E>, BuildError> {
        let mesh = CartesianMesh::new(self.domain, self.cells)?;
        self.state.validate()?;
        self.control.validate()?;

        let ny = self.state.num_dofs(&mesh);
        let nu = self.control.num_dofs(&mesh);
        let nvar = ny + nu;

        if let Some(x0) = &self.x0 {
            if x0.len() != nvar {
                return Err(BuildError::DofMismatch {
                    expected: nvar,
                    found: x0.len(),
                });
            }
        }
        if ny == 0 {
            return Err(BuildError::NoStateDofs);
        }

        let points = self.quadrature_points.unwrap_or_else(|| {
            GaussLegendre::points_for_order(self.state.order.max(self.control.order))
        });
        let discretization = Discretization::new(mesh, self.state, self.control, points)?;

        let mut meta = NlpMeta::new(self.name, nvar, ny);
        if let Some(x0) = self.x0 {
            meta = meta.with_x0(x0)?;
        }

        Ok(PdeModel::new(
            meta,
            discretization,
            self.objective,
            self.equation,
        ))
    }
}
