use crate::{BuildError, CartesianMesh};

/// Highest supported Lagrange order.
pub const MAX_ORDER: usize = 4;

/// Boundary treatment of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    /// Boundary nodes are fixed to the given value and carry no unknowns.
    Dirichlet(f64),

    /// Every node is an unknown.
    Free,
}

/// A continuous Lagrange finite-element space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeSpace {
    pub order: usize,
    pub boundary: Boundary,
}

impl FeSpace {
    /// An order-`order` space with the given boundary treatment.
    #[must_use]
    pub fn new(order: usize, boundary: Boundary) -> Self {
        Self { order, boundary }
    }

    /// An order-`order` space vanishing on the boundary.
    #[must_use]
    pub fn homogeneous_dirichlet(order: usize) -> Self {
        Self::new(order, Boundary::Dirichlet(0.0))
    }

    /// Checks the order against [`MAX_ORDER`].
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnsupportedOrder`] unless `1 <= order <= MAX_ORDER`.
    pub fn validate(&self) -> Result<(), BuildError> {
        if (1..=MAX_ORDER).contains(&self.order) {
            Ok(())
        } else {
            Err(BuildError::UnsupportedOrder {
                order: self.order,
                max: MAX_ORDER,
            })
        }
    }

    /// Number of free degrees of freedom on `mesh`, without building a map.
    #[must_use]
    pub fn num_dofs(&self, mesh: &CartesianMesh) -> usize {
        let [nx, ny] = mesh.cells();
        let (lx, ly) = (self.order * nx + 1, self.order * ny + 1);
        match self.boundary {
            Boundary::Free => lx * ly,
            Boundary::Dirichlet(_) => lx.saturating_sub(2) * ly.saturating_sub(2),
        }
    }
}

/// Maps the global node lattice of a space to free degrees of freedom.
///
/// The lattice has `(p·nx + 1) × (p·ny + 1)` nodes numbered row by row.
/// Free DOFs are numbered in lattice order, skipping constrained nodes.
#[derive(Debug, Clone)]
pub struct DofMap {
    space: FeSpace,
    lattice: [usize; 2],
    node_dof: Vec<Option<usize>>,
    num_dofs: usize,
}

impl DofMap {
    /// Numbers the free nodes of `space` on `mesh`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnsupportedOrder`] if the order is out of range.
    pub fn new(space: FeSpace, mesh: &CartesianMesh) -> Result<Self, BuildError> {
        space.validate()?;

        let p = space.order;
        let [nx, ny] = mesh.cells();
        let lattice = [p * nx + 1, p * ny + 1];

        let mut node_dof = Vec::with_capacity(lattice[0] * lattice[1]);
        let mut next = 0;
        for j in 0..lattice[1] {
            for i in 0..lattice[0] {
                let on_boundary = i == 0 || j == 0 || i + 1 == lattice[0] || j + 1 == lattice[1];
                let constrained = on_boundary && matches!(space.boundary, Boundary::Dirichlet(_));
                if constrained {
                    node_dof.push(None);
                } else {
                    node_dof.push(Some(next));
                    next += 1;
                }
            }
        }

        Ok(Self {
            space,
            lattice,
            node_dof,
            num_dofs: next,
        })
    }

    #[must_use]
    pub fn space(&self) -> &FeSpace {
        &self.space
    }

    #[must_use]
    pub fn num_dofs(&self) -> usize {
        self.num_dofs
    }

    /// The free DOF at global node `node`, if any.
    #[must_use]
    pub fn dof(&self, node: usize) -> Option<usize> {
        self.node_dof[node]
    }

    /// Field value at `node` given the free DOF values.
    #[must_use]
    pub fn node_value(&self, node: usize, dofs: &[f64]) -> f64 {
        match (self.node_dof[node], self.space.boundary) {
            (Some(d), _) => dofs[d],
            (None, Boundary::Dirichlet(value)) => value,
            (None, Boundary::Free) => 0.0,
        }
    }

    /// Writes the global nodes of cell `(cx, cy)` in local element order.
    pub(crate) fn cell_nodes(&self, cx: usize, cy: usize, nodes: &mut Vec<usize>) {
        let p = self.space.order;
        nodes.clear();
        for b in 0..=p {
            let row = (cy * p + b) * self.lattice[0];
            for a in 0..=p {
                nodes.push(row + cx * p + a);
            }
        }
    }
}
