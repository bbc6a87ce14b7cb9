//! Cell-by-cell assembly of the discretized objective and state equation.
//!
//! The variable vector is `[y dofs, u dofs]`. Constraint row `i` is the weak
//! residual tested against the `i`-th free state basis function.

use pdecon_core::vector::dot;
use sprs::TriMat;

use crate::element::{CellQuadrature, ElementTables};
use crate::quadrature::GaussLegendre;
use crate::space::DofMap;
use crate::{BuildError, CartesianMesh, FeSpace, FieldValues, Objective, Partials, StateEquation};

/// The discrete spaces and precomputed element data of one model.
#[derive(Debug, Clone)]
pub(crate) struct Discretization {
    mesh: CartesianMesh,
    state: DofMap,
    control: DofMap,
    quadrature: CellQuadrature,
    state_tables: ElementTables,
    control_tables: ElementTables,
}

/// Per-cell gather buffers.
#[derive(Debug, Default)]
struct Local {
    nodes: Vec<usize>,
    y_vars: Vec<Option<usize>>,
    y_vals: Vec<f64>,
    u_vars: Vec<Option<usize>>,
    u_vals: Vec<f64>,
}

/// Field data at one quadrature point.
struct Point {
    q: usize,
    weight: f64,
    at: FieldValues,
    grad_y: [f64; 2],
}

impl Discretization {
    pub(crate) fn new(
        mesh: CartesianMesh,
        state: FeSpace,
        control: FeSpace,
        quadrature_points: usize,
    ) -> Result<Self, BuildError> {
        let rule = GaussLegendre::new(quadrature_points)?;
        let state_map = DofMap::new(state, &mesh)?;
        let control_map = DofMap::new(control, &mesh)?;
        let cell_size = mesh.cell_size();

        Ok(Self {
            quadrature: CellQuadrature::new(&rule, cell_size),
            state_tables: ElementTables::new(state.order, &rule, cell_size),
            control_tables: ElementTables::new(control.order, &rule, cell_size),
            state: state_map,
            control: control_map,
            mesh,
        })
    }

    pub(crate) fn mesh(&self) -> &CartesianMesh {
        &self.mesh
    }

    pub(crate) fn state(&self) -> &DofMap {
        &self.state
    }

    pub(crate) fn control(&self) -> &DofMap {
        &self.control
    }

    pub(crate) fn nvar(&self) -> usize {
        self.state.num_dofs() + self.control.num_dofs()
    }

    pub(crate) fn ncon(&self) -> usize {
        self.state.num_dofs()
    }

    /// `∫ j(x, y, u) dΩ`.
    pub(crate) fn objective(&self, objective: &impl Objective, x: &[f64]) -> f64 {
        let mut total = 0.0;
        self.visit(x, |_, point| {
            total += point.weight * objective.eval(&point.at).value;
        });
        total
    }

    /// Writes the objective gradient into `g`.
    pub(crate) fn gradient(&self, objective: &impl Objective, x: &[f64], g: &mut [f64]) {
        g.fill(0.0);
        let (gy, gu) = g.split_at_mut(self.state.num_dofs());
        self.visit(x, |local, point| {
            let j = objective.eval(&point.at);
            let phi = self.state_tables.values(point.q);
            let psi = self.control_tables.values(point.q);
            scatter(gy, &local.y_vars, phi, point.weight * j.dy);
            scatter(gu, &local.u_vars, psi, point.weight * j.du);
        });
    }

    /// Writes the weak state-equation residual into `c`.
    pub(crate) fn residual(&self, equation: &impl StateEquation, x: &[f64], c: &mut [f64]) {
        c.fill(0.0);
        self.visit(x, |local, point| {
            let a = equation.diffusivity(point.at.x);
            let g = equation.reaction(&point.at);
            let phi = self.state_tables.values(point.q);
            let dphi = self.state_tables.gradients(point.q);
            for (k, row) in local.y_vars.iter().enumerate() {
                if let Some(row) = *row {
                    let diffusion = a * dot2(dphi[k], point.grad_y);
                    c[row] += point.weight * (diffusion + phi[k] * g.value);
                }
            }
        });
    }

    /// The residual Jacobian in coordinate form.
    pub(crate) fn jacobian(&self, equation: &impl StateEquation, x: &[f64]) -> TriMat<f64> {
        let offset = self.state.num_dofs();
        let mut jac = TriMat::new((self.ncon(), self.nvar()));
        self.visit(x, |local, point| {
            let a = equation.diffusivity(point.at.x);
            let g = equation.reaction(&point.at);
            let phi = self.state_tables.values(point.q);
            let dphi = self.state_tables.gradients(point.q);
            let psi = self.control_tables.values(point.q);
            let w = point.weight;

            for (i, row) in local.y_vars.iter().enumerate() {
                let Some(row) = *row else { continue };
                for (k, col) in local.y_vars.iter().enumerate() {
                    if let Some(col) = *col {
                        let value = a * dot2(dphi[i], dphi[k]) + g.dy * phi[i] * phi[k];
                        jac.add_triplet(row, col, w * value);
                    }
                }
                for (k, col) in local.u_vars.iter().enumerate() {
                    if let Some(col) = *col {
                        jac.add_triplet(row, col + offset, w * g.du * phi[i] * psi[k]);
                    }
                }
            }
        });
        jac
    }

    /// The Hessian of `σ F + λᵀ c` in coordinate form, both triangles.
    pub(crate) fn hessian(
        &self,
        objective: &impl Objective,
        equation: &impl StateEquation,
        x: &[f64],
        multipliers: &[f64],
        obj_weight: f64,
    ) -> TriMat<f64> {
        let offset = self.state.num_dofs();
        let mut hess = TriMat::new((self.nvar(), self.nvar()));
        self.visit(x, |local, point| {
            let j = objective.eval(&point.at);
            let g = equation.reaction(&point.at);
            let phi = self.state_tables.values(point.q);
            let psi = self.control_tables.values(point.q);

            let lambda: f64 = local
                .y_vars
                .iter()
                .zip(phi)
                .filter_map(|(row, p)| row.map(|r| multipliers[r] * p))
                .sum();
            let w = point.weight;
            let Partials { dyy, dyu, duu, .. } = combine(obj_weight, &j, lambda, &g);

            for (i, vi) in local.y_vars.iter().enumerate() {
                let Some(vi) = *vi else { continue };
                for (k, vk) in local.y_vars.iter().enumerate() {
                    if let Some(vk) = *vk {
                        hess.add_triplet(vi, vk, w * dyy * phi[i] * phi[k]);
                    }
                }
                if dyu != 0.0 {
                    for (k, vk) in local.u_vars.iter().enumerate() {
                        if let Some(vk) = *vk {
                            let value = w * dyu * phi[i] * psi[k];
                            hess.add_triplet(vi, vk + offset, value);
                            hess.add_triplet(vk + offset, vi, value);
                        }
                    }
                }
            }
            if duu != 0.0 {
                for (i, vi) in local.u_vars.iter().enumerate() {
                    let Some(vi) = *vi else { continue };
                    for (k, vk) in local.u_vars.iter().enumerate() {
                        if let Some(vk) = *vk {
                            hess.add_triplet(vi + offset, vk + offset, w * duu * psi[i] * psi[k]);
                        }
                    }
                }
            }
        });
        hess
    }

    /// Calls `f` at every quadrature point of every cell.
    fn visit(&self, x: &[f64], mut f: impl FnMut(&Local, &Point)) {
        let (ys, us) = x.split_at(self.state.num_dofs());
        let mut local = Local::default();

        for (cx, cy) in self.mesh.iter_cells() {
            let origin = self.mesh.cell_origin(cx, cy);
            gather(&self.state, cx, cy, ys, &mut local.nodes, &mut local.y_vars, &mut local.y_vals);
            gather(&self.control, cx, cy, us, &mut local.nodes, &mut local.u_vars, &mut local.u_vals);

            for q in 0..self.quadrature.len() {
                let phi = self.state_tables.values(q);
                let dphi = self.state_tables.gradients(q);
                let psi = self.control_tables.values(q);

                let y = dot(phi, &local.y_vals);
                let u = dot(psi, &local.u_vals);
                let grad_y = dphi
                    .iter()
                    .zip(&local.y_vals)
                    .fold([0.0, 0.0], |acc, (d, v)| [acc[0] + d[0] * v, acc[1] + d[1] * v]);
                let [ox, oy] = self.quadrature.offsets[q];

                let point = Point {
                    q,
                    weight: self.quadrature.weights[q],
                    at: FieldValues {
                        x: [origin[0] + ox, origin[1] + oy],
                        y,
                        u,
                    },
                    grad_y,
                };
                f(&local, &point);
            }
        }
    }
}

/// Second partials of `σ j + λ g`.
fn combine(sigma: f64, j: &Partials, lambda: f64, g: &Partials) -> Partials {
    Partials {
        value: sigma * j.value + lambda * g.value,
        dy: sigma * j.dy + lambda * g.dy,
        du: sigma * j.du + lambda * g.du,
        dyy: sigma * j.dyy + lambda * g.dyy,
        dyu: sigma * j.dyu + lambda * g.dyu,
        duu: sigma * j.duu + lambda * g.duu,
    }
}

fn gather(
    map: &DofMap,
    cx: usize,
    cy: usize,
    dofs: &[f64],
    nodes: &mut Vec<usize>,
    vars: &mut Vec<Option<usize>>,
    vals: &mut Vec<f64>,
) {
    map.cell_nodes(cx, cy, nodes);
    vars.clear();
    vals.clear();
    for &node in nodes.iter() {
        vars.push(map.dof(node));
        vals.push(map.node_value(node, dofs));
    }
}

fn scatter(out: &mut [f64], vars: &[Option<usize>], basis: &[f64], scale: f64) {
    for (var, b) in vars.iter().zip(basis) {
        if let Some(var) = *var {
            out[var] += scale * b;
        }
    }
}

fn dot2(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}
