//! Tensor-product Lagrange elements on a rectangular cell.
//!
//! Local nodes of an order-`p` element sit on the equispaced `(p + 1) × (p + 1)`
//! lattice of the cell and are numbered row by row, `b * (p + 1) + a` for the
//! node at lattice position `(a, b)`.

use crate::quadrature::GaussLegendre;

/// One-dimensional Lagrange basis on `[0, 1]` with equispaced nodes `k / p`.
#[derive(Debug, Clone)]
pub(crate) struct LagrangeBasis {
    nodes: Vec<f64>,
}

impl LagrangeBasis {
    pub(crate) fn new(order: usize) -> Self {
        let p = order as f64;
        let nodes = (0..=order).map(|k| k as f64 / p).collect();
        Self { nodes }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Value of basis function `k` at `t`.
    pub(crate) fn value(&self, k: usize, t: f64) -> f64 {
        let tk = self.nodes[k];
        self.nodes
            .iter()
            .enumerate()
            .filter(|&(m, _)| m != k)
            .map(|(_, &tm)| (t - tm) / (tk - tm))
            .product()
    }

    /// Derivative of basis function `k` at `t`.
    pub(crate) fn derivative(&self, k: usize, t: f64) -> f64 {
        let tk = self.nodes[k];
        let mut sum = 0.0;
        for (l, &tl) in self.nodes.iter().enumerate() {
            if l == k {
                continue;
            }
            let mut term = 1.0 / (tk - tl);
            for (m, &tm) in self.nodes.iter().enumerate() {
                if m != k && m != l {
                    term *= (t - tm) / (tk - tm);
                }
            }
            sum += term;
        }
        sum
    }
}

/// Quadrature points and weights of one physical cell, relative to its
/// lower-left corner.
#[derive(Debug, Clone)]
pub(crate) struct CellQuadrature {
    pub(crate) offsets: Vec<[f64; 2]>,
    pub(crate) weights: Vec<f64>,
}

impl CellQuadrature {
    pub(crate) fn new(rule: &GaussLegendre, cell_size: [f64; 2]) -> Self {
        let [hx, hy] = cell_size;
        let n = rule.len();
        let mut offsets = Vec::with_capacity(n * n);
        let mut weights = Vec::with_capacity(n * n);
        for (&ty, &wy) in rule.points().iter().zip(rule.weights()) {
            for (&tx, &wx) in rule.points().iter().zip(rule.weights()) {
                offsets.push([tx * hx, ty * hy]);
                weights.push(wx * wy * hx * hy);
            }
        }
        Self { offsets, weights }
    }

    pub(crate) fn len(&self) -> usize {
        self.weights.len()
    }
}

/// Basis values and physical gradients of one element at every quadrature
/// point of a cell.
///
/// The mesh is uniform, so one table serves every cell.
#[derive(Debug, Clone)]
pub(crate) struct ElementTables {
    nloc: usize,
    values: Vec<f64>,
    gradients: Vec<[f64; 2]>,
}

impl ElementTables {
    pub(crate) fn new(order: usize, rule: &GaussLegendre, cell_size: [f64; 2]) -> Self {
        let basis = LagrangeBasis::new(order);
        let n1 = basis.len();
        let nloc = n1 * n1;
        let nq = rule.len() * rule.len();
        let [hx, hy] = cell_size;

        let mut values = Vec::with_capacity(nq * nloc);
        let mut gradients = Vec::with_capacity(nq * nloc);
        for &ty in rule.points() {
            for &tx in rule.points() {
                for b in 0..n1 {
                    let (vy, dy) = (basis.value(b, ty), basis.derivative(b, ty));
                    for a in 0..n1 {
                        let (vx, dx) = (basis.value(a, tx), basis.derivative(a, tx));
                        values.push(vx * vy);
                        gradients.push([dx * vy / hx, vx * dy / hy]);
                    }
                }
            }
        }

        Self {
            nloc,
            values,
            gradients,
        }
    }

    /// Number of local basis functions.
    pub(crate) fn nloc(&self) -> usize {
        self.nloc
    }

    /// Basis values at quadrature point `q`.
    pub(crate) fn values(&self, q: usize) -> &[f64] {
        &self.values[q * self.nloc..(q + 1) * self.nloc]
    }

    /// Physical basis gradients at quadrature point `q`.
    pub(crate) fn gradients(&self, q: usize) -> &[[f64; 2]] {
        &self.gradients[q * self.nloc..(q + 1) * self.nloc]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn basis_is_nodal() {
        for order in 1..=4 {
            let basis = LagrangeBasis::new(order);
            for k in 0..=order {
                for m in 0..=order {
                    let expected = if k == m { 1.0 } else { 0.0 };
                    let t = m as f64 / order as f64;
                    assert_abs_diff_eq!(basis.value(k, t), expected, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let basis = LagrangeBasis::new(3);
        let h = 1e-6;
        for k in 0..4 {
            for &t in &[0.1, 0.45, 0.8] {
                let fd = (basis.value(k, t + h) - basis.value(k, t - h)) / (2.0 * h);
                assert_relative_eq!(basis.derivative(k, t), fd, epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn partition_of_unity_at_quadrature_points() {
        let rule = GaussLegendre::new(4).unwrap();
        for order in 1..=4 {
            let tables = ElementTables::new(order, &rule, [0.5, 0.25]);
            for q in 0..rule.len() * rule.len() {
                let sum: f64 = tables.values(q).iter().sum();
                assert_relative_eq!(sum, 1.0, epsilon = 1e-12);

                let grad = tables
                    .gradients(q)
                    .iter()
                    .fold([0.0, 0.0], |acc, g| [acc[0] + g[0], acc[1] + g[1]]);
                assert_abs_diff_eq!(grad[0], 0.0, epsilon = 1e-10);
                assert_abs_diff_eq!(grad[1], 0.0, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn gradients_reproduce_linear_functions() {
        // Interpolating f(x, y) = 2x - 3y on a 0.5 × 0.25 cell must give ∇f exactly.
        let (hx, hy) = (0.5, 0.25);
        let order = 2;
        let rule = GaussLegendre::new(3).unwrap();
        let tables = ElementTables::new(order, &rule, [hx, hy]);

        let mut nodal = Vec::new();
        for b in 0..=order {
            for a in 0..=order {
                let x = hx * a as f64 / order as f64;
                let y = hy * b as f64 / order as f64;
                nodal.push(2.0 * x - 3.0 * y);
            }
        }

        for q in 0..9 {
            let grad = tables
                .gradients(q)
                .iter()
                .zip(&nodal)
                .fold([0.0, 0.0], |acc, (g, f)| [acc[0] + g[0] * f, acc[1] + g[1] * f]);
            assert_relative_eq!(grad[0], 2.0, epsilon = 1e-12);
            assert_relative_eq!(grad[1], -3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn cell_weights_sum_to_cell_area() {
        let rule = GaussLegendre::new(2).unwrap();
        let quad = CellQuadrature::new(&rule, [0.5, 0.25]);
        assert_eq!(quad.len(), 4);
        assert_relative_eq!(quad.weights.iter().sum::<f64>(), 0.125, epsilon = 1e-15);
    }
}
