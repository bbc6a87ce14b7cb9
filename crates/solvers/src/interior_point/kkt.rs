//! Assembly and inertia-corrected factorization of the primal-dual system.

use sprs::errors::LinalgError;
use sprs::{CsMat, FillInReduction, SymmetryCheck, TriMat};
use sprs_ldl::{Ldl, LdlNumeric};

/// Dual regularization kept on the constraint block.
///
/// A small negative diagonal makes the matrix quasi-definite whenever the
/// primal block is positive definite, so the factorization never meets a
/// zero pivot on a constraint row.
pub(super) const DUAL_REGULARIZATION: f64 = 1e-8;

const FIRST_REGULARIZATION: f64 = 1e-4;
const MIN_REGULARIZATION: f64 = 1e-20;
const MAX_REGULARIZATION: f64 = 1e40;

/// A factorized primal-dual matrix and the regularization it needed.
pub(super) struct Factorized {
    ldl: LdlNumeric<f64, usize>,
    pub(super) regularization: f64,
}

impl Factorized {
    pub(super) fn solve(&self, rhs: &[f64]) -> Vec<f64> {
        self.ldl.solve(rhs)
    }
}

/// Remembers the last primal regularization between iterations.
#[derive(Debug, Default)]
pub(super) struct Regularizer {
    last: f64,
}

impl Regularizer {
    /// Factorizes
    ///
    /// ```text
    /// [ W + Σ + δw I     Jᵀ   ]
    /// [      J        −δc I  ]
    /// ```
    ///
    /// increasing `δw` until the matrix has `n` positive and `m` negative
    /// eigenvalues. Returns `None` if no regularization below the cap works.
    pub(super) fn factorize(
        &mut self,
        hess: &CsMat<f64>,
        jac: &CsMat<f64>,
        sigma: &[f64],
    ) -> Option<Factorized> {
        let (n, m) = (hess.rows(), jac.rows());
        let mut delta = 0.0;

        loop {
            let matrix = assemble(hess, jac, sigma, delta, DUAL_REGULARIZATION);
            match factor(&matrix) {
                Ok(ldl) if inertia(&ldl) == (n, m) => {
                    if delta > 0.0 {
                        self.last = delta;
                    }
                    return Some(Factorized {
                        ldl,
                        regularization: delta,
                    });
                }
                _ => {}
            }

            delta = match (delta == 0.0, self.last == 0.0) {
                (true, true) => FIRST_REGULARIZATION,
                (true, false) => (self.last / 3.0).max(MIN_REGULARIZATION),
                (false, true) => 100.0 * delta,
                (false, false) => 8.0 * delta,
            };
            if delta > MAX_REGULARIZATION {
                return None;
            }
        }
    }
}

/// Builds the full symmetric primal-dual matrix in CSC form.
pub(super) fn assemble(
    hess: &CsMat<f64>,
    jac: &CsMat<f64>,
    sigma: &[f64],
    delta_w: f64,
    delta_c: f64,
) -> CsMat<f64> {
    let (n, m) = (hess.rows(), jac.rows());
    let mut t = TriMat::with_capacity((n + m, n + m), hess.nnz() + 2 * jac.nnz() + n + m);

    for (value, (i, j)) in hess {
        t.add_triplet(i, j, *value);
    }
    for (i, s) in sigma.iter().enumerate() {
        t.add_triplet(i, i, s + delta_w);
    }
    for (value, (row, col)) in jac {
        t.add_triplet(n + row, col, *value);
        t.add_triplet(col, n + row, *value);
    }
    for row in 0..m {
        t.add_triplet(n + row, n + row, -delta_c);
    }

    t.to_csc()
}

fn factor(matrix: &CsMat<f64>) -> Result<LdlNumeric<f64, usize>, LinalgError> {
    Ldl::new()
        .fill_in_reduction(FillInReduction::ReverseCuthillMcKee)
        .check_symmetry(SymmetryCheck::DontCheckSymmetry)
        .numeric(matrix.view())
}

/// Counts positive and negative pivots; zero pivots count as neither.
fn inertia(ldl: &LdlNumeric<f64, usize>) -> (usize, usize) {
    ldl.d().iter().fold((0, 0), |(pos, neg), &d| {
        if d > 0.0 {
            (pos + 1, neg)
        } else if d < 0.0 {
            (pos, neg + 1)
        } else {
            (pos, neg)
        }
    })
}
