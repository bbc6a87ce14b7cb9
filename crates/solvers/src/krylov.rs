//! Matrix-free Krylov kernels for trust-region subproblems.
//!
//! Both kernels only need operator products and start from the zero vector,
//! so their iterates grow monotonically in norm and can be truncated at a
//! trust-region boundary.
//!
//! - [`cgls`] — conjugate gradients on the normal equations of `min ‖A s + r‖`
//! - [`steihaug`] — Steihaug–Toint truncated CG for `min gᵀs + ½ sᵀHs`

use pdecon_core::vector::{axpy, dot, norm2};

/// Why a Krylov iteration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The residual dropped below the requested tolerance.
    Converged,

    /// The step reached the trust-region boundary.
    Boundary,

    /// A direction of non-positive curvature was found.
    NegativeCurvature,

    /// The iteration limit was reached.
    MaxIters,
}

/// The step produced by a Krylov kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct KrylovStep {
    pub step: Vec<f64>,
    pub iterations: usize,
    pub termination: Termination,
}

/// Approximately solves `min ‖A s + r‖` subject to `‖s‖ ≤ radius` with CGLS.
///
/// `apply(v, out)` writes `A v` and `apply_t(w, out)` writes `Aᵀ w`. The
/// iteration stops once `‖Aᵀ(A s + r)‖ ≤ rtol ‖Aᵀ r‖`.
///
/// # Errors
///
/// Propagates the first error returned by an operator product.
pub fn cgls<E>(
    mut apply: impl FnMut(&[f64], &mut [f64]) -> Result<(), E>,
    mut apply_t: impl FnMut(&[f64], &mut [f64]) -> Result<(), E>,
    r: &[f64],
    nvar: usize,
    radius: f64,
    rtol: f64,
    max_iters: usize,
) -> Result<KrylovStep, E> {
    let mut s = vec![0.0; nvar];

    // Residual of A s = -r.
    let mut res: Vec<f64> = r.iter().map(|v| -v).collect();
    let mut p = vec![0.0; nvar];
    apply_t(&res, &mut p)?;
    let mut d = p.clone();
    let mut gamma = dot(&p, &p);
    let target = rtol * gamma.sqrt();
    let mut q = vec![0.0; r.len()];

    for iter in 0..max_iters {
        if gamma.sqrt() <= target {
            return Ok(done(s, iter, Termination::Converged));
        }

        apply(&d, &mut q)?;
        let qq = dot(&q, &q);
        if qq <= 0.0 {
            return Ok(done(s, iter, Termination::Converged));
        }
        let alpha = gamma / qq;

        if norm_after(&s, alpha, &d) >= radius {
            let tau = to_boundary(&s, &d, radius);
            axpy(tau, &d, &mut s);
            return Ok(done(s, iter + 1, Termination::Boundary));
        }

        axpy(alpha, &d, &mut s);
        axpy(-alpha, &q, &mut res);
        apply_t(&res, &mut p)?;

        let gamma_next = dot(&p, &p);
        let beta = gamma_next / gamma;
        gamma = gamma_next;
        for (di, pi) in d.iter_mut().zip(&p) {
            *di = pi + beta * *di;
        }
    }

    let termination = if gamma.sqrt() <= target {
        Termination::Converged
    } else {
        Termination::MaxIters
    };
    Ok(done(s, max_iters, termination))
}

/// Approximately solves `min gᵀs + ½ sᵀHs` subject to `‖s‖ ≤ radius`.
///
/// `hess(v, out)` writes `H v`. The iteration follows Steihaug and Toint:
/// it stops at the boundary or along a direction of non-positive curvature,
/// and otherwise once `‖H s + g‖ ≤ min(0.5, √‖g‖) ‖g‖`.
///
/// # Errors
///
/// Propagates the first error returned by the Hessian product.
pub fn steihaug<E>(
    mut hess: impl FnMut(&[f64], &mut [f64]) -> Result<(), E>,
    g: &[f64],
    radius: f64,
    max_iters: usize,
) -> Result<KrylovStep, E> {
    let n = g.len();
    let g_norm = norm2(g);
    let tol = 0.5_f64.min(g_norm.sqrt()) * g_norm;

    let mut s = vec![0.0; n];
    let mut r: Vec<f64> = g.iter().map(|v| -v).collect();
    let mut d = r.clone();
    let mut rr = dot(&r, &r);
    let mut hd = vec![0.0; n];

    for iter in 0..max_iters {
        if rr.sqrt() <= tol {
            return Ok(done(s, iter, Termination::Converged));
        }

        hess(&d, &mut hd)?;
        let curvature = dot(&d, &hd);
        if curvature <= 0.0 {
            let tau = to_boundary(&s, &d, radius);
            axpy(tau, &d, &mut s);
            return Ok(done(s, iter + 1, Termination::NegativeCurvature));
        }

        let alpha = rr / curvature;
        if norm_after(&s, alpha, &d) >= radius {
            let tau = to_boundary(&s, &d, radius);
            axpy(tau, &d, &mut s);
            return Ok(done(s, iter + 1, Termination::Boundary));
        }

        axpy(alpha, &d, &mut s);
        axpy(-alpha, &hd, &mut r);

        let rr_next = dot(&r, &r);
        let beta = rr_next / rr;
        rr = rr_next;
        for (di, ri) in d.iter_mut().zip(&r) {
            *di = ri + beta * *di;
        }
    }

    Ok(done(s, max_iters, Termination::MaxIters))
}

fn done(step: Vec<f64>, iterations: usize, termination: Termination) -> KrylovStep {
    KrylovStep {
        step,
        iterations,
        termination,
    }
}

/// `‖s + alpha d‖`.
fn norm_after(s: &[f64], alpha: f64, d: &[f64]) -> f64 {
    s.iter()
        .zip(d)
        .map(|(si, di)| (si + alpha * di).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// The non-negative `tau` with `‖s + tau d‖ = radius`, assuming `‖s‖ ≤ radius`.
fn to_boundary(s: &[f64], d: &[f64], radius: f64) -> f64 {
    let dd = dot(d, d);
    if dd == 0.0 {
        return 0.0;
    }
    let sd = dot(s, d);
    let ss = dot(s, s);
    let disc = (sd * sd + dd * (radius * radius - ss)).max(0.0);
    (-sd + disc.sqrt()) / dd
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;

    /// `A = [[2, 0], [0, 1], [1, 1]]`.
    fn apply(v: &[f64], out: &mut [f64]) -> Result<(), Infallible> {
        out[0] = 2.0 * v[0];
        out[1] = v[1];
        out[2] = v[0] + v[1];
        Ok(())
    }

    fn apply_t(w: &[f64], out: &mut [f64]) -> Result<(), Infallible> {
        out[0] = 2.0 * w[0] + w[2];
        out[1] = w[1] + w[2];
        Ok(())
    }

    #[test]
    fn cgls_solves_least_squares_problem() {
        let r = [-2.0, -1.0, -3.0];
        let step = cgls(apply, apply_t, &r, 2, 1e6, 1e-12, 10).unwrap();

        // AᵀA = [[5, 1], [1, 2]], Aᵀb = [7, 4] with b = -r.
        let det = 5.0 * 2.0 - 1.0;
        let expected = [(2.0 * 7.0 - 4.0) / det, (5.0 * 4.0 - 7.0) / det];
        assert_eq!(step.termination, Termination::Converged);
        assert_relative_eq!(step.step[0], expected[0], epsilon = 1e-10);
        assert_relative_eq!(step.step[1], expected[1], epsilon = 1e-10);
    }

    #[test]
    fn cgls_stops_on_the_boundary() {
        let r = [-2.0, -1.0, -3.0];
        let step = cgls(apply, apply_t, &r, 2, 0.1, 1e-12, 10).unwrap();

        assert_eq!(step.termination, Termination::Boundary);
        assert_relative_eq!(norm2(&step.step), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn steihaug_solves_convex_quadratic() {
        // H = [[4, 1], [1, 3]]; the Newton step solves H s = -g.
        let hess = |v: &[f64], out: &mut [f64]| -> Result<(), Infallible> {
            out[0] = 4.0 * v[0] + v[1];
            out[1] = v[0] + 3.0 * v[1];
            Ok(())
        };
        let g = [1.0e-4, 2.0e-4];
        let step = steihaug(hess, &g, 10.0, 10).unwrap();

        let det = 11.0;
        let expected = [-(3.0 * 1.0e-4 - 2.0e-4) / det, -(4.0 * 2.0e-4 - 1.0e-4) / det];
        assert_eq!(step.termination, Termination::Converged);
        assert_relative_eq!(step.step[0], expected[0], epsilon = 1e-12);
        assert_relative_eq!(step.step[1], expected[1], epsilon = 1e-12);
    }

    #[test]
    fn steihaug_follows_negative_curvature_to_the_boundary() {
        let hess = |v: &[f64], out: &mut [f64]| -> Result<(), Infallible> {
            out[0] = -v[0];
            out[1] = v[1];
            Ok(())
        };
        let step = steihaug(hess, &[1.0, 0.0], 2.0, 10).unwrap();

        assert_eq!(step.termination, Termination::NegativeCurvature);
        assert_relative_eq!(step.step[0], -2.0, epsilon = 1e-12);
        assert_relative_eq!(step.step[1], 0.0);
    }
}
