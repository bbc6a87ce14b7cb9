//! Small dense-vector kernels shared by models and solvers.

/// Inner product `xᵀy`.
#[must_use]
pub fn dot(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

/// Euclidean norm.
#[must_use]
pub fn norm2(x: &[f64]) -> f64 {
    dot(x, x).sqrt()
}

/// Maximum absolute entry, `0.0` for an empty slice.
#[must_use]
pub fn norm_inf(x: &[f64]) -> f64 {
    x.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

/// `y ← y + alpha x`.
pub fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// Clamps `x` componentwise into `[lower, upper]`.
pub fn project(x: &mut [f64], lower: &[f64], upper: &[f64]) {
    for ((xi, l), u) in x.iter_mut().zip(lower).zip(upper) {
        *xi = xi.clamp(*l, *u);
    }
}

/// `‖P(x − g) − x‖∞`, the projected-gradient stationarity measure on a box.
#[must_use]
pub fn projected_gradient_norm(x: &[f64], g: &[f64], lower: &[f64], upper: &[f64]) -> f64 {
    x.iter()
        .zip(g)
        .zip(lower.iter().zip(upper))
        .fold(0.0, |acc: f64, ((xi, gi), (l, u))| {
            acc.max(((xi - gi).clamp(*l, *u) - xi).abs())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn norms() {
        let v = [3.0, -4.0];
        assert_relative_eq!(norm2(&v), 5.0);
        assert_relative_eq!(norm_inf(&v), 4.0);
        assert_relative_eq!(norm_inf(&[]), 0.0);
    }

    #[test]
    fn axpy_accumulates() {
        let mut y = vec![1.0, 1.0];
        axpy(2.0, &[1.0, -1.0], &mut y);
        assert_eq!(y, vec![3.0, -1.0]);
    }

    #[test]
    fn projection_clamps() {
        let mut x = vec![-2.0, 0.5, 3.0];
        project(&mut x, &[-1.0; 3], &[1.0; 3]);
        assert_eq!(x, vec![-1.0, 0.5, 1.0]);
    }

    #[test]
    fn projected_gradient_ignores_blocked_directions() {
        // At the lower bound with a positive gradient, the descent direction is blocked.
        let pg = projected_gradient_norm(&[0.0, 0.5], &[2.0, 0.1], &[0.0, 0.0], &[1.0, 1.0]);
        assert_relative_eq!(pg, 0.1);
    }
}
