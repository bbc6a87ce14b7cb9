//! Slack bookkeeping for the variable bounds `l ≤ x ≤ u`.

/// Relative distance `x₀` is pushed away from a finite bound.
const PUSH: f64 = 1e-2;

/// Lower and upper variable bounds, infinite where absent.
#[derive(Debug, Clone, Copy)]
pub(super) struct Bounds<'a> {
    lower: &'a [f64],
    upper: &'a [f64],
}

impl<'a> Bounds<'a> {
    pub(super) fn new(lower: &'a [f64], upper: &'a [f64]) -> Self {
        Self { lower, upper }
    }

    pub(super) fn any(&self) -> bool {
        self.lower.iter().chain(self.upper).any(|b| b.is_finite())
    }

    pub(super) fn has_lower(&self, i: usize) -> bool {
        self.lower[i].is_finite()
    }

    pub(super) fn has_upper(&self, i: usize) -> bool {
        self.upper[i].is_finite()
    }

    /// `x − l`, meaningful only where the lower bound is finite.
    pub(super) fn lower_slack(&self, x: &[f64], i: usize) -> f64 {
        x[i] - self.lower[i]
    }

    /// `u − x`, meaningful only where the upper bound is finite.
    pub(super) fn upper_slack(&self, x: &[f64], i: usize) -> f64 {
        self.upper[i] - x[i]
    }

    /// Moves `x` strictly inside the bounds.
    pub(super) fn push_interior(&self, x: &mut [f64]) {
        for (i, xi) in x.iter_mut().enumerate() {
            let (l, u) = (self.lower[i], self.upper[i]);
            let width = u - l;
            if l.is_finite() {
                let push = (PUSH * l.abs().max(1.0)).min(PUSH * width);
                *xi = xi.max(l + push);
            }
            if u.is_finite() {
                let push = (PUSH * u.abs().max(1.0)).min(PUSH * width);
                *xi = xi.min(u - push);
            }
        }
    }

    /// `−Σ ln(x − l) − Σ ln(u − x)`, infinite outside the interior.
    pub(super) fn log_barrier(&self, x: &[f64]) -> f64 {
        let mut value = 0.0;
        for i in 0..x.len() {
            for (present, slack) in [
                (self.has_lower(i), self.lower_slack(x, i)),
                (self.has_upper(i), self.upper_slack(x, i)),
            ] {
                if present {
                    if slack <= 0.0 {
                        return f64::INFINITY;
                    }
                    value -= slack.ln();
                }
            }
        }
        value
    }

    /// Largest `α ∈ (0, 1]` keeping every slack above `(1 − τ)` times its value.
    pub(super) fn max_step(&self, x: &[f64], dx: &[f64], tau: f64) -> f64 {
        let mut alpha: f64 = 1.0;
        for (i, &d) in dx.iter().enumerate() {
            if self.has_lower(i) && d < 0.0 {
                alpha = alpha.min(-tau * self.lower_slack(x, i) / d);
            }
            if self.has_upper(i) && d > 0.0 {
                alpha = alpha.min(tau * self.upper_slack(x, i) / d);
            }
        }
        alpha
    }
}

/// Largest `α ∈ (0, 1]` keeping every `z + α dz` above `(1 − τ) z`.
pub(super) fn max_dual_step(z: &[f64], dz: &[f64], tau: f64) -> f64 {
    z.iter()
        .zip(dz)
        .filter(|&(&zi, &di)| zi > 0.0 && di < 0.0)
        .fold(1.0, |alpha: f64, (&zi, &di)| alpha.min(-tau * zi / di))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn push_moves_points_inside() {
        let lower = [0.0, f64::NEG_INFINITY, 0.0];
        let upper = [f64::INFINITY, 10.0, 1.0];
        let bounds = Bounds::new(&lower, &upper);

        let mut x = vec![-3.0, 20.0, 1.0];
        bounds.push_interior(&mut x);

        assert_relative_eq!(x[0], 0.01);
        assert_relative_eq!(x[1], 9.9);
        assert_relative_eq!(x[2], 0.99);
    }

    #[test]
    fn fraction_to_boundary() {
        let lower = [0.0, f64::NEG_INFINITY];
        let upper = [f64::INFINITY, f64::INFINITY];
        let bounds = Bounds::new(&lower, &upper);

        let alpha = bounds.max_step(&[1.0, 0.0], &[-2.0, -100.0], 0.99);

        assert_relative_eq!(alpha, 0.495);
        assert_relative_eq!(max_dual_step(&[1.0, 2.0], &[-4.0, 1.0], 0.9), 0.225);
    }

    #[test]
    fn barrier_is_infinite_outside() {
        let lower = [0.0];
        let upper = [1.0];
        let bounds = Bounds::new(&lower, &upper);

        assert_relative_eq!(bounds.log_barrier(&[0.5]), -2.0 * 0.5_f64.ln());
        assert!(bounds.log_barrier(&[1.5]).is_infinite());
    }
}
