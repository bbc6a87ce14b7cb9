use crate::BuildError;

/// Largest supported number of Gauss points per direction.
pub const MAX_POINTS: usize = 6;

/// Gauss–Legendre abscissae and weights on `[-1, 1]`, non-negative half only.
///
/// Entry `n - 1` holds the rule with `n` points. A zero abscissa appears once.
const TABLE: [&[(f64, f64)]; MAX_POINTS] = [
    &[(0.0, 2.0)],
    &[(0.577_350_269_189_625_8, 1.0)],
    &[
        (0.0, 0.888_888_888_888_888_9),
        (0.774_596_669_241_483_4, 0.555_555_555_555_555_6),
    ],
    &[
        (0.339_981_043_584_856_3, 0.652_145_154_862_546_1),
        (0.861_136_311_594_052_6, 0.347_854_845_137_453_8),
    ],
    &[
        (0.0, 0.568_888_888_888_888_9),
        (0.538_469_310_105_683_1, 0.478_628_670_499_366_5),
        (0.906_179_845_938_664_0, 0.236_926_885_056_189_1),
    ],
    &[
        (0.238_619_186_083_196_9, 0.467_913_934_572_691_0),
        (0.661_209_386_466_264_5, 0.360_761_573_048_138_6),
        (0.932_469_514_203_152_1, 0.171_324_492_379_170_4),
    ],
];

/// A one-dimensional Gauss–Legendre rule mapped to the unit interval `[0, 1]`.
///
/// An `n`-point rule integrates polynomials of degree `2n - 1` exactly.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GaussLegendre {
    points: Vec<f64>,
    weights: Vec<f64>,
}

impl GaussLegendre {
    /// Creates the `n`-point rule.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidQuadrature`] unless `1 <= n <= MAX_POINTS`.
    pub(crate) fn new(n: usize) -> Result<Self, BuildError> {
        if n == 0 || n > MAX_POINTS {
            return Err(BuildError::InvalidQuadrature {
                points: n,
                max: MAX_POINTS,
            });
        }

        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);
        for &(node, weight) in TABLE[n - 1] {
            pairs.push((node, weight));
            if node != 0.0 {
                pairs.push((-node, weight));
            }
        }
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (points, weights) = pairs
            .into_iter()
            .map(|(node, weight)| (0.5 * (node + 1.0), 0.5 * weight))
            .unzip();

        Ok(Self { points, weights })
    }

    /// The smallest rule that integrates a product of two order-`p` bases
    /// and one extra order-`p` factor exactly, capped at [`MAX_POINTS`].
    pub(crate) fn points_for_order(order: usize) -> usize {
        (order + 2).min(MAX_POINTS)
    }

    pub(crate) fn points(&self) -> &[f64] {
        &self.points
    }

    pub(crate) fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub(crate) fn len(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn weights_sum_to_interval_length() {
        for n in 1..=MAX_POINTS {
            let rule = GaussLegendre::new(n).unwrap();
            assert_eq!(rule.len(), n);
            assert_relative_eq!(rule.weights().iter().sum::<f64>(), 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn points_are_sorted_inside_unit_interval() {
        for n in 1..=MAX_POINTS {
            let rule = GaussLegendre::new(n).unwrap();
            assert!(rule.points().windows(2).all(|w| w[0] < w[1]));
            assert!(rule.points().iter().all(|&t| t > 0.0 && t < 1.0));
        }
    }

    #[test]
    fn exact_for_degree_two_n_minus_one() {
        for n in 1..=MAX_POINTS {
            let rule = GaussLegendre::new(n).unwrap();
            for degree in 0..2 * n {
                let exponent = i32::try_from(degree).unwrap();
                let approx: f64 = rule
                    .points()
                    .iter()
                    .zip(rule.weights())
                    .map(|(t, w)| w * t.powi(exponent))
                    .sum();
                let exact = 1.0 / (degree as f64 + 1.0);
                assert_relative_eq!(approx, exact, epsilon = 1e-13);
            }
        }
    }

    #[test]
    fn out_of_range_sizes_are_rejected() {
        assert_eq!(
            GaussLegendre::new(0),
            Err(BuildError::InvalidQuadrature {
                points: 0,
                max: MAX_POINTS
            })
        );
        assert!(GaussLegendre::new(MAX_POINTS + 1).is_err());
    }
}
