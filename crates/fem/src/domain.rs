use crate::BuildError;

/// An axis-aligned rectangle `[x₀, x₁] × [y₀, y₁]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    x: [f64; 2],
    y: [f64; 2],
}

impl Rectangle {
    /// Creates a rectangle from its x and y extents.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidDomain`] unless both extents are finite
    /// and strictly increasing.
    pub fn new(x: [f64; 2], y: [f64; 2]) -> Result<Self, BuildError> {
        let valid = |[lo, hi]: [f64; 2]| lo.is_finite() && hi.is_finite() && lo < hi;
        if valid(x) && valid(y) {
            Ok(Self { x, y })
        } else {
            Err(BuildError::InvalidDomain { x, y })
        }
    }

    /// A square of the given side length centered at `center`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidDomain`] if `side` is not positive and finite.
    pub fn square(side: f64, center: [f64; 2]) -> Result<Self, BuildError> {
        let half = 0.5 * side;
        Self::new(
            [center[0] - half, center[0] + half],
            [center[1] - half, center[1] + half],
        )
    }

    /// The x extent.
    #[must_use]
    pub fn x(&self) -> [f64; 2] {
        self.x
    }

    /// The y extent.
    #[must_use]
    pub fn y(&self) -> [f64; 2] {
        self.y
    }

    /// Width and height.
    #[must_use]
    pub fn size(&self) -> [f64; 2] {
        [self.x[1] - self.x[0], self.y[1] - self.y[0]]
    }

    /// Lower-left corner.
    #[must_use]
    pub fn origin(&self) -> [f64; 2] {
        [self.x[0], self.y[0]]
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        let [w, h] = self.size();
        w * h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn square_is_centered() {
        let square = Rectangle::square(2.0, [0.0, 0.0]).unwrap();

        assert_eq!(square.x(), [-1.0, 1.0]);
        assert_eq!(square.y(), [-1.0, 1.0]);
        assert_relative_eq!(square.area(), 4.0);
    }

    #[test]
    fn degenerate_extents_are_rejected() {
        assert!(Rectangle::new([0.0, 0.0], [0.0, 1.0]).is_err());
        assert!(Rectangle::new([0.0, 1.0], [1.0, 0.0]).is_err());
        assert!(Rectangle::new([0.0, f64::INFINITY], [0.0, 1.0]).is_err());
        assert!(Rectangle::square(-1.0, [0.0, 0.0]).is_err());
        assert!(Rectangle::square(f64::NAN, [0.0, 0.0]).is_err());
    }
}
