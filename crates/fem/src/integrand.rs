//! Pointwise integrands of the objective and the state equation.

/// The fields evaluated at one quadrature point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldValues {
    /// Physical coordinates.
    pub x: [f64; 2],

    /// State value.
    pub y: f64,

    /// Control value.
    pub u: f64,
}

/// A pointwise function of `(y, u)` with its first and second partials.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Partials {
    pub value: f64,
    pub dy: f64,
    pub du: f64,
    pub dyy: f64,
    pub dyu: f64,
    pub duu: f64,
}

/// Objective density `j(x, y, u)`, integrated over the domain.
pub trait Objective {
    fn eval(&self, at: &FieldValues) -> Partials;
}

/// State equation in weak form, `∫ a ∇v·∇y + v g(x, y, u) dΩ = 0`.
pub trait StateEquation {
    /// Diffusion coefficient `a(x)`.
    fn diffusivity(&self, _x: [f64; 2]) -> f64 {
        1.0
    }

    /// Zeroth-order term `g(x, y, u)`.
    fn reaction(&self, at: &FieldValues) -> Partials;
}

/// Tracking-type cost `½(y − y_d(x))² + ½ α u²`.
#[derive(Debug, Clone, Copy)]
pub struct TrackingObjective<T> {
    pub target: T,
    pub alpha: f64,
}

impl<T> TrackingObjective<T>
where
    T: Fn([f64; 2]) -> f64,
{
    pub fn new(target: T, alpha: f64) -> Self {
        Self { target, alpha }
    }
}

impl<T> Objective for TrackingObjective<T>
where
    T: Fn([f64; 2]) -> f64,
{
    fn eval(&self, at: &FieldValues) -> Partials {
        let misfit = at.y - (self.target)(at.x);
        Partials {
            value: 0.5 * misfit * misfit + 0.5 * self.alpha * at.u * at.u,
            dy: misfit,
            du: self.alpha * at.u,
            dyy: 1.0,
            dyu: 0.0,
            duu: self.alpha,
        }
    }
}

/// The semilinear Poisson equation `−Δy + κ y³ = u + h(x)`.
///
/// A zero `reaction` coefficient gives the linear Poisson equation.
#[derive(Debug, Clone, Copy)]
pub struct SemilinearPoisson<H> {
    pub forcing: H,
    pub reaction: f64,
}

impl<H> SemilinearPoisson<H>
where
    H: Fn([f64; 2]) -> f64,
{
    pub fn new(forcing: H, reaction: f64) -> Self {
        Self { forcing, reaction }
    }
}

impl<H> StateEquation for SemilinearPoisson<H>
where
    H: Fn([f64; 2]) -> f64,
{
    fn reaction(&self, at: &FieldValues) -> Partials {
        let k = self.reaction;
        let y = at.y;
        Partials {
            value: k * y * y * y - at.u - (self.forcing)(at.x),
            dy: 3.0 * k * y * y,
            du: -1.0,
            dyy: 6.0 * k * y,
            dyu: 0.0,
            duu: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn check_partials(f: impl Fn(f64, f64) -> Partials, y: f64, u: f64) {
        let h = 1e-6;
        let p = f(y, u);
        let fd = |g: &dyn Fn(&Partials) -> f64, dy: f64, du: f64| {
            (g(&f(y + dy, u + du)) - g(&f(y - dy, u - du))) / (2.0 * h)
        };
        assert_relative_eq!(p.dy, fd(&|q: &Partials| q.value, h, 0.0), epsilon = 1e-6);
        assert_relative_eq!(p.du, fd(&|q: &Partials| q.value, 0.0, h), epsilon = 1e-6);
        assert_relative_eq!(p.dyy, fd(&|q: &Partials| q.dy, h, 0.0), epsilon = 1e-6);
        assert_relative_eq!(p.dyu, fd(&|q: &Partials| q.dy, 0.0, h), epsilon = 1e-6);
        assert_relative_eq!(p.duu, fd(&|q: &Partials| q.du, 0.0, h), epsilon = 1e-6);
    }

    #[test]
    fn tracking_partials_match_finite_differences() {
        let objective = TrackingObjective::new(|x: [f64; 2]| -x[0] * x[0], 0.01);
        let at = |y, u| FieldValues { x: [0.3, -0.2], y, u };
        check_partials(|y, u| objective.eval(&at(y, u)), 0.4, -1.5);

        let p = objective.eval(&at(0.0, 2.0));
        assert_relative_eq!(p.value, 0.5 * 0.09 * 0.09 + 0.02);
    }

    #[test]
    fn semilinear_partials_match_finite_differences() {
        let equation = SemilinearPoisson::new(|x: [f64; 2]| x[0] + x[1], 2.0);
        let at = |y, u| FieldValues { x: [0.5, 0.25], y, u };
        check_partials(|y, u| equation.reaction(&at(y, u)), 0.7, 0.1);
        assert_relative_eq!(equation.diffusivity([0.0, 0.0]), 1.0);
    }
}
