use std::convert::Infallible;

use approx::assert_relative_eq;
use pdecon_core::{Counters, EvalKind, NlsModel, Status};

use super::{Action, Config, Error, Event, solve, solve_unobserved};

/// Rosenbrock's function as residuals: `F = [10(x₂ − x₁²), 1 − x₁]`.
struct Rosenbrock {
    x0: Vec<f64>,
    counters: Counters,
}

impl Rosenbrock {
    fn new() -> Self {
        Self {
            x0: vec![-1.2, 1.0],
            counters: Counters::new(),
        }
    }
}

impl NlsModel for Rosenbrock {
    type Error = Infallible;

    fn nvar(&self) -> usize {
        2
    }

    fn nequ(&self) -> usize {
        2
    }

    fn x0(&self) -> &[f64] {
        &self.x0
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn residual(&self, x: &[f64], r: &mut [f64]) -> Result<(), Infallible> {
        self.counters.record(EvalKind::Residual);
        r[0] = 10.0 * (x[1] - x[0] * x[0]);
        r[1] = 1.0 - x[0];
        Ok(())
    }

    fn jprod_residual(&self, x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<(), Infallible> {
        self.counters.record(EvalKind::JprodResidual);
        jv[0] = -20.0 * x[0] * v[0] + 10.0 * v[1];
        jv[1] = -v[0];
        Ok(())
    }

    fn jtprod_residual(&self, x: &[f64], w: &[f64], jtw: &mut [f64]) -> Result<(), Infallible> {
        self.counters.record(EvalKind::JtprodResidual);
        jtw[0] = -20.0 * x[0] * w[0] - w[1];
        jtw[1] = 10.0 * w[0];
        Ok(())
    }
}

/// An underdetermined linear system `x₁ + x₂ + x₃ = 3`, `x₁ − x₃ = 1`.
struct Underdetermined {
    x0: Vec<f64>,
    counters: Counters,
}

impl NlsModel for Underdetermined {
    type Error = Infallible;

    fn nvar(&self) -> usize {
        3
    }

    fn nequ(&self) -> usize {
        2
    }

    fn x0(&self) -> &[f64] {
        &self.x0
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }

    fn residual(&self, x: &[f64], r: &mut [f64]) -> Result<(), Infallible> {
        r[0] = x[0] + x[1] + x[2] - 3.0;
        r[1] = x[0] - x[2] - 1.0;
        Ok(())
    }

    fn jprod_residual(&self, _x: &[f64], v: &[f64], jv: &mut [f64]) -> Result<(), Infallible> {
        jv[0] = v[0] + v[1] + v[2];
        jv[1] = v[0] - v[2];
        Ok(())
    }

    fn jtprod_residual(&self, _x: &[f64], w: &[f64], jtw: &mut [f64]) -> Result<(), Infallible> {
        jtw[0] = w[0] + w[1];
        jtw[1] = w[0];
        jtw[2] = w[0] - w[1];
        Ok(())
    }
}

#[test]
fn solves_rosenbrock() {
    let model = Rosenbrock::new();
    let solution = solve_unobserved(&model, model.x0(), &Config::default()).unwrap();

    assert_eq!(solution.status, Status::FirstOrder);
    assert_relative_eq!(solution.x[0], 1.0, epsilon = 1e-6);
    assert_relative_eq!(solution.x[1], 1.0, epsilon = 1e-6);
    assert!(solution.residual_norm < solution.initial_residual_norm);
}

#[test]
fn finds_minimum_norm_correction_for_linear_system() {
    let model = Underdetermined {
        x0: vec![0.0; 3],
        counters: Counters::new(),
    };
    let config = Config::new(50, 1e-12, 0.0)
        .unwrap()
        .with_radius(10.0, 1e-14)
        .unwrap();
    let solution = solve_unobserved(&model, &[0.0; 3], &config).unwrap();

    assert_eq!(solution.status, Status::FirstOrder);
    assert!(solution.residual_norm <= 1e-12);
    // From the origin, CGLS stays in range(Jᵀ) and finds the minimum-norm solution.
    assert_relative_eq!(solution.x[0], 1.5, epsilon = 1e-10);
    assert_relative_eq!(solution.x[1], 1.0, epsilon = 1e-10);
    assert_relative_eq!(solution.x[2], 0.5, epsilon = 1e-10);
}

#[test]
fn residual_norm_never_increases() {
    let model = Rosenbrock::new();
    let mut norms = vec![];
    let observer = |event: &Event<'_>| {
        norms.push(event.residual_norm);
        None
    };

    let solution = solve(&model, model.x0(), &Config::default(), observer).unwrap();

    assert!(!norms.is_empty());
    assert!(norms.windows(2).all(|w| w[1] <= w[0]));
    assert!(solution.residual_norm <= solution.initial_residual_norm);
}

#[test]
fn observer_can_stop_early() {
    let model = Rosenbrock::new();
    let observer = |_: &Event<'_>| Some(Action::StopEarly);

    let solution = solve(&model, model.x0(), &Config::default(), observer).unwrap();

    assert_eq!(solution.status, Status::StoppedByObserver);
    assert_eq!(solution.iters, 1);
}

#[test]
fn iteration_limit_is_reported() {
    let model = Rosenbrock::new();
    let config = Config::new(1, 0.0, 0.0).unwrap();

    let solution = solve_unobserved(&model, model.x0(), &config).unwrap();

    assert_eq!(solution.status, Status::MaxIters);
    assert_eq!(solution.iters, 1);
}

#[test]
fn evaluations_are_counted() {
    let model = Rosenbrock::new();
    let solution = solve_unobserved(&model, model.x0(), &Config::default()).unwrap();

    assert!(solution.counters.residual > solution.iters);
    assert!(solution.counters.jprod_residual > 0);
    assert!(solution.counters.jtprod_residual > 0);
}

#[test]
fn wrong_initial_point_is_an_error() {
    let model = Rosenbrock::new();
    let result = solve_unobserved(&model, &[0.0; 3], &Config::default());

    assert!(matches!(
        result,
        Err(Error::InitialPoint {
            expected: 2,
            found: 3
        })
    ));
}

#[test]
fn config_rejects_bad_values() {
    use super::ConfigError;

    assert_eq!(Config::new(10, -1.0, 0.0), Err(ConfigError::Atol));
    assert_eq!(Config::new(10, 0.0, f64::NAN), Err(ConfigError::Rtol));
    assert_eq!(
        Config::default().with_radius(1.0, 2.0),
        Err(ConfigError::MinRadius)
    );
    assert_eq!(Config::default().with_cg(1.5, 10), Err(ConfigError::CgRtol));
}
