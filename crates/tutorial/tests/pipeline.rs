use approx::assert_relative_eq;
use pdecon_core::NlpModel;
use pdecon_observers::History;
use pdecon_tutorial::{
    Backend, Comparison, Experiment, ExperimentConfig, Stage, build_model, initialize,
    initialize_from, run_solver,
};

fn small(cells: usize) -> ExperimentConfig {
    ExperimentConfig {
        cells: [cells, cells],
        ..ExperimentConfig::default()
    }
}

#[test]
fn reference_mesh_has_two_fields_of_interior_nodes() {
    let model = build_model(&ExperimentConfig::default()).unwrap();

    assert_eq!(model.nvar(), 19602);
    assert_eq!(model.ncon(), 9801);
}

#[test]
fn variable_count_is_the_sum_of_field_dofs() {
    for (cells, order) in [(4, 1), (4, 2), (7, 3)] {
        let config = ExperimentConfig {
            state_order: order,
            control_order: order,
            ..small(cells)
        };
        let model = build_model(&config).unwrap();

        let per_axis = order * cells - 1;
        assert_eq!(model.state().num_dofs() + model.control().num_dofs(), model.nvar());
        assert_eq!(model.nvar(), 2 * per_axis * per_axis);
    }
}

#[test]
fn feasibility_phase_never_increases_violation() {
    let config = small(10);
    let model = build_model(&config).unwrap();
    let settings = config.least_squares().unwrap();

    let mut history = History::new();
    let first = initialize(&model, &settings, &mut history).unwrap();

    assert!(first.initial_violation > 0.0);
    assert!(first.final_violation <= first.initial_violation);
    assert!(history.primal_feas_non_increasing());

    let second = initialize_from(&model, &first.point, &settings, ()).unwrap();

    assert_relative_eq!(
        second.initial_violation,
        first.final_violation,
        max_relative = 1e-10,
        epsilon = 1e-14
    );
    assert!(second.final_violation <= second.initial_violation);
}

#[test]
fn counters_cover_a_single_run() {
    let config = small(8);
    let model = build_model(&config).unwrap();
    let start = initialize(&model, &config.least_squares().unwrap(), ()).unwrap();

    let ipm = run_solver(&model, &start.point, Backend::InteriorPoint, &config, ()).unwrap();
    assert!(ipm.counters.hess > 0);
    assert_eq!(ipm.counters.jprod, 0);
    assert_eq!(ipm.counters.jtprod, 0);
    assert_eq!(ipm.counters.hprod, 0);

    let al = run_solver(&model, &start.point, Backend::AugmentedLagrangian, &config, ()).unwrap();
    assert_eq!(al.counters.hess, 0);
    assert_eq!(al.counters.jac, 0);
    assert!(al.counters.hprod > 0);
    assert_eq!(model.counters().snapshot(), al.counters);
}

#[test]
fn both_backends_agree_on_a_small_mesh() {
    let config = small(16);

    let report = Experiment::run(&config, |_| ()).unwrap();
    let comparison = &report.comparison;

    assert_eq!(report.nvar, 2 * 15 * 15);
    assert_eq!(comparison.rows().len(), 2);
    for row in comparison.rows() {
        assert!(row.status.is_converged(), "{}: {}", row.solver, row.status);
        assert!(row.objective > 0.0);
    }
    assert!(comparison.all_feasible(1e-4));
    assert!(comparison.max_relative_objective_gap() < 0.01);

    assert_eq!(report.fields.len(), 2);
    for field in &report.fields {
        assert!(field.state > 0.0 && field.state.is_finite(), "{field:?}");
        assert!(field.control > 0.0 && field.control.is_finite(), "{field:?}");
    }
    let (a, b) = (&report.fields[0], &report.fields[1]);
    assert!((a.state - b.state).abs() <= 0.05 * a.state.max(b.state));
}

#[test]
fn observer_factory_sees_every_stage() {
    let config = ExperimentConfig {
        backends: vec![Backend::AugmentedLagrangian],
        ..small(6)
    };
    let mut stages = Vec::new();

    let report = Experiment::run(&config, |stage| {
        stages.push(stage);
    })
    .unwrap();

    assert_eq!(
        stages,
        vec![Stage::Feasibility, Stage::Solve(Backend::AugmentedLagrangian)]
    );
    assert_eq!(report.comparison.rows()[0].solver, "augmented-lagrangian");
}

#[test]
fn report_renders_as_text_and_json() {
    let config = ExperimentConfig {
        backends: vec![Backend::InteriorPoint],
        ..small(6)
    };

    let report = Experiment::run(&config, |_| ()).unwrap();

    let text = report.to_string();
    assert!(text.contains("6x6 cells"));
    assert!(text.contains("interior-point"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["nvar"], 50);
    assert_eq!(json["comparison"]["rows"][0]["solver"], "interior-point");
}

#[test]
fn linear_state_equation_is_solved_in_few_iterations() {
    let config = ExperimentConfig {
        reaction: 0.0,
        backends: vec![Backend::InteriorPoint],
        ..small(8)
    };
    let model = build_model(&config).unwrap();
    let start = initialize(&model, &config.least_squares().unwrap(), ()).unwrap();

    let stats = run_solver(&model, &start.point, Backend::InteriorPoint, &config, ()).unwrap();

    assert!(stats.is_converged(), "{}", stats.status);
    assert!(stats.iterations <= 5);
    assert!(stats.primal_feas < 1e-6);
}

#[test]
fn invalid_configuration_stops_the_pipeline() {
    let config = ExperimentConfig {
        alpha: 0.0,
        ..small(4)
    };

    assert!(Experiment::run(&config, |_| ()).is_err());
}

#[test]
fn comparison_needs_at_least_one_run() {
    assert!(Comparison::new(&[]).is_err());
}
