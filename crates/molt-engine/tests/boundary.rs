//! Which boundary hook runs, when, and on which buffer.

use std::sync::Arc;

use molt_core::{BoundaryCondition, BufferRole, GridId, SimulationClock};
use molt_engine::{MolStepper, StepperConfig};
use molt_test_utils::{line_grid_with_boundary, ConstantRhs, CountingBoundary, RecordingRhs};

fn stepper_with(boundary: &Arc<CountingBoundary>, rate: f64) -> MolStepper {
    let cfg = StepperConfig::new(ConstantRhs::new(rate)).with_boundary(Arc::clone(boundary));
    MolStepper::new(cfg).unwrap()
}

#[test]
fn unrecognised_tag_makes_no_boundary_calls() {
    let boundary = Arc::new(CountingBoundary::new());
    let mut stepper = stepper_with(&boundary, 2.0);
    let mut clock = SimulationClock::new(0.1).unwrap();
    let mut grids = vec![line_grid_with_boundary(
        0,
        &[1.0],
        BoundaryCondition::from_tag("periodic"),
    )];

    let report = stepper.step(&mut clock, &mut grids).unwrap();

    assert_eq!(boundary.applies(), 0);
    assert_eq!(boundary.radiation_applies(), 0);
    assert_eq!(report.metrics.boundary_applications, 0);
    let y = grids[0].functions().buffer(BufferRole::State)[0];
    assert!((y - 1.2).abs() < 1e-15);
}

#[test]
fn extrapolation_runs_after_every_stage() {
    let boundary = Arc::new(CountingBoundary::new());
    let mut stepper = stepper_with(&boundary, 0.0);
    let mut clock = SimulationClock::new(0.1).unwrap();
    let mut grids = vec![
        line_grid_with_boundary(0, &[0.0], BoundaryCondition::Extrapolation),
        line_grid_with_boundary(1, &[0.0], BoundaryCondition::Extrapolation),
    ];

    stepper.step(&mut clock, &mut grids).unwrap();
    stepper.step(&mut clock, &mut grids).unwrap();

    assert_eq!(boundary.applies(), 8);
    assert_eq!(boundary.radiation_applies(), 0);
    let mut applied = boundary.applied();
    applied.sort_unstable_by_key(|&(grid, stage)| (grid, stage));
    assert_eq!(
        applied,
        vec![
            (GridId(0), 1),
            (GridId(0), 1),
            (GridId(0), 2),
            (GridId(0), 2),
            (GridId(1), 1),
            (GridId(1), 1),
            (GridId(1), 2),
            (GridId(1), 2),
        ]
    );
}

#[test]
fn extrapolation_corrects_predictor_then_new_state() {
    let boundary = Arc::new(CountingBoundary::with_marker(-7.0));
    let rhs = Arc::new(RecordingRhs::new(ConstantRhs::new(2.0)));
    let cfg = StepperConfig::new(Arc::clone(&rhs)).with_boundary(Arc::clone(&boundary));
    let mut stepper = MolStepper::new(cfg).unwrap();
    let mut clock = SimulationClock::new(0.1).unwrap();
    let mut grids = vec![line_grid_with_boundary(
        0,
        &[1.0, 1.0],
        BoundaryCondition::Extrapolation,
    )];

    stepper.step(&mut clock, &mut grids).unwrap();

    let calls = rhs.calls();
    assert_eq!(calls[0].input, vec![1.0, 1.0]);
    // The stage-2 RHS sees the corrected predictor.
    assert_eq!(calls[1].input, vec![-7.0, 0.1f64.mul_add(2.0, 1.0)]);
    let y = grids[0].functions().buffer(BufferRole::State);
    assert_eq!(y[0], -7.0);
    assert!((y[1] - 1.2).abs() < 1e-15);
}

#[test]
fn radiation_corrects_each_rhs_output() {
    let boundary = Arc::new(CountingBoundary::with_marker(10.0));
    let mut stepper = stepper_with(&boundary, 2.0);
    let mut clock = SimulationClock::new(0.1).unwrap();
    let mut grids = vec![line_grid_with_boundary(
        0,
        &[1.0, 1.0],
        BoundaryCondition::Radiation,
    )];

    let report = stepper.step(&mut clock, &mut grids).unwrap();

    assert_eq!(boundary.radiation_applies(), 2);
    assert_eq!(boundary.applies(), 0);
    assert_eq!(report.metrics.radiation_applications, 2);
    // Both rates at point 0 were replaced by the marker.
    let y = grids[0].functions().buffer(BufferRole::State);
    assert!((y[0] - 2.0).abs() < 1e-14, "y[0] = {}", y[0]);
    assert!((y[1] - 1.2).abs() < 1e-15, "y[1] = {}", y[1]);
}

#[test]
fn run_wide_tag_overrides_every_grid() {
    let boundary = Arc::new(CountingBoundary::new());
    let mut cfg = StepperConfig::new(ConstantRhs::new(0.0)).with_boundary(Arc::clone(&boundary));
    cfg.outer_bc_type = Some("Radiation".into());
    let mut stepper = MolStepper::new(cfg).unwrap();
    let mut clock = SimulationClock::new(0.1).unwrap();
    let mut grids = vec![
        line_grid_with_boundary(0, &[0.0], BoundaryCondition::Extrapolation),
        line_grid_with_boundary(1, &[0.0], BoundaryCondition::from_tag("outflow")),
    ];

    stepper.step(&mut clock, &mut grids).unwrap();

    assert_eq!(boundary.applies(), 0);
    assert_eq!(boundary.radiation_applies(), 4);
}

#[test]
fn tag_case_does_not_matter() {
    let boundary = Arc::new(CountingBoundary::new());
    let mut cfg = StepperConfig::new(ConstantRhs::new(0.0)).with_boundary(Arc::clone(&boundary));
    cfg.outer_bc_type = Some("EXTRAPOLATION".into());
    let mut stepper = MolStepper::new(cfg).unwrap();
    let mut clock = SimulationClock::new(0.1).unwrap();
    let mut grids = vec![line_grid_with_boundary(
        0,
        &[0.0],
        BoundaryCondition::from_tag("none"),
    )];

    stepper.step(&mut clock, &mut grids).unwrap();

    assert_eq!(boundary.applies(), 2);
}
