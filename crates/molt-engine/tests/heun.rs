//! End-to-end behaviour of the default two-stage Heun step.

use std::sync::Arc;

use molt_core::{BufferRole, SimulationClock};
use molt_engine::{MolStepper, StepperConfig};
use molt_test_utils::{line_grid, padded_grid, ConstantRhs, LinearRhs, RecordingRhs};
use proptest::prelude::*;

fn state(grid: &molt_grid::GridData) -> Vec<f64> {
    grid.functions().buffer(BufferRole::State).to_vec()
}

#[test]
fn constant_rate_advances_like_euler() {
    let mut stepper = MolStepper::new(StepperConfig::new(ConstantRhs::new(2.0))).unwrap();
    let mut clock = SimulationClock::new(0.1).unwrap();
    let mut grids = vec![line_grid(0, &[1.0])];

    stepper.step(&mut clock, &mut grids).unwrap();

    let y = state(&grids[0])[0];
    assert!((y - 1.2).abs() < 1e-15, "y = {y}");
    assert_eq!(clock.iteration(), 1);
}

#[test]
fn fused_evaluation_order_is_bit_exact() {
    let lambda = -0.75;
    let dt = 0.013;
    let y0: Vec<f64> = (0..37).map(|i| 1.0 + 0.1 * i as f64).collect();
    let mut stepper = MolStepper::new(StepperConfig::new(LinearRhs::new(lambda))).unwrap();
    let mut clock = SimulationClock::new(dt).unwrap();
    let mut grids = vec![line_grid(0, &y0)];

    stepper.step(&mut clock, &mut grids).unwrap();

    let reference: Vec<f64> = y0
        .iter()
        .map(|&y| {
            let k1 = lambda * y;
            let total = (0.5 * dt) * k1;
            let predictor = dt.mul_add(k1, y);
            let k2 = lambda * predictor;
            total + (0.5 * dt).mul_add(k2, y)
        })
        .collect();
    let got = state(&grids[0]);
    for (g, r) in got.iter().zip(&reference) {
        assert_eq!(g.to_bits(), r.to_bits());
    }
}

#[test]
fn stage_buffers_hold_predictor_and_corrector_rates() {
    let mut stepper = MolStepper::new(StepperConfig::new(ConstantRhs::new(2.0))).unwrap();
    let mut clock = SimulationClock::new(0.1).unwrap();
    let y0 = [1.0, -1.0, 0.25];
    let mut grids = vec![line_grid(0, &y0)];

    stepper.step(&mut clock, &mut grids).unwrap();

    let predictor: Vec<f64> = y0.iter().map(|&y| 0.1f64.mul_add(2.0, y)).collect();
    let corrected: Vec<f64> = y0.iter().map(|&y| 0.1 + 0.05f64.mul_add(2.0, y)).collect();
    assert_eq!(state(&grids[0]), corrected);
    // The first stage buffer was reused for the predictor; the second
    // still holds the raw stage-2 rate.
    assert_eq!(grids[0].functions().buffer(BufferRole::StageA), predictor.as_slice());
    assert_eq!(grids[0].functions().buffer(BufferRole::StageB), &[2.0; 3]);
}

#[test]
fn rhs_sees_stage_times_and_inputs() {
    let rhs = Arc::new(RecordingRhs::new(ConstantRhs::new(2.0)));
    let mut stepper = MolStepper::new(StepperConfig::new(Arc::clone(&rhs))).unwrap();
    let mut clock = SimulationClock::resume(4, 0.1).unwrap();
    let mut grids = vec![line_grid(0, &[1.0, 3.0])];

    stepper.step(&mut clock, &mut grids).unwrap();

    let calls = rhs.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].stage, 1);
    assert_eq!(calls[0].time, 4.0 * 0.1);
    assert_eq!(calls[0].input, vec![1.0, 3.0]);
    assert_eq!(calls[1].stage, 2);
    assert_eq!(calls[1].time, 4.0 * 0.1 + 0.1);
    assert_eq!(
        calls[1].input,
        vec![0.1f64.mul_add(2.0, 1.0), 0.1f64.mul_add(2.0, 3.0)]
    );
    assert_eq!(clock.time(), 5.0 * 0.1);
}

#[test]
fn thousand_steps_time_is_exact() {
    let mut stepper = MolStepper::new(StepperConfig::new(ConstantRhs::new(0.0))).unwrap();
    let mut clock = SimulationClock::new(0.1).unwrap();
    let mut grids = vec![line_grid(0, &[0.0])];
    for _ in 0..1000 {
        stepper.step(&mut clock, &mut grids).unwrap();
    }
    assert_eq!(clock.iteration(), 1000);
    assert_eq!(clock.time().to_bits(), (1000.0f64 * 0.1).to_bits());
}

#[test]
fn time_recompute_twice_is_a_no_op() {
    let mut stepper = MolStepper::new(StepperConfig::new(ConstantRhs::new(0.0))).unwrap();
    let mut clock = SimulationClock::new(0.1).unwrap();
    let mut grids = vec![line_grid(0, &[0.0])];
    stepper.step(&mut clock, &mut grids).unwrap();
    let after = clock.clone();
    clock.recompute_time();
    clock.recompute_time();
    assert_eq!(clock, after);
}

#[test]
fn ghost_zones_and_fields_are_all_updated() {
    let mut stepper = MolStepper::new(StepperConfig::new(ConstantRhs::new(1.0))).unwrap();
    let mut clock = SimulationClock::new(0.5).unwrap();
    let mut grids = vec![padded_grid(0, [3, 2, 2], 1, 3, |_| 0.0)];
    stepper.step(&mut clock, &mut grids).unwrap();
    let y = state(&grids[0]);
    assert_eq!(y.len(), 5 * 4 * 4 * 3);
    assert!(y.iter().all(|&v| v == 0.5));
}

proptest! {
    #[test]
    fn linear_update_factor(lambda in -4.0f64..4.0, h in 1e-4f64..0.2, y0 in -10.0f64..10.0) {
        let mut stepper = MolStepper::new(StepperConfig::new(LinearRhs::new(lambda))).unwrap();
        let mut clock = SimulationClock::new(h).unwrap();
        let mut grids = vec![line_grid(0, &[y0])];
        stepper.step(&mut clock, &mut grids).unwrap();

        let z = lambda * h;
        let exact = y0 * (1.0 + z + z * z / 2.0);
        let got = grids[0].functions().buffer(BufferRole::State)[0];
        prop_assert!((got - exact).abs() <= 1e-12 * (1.0 + exact.abs()), "{got} vs {exact}");
    }
}
