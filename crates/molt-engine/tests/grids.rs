//! Multi-grid stepping across stream pools.

use std::sync::Arc;

use molt_core::{BufferRole, SimulationClock};
use molt_engine::{MolStepper, StepperConfig};
use molt_grid::GridData;
use molt_test_utils::{line_grid, ConstantRhs, LinearRhs, RecordingRhs};
use proptest::prelude::*;

fn run(states: &[Vec<f64>], ids: &[u32], streams: usize, steps: usize) -> Vec<Vec<f64>> {
    let mut cfg = StepperConfig::new(LinearRhs::new(-1.3));
    cfg.stream_pool_size = streams;
    let mut stepper = MolStepper::new(cfg).unwrap();
    let mut clock = SimulationClock::new(0.05).unwrap();
    let mut grids: Vec<GridData> = ids
        .iter()
        .zip(states)
        .map(|(&id, s)| line_grid(id, s))
        .collect();
    stepper.validate_grids(&grids).unwrap();
    for _ in 0..steps {
        stepper.step(&mut clock, &mut grids).unwrap();
    }
    grids
        .iter()
        .map(|g| g.functions().buffer(BufferRole::State).to_vec())
        .collect()
}

fn bits(v: &[Vec<f64>]) -> Vec<Vec<u64>> {
    v.iter()
        .map(|s| s.iter().map(|x| x.to_bits()).collect())
        .collect()
}

#[test]
fn stage_barrier_orders_rhs_calls() {
    let rhs = Arc::new(RecordingRhs::new(ConstantRhs::new(1.0)));
    let mut cfg = StepperConfig::new(Arc::clone(&rhs));
    cfg.stream_pool_size = 4;
    let mut stepper = MolStepper::new(cfg).unwrap();
    let mut clock = SimulationClock::new(0.1).unwrap();
    let mut grids: Vec<GridData> = (0..8).map(|id| line_grid(id, &[0.0; 64])).collect();

    let report = stepper.step(&mut clock, &mut grids).unwrap();

    let calls = rhs.calls();
    assert_eq!(calls.len(), 16);
    let (first, second) = calls.split_at(8);
    assert!(first.iter().all(|c| c.stage == 1));
    assert!(second.iter().all(|c| c.stage == 2));
    for call in &calls {
        assert_eq!(call.stream, call.grid.0 as usize % 4);
    }
    assert_eq!(report.metrics.streams_used, 4);
}

#[test]
fn more_streams_than_grids() {
    let states = vec![vec![1.0, 2.0], vec![3.0]];
    let single = run(&states, &[0, 1], 1, 3);
    let wide = run(&states, &[0, 1], 16, 3);
    assert_eq!(bits(&single), bits(&wide));
}

#[test]
fn empty_grid_set_still_advances_time() {
    let mut stepper = MolStepper::new(StepperConfig::new(ConstantRhs::new(1.0))).unwrap();
    let mut clock = SimulationClock::new(0.25).unwrap();
    let report = stepper.step(&mut clock, &mut []).unwrap();
    assert_eq!(report.iteration, 1);
    assert_eq!(report.time, 0.25);
    assert_eq!(report.metrics.launches, 0);
    assert_eq!(report.metrics.streams_used, 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn grids_evolve_independently(
        states in prop::collection::vec(prop::collection::vec(-5.0f64..5.0, 1..40), 1..6),
        streams in 1usize..5,
    ) {
        let ids: Vec<u32> = (0..states.len() as u32).collect();
        let together = run(&states, &ids, streams, 2);
        for (i, state) in states.iter().enumerate() {
            let alone = run(std::slice::from_ref(state), &[ids[i]], 1, 2);
            prop_assert_eq!(bits(&alone[..1]), bits(&together[i..=i]));
        }
    }
}
