//! Diffusion of Gaussian bumps across several grids and streams.
//!
//! Demonstrates: build profile → validate grids → step → read metrics.
//! Set `RUST_LOG=molt_engine=debug` (or `trace`) to see the stepper's spans.

use molt_bench::{interior_sum, reference_profile, Profile};
use molt_core::SimulationClock;
use molt_engine::MolStepper;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Molt Diffusion Example ===\n");

    let Profile {
        config,
        mut grids,
        dt,
    } = reference_profile(2);
    let mut stepper = MolStepper::new(config).unwrap();
    stepper.validate_grids(&grids).unwrap();
    let mut clock = SimulationClock::new(dt).unwrap();

    let initial: Vec<f64> = grids.iter().map(|g| interior_sum(g, 0)).collect();
    println!(
        "{} grids, {} streams, scheme {}, dt={dt:.3e}",
        grids.len(),
        stepper.stream_pool_size(),
        stepper.plan().name()
    );

    for step in 0..200 {
        let report = stepper.step(&mut clock, &mut grids).unwrap();
        if step % 50 == 0 || step == 199 {
            let drift: f64 = grids
                .iter()
                .zip(&initial)
                .map(|(g, m)| (interior_sum(g, 0) - m).abs() / m)
                .fold(0.0, f64::max);
            tracing::info!(iteration = report.iteration, "checkpoint");
            println!(
                "  iter {:>4}: t={:.5}, max mass drift={drift:.2e}, launches={}, time={:>6}μs",
                report.iteration, report.time, report.metrics.launches, report.metrics.total_us,
            );
        }
    }

    println!("\nDone.");
}
