//! Criterion benchmarks for the fused stage kernels alone.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use molt_core::{BufferRole, StagePlan};
use molt_device::{run_stage_kernel, LaunchConfig};
use molt_grid::GridFunctionSet;

const POINTS: usize = 1 << 20;

fn bench_heun_kernels(c: &mut Criterion) {
    let plan = StagePlan::heun();
    let mut functions = GridFunctionSet::new(POINTS, 1).unwrap();
    let state: Vec<f64> = (0..POINTS).map(|i| (i as f64).sin()).collect();
    functions.set_state(&state).unwrap();

    let mut group = c.benchmark_group("heun_kernels_1m");
    group.throughput(Throughput::Elements(POINTS as u64));
    for block in [32, 256, 1024] {
        let launch = LaunchConfig::new(POINTS, block).unwrap();
        for stage in plan.stages() {
            group.bench_with_input(
                BenchmarkId::new(stage.kernel_name(), block),
                &launch,
                |b, launch| {
                    b.iter(|| {
                        let buffers = functions.stage_buffers(stage.rhs_output).unwrap();
                        run_stage_kernel(stage.kernel, 1e-3, launch, buffers).unwrap();
                        black_box(functions.buffer(BufferRole::State)[0]);
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_heun_kernels);
criterion_main!(benches);
