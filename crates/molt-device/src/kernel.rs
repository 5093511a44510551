//! The elementwise stage kernels.
//!
//! One kernel per stage of a diagonal Runge-Kutta plan. Every multiply-add
//! that feeds a state value goes through [`f64::mul_add`], so results are
//! rounded once per fused operation. For Heun's method:
//!
//! ```text
//! rk_substep_1:  total = (dt/2) * k1;   k1 = fma(dt, k1, y_n)
//! rk_substep_2:  y_n   = total + fma(dt/2, k2, y_n)
//! ```

use molt_core::{DispatchErrorKind, StageKernel};
use molt_grid::StageBuffers;
use rayon::prelude::*;

use crate::launch::LaunchConfig;

/// Run `kernel` over the buffers of one grid, one rayon task per block.
///
/// Coefficients are scaled by `dt` once, before the launch. All three
/// buffers must hold exactly `launch.total()` elements.
pub fn run_stage_kernel(
    kernel: StageKernel,
    dt: f64,
    launch: &LaunchConfig,
    buffers: StageBuffers<'_>,
) -> Result<(), DispatchErrorKind> {
    let StageBuffers {
        state,
        stage,
        total,
    } = buffers;
    for len in [state.len(), stage.len(), total.len()] {
        if len != launch.total() {
            return Err(DispatchErrorKind::BufferMismatch {
                expected: launch.total(),
                actual: len,
            });
        }
    }

    let block = launch.block_size();
    let blocks = state
        .par_chunks_mut(block)
        .zip(stage.par_chunks_mut(block))
        .zip(total.par_chunks_mut(block));

    match kernel {
        StageKernel::Single { b } => {
            let b_dt = b * dt;
            blocks.for_each(|((y, k), _)| {
                for (y, &k) in y.iter_mut().zip(k.iter()) {
                    *y = b_dt.mul_add(k, *y);
                }
            });
        }
        StageKernel::First { b, a_next } => {
            let b_dt = b * dt;
            let a_dt = a_next * dt;
            blocks.for_each(|((y, k), t)| {
                for ((&y, k), t) in y.iter().zip(k.iter_mut()).zip(t.iter_mut()) {
                    *t = b_dt * *k;
                    *k = a_dt.mul_add(*k, y);
                }
            });
        }
        StageKernel::Intermediate { b, a_next } => {
            let b_dt = b * dt;
            let a_dt = a_next * dt;
            blocks.for_each(|((y, k), t)| {
                for ((&y, k), t) in y.iter().zip(k.iter_mut()).zip(t.iter_mut()) {
                    *t = b_dt.mul_add(*k, *t);
                    *k = a_dt.mul_add(*k, y);
                }
            });
        }
        StageKernel::Final { b } => {
            let b_dt = b * dt;
            blocks.for_each(|((y, k), t)| {
                for ((y, &k), &t) in y.iter_mut().zip(k.iter()).zip(t.iter()) {
                    *y = t + b_dt.mul_add(k, *y);
                }
            });
        }
    }
    Ok(())
}
