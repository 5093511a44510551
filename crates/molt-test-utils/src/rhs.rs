//! Stub RHS evaluators.
//!
//! - [`ConstantRhs`]: writes a constant rate, ignoring the state.
//! - [`LinearRhs`]: `dy/dt = lambda * y`.
//! - [`RecordingRhs`]: wraps another evaluator and records every call.
//! - [`FailingRhs`]: fails deterministically after N calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use molt_core::{EvalError, GridId};
use molt_operator::{RhsEvaluator, StageContext};

/// Writes `value` everywhere regardless of input.
pub struct ConstantRhs {
    pub value: f64,
}

impl ConstantRhs {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl RhsEvaluator for ConstantRhs {
    fn name(&self) -> &str {
        "constant"
    }

    fn evaluate(
        &self,
        _ctx: &StageContext<'_>,
        _input: &[f64],
        output: &mut [f64],
    ) -> Result<(), EvalError> {
        output.fill(self.value);
        Ok(())
    }
}

/// `dy/dt = lambda * y`, pointwise.
pub struct LinearRhs {
    pub lambda: f64,
}

impl LinearRhs {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }
}

impl RhsEvaluator for LinearRhs {
    fn name(&self) -> &str {
        "linear"
    }

    fn evaluate(
        &self,
        _ctx: &StageContext<'_>,
        input: &[f64],
        output: &mut [f64],
    ) -> Result<(), EvalError> {
        for (o, &y) in output.iter_mut().zip(input) {
            *o = self.lambda * y;
        }
        Ok(())
    }
}

/// One recorded RHS call.
#[derive(Clone, Debug, PartialEq)]
pub struct RhsCall {
    pub grid: GridId,
    pub stage: usize,
    pub time: f64,
    pub stream: usize,
    pub input: Vec<f64>,
}

/// Delegates to `inner` and records grid, stage, time, stream, and a copy
/// of the input of every call.
pub struct RecordingRhs<R> {
    inner: R,
    calls: Mutex<Vec<RhsCall>>,
}

impl<R: RhsEvaluator> RecordingRhs<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls recorded so far, in completion order.
    pub fn calls(&self) -> Vec<RhsCall> {
        self.calls.lock().expect("recording lock").clone()
    }

    /// Recorded calls for one grid, in issue order.
    pub fn calls_for(&self, grid: GridId) -> Vec<RhsCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.grid == grid)
            .collect()
    }
}

impl<R: RhsEvaluator> RhsEvaluator for RecordingRhs<R> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn evaluate(
        &self,
        ctx: &StageContext<'_>,
        input: &[f64],
        output: &mut [f64],
    ) -> Result<(), EvalError> {
        self.calls.lock().expect("recording lock").push(RhsCall {
            grid: ctx.descriptor().id(),
            stage: ctx.stage(),
            time: ctx.time(),
            stream: ctx.stream().0,
            input: input.to_vec(),
        });
        self.inner.evaluate(ctx, input, output)
    }
}

/// Succeeds `succeed_count` times, writing zeros, then fails every call.
pub struct FailingRhs {
    pub succeed_count: usize,
    call_count: AtomicUsize,
}

impl FailingRhs {
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `evaluate()` has been called.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl RhsEvaluator for FailingRhs {
    fn name(&self) -> &str {
        "failing"
    }

    fn evaluate(
        &self,
        _ctx: &StageContext<'_>,
        _input: &[f64],
        output: &mut [f64],
    ) -> Result<(), EvalError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(EvalError::ExecutionFailed {
                reason: format!(
                    "deliberate failure after {} successful calls",
                    self.succeed_count
                ),
            });
        }
        output.fill(0.0);
        Ok(())
    }
}
