//! Stub boundary enforcers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use molt_core::{EvalError, GridId};
use molt_operator::{BoundaryEnforcer, StageContext};

/// Counts calls and optionally stamps a marker into element 0 of every
/// buffer it touches.
#[derive(Default)]
pub struct CountingBoundary {
    marker: Option<f64>,
    applies: AtomicUsize,
    radiation: AtomicUsize,
    log: Mutex<Vec<(GridId, usize)>>,
}

impl CountingBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` into element 0 of each corrected buffer.
    pub fn with_marker(value: f64) -> Self {
        Self {
            marker: Some(value),
            ..Self::default()
        }
    }

    /// Calls to [`BoundaryEnforcer::apply`].
    pub fn applies(&self) -> usize {
        self.applies.load(Ordering::Relaxed)
    }

    /// Calls to [`BoundaryEnforcer::apply_radiation`].
    pub fn radiation_applies(&self) -> usize {
        self.radiation.load(Ordering::Relaxed)
    }

    /// `(grid, stage)` of every `apply()` call, in completion order.
    pub fn applied(&self) -> Vec<(GridId, usize)> {
        self.log.lock().expect("boundary log lock").clone()
    }

    fn stamp(&self, buffer: &mut [f64]) {
        if let (Some(value), Some(first)) = (self.marker, buffer.first_mut()) {
            *first = value;
        }
    }
}

impl BoundaryEnforcer for CountingBoundary {
    fn name(&self) -> &str {
        "counting"
    }

    fn apply(&self, ctx: &StageContext<'_>, state: &mut [f64]) -> Result<(), EvalError> {
        self.applies.fetch_add(1, Ordering::Relaxed);
        self.log
            .lock()
            .expect("boundary log lock")
            .push((ctx.descriptor().id(), ctx.stage()));
        self.stamp(state);
        Ok(())
    }

    fn apply_radiation(
        &self,
        _ctx: &StageContext<'_>,
        _input: &[f64],
        rhs: &mut [f64],
    ) -> Result<(), EvalError> {
        self.radiation.fetch_add(1, Ordering::Relaxed);
        self.stamp(rhs);
        Ok(())
    }
}

/// Fails every call.
#[derive(Default)]
pub struct FailingBoundary;

impl BoundaryEnforcer for FailingBoundary {
    fn name(&self) -> &str {
        "failing"
    }

    fn apply(&self, _ctx: &StageContext<'_>, _state: &mut [f64]) -> Result<(), EvalError> {
        Err(EvalError::ExecutionFailed {
            reason: "deliberate boundary failure".into(),
        })
    }

    fn apply_radiation(
        &self,
        _ctx: &StageContext<'_>,
        _input: &[f64],
        _rhs: &mut [f64],
    ) -> Result<(), EvalError> {
        Err(EvalError::ExecutionFailed {
            reason: "deliberate radiation failure".into(),
        })
    }
}
