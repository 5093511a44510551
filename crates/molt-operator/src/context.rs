//! Call context handed to collaborators during a stage.
//!
//! [`StageContext`] carries the read-only, stage-global values a
//! collaborator may need: the grid's descriptor (dimensions, ghosts,
//! spacing, boundary tag), the working time, the timestep, the stage
//! number, and the stream the call is running on.

use std::ops::Range;

use molt_core::StreamIndex;
use molt_grid::GridDescriptor;

/// Execution context passed to [`RhsEvaluator`](crate::RhsEvaluator) and
/// [`BoundaryEnforcer`](crate::BoundaryEnforcer) calls.
#[derive(Clone, Copy, Debug)]
pub struct StageContext<'a> {
    descriptor: &'a GridDescriptor,
    time: f64,
    dt: f64,
    stage: usize,
    stream: StreamIndex,
    fields: usize,
}

impl<'a> StageContext<'a> {
    /// Construct a stage context.
    ///
    /// Typically called by the stepper; tests construct one directly to
    /// drive a collaborator in isolation.
    pub fn new(
        descriptor: &'a GridDescriptor,
        time: f64,
        dt: f64,
        stage: usize,
        stream: StreamIndex,
        fields: usize,
    ) -> Self {
        Self {
            descriptor,
            time,
            dt,
            stage,
            stream,
            fields,
        }
    }

    /// The grid being advanced.
    pub fn descriptor(&self) -> &'a GridDescriptor {
        self.descriptor
    }

    /// Working time of this stage: `time_start + c_i * dt`.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Timestep of the current step.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// 1-based stage number.
    pub fn stage(&self) -> usize {
        self.stage
    }

    /// Stream this call is ordered on.
    pub fn stream(&self) -> StreamIndex {
        self.stream
    }

    /// Number of evolved fields in each buffer.
    pub fn field_count(&self) -> usize {
        self.fields
    }

    /// Points per field, ghosts included.
    pub fn points(&self) -> usize {
        self.descriptor.points()
    }

    /// Index range of field `gf` within a buffer.
    pub fn field_range(&self, gf: usize) -> Range<usize> {
        let points = self.points();
        gf * points..(gf + 1) * points
    }
}
