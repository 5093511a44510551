//! Per-step metrics.
//!
//! [`StepMetrics`] captures timing and call counts for a single step.
//! Counts are of operations issued by the controlling thread; a step that
//! fails returns no metrics.

/// Timing and call-count metrics collected during a single step.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step, in microseconds.
    pub total_us: u64,
    /// Wall-clock time of each stage, fence included, in microseconds.
    pub stage_us: Vec<u64>,
    /// Stage kernels launched.
    pub launches: u64,
    /// RHS evaluations issued.
    pub rhs_evaluations: u64,
    /// Post-stage boundary enforcements issued.
    pub boundary_applications: u64,
    /// Post-RHS radiation corrections issued.
    pub radiation_applications: u64,
    /// Streams that owned at least one grid.
    pub streams_used: usize,
}

/// Result of a successful step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// Iteration count after the step.
    pub iteration: u64,
    /// Simulation time after the step: `iteration * dt`.
    pub time: f64,
    /// Metrics for this step.
    pub metrics: StepMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert!(m.stage_us.is_empty());
        assert_eq!(m.launches, 0);
        assert_eq!(m.rhs_evaluations, 0);
        assert_eq!(m.boundary_applications, 0);
        assert_eq!(m.radiation_applications, 0);
        assert_eq!(m.streams_used, 0);
    }
}
