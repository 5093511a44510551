//! The method-of-lines step orchestrator.
//!
//! [`MolStepper`] owns the compiled stage plan and the collaborators, and
//! borrows the clock and the grids for the duration of one
//! [`step()`](MolStepper::step).
//!
//! # Failure
//!
//! No error is recovered inside a step. When any sync, RHS evaluation,
//! kernel launch, or boundary call fails, the step returns the error, the
//! clock is put back to the step-start time with its iteration count
//! unchanged, and the stepper is poisoned: the grid buffers are in an
//! undefined, partially updated state and every later `step()` returns
//! [`StepError::Poisoned`].

use std::num::NonZeroUsize;
use std::time::Instant;

use indexmap::IndexSet;

use molt_core::{BoundaryCondition, SimulationClock, StagePlan, StepError};
use molt_device::{Collaborators, StageCall, StageLauncher, StreamPool};
use molt_grid::{GridData, GridError};
use molt_operator::{BoundaryEnforcer, RhsEvaluator};

use crate::config::{ConfigError, StepperConfig};
use crate::metrics::{StepMetrics, StepReport};

// ── StepPhase ────────────────────────────────────────────────────

/// Where the stepper's per-call state machine stands.
///
/// Each `step()` walks `AwaitingStage(1) → … → AwaitingStage(s) →
/// Complete`. After a failed step the phase stays at the stage that
/// failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepPhase {
    /// Stage `n` (1-based) has not finished on every grid.
    AwaitingStage(usize),
    /// Every stage finished and the clock was advanced.
    Complete,
}

// ── MolStepper ───────────────────────────────────────────────────

/// Advances a set of grids by one Runge-Kutta step per call.
pub struct MolStepper {
    plan: StagePlan,
    rhs: Box<dyn RhsEvaluator>,
    boundary: Box<dyn BoundaryEnforcer>,
    outer_boundary: Option<BoundaryCondition>,
    streams: NonZeroUsize,
    launcher: StageLauncher,
    check_finite: bool,
    phase: StepPhase,
    poisoned: bool,
    last_metrics: StepMetrics,
}

impl MolStepper {
    /// Build a stepper from a validated configuration.
    ///
    /// Compiles the tableau into a stage plan and resolves the run-wide
    /// boundary tag, if any. Consumes the config.
    pub fn new(config: StepperConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let plan = StagePlan::from_tableau(&config.scheme)?;
        let streams = NonZeroUsize::new(config.stream_pool_size).ok_or(ConfigError::ZeroStreams)?;
        let outer_boundary = config
            .outer_bc_type
            .as_deref()
            .map(BoundaryCondition::from_tag);
        if let Some(BoundaryCondition::Other(tag)) = &outer_boundary {
            tracing::warn!(tag = %tag, "unrecognised outer_bc_type, boundary calls skipped");
        }
        tracing::debug!(
            scheme = plan.name(),
            stages = plan.len(),
            streams = streams.get(),
            block_size = config.block_size,
            rhs = config.rhs.name(),
            boundary = config.boundary.name(),
            "stepper built"
        );
        Ok(Self {
            plan,
            rhs: config.rhs,
            boundary: config.boundary,
            outer_boundary,
            streams,
            launcher: StageLauncher::new(config.block_size),
            check_finite: config.check_finite,
            phase: StepPhase::AwaitingStage(1),
            poisoned: false,
            last_metrics: StepMetrics::default(),
        })
    }

    /// The compiled stage plan.
    pub fn plan(&self) -> &StagePlan {
        &self.plan
    }

    /// Configured number of streams.
    pub fn stream_pool_size(&self) -> usize {
        self.streams.get()
    }

    /// Current phase of the per-call state machine.
    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    /// Whether a failed step has poisoned the stepper.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Metrics of the most recent successful step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// The boundary condition `step()` applies to `grid`.
    pub fn boundary_for<'a>(&'a self, grid: &'a GridData) -> &'a BoundaryCondition {
        self.outer_boundary
            .as_ref()
            .unwrap_or_else(|| grid.descriptor().boundary())
    }

    /// One-time ConfigurationMismatch check for a set of grids.
    ///
    /// Verifies every grid's buffers against its descriptor, that grid ids
    /// are unique, and that all grids evolve the same number of fields.
    /// `step()` does not repeat these checks.
    pub fn validate_grids(&self, grids: &[GridData]) -> Result<(), ConfigError> {
        let mut seen = IndexSet::with_capacity(grids.len());
        let fields = grids.first().map(|g| g.functions().field_count());
        for grid in grids {
            let id = grid.descriptor().id();
            grid.functions().validate_against(grid.descriptor())?;
            if !seen.insert(id) {
                return Err(GridError::DuplicateGridId { id }.into());
            }
            let actual = grid.functions().field_count();
            if let Some(expected) = fields.filter(|&n| n != actual) {
                return Err(GridError::FieldCountMismatch {
                    id,
                    expected,
                    actual,
                }
                .into());
            }
            if let BoundaryCondition::Other(tag) = self.boundary_for(grid) {
                tracing::warn!(grid = id.0, tag = %tag, "unrecognised boundary tag, boundary calls skipped");
            }
        }
        Ok(())
    }

    /// Advance every grid by one step of `clock.dt()`.
    ///
    /// On success the clock reads `time == iteration * dt` with the
    /// iteration count incremented by one.
    pub fn step(
        &mut self,
        clock: &mut SimulationClock,
        grids: &mut [GridData],
    ) -> Result<StepReport, StepError> {
        if self.poisoned {
            return Err(StepError::Poisoned);
        }
        let started = Instant::now();
        let time_start = clock.time();
        let iteration = clock.iteration();
        tracing::debug!(
            iteration,
            time = time_start,
            dt = clock.dt(),
            grids = grids.len(),
            "step"
        );

        match self.run_stages(clock, grids) {
            Ok(mut metrics) => {
                clock.complete_step();
                self.phase = StepPhase::Complete;
                metrics.total_us = started.elapsed().as_micros() as u64;
                self.last_metrics = metrics.clone();
                Ok(StepReport {
                    iteration: clock.iteration(),
                    time: clock.time(),
                    metrics,
                })
            }
            Err(e) => {
                clock.set_working_time(time_start);
                self.poisoned = true;
                tracing::error!(iteration, error = %e, "step failed, stepper poisoned");
                Err(e)
            }
        }
    }

    fn run_stages(
        &mut self,
        clock: &mut SimulationClock,
        grids: &mut [GridData],
    ) -> Result<StepMetrics, StepError> {
        let time_start = clock.time();
        let dt = clock.dt();
        let collaborators = Collaborators {
            rhs: &*self.rhs,
            boundary: &*self.boundary,
            check_finite: self.check_finite,
        };
        let plan = &self.plan;
        let launcher = self.launcher;
        let streams = self.streams;
        let outer = self.outer_boundary.as_ref();
        let phase = &mut self.phase;

        std::thread::scope(|scope| -> Result<StepMetrics, StepError> {
            let mut pool = StreamPool::spawn(scope, streams, grids, collaborators);
            let mut metrics = StepMetrics {
                streams_used: pool.streams_used(),
                ..StepMetrics::default()
            };

            for stage in plan.stages() {
                *phase = StepPhase::AwaitingStage(stage.number());
                let stage_start = Instant::now();
                let time = time_start + stage.c * dt;
                clock.set_working_time(time);
                let call = StageCall::new(stage, time, dt);
                tracing::trace!(stage = stage.number(), kernel = stage.kernel_name(), time, "stage");

                for slot in 0..pool.grid_count() {
                    let policy = outer
                        .unwrap_or_else(|| pool.descriptor(slot).boundary())
                        .policy();
                    pool.sync_params(slot, call)?;
                    pool.evaluate_rhs(slot, stage, call)?;
                    metrics.rhs_evaluations += 1;
                    if policy.after_rhs() {
                        pool.apply_radiation(slot, stage, call)?;
                        metrics.radiation_applications += 1;
                    }
                    launcher.launch(&mut pool, slot, stage, call)?;
                    metrics.launches += 1;
                    if policy.after_stage() {
                        pool.apply_boundary(slot, stage, call)?;
                        metrics.boundary_applications += 1;
                    }
                }

                pool.fence(stage)?;
                metrics.stage_us.push(stage_start.elapsed().as_micros() as u64);
            }
            Ok(metrics)
        })
    }
}

impl std::fmt::Debug for MolStepper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MolStepper")
            .field("scheme", &self.plan.name())
            .field("streams", &self.streams)
            .field("launcher", &self.launcher)
            .field("outer_boundary", &self.outer_boundary)
            .field("phase", &self.phase)
            .field("poisoned", &self.poisoned)
            .finish()
    }
}
