//! The simulation clock passed explicitly into every step.
//!
//! Time is never accumulated. During a step the orchestrator moves the
//! working time through the stage times; at the end of the step the time
//! is recomputed from the iteration count with [`time_at`], so after any
//! number of steps `time == iteration as f64 * dt` holds bit-for-bit.

use std::error::Error;
use std::fmt;

/// Simulation time after `iteration` full steps of size `dt`.
///
/// This is the only way the clock derives its end-of-step time.
pub fn time_at(iteration: u64, dt: f64) -> f64 {
    iteration as f64 * dt
}

/// The timestep is NaN, infinite, zero, or negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvalidTimestep {
    /// The rejected value.
    pub dt: f64,
}

impl fmt::Display for InvalidTimestep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dt must be finite and positive, got {}", self.dt)
    }
}

impl Error for InvalidTimestep {}

/// Time bookkeeping for a run: current time, timestep, iteration count.
///
/// Owned by the caller's run context and lent to the stepper for the
/// duration of one step.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationClock {
    time: f64,
    dt: f64,
    iteration: u64,
}

impl SimulationClock {
    /// A clock at iteration 0, time 0.
    pub fn new(dt: f64) -> Result<Self, InvalidTimestep> {
        Self::resume(0, dt)
    }

    /// A clock resumed at `iteration` (e.g. from a checkpoint).
    ///
    /// The time is derived from the iteration count, not restored.
    pub fn resume(iteration: u64, dt: f64) -> Result<Self, InvalidTimestep> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(InvalidTimestep { dt });
        }
        Ok(Self {
            time: time_at(iteration, dt),
            dt,
            iteration,
        })
    }

    /// Current (or, mid-step, working) simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Timestep. Read-only for the duration of a step.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of completed steps.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Set the working time seen by collaborators during a stage.
    pub fn set_working_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Recompute the time from the iteration count.
    ///
    /// Idempotent: calling it again without changing the iteration count
    /// leaves the clock untouched.
    pub fn recompute_time(&mut self) {
        self.time = time_at(self.iteration, self.dt);
    }

    /// Close out a full step: `time = (iteration + 1) * dt`, then bump
    /// the iteration count.
    pub fn complete_step(&mut self) {
        self.time = time_at(self.iteration + 1, self.dt);
        self.iteration += 1;
    }
}
