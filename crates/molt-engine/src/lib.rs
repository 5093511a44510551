//! Step orchestration for the molt method-of-lines integrator.
//!
//! [`MolStepper`] advances every grid by one timestep: for each stage of
//! the configured Runge-Kutta plan it issues, grid by grid, a parameter
//! sync, the RHS evaluation, the stage kernel, and any boundary call, then
//! fences all streams before the next stage begins. At the end of the
//! step the clock's time is recomputed from the iteration count.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod stepper;

pub use config::{ConfigError, StepperConfig};
pub use metrics::{StepMetrics, StepReport};
pub use stepper::{MolStepper, StepPhase};
