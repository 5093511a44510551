//! Molt: method-of-lines Runge-Kutta time stepping over independent grids.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Molt sub-crates. For most users, adding `molt` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use molt::prelude::*;
//!
//! // dy/dt = -y, pointwise.
//! struct Decay;
//! impl RhsEvaluator for Decay {
//!     fn name(&self) -> &str { "decay" }
//!     fn evaluate(
//!         &self,
//!         _ctx: &StageContext<'_>,
//!         input: &[f64],
//!         output: &mut [f64],
//!     ) -> Result<(), EvalError> {
//!         for (o, &y) in output.iter_mut().zip(input) {
//!             *o = -y;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! // An 8×8×8 grid with two ghost zones and one field, all ones.
//! let desc = GridDescriptor::new(GridId(0), [8, 8, 8], 2).unwrap();
//! let mut grid = GridData::new(desc, 1).unwrap();
//! let ones = vec![1.0; grid.functions().len()];
//! grid.functions_mut().set_state(&ones).unwrap();
//! let mut grids = vec![grid];
//!
//! let mut stepper = MolStepper::new(StepperConfig::new(Decay)).unwrap();
//! stepper.validate_grids(&grids).unwrap();
//! let mut clock = SimulationClock::new(0.1).unwrap();
//! let report = stepper.step(&mut clock, &mut grids).unwrap();
//!
//! assert_eq!(report.iteration, 1);
//! let y = grids[0].functions().buffer(BufferRole::State)[0];
//! assert!((y - 0.905).abs() < 1e-12);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `molt-core` | IDs, clock, tableaus, stage plans, boundary tags, errors |
//! | [`grid`] | `molt-grid` | Grid descriptors and the four-buffer function sets |
//! | [`operator`] | `molt-operator` | RHS and boundary collaborator traits |
//! | [`device`] | `molt-device` | Stage kernels, launcher, stream pool |
//! | [`engine`] | `molt-engine` | The step orchestrator and its configuration |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`molt-core`).
///
/// Grid and stream ids, [`types::SimulationClock`], Butcher tableaus and
/// the compiled [`types::StagePlan`], boundary tags, and the error types
/// shared by every layer.
pub use molt_core as types;

/// Grid geometry and storage (`molt-grid`).
///
/// [`grid::GridDescriptor`] describes a grid; [`grid::GridFunctionSet`]
/// holds its state and the three scratch buffers.
pub use molt_grid as grid;

/// Collaborator traits (`molt-operator`).
///
/// Implement [`operator::RhsEvaluator`] for the spatial right-hand side and
/// [`operator::BoundaryEnforcer`] for boundary corrections.
pub use molt_operator as operator;

/// Stage kernels and execution streams (`molt-device`).
pub use molt_device as device;

/// The step orchestrator (`molt-engine`).
pub use molt_engine as engine;

/// Common imports for typical Molt usage.
///
/// ```rust
/// use molt::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use molt_core::{
        BoundaryCondition, BufferRole, ButcherTableau, GridId, SimulationClock, StagePlan,
    };

    // Errors
    pub use molt_core::{DispatchError, EvalError, SchemeError, StepError};

    // Grids
    pub use molt_grid::{GridData, GridDescriptor, GridError, GridFunctionSet};

    // Collaborators
    pub use molt_operator::{BoundaryEnforcer, NoBoundary, RhsEvaluator, StageContext};

    // Engine
    pub use molt_engine::{ConfigError, MolStepper, StepMetrics, StepReport, StepperConfig};
}
