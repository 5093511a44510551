//! Core types and stage planning for the molt time-integration engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the molt workspace:
//! identifiers, buffer roles, the simulation clock, boundary-condition
//! resolution, Butcher tableaux, and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod clock;
pub mod error;
pub mod id;
pub mod plan;
pub mod tableau;

pub use boundary::{BoundaryCondition, BoundaryPolicy};
pub use clock::{time_at, InvalidTimestep, SimulationClock};
pub use error::{DispatchError, DispatchErrorKind, EvalError, StepError};
pub use id::{BufferRole, GridId, StreamIndex};
pub use plan::{Stage, StageKernel, StagePlan};
pub use tableau::{ButcherTableau, SchemeError};
