//! Collaborator traits for the molt stepper.
//!
//! The stepper owns no physics. It calls an [`RhsEvaluator`] once per
//! stage per grid and, depending on the grid's boundary condition, a
//! [`BoundaryEnforcer`] after the RHS or after the stage update. Both are
//! handed a [`StageContext`] describing the grid, the stage, and the
//! working time.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod context;
pub mod finite;
pub mod rhs;

pub use boundary::{BoundaryEnforcer, NoBoundary};
pub use context::StageContext;
pub use finite::check_finite;
pub use rhs::RhsEvaluator;
