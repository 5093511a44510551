//! Test utilities and stub collaborators for molt development.
//!
//! Provides grid builders and stub implementations of the collaborator
//! traits ([`RhsEvaluator`](molt_operator::RhsEvaluator),
//! [`BoundaryEnforcer`](molt_operator::BoundaryEnforcer)) that record
//! how they were called.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod boundary;
pub mod rhs;

pub use boundary::{CountingBoundary, FailingBoundary};
pub use rhs::{ConstantRhs, FailingRhs, LinearRhs, RecordingRhs, RhsCall};

use molt_core::{BoundaryCondition, GridId};
use molt_grid::{GridData, GridDescriptor};

/// A ghost-free grid of `state.len()` points along axis 0 with one field,
/// initialised to `state`.
pub fn line_grid(id: u32, state: &[f64]) -> GridData {
    let desc = GridDescriptor::new(GridId(id), [state.len(), 1, 1], 0)
        .expect("non-empty test grid");
    let mut grid = GridData::new(desc, 1).expect("one field");
    grid.functions_mut()
        .set_state(state)
        .expect("state sized to the grid");
    grid
}

/// [`line_grid`] with an explicit boundary condition.
pub fn line_grid_with_boundary(id: u32, state: &[f64], boundary: BoundaryCondition) -> GridData {
    let desc = GridDescriptor::new(GridId(id), [state.len(), 1, 1], 0)
        .expect("non-empty test grid")
        .with_boundary(boundary);
    let mut grid = GridData::new(desc, 1).expect("one field");
    grid.functions_mut()
        .set_state(state)
        .expect("state sized to the grid");
    grid
}

/// A padded 3-D grid with `fields` fields whose state is `f(index)`.
pub fn padded_grid(
    id: u32,
    interior: [usize; 3],
    nghosts: usize,
    fields: usize,
    f: impl Fn(usize) -> f64,
) -> GridData {
    let desc = GridDescriptor::new(GridId(id), interior, nghosts).expect("valid test grid");
    let mut grid = GridData::new(desc, fields).expect("at least one field");
    let state: Vec<f64> = (0..grid.functions().len()).map(f).collect();
    grid.functions_mut()
        .set_state(&state)
        .expect("state sized to the grid");
    grid
}
