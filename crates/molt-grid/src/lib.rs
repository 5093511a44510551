//! Grid descriptors and grid-function buffer sets.
//!
//! Each grid (patch) is described by an immutable [`GridDescriptor`] and
//! owns a [`GridFunctionSet`]: four same-shaped `f64` buffers, one per
//! [`BufferRole`](molt_core::BufferRole), each holding one value per
//! (point, evolved field) pair.
//!
//! # Layout
//!
//! Buffers are field-major: field `gf` at flat point `p` lives at index
//! `p + points * gf`, where `points` counts ghost zones on every axis.
//!
//! ```text
//! GridData
//! ├── GridDescriptor  (id, interior dims, ghosts, spacing, boundary tag)
//! └── GridFunctionSet
//!     ├── y_n                      [points × fields]
//!     ├── k_odd  (StageA)          [points × fields]
//!     ├── k_even (StageB)          [points × fields]
//!     └── y_nplus1_running_total   [points × fields]
//! ```
//!
//! Buffers are allocated here, by grid setup, never by the stepper.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod descriptor;
pub mod error;
pub mod functions;

pub use descriptor::GridDescriptor;
pub use error::GridError;
pub use functions::{GridFunctionSet, StageBuffers};

/// A grid's descriptor together with its buffers.
#[derive(Clone, Debug)]
pub struct GridData {
    descriptor: GridDescriptor,
    functions: GridFunctionSet,
}

impl GridData {
    /// Allocate zeroed buffers for `fields` evolved fields on `descriptor`.
    pub fn new(descriptor: GridDescriptor, fields: usize) -> Result<Self, GridError> {
        let functions = GridFunctionSet::new(descriptor.points(), fields)?;
        Ok(Self {
            descriptor,
            functions,
        })
    }

    /// Pair a descriptor with existing buffers, checking their shape.
    pub fn from_parts(
        descriptor: GridDescriptor,
        functions: GridFunctionSet,
    ) -> Result<Self, GridError> {
        functions.validate_against(&descriptor)?;
        Ok(Self {
            descriptor,
            functions,
        })
    }

    /// The grid's descriptor.
    pub fn descriptor(&self) -> &GridDescriptor {
        &self.descriptor
    }

    /// The grid's buffers.
    pub fn functions(&self) -> &GridFunctionSet {
        &self.functions
    }

    /// Mutable access to the grid's buffers (e.g. to set initial data).
    pub fn functions_mut(&mut self) -> &mut GridFunctionSet {
        &mut self.functions
    }

    /// Borrow the descriptor and the buffers separately.
    pub fn split_mut(&mut self) -> (&GridDescriptor, &mut GridFunctionSet) {
        (&self.descriptor, &mut self.functions)
    }
}
