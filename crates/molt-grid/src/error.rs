//! Grid-setup error types.
//!
//! These are the configuration-mismatch errors: they are raised once,
//! when grids and buffers are built or validated, never during a step.

use std::error::Error;
use std::fmt;

use molt_core::{BufferRole, GridId};

/// Errors building or validating a grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// An axis has zero interior points.
    EmptyAxis {
        /// The empty axis (0, 1, or 2).
        axis: usize,
    },
    /// The point count (or points × fields) does not fit in `usize`.
    PointCountOverflow,
    /// A grid-function set with no evolved fields.
    ZeroFields,
    /// A buffer's length differs from `points × fields`.
    ShapeMismatch {
        /// The mis-sized buffer.
        role: BufferRole,
        /// Expected element count.
        expected: usize,
        /// Actual element count.
        actual: usize,
    },
    /// Two grids in one run share an id.
    DuplicateGridId {
        /// The repeated id.
        id: GridId,
    },
    /// Grids in one run evolve different numbers of fields.
    FieldCountMismatch {
        /// The grid that disagrees with the first grid.
        id: GridId,
        /// Field count of the first grid.
        expected: usize,
        /// Field count of this grid.
        actual: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAxis { axis } => write!(f, "axis {axis} has no interior points"),
            Self::PointCountOverflow => write!(f, "grid point count overflows usize"),
            Self::ZeroFields => write!(f, "grid-function set has no fields"),
            Self::ShapeMismatch {
                role,
                expected,
                actual,
            } => write!(
                f,
                "buffer {role} holds {actual} values, expected {expected}"
            ),
            Self::DuplicateGridId { id } => write!(f, "grid id {id} used more than once"),
            Self::FieldCountMismatch {
                id,
                expected,
                actual,
            } => write!(
                f,
                "grid {id} evolves {actual} fields, expected {expected}"
            ),
        }
    }
}

impl Error for GridError {}
