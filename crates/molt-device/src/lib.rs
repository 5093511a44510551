//! Execution streams and stage kernels for the molt stepper.
//!
//! This crate stands in for an accelerator runtime:
//!
//! - a [`StreamPool`] of in-order execution streams, one worker thread
//!   per stream, each exclusively owning the buffers of the grids bound
//!   to it (`stream = grid_id mod pool_size`);
//! - a per-stream [`DeviceParams`] slot written by parameter sync and
//!   checked by every launch;
//! - a [`StageLauncher`] that turns a grid's point count into a
//!   [`LaunchConfig`] and dispatches the stage kernel without waiting;
//! - the elementwise stage kernels themselves, run block-parallel on
//!   rayon.
//!
//! Operations issued to one stream execute in issue order. Operations on
//! different streams run concurrently. Nothing here takes a lock.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod kernel;
pub mod launch;
pub mod params;
pub mod stream;

pub use kernel::run_stage_kernel;
pub use launch::{LaunchConfig, StageLauncher};
pub use params::DeviceParams;
pub use stream::{Collaborators, StageCall, StreamOp, StreamPool};
