//! In-order execution streams.
//!
//! A [`StreamPool`] lives for one step inside a [`std::thread::scope`].
//! Each stream is a worker thread that exclusively borrows the buffers of
//! the grids bound to it and drains a FIFO of [`StreamOp`]s. The
//! controlling thread only enqueues; it never touches grid buffers while
//! the pool is alive.
//!
//! ```text
//!  controlling thread                 stream 0 worker       stream 1 worker
//!  ──────────────────                 ───────────────       ───────────────
//!  sync_params(g0)   ───────────────▶ params ← g0
//!  evaluate_rhs(g0)  ───────────────▶ rhs(y_n → k_odd)
//!  launch(g0)        ───────────────▶ rk_substep_1
//!  sync_params(g1)   ──────────────────────────────────────▶ params ← g1
//!  ...                                      ...                   ...
//!  fence()           ───────────────▶ reply ◀── first error  reply
//! ```
//!
//! A failed op marks its stream failed; later ops on that stream are
//! skipped until the next fence, which reports the failure.

use std::num::NonZeroUsize;
use std::thread::{Scope, ScopedJoinHandle};

use crossbeam_channel::{Receiver, Sender};
use indexmap::IndexMap;

use molt_core::{
    BufferRole, DispatchError, DispatchErrorKind, GridId, Stage, StageKernel, StepError,
    StreamIndex,
};
use molt_grid::{GridData, GridDescriptor, GridFunctionSet};
use molt_operator::{check_finite, BoundaryEnforcer, RhsEvaluator, StageContext};

use crate::kernel::run_stage_kernel;
use crate::launch::LaunchConfig;
use crate::params::DeviceParams;

/// The external collaborators a stream calls, shared by every worker.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Spatial RHS.
    pub rhs: &'a dyn RhsEvaluator,
    /// Boundary enforcer.
    pub boundary: &'a dyn BoundaryEnforcer,
    /// Scan every RHS output for non-finite values.
    pub check_finite: bool,
}

impl std::fmt::Debug for Collaborators<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("rhs", &self.rhs.name())
            .field("boundary", &self.boundary.name())
            .field("check_finite", &self.check_finite)
            .finish()
    }
}

/// Stage-global values carried by every op issued for a stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageCall {
    /// Kernel name of the stage, for diagnostics.
    pub kernel: &'static str,
    /// 1-based stage number.
    pub number: usize,
    /// Working time of the stage.
    pub time: f64,
    /// Timestep.
    pub dt: f64,
}

impl StageCall {
    /// Values for `stage` running at working time `time`.
    pub fn new(stage: &Stage, time: f64, dt: f64) -> Self {
        Self {
            kernel: stage.kernel_name(),
            number: stage.number(),
            time,
            dt,
        }
    }
}

/// A command queued on a stream. Grids are named by their slot in the
/// grid slice the pool was built from.
#[derive(Debug)]
pub enum StreamOp {
    /// Write the stream's parameter slot.
    SyncParams {
        /// Target grid slot.
        slot: usize,
        /// Parameters to install.
        params: DeviceParams,
    },
    /// Evaluate the RHS from `input` into `output`.
    EvaluateRhs {
        /// Target grid slot.
        slot: usize,
        /// Stage values.
        call: StageCall,
        /// Buffer the RHS reads.
        input: BufferRole,
        /// Buffer the RHS writes.
        output: BufferRole,
    },
    /// Apply the radiation condition to a freshly evaluated RHS.
    ApplyRadiation {
        /// Target grid slot.
        slot: usize,
        /// Stage values.
        call: StageCall,
        /// Buffer the RHS was computed from.
        input: BufferRole,
        /// RHS buffer to correct.
        output: BufferRole,
    },
    /// Run a stage kernel.
    Launch {
        /// Target grid slot.
        slot: usize,
        /// Stage values.
        call: StageCall,
        /// The update to perform.
        kernel: StageKernel,
        /// Stage buffer holding the RHS; updated in place.
        stage_buffer: BufferRole,
        /// Work decomposition.
        launch: LaunchConfig,
    },
    /// Enforce the boundary on a freshly updated buffer.
    ApplyBoundary {
        /// Target grid slot.
        slot: usize,
        /// Stage values.
        call: StageCall,
        /// Buffer to correct.
        target: BufferRole,
    },
    /// Report (and clear) the stream's failure state once every earlier
    /// op has executed.
    Fence {
        /// Reply channel.
        reply: Sender<Result<(), StepError>>,
    },
}

// ── Pool ────────────────────────────────────────────────────────

struct GridEntry<'g> {
    descriptor: &'g GridDescriptor,
    stream: StreamIndex,
    fields: usize,
}

struct StreamHandle<'scope> {
    tx: Option<Sender<StreamOp>>,
    worker: Option<ScopedJoinHandle<'scope, ()>>,
    last_grid: GridId,
}

/// A pool of in-order execution streams bound to a slice of grids.
pub struct StreamPool<'scope> {
    pool_size: usize,
    grids: Vec<GridEntry<'scope>>,
    streams: IndexMap<StreamIndex, StreamHandle<'scope>>,
}

impl<'scope> StreamPool<'scope> {
    /// Bind every grid to stream `id mod pool_size` and start one worker
    /// per stream that owns at least one grid.
    ///
    /// The workers borrow the grid buffers until the pool is dropped.
    pub fn spawn<'env>(
        scope: &'scope Scope<'scope, 'env>,
        pool_size: NonZeroUsize,
        grids: &'scope mut [GridData],
        collaborators: Collaborators<'scope>,
    ) -> Self {
        let pool_size = pool_size.get();
        let mut entries = Vec::with_capacity(grids.len());
        let mut owned: IndexMap<StreamIndex, IndexMap<usize, GridSlot<'scope>>> = IndexMap::new();
        for (slot, grid) in grids.iter_mut().enumerate() {
            let (descriptor, functions) = grid.split_mut();
            let stream = StreamIndex::for_grid(descriptor.id(), pool_size);
            entries.push(GridEntry {
                descriptor,
                stream,
                fields: functions.field_count(),
            });
            owned.entry(stream).or_default().insert(
                slot,
                GridSlot {
                    descriptor,
                    functions,
                },
            );
        }
        owned.sort_keys();

        let streams = owned
            .into_iter()
            .map(|(stream, slots)| {
                let last_grid = slots
                    .values()
                    .next()
                    .map(|s| s.descriptor.id())
                    .expect("a stream is only started for grids it owns");
                let (tx, rx) = crossbeam_channel::unbounded();
                let worker = scope.spawn(move || worker_loop(stream, rx, slots, collaborators));
                let handle = StreamHandle {
                    tx: Some(tx),
                    worker: Some(worker),
                    last_grid,
                };
                (stream, handle)
            })
            .collect();

        Self {
            pool_size,
            grids: entries,
            streams,
        }
    }

    /// Configured number of streams.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Streams with a running worker (those owning at least one grid).
    pub fn streams_used(&self) -> usize {
        self.streams.len()
    }

    /// Number of grids bound to the pool.
    pub fn grid_count(&self) -> usize {
        self.grids.len()
    }

    /// Descriptor of the grid in `slot`.
    ///
    /// # Panics
    ///
    /// If `slot` is out of range.
    pub fn descriptor(&self, slot: usize) -> &'scope GridDescriptor {
        self.grids[slot].descriptor
    }

    /// Evolved-field count of the grid in `slot`.
    pub fn field_count(&self, slot: usize) -> usize {
        self.grids[slot].fields
    }

    /// Stream the grid in `slot` is bound to.
    pub fn stream_of(&self, slot: usize) -> StreamIndex {
        self.grids[slot].stream
    }

    /// Install the grid's parameters in its stream's parameter slot.
    pub fn sync_params(&mut self, slot: usize, call: StageCall) -> Result<(), DispatchError> {
        let params = DeviceParams::from_descriptor(self.grids[slot].descriptor);
        self.submit(slot, call, StreamOp::SyncParams { slot, params })
    }

    /// Queue the RHS evaluation of `stage`.
    pub fn evaluate_rhs(
        &mut self,
        slot: usize,
        stage: &Stage,
        call: StageCall,
    ) -> Result<(), DispatchError> {
        let op = StreamOp::EvaluateRhs {
            slot,
            call,
            input: stage.rhs_input,
            output: stage.rhs_output,
        };
        self.submit(slot, call, op)
    }

    /// Queue the radiation correction of `stage`'s RHS output.
    pub fn apply_radiation(
        &mut self,
        slot: usize,
        stage: &Stage,
        call: StageCall,
    ) -> Result<(), DispatchError> {
        let op = StreamOp::ApplyRadiation {
            slot,
            call,
            input: stage.rhs_input,
            output: stage.rhs_output,
        };
        self.submit(slot, call, op)
    }

    /// Queue `stage`'s kernel. Normally reached through
    /// [`StageLauncher`](crate::StageLauncher).
    pub fn launch(
        &mut self,
        slot: usize,
        stage: &Stage,
        call: StageCall,
        launch: LaunchConfig,
    ) -> Result<(), DispatchError> {
        let op = StreamOp::Launch {
            slot,
            call,
            kernel: stage.kernel,
            stage_buffer: stage.rhs_output,
            launch,
        };
        self.submit(slot, call, op)
    }

    /// Queue boundary enforcement on `stage`'s updated buffer.
    pub fn apply_boundary(
        &mut self,
        slot: usize,
        stage: &Stage,
        call: StageCall,
    ) -> Result<(), DispatchError> {
        let op = StreamOp::ApplyBoundary {
            slot,
            call,
            target: stage.boundary_target,
        };
        self.submit(slot, call, op)
    }

    /// Wait until every stream has drained its queue.
    ///
    /// Returns the first failure in stream order. A stream whose worker
    /// is gone is reported as [`DispatchErrorKind::StreamLost`] against
    /// the last grid issued to it.
    pub fn fence(&mut self, stage: &Stage) -> Result<(), StepError> {
        let mut pending = Vec::with_capacity(self.streams.len());
        for (&stream, handle) in &self.streams {
            let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
            let sent = handle
                .tx
                .as_ref()
                .is_some_and(|tx| tx.send(StreamOp::Fence { reply: reply_tx }).is_ok());
            pending.push((stream, handle.last_grid, sent.then_some(reply_rx)));
        }

        let mut first = None;
        for (stream, grid, reply) in pending {
            let lost = || {
                StepError::Dispatch(DispatchError {
                    kernel: stage.kernel_name(),
                    stage: stage.number(),
                    grid,
                    kind: DispatchErrorKind::StreamLost { stream },
                })
            };
            let outcome = match reply {
                Some(rx) => rx.recv().unwrap_or_else(|_| Err(lost())),
                None => Err(lost()),
            };
            if let Err(e) = outcome {
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }

    fn submit(&mut self, slot: usize, call: StageCall, op: StreamOp) -> Result<(), DispatchError> {
        let entry = &self.grids[slot];
        let grid = entry.descriptor.id();
        let stream = entry.stream;
        let handle = self
            .streams
            .get_mut(&stream)
            .expect("every bound grid's stream has a worker");
        handle.last_grid = grid;
        let delivered = handle.tx.as_ref().is_some_and(|tx| tx.send(op).is_ok());
        if delivered {
            Ok(())
        } else {
            Err(DispatchError {
                kernel: call.kernel,
                stage: call.number,
                grid,
                kind: DispatchErrorKind::StreamLost { stream },
            })
        }
    }
}

impl Drop for StreamPool<'_> {
    fn drop(&mut self) {
        // Closing the channels lets each worker finish its queue and exit.
        for handle in self.streams.values_mut() {
            handle.tx.take();
        }
        for (stream, handle) in &mut self.streams {
            if let Some(worker) = handle.worker.take() {
                if worker.join().is_err() {
                    tracing::error!(stream = stream.0, "stream worker panicked");
                }
            }
        }
    }
}

// ── Worker ──────────────────────────────────────────────────────

struct GridSlot<'g> {
    descriptor: &'g GridDescriptor,
    functions: &'g mut GridFunctionSet,
}

fn worker_loop(
    stream: StreamIndex,
    ops: Receiver<StreamOp>,
    mut grids: IndexMap<usize, GridSlot<'_>>,
    collaborators: Collaborators<'_>,
) {
    let mut params: Option<DeviceParams> = None;
    let mut failed: Option<StepError> = None;
    while let Ok(op) = ops.recv() {
        if let StreamOp::Fence { reply } = op {
            let _ = reply.send(failed.take().map_or(Ok(()), Err));
            continue;
        }
        if failed.is_some() {
            continue;
        }
        if let Err(e) = execute(stream, op, &mut grids, &mut params, collaborators) {
            tracing::trace!(stream = stream.0, error = %e, "stream failed, skipping to fence");
            failed = Some(e);
        }
    }
}

fn execute(
    stream: StreamIndex,
    op: StreamOp,
    grids: &mut IndexMap<usize, GridSlot<'_>>,
    params: &mut Option<DeviceParams>,
    collaborators: Collaborators<'_>,
) -> Result<(), StepError> {
    let slot = match &op {
        StreamOp::SyncParams { params: p, .. } => {
            *params = Some(*p);
            return Ok(());
        }
        StreamOp::Fence { .. } => return Ok(()),
        StreamOp::EvaluateRhs { slot, .. }
        | StreamOp::ApplyRadiation { slot, .. }
        | StreamOp::Launch { slot, .. }
        | StreamOp::ApplyBoundary { slot, .. } => *slot,
    };
    let grid = grids
        .get_mut(&slot)
        .expect("op routed to the stream that owns its grid");
    let descriptor = grid.descriptor;
    let id = descriptor.id();
    let fields = grid.functions.field_count();
    let context = |call: &StageCall| {
        StageContext::new(descriptor, call.time, call.dt, call.number, stream, fields)
    };

    match op {
        StreamOp::EvaluateRhs {
            call,
            input,
            output,
            ..
        } => {
            let ctx = context(&call);
            let failed = |reason| StepError::RhsFailed {
                grid: id,
                stage: call.number,
                reason,
            };
            let (input, output) = grid
                .functions
                .pair(input, output)
                .expect("RHS input and output are distinct buffers");
            collaborators
                .rhs
                .evaluate(&ctx, input, output)
                .map_err(failed)?;
            if collaborators.check_finite {
                check_finite(ctx.points(), output).map_err(failed)?;
            }
            Ok(())
        }
        StreamOp::ApplyRadiation {
            call,
            input,
            output,
            ..
        } => {
            let ctx = context(&call);
            let (input, output) = grid
                .functions
                .pair(input, output)
                .expect("RHS input and output are distinct buffers");
            collaborators
                .boundary
                .apply_radiation(&ctx, input, output)
                .map_err(|reason| StepError::BoundaryFailed {
                    grid: id,
                    stage: call.number,
                    reason,
                })
        }
        StreamOp::ApplyBoundary { call, target, .. } => {
            let ctx = context(&call);
            collaborators
                .boundary
                .apply(&ctx, grid.functions.buffer_mut(target))
                .map_err(|reason| StepError::BoundaryFailed {
                    grid: id,
                    stage: call.number,
                    reason,
                })
        }
        StreamOp::Launch {
            call,
            kernel,
            stage_buffer,
            launch,
            ..
        } => {
            let dispatch = |kind| {
                StepError::Dispatch(DispatchError {
                    kernel: call.kernel,
                    stage: call.number,
                    grid: id,
                    kind,
                })
            };
            let synced = match *params {
                Some(p) if p.grid == id => p,
                other => {
                    return Err(dispatch(DispatchErrorKind::StaleParams {
                        expected: id,
                        found: other.map(|p| p.grid),
                    }))
                }
            };
            let covered = synced.points * fields;
            if launch.total() != covered {
                return Err(dispatch(DispatchErrorKind::BufferMismatch {
                    expected: launch.total(),
                    actual: covered,
                }));
            }
            let buffers = grid
                .functions
                .stage_buffers(stage_buffer)
                .expect("stage kernels update a stage buffer");
            run_stage_kernel(kernel, call.dt, &launch, buffers).map_err(dispatch)
        }
        StreamOp::SyncParams { .. } | StreamOp::Fence { .. } => Ok(()),
    }
}
