//! Strongly-typed identifiers and the [`BufferRole`] enum.

use std::fmt;

/// Identifies a computational grid (patch) within a run.
///
/// Grid ids are assigned by the grid-setup collaborator. Besides naming
/// the grid in diagnostics, the id selects the execution stream the grid
/// is bound to: `stream = id mod stream_pool_size`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridId(pub u32);

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for GridId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Index of an execution stream in the stream pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamIndex(pub usize);

impl StreamIndex {
    /// The stream a grid is bound to for a pool of `pool_size` streams.
    ///
    /// `pool_size` must be non-zero; the engine config rejects empty pools.
    pub fn for_grid(grid: GridId, pool_size: usize) -> Self {
        Self(grid.0 as usize % pool_size)
    }
}

impl fmt::Display for StreamIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role a grid-function buffer plays within one step.
///
/// Every grid owns exactly one buffer per role. The two stage buffers
/// alternate between "RHS output of this stage" and "predictor state fed
/// to the next stage's RHS"; which role a stage buffer is currently
/// playing is decided by the stage being executed, never by relabelling
/// storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BufferRole {
    /// `y_n`: authoritative state at the start of the step; overwritten
    /// with the corrected state by the final stage.
    State,
    /// Stage buffer written by even-numbered stages (stage 1, 3, ...).
    StageA,
    /// Stage buffer written by odd-numbered stages (stage 2, 4, ...).
    StageB,
    /// Weighted sum of the stage derivatives folded in so far.
    RunningTotal,
}

impl BufferRole {
    /// All roles, in storage order.
    pub const ALL: [BufferRole; 4] = [
        BufferRole::State,
        BufferRole::StageA,
        BufferRole::StageB,
        BufferRole::RunningTotal,
    ];

    /// Storage slot of this role inside a grid-function set.
    pub fn index(self) -> usize {
        match self {
            BufferRole::State => 0,
            BufferRole::StageA => 1,
            BufferRole::StageB => 2,
            BufferRole::RunningTotal => 3,
        }
    }

    /// The stage buffer that receives the RHS of stage `stage` (0-based).
    pub fn stage_output(stage: usize) -> Self {
        if stage % 2 == 0 {
            BufferRole::StageA
        } else {
            BufferRole::StageB
        }
    }

    /// Short name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            BufferRole::State => "y_n",
            BufferRole::StageA => "k_odd",
            BufferRole::StageB => "k_even",
            BufferRole::RunningTotal => "y_nplus1_running_total",
        }
    }
}

impl fmt::Display for BufferRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
