//! Work decomposition and the stage launcher.

use molt_core::{DispatchError, DispatchErrorKind, Stage};
use molt_grid::GridDescriptor;

use crate::stream::{StageCall, StreamPool};

/// A 1-D launch: `blocks` blocks of `block_size` threads covering
/// `total` elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaunchConfig {
    total: usize,
    block_size: usize,
    blocks: usize,
}

impl LaunchConfig {
    /// Threads per block used when none is configured.
    pub const DEFAULT_BLOCK_SIZE: usize = 32;
    /// Largest accepted block size.
    pub const MAX_BLOCK_SIZE: usize = 1024;
    /// Largest accepted block count.
    pub const MAX_BLOCKS: usize = i32::MAX as usize;

    /// Cover `total` elements with blocks of `block_size`.
    ///
    /// Rejects zero work, block sizes outside `1..=1024`, and grids of
    /// more than `2^31 - 1` blocks.
    pub fn new(total: usize, block_size: usize) -> Result<Self, DispatchErrorKind> {
        if total == 0 {
            return Err(DispatchErrorKind::InvalidLaunch {
                reason: "zero elements to cover".into(),
            });
        }
        if block_size == 0 || block_size > Self::MAX_BLOCK_SIZE {
            return Err(DispatchErrorKind::InvalidLaunch {
                reason: format!(
                    "block size {block_size} outside 1..={}",
                    Self::MAX_BLOCK_SIZE
                ),
            });
        }
        let blocks = total.div_ceil(block_size);
        if blocks > Self::MAX_BLOCKS {
            return Err(DispatchErrorKind::InvalidLaunch {
                reason: format!("{blocks} blocks exceeds {}", Self::MAX_BLOCKS),
            });
        }
        Ok(Self {
            total,
            block_size,
            blocks,
        })
    }

    /// Launch covering every (point, field) pair of a grid.
    pub fn for_grid(
        descriptor: &GridDescriptor,
        fields: usize,
        block_size: usize,
    ) -> Result<Self, DispatchErrorKind> {
        let total = descriptor.points().checked_mul(fields).ok_or_else(|| {
            DispatchErrorKind::InvalidLaunch {
                reason: "element count overflows usize".into(),
            }
        })?;
        Self::new(total, block_size)
    }

    /// Elements covered.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Threads per block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks.
    pub fn blocks(&self) -> usize {
        self.blocks
    }
}

/// Computes a grid's launch configuration and dispatches its stage kernel
/// on the grid's stream.
///
/// The launcher does no numeric work and does not wait for the kernel to
/// finish; failures surface either here (an unlaunchable configuration)
/// or at the next stream fence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageLauncher {
    block_size: usize,
}

impl Default for StageLauncher {
    fn default() -> Self {
        Self {
            block_size: LaunchConfig::DEFAULT_BLOCK_SIZE,
        }
    }
}

impl StageLauncher {
    /// A launcher using `block_size` threads per block.
    pub fn new(block_size: usize) -> Self {
        Self { block_size }
    }

    /// Threads per block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Dispatch `stage`'s kernel for the grid in `slot`.
    pub fn launch(
        &self,
        pool: &mut StreamPool<'_>,
        slot: usize,
        stage: &Stage,
        call: StageCall,
    ) -> Result<LaunchConfig, DispatchError> {
        let descriptor = pool.descriptor(slot);
        let grid = descriptor.id();
        let launch = LaunchConfig::for_grid(descriptor, pool.field_count(slot), self.block_size)
            .map_err(|kind| DispatchError {
                kernel: stage.kernel_name(),
                stage: stage.number(),
                grid,
                kind,
            })?;
        tracing::trace!(
            kernel = stage.kernel_name(),
            grid = grid.0,
            stream = pool.stream_of(slot).0,
            blocks = launch.blocks(),
            block_size = launch.block_size(),
            "launch"
        );
        pool.launch(slot, stage, call, launch)?;
        Ok(launch)
    }
}
