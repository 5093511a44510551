//! Error types for the molt time-integration engine.
//!
//! Organized by subsystem: collaborator evaluation (RHS and boundary
//! operators), kernel dispatch, and the step orchestrator. No error is
//! recovered inside a step; every variant here aborts the step it
//! occurred in.

use std::error::Error;
use std::fmt;

use crate::id::{GridId, StreamIndex};

/// Errors reported by an external collaborator (RHS evaluator or
/// boundary enforcer).
#[derive(Clone, Debug, PartialEq)]
pub enum EvalError {
    /// The collaborator failed to produce its output.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A non-finite value was detected in the collaborator's output.
    NanDetected {
        /// Field slot containing the NaN.
        field: usize,
        /// Flat point index of the first NaN, if known.
        point: Option<usize>,
    },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::NanDetected { field, point } => {
                write!(f, "NaN detected in field {field}")?;
                if let Some(idx) = point {
                    write!(f, " at point {idx}")?;
                }
                Ok(())
            }
        }
    }
}

impl Error for EvalError {}

/// Why a kernel dispatch was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchErrorKind {
    /// The work decomposition is not launchable (zero work, block size
    /// out of range, too many blocks).
    InvalidLaunch {
        /// Description of the offending dimension.
        reason: String,
    },
    /// The stream's parameter slot does not hold this grid's parameters;
    /// the parameter sync was skipped or issued to another stream.
    StaleParams {
        /// Grid the kernel was launched for.
        expected: GridId,
        /// Grid whose parameters the slot holds, if any.
        found: Option<GridId>,
    },
    /// The launch covers a different number of elements than the
    /// buffers it targets.
    BufferMismatch {
        /// Elements covered by the launch.
        expected: usize,
        /// Elements in the target buffer.
        actual: usize,
    },
    /// The stream worker died before draining its queue.
    StreamLost {
        /// The stream that was lost.
        stream: StreamIndex,
    },
}

impl fmt::Display for DispatchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLaunch { reason } => write!(f, "invalid launch: {reason}"),
            Self::StaleParams { expected, found } => match found {
                Some(found) => write!(
                    f,
                    "stream parameters belong to grid {found}, expected grid {expected}"
                ),
                None => write!(f, "stream parameters never synced for grid {expected}"),
            },
            Self::BufferMismatch { expected, actual } => write!(
                f,
                "launch covers {expected} elements but buffer holds {actual}"
            ),
            Self::StreamLost { stream } => write!(f, "stream {stream} lost"),
        }
    }
}

/// A kernel launch failed (DispatchFailure).
///
/// Always identifies the kernel, the stage, and the grid, so the fatal
/// diagnostic names exactly which launch broke the step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchError {
    /// Name of the kernel that failed, e.g. `rk_substep_2`.
    pub kernel: &'static str,
    /// 1-based stage number.
    pub stage: usize,
    /// Grid the kernel was launched for.
    pub grid: GridId,
    /// What went wrong.
    pub kind: DispatchErrorKind,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "kernel '{}' (stage {}) failed on grid {}: {}",
            self.kernel, self.stage, self.grid, self.kind
        )
    }
}

impl Error for DispatchError {}

/// Errors from the step orchestrator.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// A kernel launch failed.
    Dispatch(DispatchError),
    /// The RHS evaluator failed.
    RhsFailed {
        /// Grid being evaluated.
        grid: GridId,
        /// 1-based stage number.
        stage: usize,
        /// The underlying collaborator error.
        reason: EvalError,
    },
    /// The boundary enforcer failed.
    BoundaryFailed {
        /// Grid being corrected.
        grid: GridId,
        /// 1-based stage number.
        stage: usize,
        /// The underlying collaborator error.
        reason: EvalError,
    },
    /// A previous step failed; grid state is undefined and the stepper
    /// refuses to advance it further.
    Poisoned,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatch(e) => write!(f, "dispatch failure: {e}"),
            Self::RhsFailed {
                grid,
                stage,
                reason,
            } => write!(f, "RHS evaluation failed on grid {grid} (stage {stage}): {reason}"),
            Self::BoundaryFailed {
                grid,
                stage,
                reason,
            } => write!(
                f,
                "boundary enforcement failed on grid {grid} (stage {stage}): {reason}"
            ),
            Self::Poisoned => write!(f, "stepper poisoned by an earlier failed step"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Dispatch(e) => Some(e),
            Self::RhsFailed { reason, .. } | Self::BoundaryFailed { reason, .. } => Some(reason),
            Self::Poisoned => None,
        }
    }
}

impl From<DispatchError> for StepError {
    fn from(e: DispatchError) -> Self {
        Self::Dispatch(e)
    }
}
