//! Stepper configuration, validation, and error types.
//!
//! [`StepperConfig`] is the builder input for a
//! [`MolStepper`](crate::MolStepper). [`validate()`](StepperConfig::validate)
//! checks structural invariants once, at construction; the scheme and the
//! boundary tag are resolved there too, never per step.

use std::error::Error;
use std::fmt;

use molt_core::{ButcherTableau, InvalidTimestep, SchemeError};
use molt_device::LaunchConfig;
use molt_grid::GridError;
use molt_operator::{BoundaryEnforcer, NoBoundary, RhsEvaluator};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building a stepper or validating its grids.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The Runge-Kutta scheme is unknown, malformed, or not diagonal.
    Scheme(SchemeError),
    /// A grid failed validation (ConfigurationMismatch).
    Grid(GridError),
    /// The timestep is not finite and positive.
    InvalidTimestep {
        /// The rejected value.
        dt: f64,
    },
    /// The stream pool is empty.
    ZeroStreams,
    /// The launch block size is outside `1..=1024`.
    InvalidBlockSize {
        /// The configured value.
        value: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheme(e) => write!(f, "scheme: {e}"),
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::InvalidTimestep { dt } => {
                write!(f, "dt must be finite and positive, got {dt}")
            }
            Self::ZeroStreams => write!(f, "stream_pool_size must be at least 1"),
            Self::InvalidBlockSize { value } => write!(
                f,
                "block_size {value} outside 1..={}",
                LaunchConfig::MAX_BLOCK_SIZE
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Scheme(e) => Some(e),
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SchemeError> for ConfigError {
    fn from(e: SchemeError) -> Self {
        Self::Scheme(e)
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<InvalidTimestep> for ConfigError {
    fn from(e: InvalidTimestep) -> Self {
        Self::InvalidTimestep { dt: e.dt }
    }
}

// ── StepperConfig ──────────────────────────────────────────────────

/// Everything a [`MolStepper`](crate::MolStepper) needs, consumed at
/// construction.
pub struct StepperConfig {
    /// Runge-Kutta tableau. Must be diagonal. Default: RK2 Heun.
    pub scheme: ButcherTableau,
    /// Number of execution streams. Grid `g` runs on stream
    /// `g mod stream_pool_size`. Default: 1.
    pub stream_pool_size: usize,
    /// Threads per kernel block. Default: 32.
    pub block_size: usize,
    /// Run-wide outer boundary type. When set, it is resolved once and
    /// overrides every grid descriptor's own boundary condition.
    /// Default: `None` (each grid's descriptor decides).
    pub outer_bc_type: Option<String>,
    /// Scan every RHS output for NaN/infinity. Default: false.
    pub check_finite: bool,
    /// The spatial RHS.
    pub rhs: Box<dyn RhsEvaluator>,
    /// The boundary enforcer. Default: [`NoBoundary`].
    pub boundary: Box<dyn BoundaryEnforcer>,
}

impl StepperConfig {
    /// Defaults around `rhs`.
    pub fn new(rhs: impl RhsEvaluator) -> Self {
        Self {
            scheme: ButcherTableau::heun(),
            stream_pool_size: 1,
            block_size: LaunchConfig::DEFAULT_BLOCK_SIZE,
            outer_bc_type: None,
            check_finite: false,
            rhs: Box::new(rhs),
            boundary: Box::new(NoBoundary),
        }
    }

    /// Replace the boundary enforcer.
    pub fn with_boundary(mut self, boundary: impl BoundaryEnforcer) -> Self {
        self.boundary = Box::new(boundary);
        self
    }

    /// Check structural invariants.
    ///
    /// Called automatically by [`MolStepper::new()`](crate::MolStepper::new).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream_pool_size == 0 {
            return Err(ConfigError::ZeroStreams);
        }
        if self.block_size == 0 || self.block_size > LaunchConfig::MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize {
                value: self.block_size,
            });
        }
        if !self.scheme.is_diagonal() {
            return Err(ConfigError::Scheme(SchemeError::NotDiagonal {
                name: self.scheme.name().to_string(),
            }));
        }
        Ok(())
    }
}

impl fmt::Debug for StepperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepperConfig")
            .field("scheme", &self.scheme.name())
            .field("stream_pool_size", &self.stream_pool_size)
            .field("block_size", &self.block_size)
            .field("outer_bc_type", &self.outer_bc_type)
            .field("check_finite", &self.check_finite)
            .field("rhs", &self.rhs.name())
            .field("boundary", &self.boundary.name())
            .finish()
    }
}
