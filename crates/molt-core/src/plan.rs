//! Compiled per-stage execution plan for a diagonal Runge-Kutta scheme.
//!
//! A [`StagePlan`] fixes, for every stage, which buffer the RHS reads,
//! which buffer it writes, which update kernel runs, and which buffer the
//! boundary enforcer corrects afterwards. Four buffers per grid suffice:
//!
//! ```text
//! stage i RHS:     input  = y_n (i = 0) | stage buffer of i-1
//!                  output = StageA (i even) | StageB (i odd)
//! stage i kernel:  total  += b_i dt k         (first stage assigns)
//!                  k       = y_n + a_{i+1,i} dt k   (predictor, in place)
//! final kernel:    y_n     = total + (y_n + b_s dt k)
//! ```

use smallvec::SmallVec;

use crate::id::BufferRole;
use crate::tableau::{ButcherTableau, SchemeError};

const KERNEL_NAMES: [&str; crate::tableau::MAX_STAGES] = [
    "rk_substep_1",
    "rk_substep_2",
    "rk_substep_3",
    "rk_substep_4",
    "rk_substep_5",
    "rk_substep_6",
    "rk_substep_7",
    "rk_substep_8",
];

/// The elementwise update a stage performs, with unscaled coefficients.
///
/// The launcher multiplies each coefficient by `dt` once per launch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StageKernel {
    /// One-stage scheme: `y_n = fma(b dt, k, y_n)`.
    Single {
        /// Weight of the only stage.
        b: f64,
    },
    /// First of several stages:
    /// `total = (b dt) * k; k = fma(a_next dt, k, y_n)`.
    First {
        /// Weight of this stage.
        b: f64,
        /// Coupling of the next stage to this one.
        a_next: f64,
    },
    /// Neither first nor last:
    /// `total = fma(b dt, k, total); k = fma(a_next dt, k, y_n)`.
    Intermediate {
        /// Weight of this stage.
        b: f64,
        /// Coupling of the next stage to this one.
        a_next: f64,
    },
    /// Last of several stages: `y_n = total + fma(b dt, k, y_n)`.
    Final {
        /// Weight of this stage.
        b: f64,
    },
}

impl StageKernel {
    /// Whether this kernel writes the new authoritative state.
    pub fn finalizes(&self) -> bool {
        matches!(self, Self::Single { .. } | Self::Final { .. })
    }
}

/// One stage of a compiled plan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stage {
    /// 0-based stage index.
    pub index: usize,
    /// Node `c_i`; the stage runs at `time_start + c_i * dt`.
    pub c: f64,
    /// Buffer the RHS evaluator reads.
    pub rhs_input: BufferRole,
    /// Buffer the RHS evaluator writes (and the kernel updates in place).
    pub rhs_output: BufferRole,
    /// The update kernel.
    pub kernel: StageKernel,
    /// Buffer holding this stage's result, which the boundary enforcer
    /// corrects: the predictor for the next stage, or `y_n` at the end.
    pub boundary_target: BufferRole,
}

impl Stage {
    /// 1-based stage number, as used in diagnostics.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Kernel name, as used in diagnostics.
    pub fn kernel_name(&self) -> &'static str {
        KERNEL_NAMES[self.index]
    }
}

/// Compiled stage sequence for one scheme.
#[derive(Clone, Debug, PartialEq)]
pub struct StagePlan {
    name: String,
    stages: SmallVec<[Stage; 4]>,
}

impl StagePlan {
    /// Compile a tableau into a stage plan.
    ///
    /// Fails with [`SchemeError::NotDiagonal`] if any stage reads a stage
    /// other than its immediate predecessor.
    pub fn from_tableau(tableau: &ButcherTableau) -> Result<Self, SchemeError> {
        if !tableau.is_diagonal() {
            return Err(SchemeError::NotDiagonal {
                name: tableau.name().to_string(),
            });
        }
        let count = tableau.stages();
        let b = tableau.b();
        let c = tableau.c();
        let stages = (0..count)
            .map(|i| {
                let last = i + 1 == count;
                let kernel = match (i, last) {
                    (0, true) => StageKernel::Single { b: b[0] },
                    (0, false) => StageKernel::First {
                        b: b[0],
                        a_next: tableau.a(1, 0),
                    },
                    (_, false) => StageKernel::Intermediate {
                        b: b[i],
                        a_next: tableau.a(i + 1, i),
                    },
                    (_, true) => StageKernel::Final { b: b[i] },
                };
                let rhs_output = BufferRole::stage_output(i);
                Stage {
                    index: i,
                    c: c[i],
                    rhs_input: if i == 0 {
                        BufferRole::State
                    } else {
                        BufferRole::stage_output(i - 1)
                    },
                    rhs_output,
                    kernel,
                    boundary_target: if last { BufferRole::State } else { rhs_output },
                }
            })
            .collect();
        Ok(Self {
            name: tableau.name().to_string(),
            stages,
        })
    }

    /// The default scheme: Heun's two-stage method.
    pub fn heun() -> Self {
        Self::from_tableau(&ButcherTableau::heun()).expect("Heun tableau is diagonal")
    }

    /// Scheme name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always `false`: a plan has at least one stage.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
