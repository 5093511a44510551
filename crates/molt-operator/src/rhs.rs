//! The [`RhsEvaluator`] trait.

use std::sync::Arc;

use molt_core::EvalError;

use crate::context::StageContext;

/// The spatial right-hand side: computes `dy/dt` from a state snapshot.
///
/// # Contract
///
/// - `evaluate()` reads `input` and writes every element of `output`;
///   both are `points × fields` long and field-major.
/// - `input` and `output` never alias. `output` may hold stale data from
///   an earlier stage and must be overwritten, not accumulated into.
/// - Grids are independent: an evaluation may only depend on the grid
///   named by `ctx`.
/// - `&self`: evaluators are stateless during a step. Calls for grids on
///   different streams run concurrently, hence `Sync`.
///
/// # Examples
///
/// ```
/// use molt_core::EvalError;
/// use molt_operator::{RhsEvaluator, StageContext};
///
/// /// `dy/dt = -y`.
/// struct Decay;
///
/// impl RhsEvaluator for Decay {
///     fn name(&self) -> &str { "decay" }
///
///     fn evaluate(
///         &self,
///         _ctx: &StageContext<'_>,
///         input: &[f64],
///         output: &mut [f64],
///     ) -> Result<(), EvalError> {
///         for (o, i) in output.iter_mut().zip(input) {
///             *o = -*i;
///         }
///         Ok(())
///     }
/// }
///
/// assert_eq!(Decay.name(), "decay");
/// ```
pub trait RhsEvaluator: Send + Sync + 'static {
    /// Human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Write `RHS(input)` into `output`.
    fn evaluate(
        &self,
        ctx: &StageContext<'_>,
        input: &[f64],
        output: &mut [f64],
    ) -> Result<(), EvalError>;
}

impl<T: RhsEvaluator + ?Sized> RhsEvaluator for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate(
        &self,
        ctx: &StageContext<'_>,
        input: &[f64],
        output: &mut [f64],
    ) -> Result<(), EvalError> {
        (**self).evaluate(ctx, input, output)
    }
}

/// Shared evaluators; the caller keeps a handle to inspect state after a run.
impl<T: RhsEvaluator + ?Sized> RhsEvaluator for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate(
        &self,
        ctx: &StageContext<'_>,
        input: &[f64],
        output: &mut [f64],
    ) -> Result<(), EvalError> {
        (**self).evaluate(ctx, input, output)
    }
}
