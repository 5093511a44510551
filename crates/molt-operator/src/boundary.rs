//! The [`BoundaryEnforcer`] trait.

use std::sync::Arc;

use molt_core::EvalError;

use crate::context::StageContext;

/// Corrects domain-boundary values of a grid buffer.
///
/// Which method the stepper calls, and when, is decided by the grid's
/// resolved [`BoundaryCondition`](molt_core::BoundaryCondition):
///
/// | condition       | call                    | when                         |
/// |-----------------|-------------------------|------------------------------|
/// | `Extrapolation` | [`apply()`](Self::apply) | after each stage kernel      |
/// | `Radiation`     | [`apply_radiation()`](Self::apply_radiation) | after each RHS evaluation |
/// | `Other(_)`      | none                    |                              |
pub trait BoundaryEnforcer: Send + Sync + 'static {
    /// Human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Fill outer (and inner) ghost zones of `state` in place.
    ///
    /// `state` is the predictor after an intermediate stage, or the new
    /// `y_n` after the final stage.
    fn apply(&self, ctx: &StageContext<'_>, state: &mut [f64]) -> Result<(), EvalError>;

    /// Overwrite boundary values of `rhs` with the radiation condition
    /// evaluated from `input`, the state the RHS was computed from.
    ///
    /// Default: no-op.
    fn apply_radiation(
        &self,
        ctx: &StageContext<'_>,
        input: &[f64],
        rhs: &mut [f64],
    ) -> Result<(), EvalError> {
        let _ = (ctx, input, rhs);
        Ok(())
    }
}

impl<T: BoundaryEnforcer + ?Sized> BoundaryEnforcer for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&self, ctx: &StageContext<'_>, state: &mut [f64]) -> Result<(), EvalError> {
        (**self).apply(ctx, state)
    }

    fn apply_radiation(
        &self,
        ctx: &StageContext<'_>,
        input: &[f64],
        rhs: &mut [f64],
    ) -> Result<(), EvalError> {
        (**self).apply_radiation(ctx, input, rhs)
    }
}

impl<T: BoundaryEnforcer + ?Sized> BoundaryEnforcer for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&self, ctx: &StageContext<'_>, state: &mut [f64]) -> Result<(), EvalError> {
        (**self).apply(ctx, state)
    }

    fn apply_radiation(
        &self,
        ctx: &StageContext<'_>,
        input: &[f64],
        rhs: &mut [f64],
    ) -> Result<(), EvalError> {
        (**self).apply_radiation(ctx, input, rhs)
    }
}

/// A boundary enforcer that leaves every buffer untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBoundary;

impl BoundaryEnforcer for NoBoundary {
    fn name(&self) -> &str {
        "none"
    }

    fn apply(&self, _ctx: &StageContext<'_>, _state: &mut [f64]) -> Result<(), EvalError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use molt_core::{GridId, StreamIndex};
    use molt_grid::GridDescriptor;

    #[test]
    fn no_boundary_leaves_buffers_alone() {
        let desc = GridDescriptor::new(GridId(0), [2, 1, 1], 0).unwrap();
        let ctx = StageContext::new(&desc, 0.0, 0.1, 1, StreamIndex(0), 1);
        let mut state = vec![1.0, 2.0];
        let mut rhs = vec![3.0, 4.0];
        NoBoundary.apply(&ctx, &mut state).unwrap();
        NoBoundary.apply_radiation(&ctx, &state, &mut rhs).unwrap();
        assert_eq!(state, [1.0, 2.0]);
        assert_eq!(rhs, [3.0, 4.0]);
    }

    #[test]
    fn boxed_enforcer_forwards() {
        let boxed: Box<dyn BoundaryEnforcer> = Box::new(NoBoundary);
        assert_eq!(boxed.name(), "none");
    }
}
