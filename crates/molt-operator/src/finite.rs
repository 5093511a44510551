//! Non-finite value detection for collaborator outputs.

use molt_core::EvalError;

/// Return [`EvalError::NanDetected`] for the first non-finite value in a
/// field-major buffer of `points` points per field.
///
/// A `points` of zero accepts any buffer.
pub fn check_finite(points: usize, values: &[f64]) -> Result<(), EvalError> {
    if points == 0 {
        return Ok(());
    }
    match values.iter().position(|v| !v.is_finite()) {
        None => Ok(()),
        Some(idx) => Err(EvalError::NanDetected {
            field: idx / points,
            point: Some(idx % points),
        }),
    }
}
