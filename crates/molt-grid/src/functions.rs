//! The four per-grid buffers a step works in.

use molt_core::BufferRole;

use crate::descriptor::GridDescriptor;
use crate::error::GridError;

/// Four same-shaped grid-function buffers, one per [`BufferRole`].
///
/// Each buffer holds `points × fields` values in field-major order.
/// Buffers are allocated once and reused across steps; the stepper never
/// resizes them.
#[derive(Clone, Debug, PartialEq)]
pub struct GridFunctionSet {
    points: usize,
    fields: usize,
    buffers: [Vec<f64>; 4],
}

/// Disjoint mutable views a stage kernel works on.
#[derive(Debug)]
pub struct StageBuffers<'a> {
    /// `y_n`.
    pub state: &'a mut [f64],
    /// The stage buffer holding this stage's RHS output.
    pub stage: &'a mut [f64],
    /// The running total.
    pub total: &'a mut [f64],
}

impl GridFunctionSet {
    /// Allocate zeroed buffers for `fields` fields on `points` points.
    pub fn new(points: usize, fields: usize) -> Result<Self, GridError> {
        if fields == 0 {
            return Err(GridError::ZeroFields);
        }
        let len = points
            .checked_mul(fields)
            .ok_or(GridError::PointCountOverflow)?;
        Ok(Self {
            points,
            fields,
            buffers: std::array::from_fn(|_| vec![0.0; len]),
        })
    }

    /// Adopt caller-allocated buffers, indexed by [`BufferRole::index`].
    pub fn from_buffers(
        points: usize,
        fields: usize,
        buffers: [Vec<f64>; 4],
    ) -> Result<Self, GridError> {
        if fields == 0 {
            return Err(GridError::ZeroFields);
        }
        let expected = points
            .checked_mul(fields)
            .ok_or(GridError::PointCountOverflow)?;
        for role in BufferRole::ALL {
            let actual = buffers[role.index()].len();
            if actual != expected {
                return Err(GridError::ShapeMismatch {
                    role,
                    expected,
                    actual,
                });
            }
        }
        Ok(Self {
            points,
            fields,
            buffers,
        })
    }

    /// Replace `y_n` wholesale, builder style.
    pub fn with_state(mut self, state: &[f64]) -> Result<Self, GridError> {
        self.set_state(state)?;
        Ok(self)
    }

    /// Copy `state` into `y_n`.
    pub fn set_state(&mut self, state: &[f64]) -> Result<(), GridError> {
        let expected = self.len();
        if state.len() != expected {
            return Err(GridError::ShapeMismatch {
                role: BufferRole::State,
                expected,
                actual: state.len(),
            });
        }
        self.buffers[BufferRole::State.index()].copy_from_slice(state);
        Ok(())
    }

    /// Elements per buffer (`points × fields`).
    pub fn len(&self) -> usize {
        self.points * self.fields
    }

    /// Always `false` for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Points per field.
    pub fn points(&self) -> usize {
        self.points
    }

    /// Number of evolved fields.
    pub fn field_count(&self) -> usize {
        self.fields
    }

    /// The buffer playing `role`.
    pub fn buffer(&self, role: BufferRole) -> &[f64] {
        &self.buffers[role.index()]
    }

    /// Mutable access to the buffer playing `role`.
    pub fn buffer_mut(&mut self, role: BufferRole) -> &mut [f64] {
        &mut self.buffers[role.index()]
    }

    /// One field's slice of a buffer, or `None` if `gf` is out of range.
    pub fn field(&self, role: BufferRole, gf: usize) -> Option<&[f64]> {
        if gf >= self.fields {
            return None;
        }
        let start = gf * self.points;
        Some(&self.buffers[role.index()][start..start + self.points])
    }

    /// Mutable slice of one field of a buffer.
    pub fn field_mut(&mut self, role: BufferRole, gf: usize) -> Option<&mut [f64]> {
        if gf >= self.fields {
            return None;
        }
        let start = gf * self.points;
        let points = self.points;
        Some(&mut self.buffers[role.index()][start..start + points])
    }

    /// Read one buffer while writing another. `None` if the roles match.
    pub fn pair(&mut self, read: BufferRole, write: BufferRole) -> Option<(&[f64], &mut [f64])> {
        let [r, w] = self
            .buffers
            .get_disjoint_mut([read.index(), write.index()])
            .ok()?;
        Some((r.as_slice(), w.as_mut_slice()))
    }

    /// Split out `y_n`, the stage buffer `stage`, and the running total.
    ///
    /// `None` if `stage` is not one of the two stage buffers.
    pub fn stage_buffers(&mut self, stage: BufferRole) -> Option<StageBuffers<'_>> {
        let [state, a, b, total] = &mut self.buffers;
        let stage = match stage {
            BufferRole::StageA => a,
            BufferRole::StageB => b,
            BufferRole::State | BufferRole::RunningTotal => return None,
        };
        Some(StageBuffers {
            state,
            stage,
            total,
        })
    }

    /// Check that these buffers fit `descriptor`.
    pub fn validate_against(&self, descriptor: &GridDescriptor) -> Result<(), GridError> {
        let expected = descriptor
            .points()
            .checked_mul(self.fields)
            .ok_or(GridError::PointCountOverflow)?;
        for role in BufferRole::ALL {
            let actual = self.buffers[role.index()].len();
            if actual != expected {
                return Err(GridError::ShapeMismatch {
                    role,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fields_rejected() {
        assert_eq!(GridFunctionSet::new(10, 0), Err(GridError::ZeroFields));
    }

    #[test]
    fn field_major_layout() {
        let mut set = GridFunctionSet::new(3, 2).unwrap();
        set.field_mut(BufferRole::State, 1)
            .unwrap()
            .copy_from_slice(&[7.0, 8.0, 9.0]);
        assert_eq!(set.buffer(BufferRole::State), &[0.0, 0.0, 0.0, 7.0, 8.0, 9.0]);
        assert!(set.field(BufferRole::State, 2).is_none());
    }

    #[test]
    fn from_buffers_reports_bad_role() {
        let good = vec![0.0; 4];
        let err = GridFunctionSet::from_buffers(
            2,
            2,
            [good.clone(), good.clone(), vec![0.0; 3], good],
        )
        .unwrap_err();
        assert_eq!(
            err,
            GridError::ShapeMismatch {
                role: BufferRole::StageB,
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn set_state_checks_length() {
        let mut set = GridFunctionSet::new(2, 1).unwrap();
        assert!(set.set_state(&[1.0]).is_err());
        set.set_state(&[1.0, 2.0]).unwrap();
        assert_eq!(set.buffer(BufferRole::State), &[1.0, 2.0]);
    }

    #[test]
    fn pair_rejects_aliasing() {
        let mut set = GridFunctionSet::new(2, 1).unwrap();
        assert!(set.pair(BufferRole::StageA, BufferRole::StageA).is_none());
        let (read, write) = set.pair(BufferRole::State, BufferRole::StageA).unwrap();
        write[0] = read[0] + 1.0;
        assert_eq!(set.buffer(BufferRole::StageA)[0], 1.0);
    }

    #[test]
    fn stage_buffers_are_disjoint() {
        let mut set = GridFunctionSet::new(1, 1)
            .unwrap()
            .with_state(&[5.0])
            .unwrap();
        {
            let views = set.stage_buffers(BufferRole::StageB).unwrap();
            views.stage[0] = 2.0;
            views.total[0] = views.state[0] + views.stage[0];
        }
        assert_eq!(set.buffer(BufferRole::StageB), &[2.0]);
        assert_eq!(set.buffer(BufferRole::RunningTotal), &[7.0]);
        assert_eq!(set.buffer(BufferRole::StageA), &[0.0]);
        assert!(set.stage_buffers(BufferRole::State).is_none());
    }
}
