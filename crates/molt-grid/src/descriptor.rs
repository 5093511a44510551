//! Immutable per-grid metadata.

use molt_core::{BoundaryCondition, GridId};

use crate::error::GridError;

/// Per-grid metadata, immutable for the duration of a step.
///
/// Dimensions are stored as interior point counts plus a uniform ghost
/// width; [`dims()`](Self::dims) reports the padded extent
/// (`interior + 2 * nghosts` on every axis) that the buffers are sized by.
#[derive(Clone, Debug, PartialEq)]
pub struct GridDescriptor {
    id: GridId,
    interior: [usize; 3],
    nghosts: usize,
    spacing: [f64; 3],
    boundary: BoundaryCondition,
    points: usize,
}

impl GridDescriptor {
    /// Describe a grid with `interior` points per axis and `nghosts`
    /// ghost points on each side of each axis.
    ///
    /// Spacing defaults to 1 and the boundary to extrapolation.
    pub fn new(id: GridId, interior: [usize; 3], nghosts: usize) -> Result<Self, GridError> {
        if let Some(axis) = interior.iter().position(|&n| n == 0) {
            return Err(GridError::EmptyAxis { axis });
        }
        let pad = nghosts.checked_mul(2).ok_or(GridError::PointCountOverflow)?;
        let mut points = 1usize;
        for n in interior {
            let padded = n.checked_add(pad).ok_or(GridError::PointCountOverflow)?;
            points = points
                .checked_mul(padded)
                .ok_or(GridError::PointCountOverflow)?;
        }
        Ok(Self {
            id,
            interior,
            nghosts,
            spacing: [1.0; 3],
            boundary: BoundaryCondition::Extrapolation,
            points,
        })
    }

    /// Set the grid spacing per axis.
    pub fn with_spacing(mut self, spacing: [f64; 3]) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the outer boundary condition.
    pub fn with_boundary(mut self, boundary: BoundaryCondition) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set the outer boundary condition from its configuration string.
    ///
    /// The string is resolved here, once; see
    /// [`BoundaryCondition::from_tag`].
    pub fn with_boundary_tag(self, tag: &str) -> Self {
        self.with_boundary(BoundaryCondition::from_tag(tag))
    }

    /// Grid identifier.
    pub fn id(&self) -> GridId {
        self.id
    }

    /// Interior points per axis.
    pub fn interior(&self) -> [usize; 3] {
        self.interior
    }

    /// Ghost width on each side of each axis.
    pub fn nghosts(&self) -> usize {
        self.nghosts
    }

    /// Padded points per axis, ghosts included.
    pub fn dims(&self) -> [usize; 3] {
        let pad = 2 * self.nghosts;
        [
            self.interior[0] + pad,
            self.interior[1] + pad,
            self.interior[2] + pad,
        ]
    }

    /// Total points, ghosts included.
    pub fn points(&self) -> usize {
        self.points
    }

    /// Grid spacing per axis.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Outer boundary condition.
    pub fn boundary(&self) -> &BoundaryCondition {
        &self.boundary
    }

    /// Flat point index of padded coordinates `(i0, i1, i2)`; axis 0 is
    /// fastest.
    pub fn point_index(&self, i0: usize, i1: usize, i2: usize) -> usize {
        let [n0, n1, _] = self.dims();
        i0 + n0 * (i1 + n1 * i2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn dims_include_ghosts() {
        let d = GridDescriptor::new(GridId(3), [10, 4, 1], 2).unwrap();
        assert_eq!(d.dims(), [14, 8, 5]);
        assert_eq!(d.points(), 14 * 8 * 5);
        assert_eq!(d.id(), GridId(3));
    }

    #[test]
    fn single_point_grid() {
        let d = GridDescriptor::new(GridId(0), [1, 1, 1], 0).unwrap();
        assert_eq!(d.points(), 1);
    }

    #[test]
    fn empty_axis_rejected() {
        assert_eq!(
            GridDescriptor::new(GridId(0), [4, 0, 1], 1),
            Err(GridError::EmptyAxis { axis: 1 })
        );
    }

    #[test]
    fn overflow_rejected() {
        assert_eq!(
            GridDescriptor::new(GridId(0), [usize::MAX / 2, 4, 1], 0),
            Err(GridError::PointCountOverflow)
        );
    }

    #[test]
    fn boundary_tag_resolved_once() {
        let d = GridDescriptor::new(GridId(0), [2, 2, 2], 1)
            .unwrap()
            .with_boundary_tag("Radiation");
        assert_eq!(d.boundary(), &BoundaryCondition::Radiation);
    }

    #[test]
    fn point_index_axis0_fastest() {
        let d = GridDescriptor::new(GridId(0), [2, 3, 4], 0).unwrap();
        assert_eq!(d.point_index(1, 0, 0), 1);
        assert_eq!(d.point_index(0, 1, 0), 2);
        assert_eq!(d.point_index(0, 0, 1), 6);
        assert_eq!(d.point_index(1, 2, 3), d.points() - 1);
    }

    proptest! {
        #[test]
        fn points_is_product_of_padded_dims(
            n0 in 1usize..20,
            n1 in 1usize..20,
            n2 in 1usize..20,
            ghosts in 0usize..4,
        ) {
            let d = GridDescriptor::new(GridId(0), [n0, n1, n2], ghosts).unwrap();
            let [d0, d1, d2] = d.dims();
            prop_assert_eq!(d.points(), d0 * d1 * d2);
            prop_assert_eq!(d.point_index(d0 - 1, d1 - 1, d2 - 1), d.points() - 1);
        }
    }
}
