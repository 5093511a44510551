//! Device-resident grid parameters.

use molt_core::GridId;
use molt_grid::GridDescriptor;

/// The grid constants a kernel reads from its stream's parameter slot.
///
/// Written by a `SyncParams` op; every launch checks that the slot holds
/// the parameters of the grid it targets before deriving its work size
/// from them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceParams {
    /// Grid the parameters describe.
    pub grid: GridId,
    /// Padded points per axis.
    pub dims: [usize; 3],
    /// Ghost width.
    pub nghosts: usize,
    /// Total points, ghosts included.
    pub points: usize,
    /// Grid spacing per axis.
    pub spacing: [f64; 3],
}

impl DeviceParams {
    /// Snapshot the parameters of `descriptor`.
    pub fn from_descriptor(descriptor: &GridDescriptor) -> Self {
        Self {
            grid: descriptor.id(),
            dims: descriptor.dims(),
            nghosts: descriptor.nghosts(),
            points: descriptor.points(),
            spacing: descriptor.spacing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_matches_descriptor() {
        let desc = GridDescriptor::new(GridId(9), [4, 4, 2], 1)
            .unwrap()
            .with_spacing([0.5, 0.5, 1.0]);
        let p = DeviceParams::from_descriptor(&desc);
        assert_eq!(p.grid, GridId(9));
        assert_eq!(p.dims, [6, 6, 4]);
        assert_eq!(p.points, 144);
        assert_eq!(p.spacing, [0.5, 0.5, 1.0]);
    }
}
