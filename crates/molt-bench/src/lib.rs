//! Benchmark profiles and collaborators for the molt stepper.
//!
//! Provides a realistic RHS and boundary pair plus pre-built profiles:
//!
//! - [`DiffusionRhs`]: 7-point Laplacian on interior points
//! - [`GhostCopy`]: fills every ghost zone from the nearest interior point
//! - [`reference_profile`]: 4 grids of 32³ interior points
//! - [`stress_profile`]: 8 grids of 64³ interior points

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use molt_core::{BoundaryCondition, EvalError, GridId};
use molt_engine::StepperConfig;
use molt_grid::{GridData, GridDescriptor};
use molt_operator::{BoundaryEnforcer, RhsEvaluator, StageContext};

/// `dy/dt = D ∇²y` on interior points; ghost rates are zero.
///
/// Needs at least one ghost zone.
pub struct DiffusionRhs {
    coefficient: f64,
}

impl DiffusionRhs {
    /// Diffusion with coefficient `D`.
    pub fn new(coefficient: f64) -> Self {
        Self { coefficient }
    }
}

impl RhsEvaluator for DiffusionRhs {
    fn name(&self) -> &str {
        "diffusion"
    }

    fn evaluate(
        &self,
        ctx: &StageContext<'_>,
        input: &[f64],
        output: &mut [f64],
    ) -> Result<(), EvalError> {
        let desc = ctx.descriptor();
        let g = desc.nghosts();
        if g == 0 {
            return Err(EvalError::ExecutionFailed {
                reason: "diffusion stencil needs a ghost zone".into(),
            });
        }
        let [n0, n1, n2] = desc.dims();
        let strides = [1, n0, n0 * n1];
        let inv_h2 = desc.spacing().map(|h| 1.0 / (h * h));

        output.fill(0.0);
        for gf in 0..ctx.field_count() {
            let range = ctx.field_range(gf);
            let y = &input[range.clone()];
            let out = &mut output[range];
            for i2 in g..n2 - g {
                for i1 in g..n1 - g {
                    for i0 in g..n0 - g {
                        let p = desc.point_index(i0, i1, i2);
                        let centre = -2.0 * y[p];
                        let lap: f64 = strides
                            .iter()
                            .zip(inv_h2)
                            .map(|(&s, w)| (y[p - s] + centre + y[p + s]) * w)
                            .sum();
                        out[p] = self.coefficient * lap;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Zero-gradient extrapolation: every ghost point takes the value of the
/// nearest interior point.
#[derive(Clone, Copy, Debug, Default)]
pub struct GhostCopy;

impl BoundaryEnforcer for GhostCopy {
    fn name(&self) -> &str {
        "ghost_copy"
    }

    fn apply(&self, ctx: &StageContext<'_>, state: &mut [f64]) -> Result<(), EvalError> {
        for gf in 0..ctx.field_count() {
            fill_ghosts(ctx.descriptor(), &mut state[ctx.field_range(gf)]);
        }
        Ok(())
    }
}

/// Copy the nearest interior value into each ghost point of one field.
pub fn fill_ghosts(desc: &GridDescriptor, field: &mut [f64]) {
    let g = desc.nghosts();
    if g == 0 {
        return;
    }
    let dims = desc.dims();
    let clamp = |i: usize, axis: usize| i.clamp(g, dims[axis] - g - 1);
    for i2 in 0..dims[2] {
        for i1 in 0..dims[1] {
            for i0 in 0..dims[0] {
                let src = desc.point_index(clamp(i0, 0), clamp(i1, 1), clamp(i2, 2));
                let dst = desc.point_index(i0, i1, i2);
                if src != dst {
                    field[dst] = field[src];
                }
            }
        }
    }
}

/// Sum of field `gf` over interior points.
pub fn interior_sum(grid: &GridData, gf: usize) -> f64 {
    let desc = grid.descriptor();
    let g = desc.nghosts();
    let [n0, n1, n2] = desc.dims();
    let points = desc.points();
    let state = &grid.functions().buffer(molt_core::BufferRole::State)[gf * points..][..points];
    let mut sum = 0.0;
    for i2 in g..n2 - g {
        for i1 in g..n1 - g {
            for i0 in g..n0 - g {
                sum += state[desc.point_index(i0, i1, i2)];
            }
        }
    }
    sum
}

/// A ready-to-step workload.
pub struct Profile {
    /// Stepper configuration: diffusion RHS with ghost-copy boundaries.
    pub config: StepperConfig,
    /// Grids with a Gaussian bump centred in each.
    pub grids: Vec<GridData>,
    /// A timestep inside the explicit diffusion limit `h² / (6 D)`.
    pub dt: f64,
}

/// Build a profile of `grids` cubic grids with `n³` interior points each.
pub fn profile(grids: u32, n: usize, streams: usize) -> Profile {
    let coefficient = 0.1;
    let h = 1.0 / n as f64;
    let mut config = StepperConfig::new(DiffusionRhs::new(coefficient)).with_boundary(GhostCopy);
    config.stream_pool_size = streams;
    config.block_size = 256;
    Profile {
        config,
        grids: (0..grids).map(|id| gaussian_grid(id, n, h)).collect(),
        dt: 0.5 * h * h / (6.0 * coefficient),
    }
}

/// Reference profile: 4 grids of 32³ interior points.
pub fn reference_profile(streams: usize) -> Profile {
    profile(4, 32, streams)
}

/// Stress profile: 8 grids of 64³ interior points.
pub fn stress_profile(streams: usize) -> Profile {
    profile(8, 64, streams)
}

fn gaussian_grid(id: u32, n: usize, h: f64) -> GridData {
    let desc = GridDescriptor::new(GridId(id), [n; 3], 1)
        .expect("profile grids are non-empty")
        .with_spacing([h; 3])
        .with_boundary(BoundaryCondition::Extrapolation);
    let [n0, n1, _] = desc.dims();
    // Bumps of different widths so grids are distinguishable.
    let width = 0.1 + 0.02 * f64::from(id % 4);
    let mut state: Vec<f64> = (0..desc.points())
        .map(|p| {
            let i = [p % n0, (p / n0) % n1, p / (n0 * n1)];
            let r2: f64 = i
                .iter()
                .map(|&c| {
                    let x = (c as f64 - 0.5) * h - 0.5;
                    x * x
                })
                .sum();
            (-r2 / (width * width)).exp()
        })
        .collect();
    fill_ghosts(&desc, &mut state);
    let mut grid = GridData::new(desc, 1).expect("one field");
    grid.functions_mut()
        .set_state(&state)
        .expect("state sized to the grid");
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use molt_core::{BufferRole, SimulationClock};
    use molt_engine::MolStepper;

    #[test]
    fn ghost_copy_clamps_to_interior() {
        let desc = GridDescriptor::new(GridId(0), [2, 1, 1], 1).unwrap();
        let mut field: Vec<f64> = (0..desc.points()).map(|p| p as f64).collect();
        fill_ghosts(&desc, &mut field);
        let left = desc.point_index(1, 1, 1) as f64;
        let right = desc.point_index(2, 1, 1) as f64;
        for i2 in 0..3 {
            for i1 in 0..3 {
                assert_eq!(field[desc.point_index(0, i1, i2)], left);
                assert_eq!(field[desc.point_index(1, i1, i2)], left);
                assert_eq!(field[desc.point_index(2, i1, i2)], right);
                assert_eq!(field[desc.point_index(3, i1, i2)], right);
            }
        }
    }

    #[test]
    fn uniform_state_has_zero_rate() {
        let mut p = profile(1, 4, 1);
        p.grids[0].functions_mut().set_state(&[3.0; 216]).unwrap();
        let mut stepper = MolStepper::new(p.config).unwrap();
        let mut clock = SimulationClock::new(p.dt).unwrap();
        stepper.step(&mut clock, &mut p.grids).unwrap();
        assert!(p.grids[0]
            .functions()
            .buffer(BufferRole::State)
            .iter()
            .all(|&v| v == 3.0));
    }

    #[test]
    fn diffusion_conserves_interior_mass() {
        let mut p = profile(2, 8, 2);
        let before: Vec<f64> = p.grids.iter().map(|g| interior_sum(g, 0)).collect();
        let mut stepper = MolStepper::new(p.config).unwrap();
        stepper.validate_grids(&p.grids).unwrap();
        let mut clock = SimulationClock::new(p.dt).unwrap();
        for _ in 0..10 {
            stepper.step(&mut clock, &mut p.grids).unwrap();
        }
        for (grid, mass) in p.grids.iter().zip(before) {
            let after = interior_sum(grid, 0);
            assert!((after - mass).abs() < 1e-10 * mass, "{after} vs {mass}");
        }
    }

    #[test]
    fn no_ghosts_is_an_rhs_failure() {
        let mut stepper = MolStepper::new(StepperConfig::new(DiffusionRhs::new(1.0))).unwrap();
        let mut clock = SimulationClock::new(0.1).unwrap();
        let desc = GridDescriptor::new(GridId(0), [2, 2, 2], 0).unwrap();
        let mut grids = vec![GridData::new(desc, 1).unwrap()];
        assert!(stepper.step(&mut clock, &mut grids).is_err());
    }
}
