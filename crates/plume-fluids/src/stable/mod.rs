//! Stable-fluids operators: diffusion, projection and semi-Lagrangian advection.
//!
//! Every operator is a free function over explicit arrays and only writes inner-fluid cells of
//! the [`Grid`]. Wall cells and the outer ring keep whatever value they held before the call.

use ndarray::Array2;

use crate::{config::SchemeConfig, error::SchemeError, grid::Grid};

use diffuse::Diffusion;

pub mod advect;
pub mod diffuse;
pub mod project;
pub mod smoke_2d;

/// Numerical scheme, resolved once against the grid it will run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheme {
    pub diffusion: Diffusion,
    /// Jacobi iterations per diffusion and projection solve.
    pub nit: usize,
}

impl Scheme {
    pub fn new(diffusion: Diffusion, nit: usize) -> Result<Self, SchemeError> {
        if nit == 0 {
            return Err(SchemeError::NoIterations);
        }

        Ok(Self { diffusion, nit })
    }

    /// Resolves a configured scheme, refusing any combination the operators cannot run.
    pub fn resolve(config: &SchemeConfig, grid: &Grid) -> Result<Self, SchemeError> {
        let diffusion = config.name.parse::<Diffusion>()?;

        if !config.dx_equals_dy {
            return Err(SchemeError::NonSquareUnsupported);
        }

        if !grid.is_square() {
            return Err(SchemeError::SpacingMismatch {
                dx: grid.dx(),
                dy: grid.dy(),
            });
        }

        Self::new(diffusion, config.nit)
    }
}

/// Sum of the east, west, north and south neighbours of an inner cell.
#[inline(always)]
pub(crate) fn neighbour_sum(a: &Array2<f32>, row: usize, col: usize) -> f32 {
    a[(row, col + 1)] + a[(row, col - 1)] + a[(row + 1, col)] + a[(row - 1, col)]
}
