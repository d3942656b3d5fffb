use std::str::FromStr;

use ndarray::Array2;

use crate::{error::SchemeError, grid::Grid};

use super::neighbour_sum;

/// Viscous diffusion variants, selected by scheme name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diffusion {
    /// Jacobi-relaxed implicit diffusion. Configured as `ExplicitEuler`.
    Jacobi,
    /// A single weighted blend with the neighbour mean. Configured as `ImplicitEuler`.
    SinglePass,
}

impl FromStr for Diffusion {
    type Err = SchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ExplicitEuler" => Ok(Diffusion::Jacobi),
            "ImplicitEuler" => Ok(Diffusion::SinglePass),
            _ => Err(SchemeError::Unknown(s.to_string())),
        }
    }
}

impl Diffusion {
    /// Diffuses `field` by one timestep with coefficient `nu`.
    #[inline]
    pub fn apply(self, field: &mut Array2<f32>, grid: &Grid, nu: f32, dt: f32, nit: usize) {
        match self {
            Diffusion::Jacobi => diffuse_jacobi(field, grid, nu, dt, nit),
            Diffusion::SinglePass => diffuse_single_pass(field, grid, nu, dt),
        }
    }
}

/// `k = 4·ν·dt / dx²`. Square cells only.
#[inline]
pub fn relaxation(grid: &Grid, nu: f32, dt: f32) -> f32 {
    4.0 * nu * dt / (grid.dx() * grid.dx())
}

/// Solves `(1 + k)·D - (k/4)·ΣD_nb = D_old` with `nit` Jacobi sweeps over the inner fluid cells.
///
/// Each sweep reads a snapshot of the previous sweep, so the result does not depend on the
/// order in which cells are visited.
pub fn diffuse_jacobi(field: &mut Array2<f32>, grid: &Grid, nu: f32, dt: f32, nit: usize) {
    let k = relaxation(grid, nu, dt);
    if k == 0.0 {
        return;
    }

    let initial = field.clone();
    let mut prev = field.clone();
    let weight = 0.25 * k;
    let norm = 1.0 + k;

    for _iter in 0..nit {
        prev.assign(field);

        for &(row, col) in grid.inner_fluid_cells() {
            field[(row, col)] = (initial[(row, col)] + weight * neighbour_sum(&prev, row, col)) / norm;
        }
    }
}

/// Blends every inner fluid cell with the mean of its neighbours, `D·(1 - k) + k·mean(D_nb)`.
pub fn diffuse_single_pass(field: &mut Array2<f32>, grid: &Grid, nu: f32, dt: f32) {
    let k = relaxation(grid, nu, dt);
    if k == 0.0 {
        return;
    }

    let prev = field.clone();

    for &(row, col) in grid.inner_fluid_cells() {
        field[(row, col)] = prev[(row, col)] * (1.0 - k) + k * 0.25 * neighbour_sum(&prev, row, col);
    }
}
