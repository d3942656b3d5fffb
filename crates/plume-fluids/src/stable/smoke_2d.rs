use glam::Vec2;
use ndarray::{Array2, ArrayView2, Zip};

use crate::{
    config::SolverConfig,
    error::{FluidError, SchemeError},
    grid::Grid,
    Fluid, NonFinite,
};

use super::{advect::advect, project::project, Scheme};

/// Velocity, pressure and a passive smoke density on a cell-centred grid.
#[derive(Debug, Clone)]
pub struct SmokeFluid2D {
    grid: Grid,
    scheme: Scheme,

    /// X velocity.
    u: Array2<f32>,
    /// Y velocity.
    v: Array2<f32>,
    /// Pressure from the most recent projection.
    p: Array2<f32>,
    /// Smoke density.
    d: Array2<f32>,
}

/// Read-only view of the state a renderer or recorder needs.
#[derive(Debug, Clone, Copy)]
pub struct FieldSnapshot<'a> {
    pub u: ArrayView2<'a, f32>,
    pub v: ArrayView2<'a, f32>,
    pub d: ArrayView2<'a, f32>,
    pub walls: ArrayView2<'a, bool>,
    pub dx: f32,
    pub dy: f32,
    pub nx: usize,
    pub ny: usize,
}

impl SmokeFluid2D {
    /// Creates a fluid at rest with no smoke. The operators assume square cells, so a grid with
    /// `dx != dy` is refused.
    pub fn new(grid: Grid, scheme: Scheme) -> Result<Self, SchemeError> {
        if !grid.is_square() {
            return Err(SchemeError::SpacingMismatch {
                dx: grid.dx(),
                dy: grid.dy(),
            });
        }

        let dim = grid.dim();

        Ok(Self {
            grid,
            scheme,
            u: Array2::zeros(dim),
            v: Array2::zeros(dim),
            p: Array2::zeros(dim),
            d: Array2::zeros(dim),
        })
    }

    /// Validates `config`, then builds the grid and resolves the scheme against it.
    pub fn from_config(config: &SolverConfig) -> Result<Self, FluidError> {
        config.validate()?;

        let grid = config.build_grid()?;
        let scheme = Scheme::resolve(&config.scheme, &grid)?;

        Ok(Self::new(grid, scheme)?)
    }

    #[inline(always)]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline(always)]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn pressure(&self) -> ArrayView2<'_, f32> {
        self.p.view()
    }

    pub fn snapshot(&self) -> FieldSnapshot<'_> {
        FieldSnapshot {
            u: self.u.view(),
            v: self.v.view(),
            d: self.d.view(),
            walls: self.grid.walls(),
            dx: self.grid.dx(),
            dy: self.grid.dy(),
            nx: self.grid.nx(),
            ny: self.grid.ny(),
        }
    }

    /// Adds `amount` of smoke to a cell.
    ///
    /// Returns `Ok(false)` without touching the field if the cell is a wall.
    pub fn add_smoke(&mut self, row: usize, col: usize, amount: f32) -> Result<bool, FluidError> {
        if !self.writable(row, col)? {
            return Ok(false);
        }

        self.d[(row, col)] += amount;
        Ok(true)
    }

    /// Overwrites the velocity of a cell.
    ///
    /// Returns `Ok(false)` without touching the field if the cell is a wall.
    pub fn set_velocity(&mut self, row: usize, col: usize, velocity: Vec2) -> Result<bool, FluidError> {
        if !self.writable(row, col)? {
            return Ok(false);
        }

        self.u[(row, col)] = velocity.x;
        self.v[(row, col)] = velocity.y;
        Ok(true)
    }

    fn writable(&self, row: usize, col: usize) -> Result<bool, FluidError> {
        if !self.grid.contains(row, col) {
            return Err(FluidError::OutOfRange {
                row,
                col,
                rows: self.grid.ny(),
                cols: self.grid.nx(),
            });
        }

        Ok(!self.grid.is_wall(row, col))
    }

    pub fn velocity(&self, row: usize, col: usize) -> Vec2 {
        Vec2::new(self.u[(row, col)], self.v[(row, col)])
    }

    pub fn total_smoke(&self) -> f32 {
        self.d.sum()
    }

    pub fn max_speed(&self) -> f32 {
        Zip::from(&self.u)
            .and(&self.v)
            .fold(0.0, |max, &u, &v| f32::max(max, Vec2::new(u, v).length()))
    }

    /// Diffuses `field` with coefficient `nu` using the configured scheme.
    fn diffuse(&self, field: &mut Array2<f32>, nu: f32, dt: f32) {
        self.scheme.diffusion.apply(field, &self.grid, nu, dt, self.scheme.nit);
    }

    fn step_velocity(&mut self, dt: f32, viscosity: f32) {
        let mut u = std::mem::take(&mut self.u);
        let mut v = std::mem::take(&mut self.v);

        self.diffuse(&mut u, viscosity, dt);
        self.diffuse(&mut v, viscosity, dt);

        project(&mut u, &mut v, &mut self.p, &self.grid, self.scheme.nit);

        // Both components trace back along the velocity as it was before advection.
        let (u0, v0) = (u.clone(), v.clone());
        advect(&mut u, &u0, &v0, &self.grid, dt);
        advect(&mut v, &u0, &v0, &self.grid, dt);

        project(&mut u, &mut v, &mut self.p, &self.grid, self.scheme.nit);

        self.u = u;
        self.v = v;
    }

    fn step_smoke(&mut self, dt: f32, params: &SmokeFluid2DParams) {
        let mut d = std::mem::take(&mut self.d);

        self.diffuse(&mut d, params.smoke_viscosity, dt);
        advect(&mut d, &self.u, &self.v, &self.grid, dt);
        fade(&mut d, params.smoke_fade);

        self.d = d;
    }
}

/// Multiplies every sample of `field` by `factor`.
#[inline]
pub fn fade(field: &mut Array2<f32>, factor: f32) {
    if factor == 1.0 {
        return;
    }

    field.mapv_inplace(|x| x * factor);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmokeFluid2DParams {
    /// Kinematic viscosity of the carrier fluid.
    pub viscosity: f32,
    /// Diffusivity of the smoke.
    pub smoke_viscosity: f32,
    /// Multiplicative smoke decay per step, in `(0, 1]`.
    pub smoke_fade: f32,
}

impl SmokeFluid2DParams {
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            viscosity: config.fluid.viscosity,
            smoke_viscosity: config.fluid.smoke_viscosity,
            smoke_fade: config.fluid.smoke_fade,
        }
    }
}

impl Default for SmokeFluid2DParams {
    fn default() -> Self {
        Self {
            viscosity: 1e-1,
            smoke_viscosity: 1e-3,
            smoke_fade: 0.99,
        }
    }
}

impl Fluid for SmokeFluid2D {
    type Params = SmokeFluid2DParams;

    fn step(&mut self, dt: f32, params: &Self::Params) {
        self.step_velocity(dt, params.viscosity);

        // Boundary conditions beyond the wall mask would be enforced here.

        self.step_smoke(dt, params);
    }

    fn find_non_finite(&self) -> Option<NonFinite> {
        [("u", &self.u), ("v", &self.v), ("p", &self.p), ("d", &self.d)]
            .into_iter()
            .find_map(|(field, values)| {
                values
                    .indexed_iter()
                    .find(|(_, x)| !x.is_finite())
                    .map(|((row, col), _)| NonFinite { field, row, col })
            })
    }
}
