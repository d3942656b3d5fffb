use glam::Vec2;
use plume_fluids::{FluidError, Grid, SmokeFluid2D};

/// A fixed circular brush that injects smoke and momentum between steps.
#[derive(Debug, Clone)]
pub struct Emitter {
    /// Covered cells, clipped to the grid.
    cells: Vec<(usize, usize)>,
    /// Smoke added to each covered cell per application.
    smoke: f32,
    /// Velocity imposed on each covered cell.
    push: Vec2,
    /// Brushes centred on a wall never fire.
    active: bool,
}

impl Emitter {
    /// Centres a brush of radius `radius` cells on `(row, col)`.
    ///
    /// `strength` is smoke per unit area, so each cell receives `strength / base_size²`.
    pub fn new(
        grid: &Grid,
        row: usize,
        col: usize,
        radius: usize,
        strength: f32,
        push: Vec2,
    ) -> Result<Self, FluidError> {
        if !grid.contains(row, col) {
            return Err(FluidError::OutOfRange {
                row,
                col,
                rows: grid.ny(),
                cols: grid.nx(),
            });
        }

        let cells = brush_offsets(radius)
            .filter_map(|(dr, dc)| {
                let r = row.checked_add_signed(dr)?;
                let c = col.checked_add_signed(dc)?;
                grid.contains(r, c).then_some((r, c))
            })
            .collect();

        Ok(Self {
            cells,
            smoke: strength / (grid.base_size() * grid.base_size()),
            push,
            active: !grid.is_wall(row, col),
        })
    }

    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    /// Injects into every covered fluid cell, returning how many were written.
    pub fn apply(&self, fluid: &mut SmokeFluid2D) -> Result<usize, FluidError> {
        if !self.active {
            return Ok(0);
        }

        let mut written = 0;
        for &(row, col) in &self.cells {
            let added = fluid.add_smoke(row, col, self.smoke)?;
            fluid.set_velocity(row, col, self.push)?;

            written += added as usize;
        }

        Ok(written)
    }
}

/// Offsets `(row, col)` in `[-rad, rad)²` whose half-cell-shifted position lies within `rad`.
fn brush_offsets(rad: usize) -> impl Iterator<Item = (isize, isize)> {
    let rad = rad as isize;
    let r2 = (rad * rad) as f32;

    (-rad..rad)
        .flat_map(move |dr| (-rad..rad).map(move |dc| (dr, dc)))
        .filter(move |&(dr, dc)| {
            let (y, x) = (dr as f32 + 0.5, dc as f32 + 0.5);
            x * x + y * y <= r2
        })
}
