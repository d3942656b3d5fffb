use glam::Vec2;
use ndarray::Array2;

use crate::grid::Grid;

/// Semi-Lagrangian transport of `field` along `(u, v)` over one timestep.
///
/// Each inner fluid cell traces back along its own velocity, in index space, and resamples the
/// pre-advection field there. The source position is clamped to the grid. A cell whose velocity
/// is not finite becomes NaN.
pub fn advect(field: &mut Array2<f32>, u: &Array2<f32>, v: &Array2<f32>, grid: &Grid, dt: f32) {
    let source = field.clone();
    let scale = Vec2::new(dt / grid.dx(), dt / grid.dy());
    let max = Vec2::new((grid.nx() - 1) as f32, (grid.ny() - 1) as f32);

    for &(row, col) in grid.inner_fluid_cells() {
        let vel = Vec2::new(u[(row, col)], v[(row, col)]);
        if !vel.is_finite() {
            field[(row, col)] = f32::NAN;
            continue;
        }

        let p = (Vec2::new(col as f32, row as f32) - vel * scale).clamp(Vec2::ZERO, max);

        field[(row, col)] = sample_bilinear(&source, p);
    }
}

/// Bilinearly interpolates `field` at a fractional `(x, y) = (col, row)` index.
///
/// `p` must lie within `[0, nx - 1] x [0, ny - 1]`.
#[inline]
pub fn sample_bilinear(field: &Array2<f32>, p: Vec2) -> f32 {
    let (ny, nx) = field.dim();

    let p0 = p.floor();
    let t = p - p0;
    let s = 1.0 - t;

    let x0 = p0.x as usize;
    let y0 = p0.y as usize;
    let x1 = (x0 + 1).min(nx - 1);
    let y1 = (y0 + 1).min(ny - 1);

    s.y * (s.x * field[(y0, x0)] + t.x * field[(y0, x1)])
        + t.y * (s.x * field[(y1, x0)] + t.x * field[(y1, x1)])
}
