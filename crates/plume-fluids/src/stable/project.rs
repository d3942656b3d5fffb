use ndarray::Array2;

use crate::grid::Grid;

/// Central-difference divergence of `(u, v)` at every inner fluid cell, zero elsewhere.
///
/// Square cells use `0.5·(Δu + Δv)` with no division by the spacing, which is the scaling the
/// pressure correction in [`project`] is built around. Non-square cells weight each difference
/// by the aspect ratio so that both forms agree when `dx == dy`.
pub fn divergence(u: &Array2<f32>, v: &Array2<f32>, grid: &Grid) -> Array2<f32> {
    let mut div = Array2::zeros(grid.dim());
    let (dx, dy) = (grid.dx(), grid.dy());
    let square = grid.is_square();

    for &(row, col) in grid.inner_fluid_cells() {
        let du = u[(row, col + 1)] - u[(row, col - 1)];
        let dv = v[(row + 1, col)] - v[(row - 1, col)];

        div[(row, col)] = if square {
            0.5 * (du + dv)
        } else {
            0.5 * (du * dy / dx + dv * dx / dy)
        };
    }

    div
}

/// Removes (most of) the divergence of `(u, v)` by subtracting a pressure gradient.
///
/// The divergence of the incoming velocity is computed once and held fixed while `nit` Jacobi
/// sweeps relax `p`. Pressure is zeroed on walls and otherwise warm-started from its previous
/// contents.
pub fn project(u: &mut Array2<f32>, v: &mut Array2<f32>, p: &mut Array2<f32>, grid: &Grid, nit: usize) {
    for &idx in grid.wall_cells() {
        p[idx] = 0.0;
    }

    let div = divergence(u, v, grid);

    let dx2 = grid.dx() * grid.dx();
    let dy2 = grid.dy() * grid.dy();
    let norm = 2.0 * (dx2 + dy2);

    let mut prev = p.clone();

    for _iter in 0..nit {
        prev.assign(p);

        for &(row, col) in grid.inner_fluid_cells() {
            let rhs = (prev[(row, col + 1)] + prev[(row, col - 1)]) * dy2
                + (prev[(row + 1, col)] + prev[(row - 1, col)]) * dx2;

            p[(row, col)] = (rhs - div[(row, col)]) / norm;
        }
    }

    for &(row, col) in grid.inner_fluid_cells() {
        u[(row, col)] -= 0.5 * (p[(row, col + 1)] - p[(row, col - 1)]);
        v[(row, col)] -= 0.5 * (p[(row + 1, col)] - p[(row - 1, col)]);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn norm(div: &Array2<f32>) -> f32 {
        div.iter().map(|d| d * d).sum::<f32>().sqrt()
    }

    fn swirl(grid: &Grid) -> (Array2<f32>, Array2<f32>) {
        let u = Array2::from_shape_fn(grid.dim(), |(row, col)| {
            let r2 = ((col as f32 - 11.5).powi(2) + (row as f32 - 11.5).powi(2)) / 16.0;
            (-r2).exp()
        });
        let v = Array2::from_shape_fn(grid.dim(), |(row, col)| {
            let r2 = ((col as f32 - 10.0).powi(2) + (row as f32 - 13.0).powi(2)) / 9.0;
            0.5 * (-r2).exp()
        });

        (u, v)
    }

    #[test]
    fn divergence_of_linear_field() {
        let grid = Grid::new(6.0, 6.0, 1.0, None).unwrap();
        let u = Array2::from_shape_fn(grid.dim(), |(_, col)| 2.0 * col as f32);
        let v = Array2::from_shape_fn(grid.dim(), |(row, _)| -0.5 * row as f32);

        let div = divergence(&u, &v, &grid);

        for &idx in grid.inner_fluid_cells() {
            assert_relative_eq!(div[idx], 0.5 * (4.0 - 1.0));
        }
        assert_eq!(div[(0, 3)], 0.0);
        assert_eq!(div[(5, 5)], 0.0);
    }

    #[test]
    fn non_square_divergence_weights_by_aspect() {
        let grid = Grid::new(4.0, 2.5, 1.0, None).unwrap();
        let (dx, dy) = (grid.dx(), grid.dy());
        assert!(!grid.is_square());
        assert_relative_eq!(dy, 2.5 / 3.0);

        let u = Array2::from_shape_fn(grid.dim(), |(_, col)| col as f32);
        let v = Array2::from_shape_fn(grid.dim(), |(row, _)| row as f32);
        let div = divergence(&u, &v, &grid);

        assert_relative_eq!(div[(1, 1)], 0.5 * (2.0 * dy / dx + 2.0 * dx / dy), max_relative = 1e-6);
    }

    #[test]
    fn projection_reduces_divergence() {
        let grid = Grid::new(24.0, 24.0, 1.0, None).unwrap();

        for nit in [1, 5, 20] {
            let (mut u, mut v) = swirl(&grid);
            let mut p = Array2::zeros(grid.dim());

            let before = norm(&divergence(&u, &v, &grid));
            project(&mut u, &mut v, &mut p, &grid, nit);
            let after = norm(&divergence(&u, &v, &grid));

            assert!(after < before, "nit = {nit}: {after} >= {before}");
        }
    }

    #[test]
    fn more_iterations_remove_more_divergence() {
        let grid = Grid::new(24.0, 24.0, 1.0, None).unwrap();

        let residual = |nit| {
            let (mut u, mut v) = swirl(&grid);
            let mut p = Array2::zeros(grid.dim());
            project(&mut u, &mut v, &mut p, &grid, nit);
            norm(&divergence(&u, &v, &grid))
        };

        assert!(residual(20) < residual(5));
        assert!(residual(50) < residual(20));
    }

    #[test]
    fn divergence_free_field_is_untouched() {
        let grid = Grid::new(8.0, 8.0, 1.0, None).unwrap();
        let mut u = Array2::from_elem(grid.dim(), 1.5);
        let mut v = Array2::from_elem(grid.dim(), -0.5);
        let mut p = Array2::zeros(grid.dim());

        project(&mut u, &mut v, &mut p, &grid, 10);

        assert!(u.iter().all(|&x| x == 1.5));
        assert!(v.iter().all(|&x| x == -0.5));
        assert!(p.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn pressure_is_zeroed_on_walls() {
        let mut walls = Array2::from_elem((8, 8), false);
        walls[(4, 4)] = true;
        let grid = Grid::new(8.0, 8.0, 1.0, Some(walls)).unwrap();

        let (mut u, mut v) = (Array2::zeros(grid.dim()), Array2::zeros(grid.dim()));
        u[(3, 5)] = 1.0;
        let mut p = Array2::from_elem(grid.dim(), 3.0);

        project(&mut u, &mut v, &mut p, &grid, 5);

        assert_eq!(p[(4, 4)], 0.0);
        assert_eq!(p[(0, 0)], 3.0);
    }
}
