use glam::Vec2;
use ndarray::{Array2, ArrayView2};

use crate::error::ConfigError;

/// Largest number of cells a grid may hold.
pub const MAX_CELLS: usize = 1 << 26;

/// Cell-centred rectangular lattice with a solid/fluid mask.
///
/// Arrays defined on the grid have shape `(ny, nx)` and are indexed `(row, col)`, where the
/// row is the Y index and the column is the X index.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Size of the domain, in meters.
    size: Vec2,
    /// Requested cell size. The actual spacing is derived from it.
    base_size: f32,
    /// Number of cells in the X direction.
    nx: usize,
    /// Number of cells in the Y direction.
    ny: usize,
    /// Cell spacing in the X direction.
    dx: f32,
    /// Cell spacing in the Y direction.
    dy: f32,

    /// Solid grid cells.
    walls: Array2<bool>,
    /// Every solid cell.
    wall_cells: Vec<(usize, usize)>,
    /// Every fluid cell.
    fluid_cells: Vec<(usize, usize)>,
    /// Fluid cells with a full 4-neighbourhood, i.e. excluding the outer ring.
    inner_fluid_cells: Vec<(usize, usize)>,
}

impl Grid {
    pub fn new(
        width: f32,
        height: f32,
        base_size: f32,
        walls: Option<Array2<bool>>,
    ) -> Result<Self, ConfigError> {
        positive("domain.width", width)?;
        positive("domain.height", height)?;
        positive("domain.base_size", base_size)?;

        let cols = (width / base_size).ceil();
        let rows = (height / base_size).ceil();
        if cols as f64 * rows as f64 > MAX_CELLS as f64 {
            return Err(ConfigError::TooManyCells {
                cols,
                rows,
                max: MAX_CELLS,
            });
        }

        let nx = cols as usize;
        let ny = rows as usize;

        let grid = Self {
            size: Vec2::new(width, height),
            base_size,
            nx,
            ny,
            dx: width / nx as f32,
            dy: height / ny as f32,
            walls: Array2::from_elem((ny, nx), false),
            wall_cells: vec![],
            fluid_cells: vec![],
            inner_fluid_cells: vec![],
        };

        match walls {
            Some(walls) => grid.with_walls(walls),
            None => Ok(grid.indexed()),
        }
    }

    /// Replaces the wall mask, rebuilding every index set derived from it.
    pub fn with_walls(mut self, walls: Array2<bool>) -> Result<Self, ConfigError> {
        if walls.dim() != (self.ny, self.nx) {
            return Err(ConfigError::MaskShape {
                expected: (self.ny, self.nx),
                found: walls.dim(),
            });
        }

        self.walls = walls;
        Ok(self.indexed())
    }

    fn indexed(mut self) -> Self {
        self.wall_cells.clear();
        self.fluid_cells.clear();
        self.inner_fluid_cells.clear();

        for ((row, col), &solid) in self.walls.indexed_iter() {
            if solid {
                self.wall_cells.push((row, col));
                continue;
            }

            self.fluid_cells.push((row, col));

            if row > 0 && col > 0 && row + 1 < self.ny && col + 1 < self.nx {
                self.inner_fluid_cells.push((row, col));
            }
        }

        self
    }

    #[inline(always)]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline(always)]
    pub fn base_size(&self) -> f32 {
        self.base_size
    }

    #[inline(always)]
    pub fn nx(&self) -> usize {
        self.nx
    }

    #[inline(always)]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Array shape, `(ny, nx)`.
    #[inline(always)]
    pub fn dim(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    #[inline(always)]
    pub fn dx(&self) -> f32 {
        self.dx
    }

    #[inline(always)]
    pub fn dy(&self) -> f32 {
        self.dy
    }

    /// Whether the derived spacings agree to within rounding.
    pub fn is_square(&self) -> bool {
        (self.dx - self.dy).abs() <= 4.0 * f32::EPSILON * self.dx.max(self.dy)
    }

    pub fn walls(&self) -> ArrayView2<'_, bool> {
        self.walls.view()
    }

    pub fn wall_cells(&self) -> &[(usize, usize)] {
        &self.wall_cells
    }

    pub fn fluid_cells(&self) -> &[(usize, usize)] {
        &self.fluid_cells
    }

    pub fn inner_fluid_cells(&self) -> &[(usize, usize)] {
        &self.inner_fluid_cells
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.ny && col < self.nx
    }

    /// Whether `(row, col)` is a wall. Cells outside the grid are not.
    #[inline]
    pub fn is_wall(&self, row: usize, col: usize) -> bool {
        self.walls.get((row, col)).copied().unwrap_or(false)
    }

    /// Position of the centre of a cell, in meters.
    #[inline]
    pub fn cell_center(&self, row: usize, col: usize) -> Vec2 {
        Vec2::new((col as f32 + 0.5) * self.dx, (row as f32 + 0.5) * self.dy)
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn cell_counts_round_up() {
        let grid = Grid::new(10.0, 7.5, 2.0, None).unwrap();

        assert_eq!(grid.nx(), 5);
        assert_eq!(grid.ny(), 4);
        assert_eq!(grid.dim(), (4, 5));
        assert_relative_eq!(grid.dx(), 2.0);
        assert_relative_eq!(grid.dy(), 1.875);
        assert!(!grid.is_square());
    }

    #[test]
    fn all_fluid_index_sets() {
        let grid = Grid::new(10.0, 10.0, 1.0, None).unwrap();

        assert!(grid.wall_cells().is_empty());
        assert_eq!(grid.fluid_cells().len(), 100);
        assert_eq!(grid.inner_fluid_cells().len(), 64);
        assert!(grid.is_square());

        for &(row, col) in grid.inner_fluid_cells() {
            assert!((1..9).contains(&row));
            assert!((1..9).contains(&col));
        }
    }

    #[test]
    fn walls_are_excluded_from_fluid_sets() {
        let mut walls = Array2::from_elem((5, 5), false);
        walls[(2, 2)] = true;
        walls[(0, 1)] = true;

        let grid = Grid::new(5.0, 5.0, 1.0, Some(walls)).unwrap();

        assert_eq!(grid.wall_cells(), &[(0, 1), (2, 2)]);
        assert_eq!(grid.fluid_cells().len(), 23);
        assert_eq!(grid.inner_fluid_cells().len(), 8);
        assert!(!grid.inner_fluid_cells().contains(&(2, 2)));
        assert!(grid.is_wall(2, 2));
        assert!(!grid.is_wall(7, 7));
    }

    #[test]
    fn narrow_grid_has_no_inner_cells() {
        let grid = Grid::new(2.0, 8.0, 1.0, None).unwrap();

        assert_eq!(grid.fluid_cells().len(), 16);
        assert!(grid.inner_fluid_cells().is_empty());
    }

    #[test]
    fn rejects_non_positive_geometry() {
        assert!(matches!(
            Grid::new(0.0, 1.0, 0.1, None),
            Err(ConfigError::NotPositive { name: "domain.width", .. })
        ));
        assert!(matches!(
            Grid::new(1.0, -1.0, 0.1, None),
            Err(ConfigError::NotPositive { name: "domain.height", .. })
        ));
        assert!(matches!(
            Grid::new(1.0, 1.0, f32::NAN, None),
            Err(ConfigError::NotPositive { name: "domain.base_size", .. })
        ));
    }

    #[test]
    fn rejects_oversized_grids() {
        assert!(matches!(
            Grid::new(1e30, 1.0, 1e-6, None),
            Err(ConfigError::TooManyCells { max: MAX_CELLS, .. })
        ));
        assert!(matches!(
            Grid::new(1e30, 1e30, 1e-30, None),
            Err(ConfigError::TooManyCells { .. })
        ));
        assert!(matches!(
            Grid::new(8192.0, 8193.0, 1.0, None),
            Err(ConfigError::TooManyCells { .. })
        ));
    }

    #[test]
    fn rejects_mismatched_mask() {
        let walls = Array2::from_elem((3, 4), false);

        assert!(matches!(
            Grid::new(3.0, 3.0, 1.0, Some(walls)),
            Err(ConfigError::MaskShape { expected: (3, 3), found: (3, 4) })
        ));
    }

    #[test]
    fn cell_centers() {
        let grid = Grid::new(4.0, 2.0, 0.5, None).unwrap();

        assert_eq!(grid.cell_center(0, 0), Vec2::new(0.25, 0.25));
        assert_eq!(grid.cell_center(3, 7), Vec2::new(3.75, 1.75));
    }
}
