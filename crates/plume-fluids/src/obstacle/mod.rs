use glam::Vec2;
use ndarray::Array2;

use crate::grid::Grid;

pub mod circle;
pub mod rectangle;

/// A solid region of the domain, described by its signed distance function.
pub trait Obstacle {
    /// Signed distance from `p` to the surface of the obstacle, negative inside.
    fn sdf(&self, p: Vec2) -> f32;
}

#[derive(Default)]
pub struct ObstacleSet {
    pub obstacles: Vec<Box<dyn Obstacle>>,
}

impl ObstacleSet {
    pub fn new(obstacles: Vec<Box<dyn Obstacle>>) -> Self {
        ObstacleSet {
            obstacles,
        }
    }

    /// Adds an obstacle to the set.
    pub fn push<T: Obstacle + 'static>(&mut self, obstacle: T) {
        self.obstacles.push(Box::new(obstacle));
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Marks every cell of `walls` whose centre lies inside one of the obstacles.
    pub fn stamp(&self, grid: &Grid, walls: &mut Array2<bool>) {
        if self.is_empty() {
            return;
        }

        for ((row, col), solid) in walls.indexed_iter_mut() {
            if self.sdf(grid.cell_center(row, col)) < 0.0 {
                *solid = true;
            }
        }
    }
}

impl Obstacle for ObstacleSet {
    fn sdf(&self, p: Vec2) -> f32 {
        self.obstacles
            .iter()
            .map(|obstacle| obstacle.sdf(p))
            .fold(f32::MAX, f32::min)
    }
}

#[cfg(test)]
mod tests {
    use super::{circle::Circle, rectangle::Rectangle, *};

    #[test]
    fn empty_set_is_everywhere_outside() {
        let set = ObstacleSet::default();
        assert_eq!(set.sdf(Vec2::ZERO), f32::MAX);
    }

    #[test]
    fn union_takes_nearest_surface() {
        let mut set = ObstacleSet::default();
        set.push(Circle::new(Vec2::new(0.0, 0.0), 1.0));
        set.push(Circle::new(Vec2::new(10.0, 0.0), 2.0));

        assert_eq!(set.sdf(Vec2::new(0.0, 0.0)), -1.0);
        assert_eq!(set.sdf(Vec2::new(7.0, 0.0)), 1.0);
    }

    #[test]
    fn stamp_marks_covered_cell_centres() {
        let grid = Grid::new(6.0, 6.0, 1.0, None).unwrap();
        let mut walls = Array2::from_elem(grid.dim(), false);

        let mut set = ObstacleSet::default();
        set.push(Rectangle::new(Vec2::new(2.0, 1.0), Vec2::new(4.0, 2.0)));
        set.stamp(&grid, &mut walls);

        let marked: Vec<_> = walls
            .indexed_iter()
            .filter(|&(_, &solid)| solid)
            .map(|(idx, _)| idx)
            .collect();

        assert_eq!(marked, vec![(1, 2), (1, 3)]);
    }
}
