use glam::Vec2;

use super::Obstacle;

/// Axis-aligned box spanning `min..max`.
#[derive(Debug, Clone, Copy)]
pub struct Rectangle {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rectangle {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Rectangle {
            min,
            max,
        }
    }
}

impl Obstacle for Rectangle {
    fn sdf(&self, p: Vec2) -> f32 {
        let center = 0.5 * (self.min + self.max);
        let half = 0.5 * (self.max - self.min);
        let q = (p - center).abs() - half;

        q.max(Vec2::ZERO).length() + q.max_element().min(0.0)
    }
}
