use glam::Vec2;

use super::Obstacle;

#[derive(Debug, Clone, Copy)]
pub struct Circle {
    pub position: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Circle {
            position: pos,
            radius,
        }
    }
}

impl Obstacle for Circle {
    fn sdf(&self, p: Vec2) -> f32 {
        (p - self.position).length() - self.radius
    }
}
