//! Loss detection
//!
//! A piece that has settled past the loss line ends the run. Pieces merely passing
//! through the line while still moving do not count.

use glam::Vec2;

use super::physics::{InstanceHandle, PhysicsWorld};

#[derive(Debug, Clone, Copy)]
pub struct LossDetector {
    rest_speed_threshold: f32,
}

impl LossDetector {
    pub fn new(rest_speed_threshold: f32) -> Self {
        Self {
            rest_speed_threshold,
        }
    }

    /// Settled and past the line (pieces grow from the ceiling toward larger y)
    pub fn is_stuck(&self, position: Vec2, speed: f32, loss_line_y: f32) -> bool {
        position.y > loss_line_y && speed < self.rest_speed_threshold
    }

    /// First stuck piece, scanning in the given order
    pub fn find_stuck(
        &self,
        pieces: impl IntoIterator<Item = InstanceHandle>,
        world: &dyn PhysicsWorld,
        loss_line_y: f32,
    ) -> Option<InstanceHandle> {
        pieces.into_iter().find(|&handle| {
            match (world.position(handle), world.speed(handle)) {
                (Some(pos), Some(speed)) => self.is_stuck(pos, speed, loss_line_y),
                _ => false,
            }
        })
    }
}
