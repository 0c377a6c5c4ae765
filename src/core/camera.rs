//! Camera pose for view-driven tessellation
//!
//! The engine only consumes a position and a viewing direction; projection
//! and rasterization belong to the host. The pose is kept as a quaternion
//! so hosts can feed it from whatever controller they render with.

use crate::core::types::{Mat3, Quat, Vec3};

/// Camera with position and orientation
pub struct Camera {
    /// World position
    pub position: Vec3,
    /// Rotation as quaternion
    pub rotation: Quat,
}

impl Camera {
    /// Create a new camera at a position, looking down -Z
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Create camera looking at a target
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - position).normalize_or(-Vec3::Z);
        // A vertical view has no well-defined up; fall back to world Z.
        let up = if forward.dot(up).abs() > 0.999 { Vec3::Z } else { up };
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        let rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward));

        Self { position, rotation }
    }

    /// Re-pose the camera from a position and viewing direction
    pub fn set_pose(&mut self, position: Vec3, forward: Vec3) {
        *self = Self::look_at(position, position + forward, Vec3::Y);
    }

    /// Get forward direction (negative Z in camera space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get right direction (positive X in camera space)
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get up direction (positive Y in camera space)
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directions() {
        let camera = Camera::default();

        // Default camera looks down -Z
        let forward = camera.forward();
        assert!((forward.z - (-1.0)).abs() < 0.001);

        let right = camera.right();
        assert!((right.x - 1.0).abs() < 0.001);

        let up = camera.up();
        assert!((up.y - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_look_at_forward() {
        let camera = Camera::look_at(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::Y);
        let forward = camera.forward();
        assert!((forward - Vec3::X).length() < 0.001);
    }

    #[test]
    fn test_straight_down_pose() {
        let mut camera = Camera::default();
        camera.set_pose(Vec3::new(64.0, 200.0, 64.0), Vec3::new(0.0, -1.0, 0.0));

        let forward = camera.forward();
        assert!((forward - Vec3::new(0.0, -1.0, 0.0)).length() < 0.001);
        assert!(forward.is_finite());
    }

    #[test]
    fn test_set_pose_normalizes() {
        let mut camera = Camera::default();
        camera.set_pose(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0));
        assert!((camera.forward() - Vec3::new(0.0, 0.0, -1.0)).length() < 0.001);
    }
}
