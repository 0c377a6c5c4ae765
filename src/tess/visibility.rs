//! Patch visibility
//!
//! The engine culls with a camera-forward half-space test on the ground
//! plane rather than a true frustum: a patch is visible when its center is
//! not behind the camera heading. This overestimates visibility, which is
//! acceptable because invisible patches do no per-frame work beyond this
//! check.

use glam::Vec2;

use crate::core::camera::Camera;

/// Whether a patch centered at `center` (ground-plane coordinates) is worth
/// tessellating for this camera
pub fn patch_in_view(center: Vec2, camera: &Camera) -> bool {
    let forward = camera.forward();
    let heading = Vec2::new(forward.x, forward.z);
    // Looking straight up or down leaves no ground heading; keep everything.
    if heading.length_squared() < 1e-6 {
        return true;
    }

    let eye = Vec2::new(camera.position.x, camera.position.z);
    heading.dot(center - eye) >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_ahead_is_visible() {
        let mut camera = Camera::default();
        camera.set_pose(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(patch_in_view(Vec2::new(0.0, 50.0), &camera));
        assert!(!patch_in_view(Vec2::new(0.0, -50.0), &camera));
    }

    #[test]
    fn test_side_is_visible() {
        let mut camera = Camera::default();
        camera.set_pose(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        // Exactly abeam counts as visible.
        assert!(patch_in_view(Vec2::new(0.0, 30.0), &camera));
    }

    #[test]
    fn test_straight_down_sees_everything() {
        let mut camera = Camera::default();
        camera.set_pose(Vec3::new(64.0, 200.0, 64.0), Vec3::new(0.0, -1.0, 0.0));
        assert!(patch_in_view(Vec2::new(0.0, 0.0), &camera));
        assert!(patch_in_view(Vec2::new(500.0, 500.0), &camera));
    }
}
