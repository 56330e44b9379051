//! Visible-rectangle bounds at the play plane
//!
//! The play area scales with the window: each tick the host recomputes the
//! half-extents from the camera's vertical field of view and aspect ratio,
//! so aiming and spawning always cover exactly what is on screen.

use glam::Vec2;

/// Half-extents of the visible rectangle at z = 0, in view-space units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub half_width: f32,
    pub half_height: f32,
}

impl Viewport {
    /// Compute from a perspective camera sitting at `camera_z` looking at the
    /// origin: visible height = 2 * tan(fov/2) * distance.
    pub fn from_camera(fov_y_deg: f32, aspect: f32, camera_z: f32) -> Self {
        let half_fov = fov_y_deg.to_radians() / 2.0;
        let half_height = half_fov.tan() * camera_z;
        Self {
            half_width: half_height * aspect,
            half_height,
        }
    }

    /// Aim target in world units for a normalized [-1, 1] pointer position,
    /// padded inward so the ship never clips the screen edge.
    pub fn aim_target(&self, aim: Vec2, padding: f32) -> Vec2 {
        Vec2::new(
            aim.x * (self.half_width - padding),
            aim.y * (self.half_height - padding),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_extents_follow_fov() {
        let vp = Viewport::from_camera(90.0, 2.0, 10.0);
        // tan(45 deg) == 1
        assert!((vp.half_height - 10.0).abs() < 1e-4);
        assert!((vp.half_width - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_wider_aspect_widens_only_x() {
        let narrow = Viewport::from_camera(75.0, 1.0, 12.0);
        let wide = Viewport::from_camera(75.0, 1.8, 12.0);
        assert_eq!(narrow.half_height, wide.half_height);
        assert!(wide.half_width > narrow.half_width);
    }

    #[test]
    fn test_aim_target_respects_padding() {
        let vp = Viewport::from_camera(90.0, 1.0, 10.0);
        let target = vp.aim_target(Vec2::new(1.0, -1.0), 2.0);
        assert!((target.x - 8.0).abs() < 1e-4);
        assert!((target.y + 8.0).abs() < 1e-4);
    }
}
