//! Camera and per-frame ray generation
//!
//! The camera produces a [`FrustumBasis`] once per frame: the four corner
//! directions of the view frustum in camera space plus the camera-to-world
//! transform. Every pixel ray is a bilinear blend of those corners.

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Smallest and largest usable vertical field of view, in degrees
const FOV_LIMITS: (f32, f32) = (0.01, 179.0);

/// A look-at camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Point the camera is looking at
    pub target: Vec3,
    /// Up vector (usually Y-up)
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Aspect ratio (width / height), taken from the output size
    #[serde(skip, default = "default_aspect")]
    pub aspect: f32,
}

fn default_aspect() -> f32 {
    16.0 / 9.0
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, -6.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 60.0,
            aspect: default_aspect(),
        }
    }
}

impl Camera {
    /// Create a camera looking at a target from a position
    pub fn look_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Default::default()
        }
    }

    /// Set the aspect ratio from an output resolution
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
        self
    }

    /// Camera-to-world transform (camera looks down its local -Z)
    pub fn camera_to_world(&self) -> Mat4 {
        let up = if self.forward().cross(self.up).length_squared() > f32::EPSILON {
            self.up
        } else {
            // Looking straight along `up`; any perpendicular vector will do
            self.forward().any_orthogonal_vector()
        };
        Mat4::look_at_rh(self.position, self.target, up).inverse()
    }

    /// Get the forward direction (normalized)
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Z)
    }

    /// Get distance from camera to target
    pub fn distance(&self) -> f32 {
        (self.position - self.target).length()
    }

    /// Orbit around the target point
    ///
    /// - `delta_x`: Horizontal rotation in radians (positive = rotate right)
    /// - `delta_y`: Vertical rotation in radians (positive = rotate up)
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        let radius = self.distance();
        if radius <= f32::EPSILON {
            return;
        }

        // Get spherical coordinates
        let offset = self.position - self.target;
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-0.999, 0.999).acos();

        theta -= delta_x;
        phi = (phi - delta_y).clamp(0.01, std::f32::consts::PI - 0.01);

        // Convert back to cartesian
        self.position = self.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
    }

    /// Frame a bounding box (adjust camera to see the entire object)
    pub fn frame_bounds(&mut self, min: Vec3, max: Vec3, padding: f32) {
        let center = (min + max) * 0.5;
        let size = (max - min).max_element();
        let half_fov = (self.fov.clamp(FOV_LIMITS.0, FOV_LIMITS.1) * 0.5).to_radians();
        let distance = (size * 0.5 * (1.0 + padding)) / half_fov.tan();

        let dir = (self.position - self.target)
            .try_normalize()
            .unwrap_or(Vec3::new(0.0, 0.5, -1.0).normalize());
        self.target = center;
        self.position = center + dir * distance;
    }

    /// Build this frame's ray basis
    pub fn frustum_basis(&self) -> FrustumBasis {
        FrustumBasis::new(self.fov, self.aspect, self.camera_to_world())
    }
}

/// A world-space ray with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.try_normalize().unwrap_or(Vec3::NEG_Z),
        }
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Frustum corner directions (camera space) plus the camera-to-world transform.
///
/// Immutable for the duration of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumBasis {
    pub top_left: Vec3,
    pub top_right: Vec3,
    pub bottom_right: Vec3,
    pub bottom_left: Vec3,
    pub camera_to_world: Mat4,
}

impl FrustumBasis {
    /// Corners for a vertical `fov` in degrees and `aspect` = width / height.
    ///
    /// Out-of-range field of view values are clamped into (0, 180).
    pub fn new(fov: f32, aspect: f32, camera_to_world: Mat4) -> Self {
        let fov = if fov.is_finite() { fov } else { 60.0 };
        let half_height = (fov.clamp(FOV_LIMITS.0, FOV_LIMITS.1) * 0.5)
            .to_radians()
            .tan();
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };

        let go_up = Vec3::Y * half_height;
        let go_right = Vec3::X * half_height * aspect;
        let forward = Vec3::NEG_Z;

        Self {
            top_left: forward - go_right + go_up,
            top_right: forward + go_right + go_up,
            bottom_right: forward + go_right - go_up,
            bottom_left: forward - go_right - go_up,
            camera_to_world,
        }
    }

    /// Corners as matrix rows: top-left, top-right, bottom-right, bottom-left
    pub fn frustum_matrix(&self) -> Mat4 {
        Mat4::from_cols(
            self.top_left.extend(0.0),
            self.top_right.extend(0.0),
            self.bottom_right.extend(0.0),
            self.bottom_left.extend(0.0),
        )
        .transpose()
    }

    /// Camera position in world space
    pub fn origin(&self) -> Vec3 {
        self.camera_to_world.transform_point3(Vec3::ZERO)
    }

    /// Ray through normalized screen coordinates.
    ///
    /// `u` runs left to right and `v` bottom to top, both in `[0, 1]`.
    pub fn ray(&self, u: f32, v: f32) -> Ray {
        let bottom = self.bottom_left.lerp(self.bottom_right, u);
        let top = self.top_left.lerp(self.top_right, u);
        let local = bottom.lerp(top, v);

        let world = self.camera_to_world * Vec4::from((local, 0.0));
        Ray::new(self.origin(), world.truncate())
    }

    /// Ray through the center of pixel (`x`, `y`), with row 0 at the top
    pub fn pixel_ray(&self, x: u32, y: u32, width: u32, height: u32) -> Ray {
        let u = (x as f32 + 0.5) / width.max(1) as f32;
        let v = 1.0 - (y as f32 + 0.5) / height.max(1) as f32;
        self.ray(u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn corners_match_perspective_frustum() {
        let basis = FrustumBasis::new(90.0, 2.0, Mat4::IDENTITY);
        // tan(45deg) = 1, so half height 1 and half width 2
        assert_relative_eq!(basis.top_left.x, -2.0, epsilon = 1e-5);
        assert_relative_eq!(basis.top_left.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(basis.top_left.z, -1.0, epsilon = 1e-5);
        assert_relative_eq!(basis.bottom_right.x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(basis.bottom_right.y, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn frustum_matrix_rows_are_corners() {
        let basis = FrustumBasis::new(60.0, 1.5, Mat4::IDENTITY);
        let m = basis.frustum_matrix();
        assert_eq!(m.row(0).truncate(), basis.top_left);
        assert_eq!(m.row(1).truncate(), basis.top_right);
        assert_eq!(m.row(2).truncate(), basis.bottom_right);
        assert_eq!(m.row(3).truncate(), basis.bottom_left);
    }

    #[test]
    fn center_ray_points_forward() {
        let camera = Camera::look_at(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO);
        let ray = camera.frustum_basis().ray(0.5, 0.5);
        assert_relative_eq!(ray.origin.z, -5.0, epsilon = 1e-5);
        assert_relative_eq!(ray.direction.z, 1.0, epsilon = 1e-5);
        assert_relative_eq!(ray.direction.length(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn corner_rays_span_the_frustum() {
        let camera = Camera {
            fov: 90.0,
            aspect: 1.0,
            ..Camera::look_at(Vec3::ZERO, Vec3::NEG_Z)
        };
        let basis = camera.frustum_basis();

        let top_left = basis.ray(0.0, 1.0).direction;
        let expected = Vec3::new(-1.0, 1.0, -1.0).normalize();
        assert_relative_eq!(top_left.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(top_left.y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(top_left.z, expected.z, epsilon = 1e-5);

        let bottom_right = basis.ray(1.0, 0.0).direction;
        assert!(bottom_right.x > 0.0 && bottom_right.y < 0.0);
    }

    #[test]
    fn pixel_rows_run_top_to_bottom() {
        let basis = Camera::default().with_resolution(4, 4).frustum_basis();
        let top = basis.pixel_ray(2, 0, 4, 4);
        let bottom = basis.pixel_ray(2, 3, 4, 4);
        assert!(top.direction.y > bottom.direction.y);
    }

    #[test]
    fn degenerate_fov_is_clamped() {
        let basis = FrustumBasis::new(0.0, 1.0, Mat4::IDENTITY);
        assert!(basis.top_left.is_finite());
        let basis = FrustumBasis::new(360.0, 1.0, Mat4::IDENTITY);
        assert!(basis.top_left.is_finite());
    }

    #[test]
    fn camera_looking_straight_down_is_valid() {
        let camera = Camera::look_at(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO);
        let ray = camera.frustum_basis().ray(0.5, 0.5);
        assert!(ray.direction.is_finite());
        assert_relative_eq!(ray.direction.y, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut camera = Camera::default();
        let initial_distance = camera.distance();

        camera.orbit(0.7, 0.0);

        assert!((camera.distance() - initial_distance).abs() < 0.001);
        assert_ne!(camera.position, Camera::default().position);
    }

    #[test]
    fn frame_bounds_targets_center() {
        let mut camera = Camera::default();
        camera.frame_bounds(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 3.0, 3.0), 0.2);
        assert_eq!(camera.target, Vec3::splat(2.0));
        assert!(camera.distance() > 1.0);
    }
}
