//! SDF Primitive shapes
//!
//! Unlike origin-centered building blocks, every primitive here carries its own
//! world-space placement, so a scene entry can be configured directly from
//! its center and size.

use super::{Aabb, Sdf};
use glam::{Vec2, Vec3};

/// Sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Sdf for Sphere {
    fn distance(&self, p: Vec3) -> f32 {
        (p - self.center).length() - self.radius
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_center(self.center, Vec3::splat(self.radius.max(0.0)))
    }
}

/// Axis-aligned box with rounded edges.
///
/// `radius` is clamped to the smallest half-extent, and a radius of zero is a
/// plain box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub radius: f32,
}

impl RoundedBox {
    pub fn new(center: Vec3, half_extents: Vec3, radius: f32) -> Self {
        Self {
            center,
            half_extents,
            radius,
        }
    }
}

impl Sdf for RoundedBox {
    fn distance(&self, p: Vec3) -> f32 {
        let h = self.half_extents.max(Vec3::ZERO);
        let r = self.radius.clamp(0.0, h.min_element());
        let q = (p - self.center).abs() - h + Vec3::splat(r);
        q.max(Vec3::ZERO).length() + q.x.max(q.y.max(q.z)).min(0.0) - r
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_center(self.center, self.half_extents.max(Vec3::ZERO))
    }
}

/// Torus (donut) lying in the XZ plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torus {
    pub center: Vec3,
    pub major_radius: f32,
    pub minor_radius: f32,
}

impl Torus {
    pub fn new(center: Vec3, major_radius: f32, minor_radius: f32) -> Self {
        Self {
            center,
            major_radius,
            minor_radius,
        }
    }
}

impl Sdf for Torus {
    fn distance(&self, p: Vec3) -> f32 {
        let p = p - self.center;
        let q = Vec2::new(Vec2::new(p.x, p.z).length() - self.major_radius, p.y);
        q.length() - self.minor_radius
    }

    fn bounds(&self) -> Aabb {
        let r = self.major_radius + self.minor_radius;
        Aabb::from_center(self.center, Vec3::new(r, self.minor_radius, r))
    }
}

/// Infinite plane. Points on the side the normal faces are outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub offset: f32,
}

impl Plane {
    pub fn new(normal: Vec3, offset: f32) -> Self {
        Self {
            normal: normal.try_normalize().unwrap_or(Vec3::Y),
            offset,
        }
    }
}

impl Sdf for Plane {
    fn distance(&self, p: Vec3) -> f32 {
        p.dot(self.normal) - self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sphere_distance_is_offset_by_center() {
        let s = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 0.5);
        assert_relative_eq!(s.distance(Vec3::new(1.0, 2.0, 3.0)), -0.5, epsilon = 1e-6);
        assert_relative_eq!(s.distance(Vec3::new(1.0, 2.0, 5.0)), 1.5, epsilon = 1e-6);
    }

    #[test]
    fn sharp_box_matches_face_distance() {
        let b = RoundedBox::new(Vec3::ZERO, Vec3::splat(1.0), 0.0);
        assert_relative_eq!(b.distance(Vec3::new(3.0, 0.0, 0.0)), 2.0, epsilon = 1e-6);
        assert_relative_eq!(b.distance(Vec3::ZERO), -1.0, epsilon = 1e-6);
    }

    #[test]
    fn rounded_box_keeps_face_position() {
        let b = RoundedBox::new(Vec3::ZERO, Vec3::splat(1.0), 0.25);
        // Faces stay where they were, only the corners are pulled in
        assert_relative_eq!(b.distance(Vec3::new(1.0, 0.0, 0.0)), 0.0, epsilon = 1e-6);
        let corner = Vec3::splat(1.0);
        assert!(b.distance(corner) > 0.0);
    }

    #[test]
    fn rounded_box_radius_is_clamped() {
        // An oversized radius degrades to a sphere-like shape, never a NaN
        let b = RoundedBox::new(Vec3::ZERO, Vec3::splat(0.5), 10.0);
        let d = b.distance(Vec3::new(2.0, 0.0, 0.0));
        assert!(d.is_finite());
        assert_relative_eq!(d, 1.5, epsilon = 1e-6);
    }

    #[test]
    fn torus_surface_points() {
        let t = Torus::new(Vec3::ZERO, 1.0, 0.25);
        assert_relative_eq!(t.distance(Vec3::new(1.25, 0.0, 0.0)), 0.0, epsilon = 1e-6);
        assert_relative_eq!(t.distance(Vec3::ZERO), 0.75, epsilon = 1e-6);
    }

    #[test]
    fn plane_normalizes_and_offsets() {
        let p = Plane::new(Vec3::new(0.0, 2.0, 0.0), -1.0);
        assert_relative_eq!(p.distance(Vec3::ZERO), 1.0, epsilon = 1e-6);
        assert_relative_eq!(p.distance(Vec3::new(5.0, -1.0, 3.0)), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_plane_normal_falls_back_to_up() {
        let p = Plane::new(Vec3::ZERO, 0.0);
        assert_eq!(p.normal, Vec3::Y);
    }

    #[test]
    fn sphere_bounds_contain_surface() {
        let s = Sphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        let b = s.bounds();
        assert!(b.contains(Vec3::new(3.0, 0.0, 0.0)));
        assert!(!b.contains(Vec3::new(3.5, 0.0, 0.0)));
    }
}
