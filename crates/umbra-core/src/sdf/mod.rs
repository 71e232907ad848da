//! Signed distance fields used by the marcher
//!
//! A field maps a point to its signed distance from the nearest surface:
//! negative inside, positive outside, zero on the boundary.
//!
//! Every implementation here is a valid distance *bound* (Lipschitz ≤ 1),
//! which is what sphere tracing needs to never step through a surface.
//!
//! ## Example
//!
//! ```rust
//! use umbra_core::prelude::*;
//!
//! let ball = Sphere::new(Vec3::new(1.5, 0.0, 0.0), 1.0);
//!
//! assert!(ball.distance(Vec3::new(1.0, 0.0, 0.0)) < 0.0);
//! assert!(ball.bounds().contains(Vec3::new(2.5, 0.0, 0.0)));
//! ```

pub mod operations;
pub mod primitives;
pub mod transforms;

use glam::Vec3;

pub use primitives::*;

/// A signed distance field
pub trait Sdf: Send + Sync {
    /// Signed distance from `p` to the surface (negative inside)
    fn distance(&self, p: Vec3) -> f32;

    /// Get a conservative bounding box for this SDF.
    ///
    /// Used by the marcher to skip rays that cannot reach the surface.
    /// Unbounded shapes (planes, infinite repetition) return [`Aabb::INFINITE`].
    fn bounds(&self) -> Aabb {
        Aabb::INFINITE
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box covering all of space
    pub const INFINITE: Self = Self {
        min: Vec3::NEG_INFINITY,
        max: Vec3::INFINITY,
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Cube of the given half size around the origin
    pub fn cube(half_size: f32) -> Self {
        Self::new(Vec3::splat(-half_size), Vec3::splat(half_size))
    }

    /// Box from a center and half-extents
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Whether every bound is a finite number
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Grow every side by `margin`
    pub fn expand(&self, margin: f32) -> Self {
        Self::new(
            self.min - Vec3::splat(margin),
            self.max + Vec3::splat(margin),
        )
    }

    /// Merge two bounding boxes
    pub fn union(&self, other: &Aabb) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Overlap of two bounding boxes (may be empty)
    pub fn intersection(&self, other: &Aabb) -> Self {
        Self::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// Shift the box by an offset
    pub fn translate(&self, offset: Vec3) -> Self {
        Self::new(self.min + offset, self.max + offset)
    }

    /// Whether a point lies inside or on the box
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Slab test: the `[t_near, t_far]` interval along a ray that lies
    /// inside the box, or `None` if the ray misses it entirely.
    ///
    /// `t_near` is clamped to zero when the origin is inside the box. A ray
    /// parallel to a slab counts as inside it when its origin lies between
    /// or on the slab's planes.
    pub fn ray_interval(&self, origin: Vec3, dir: Vec3) -> Option<(f32, f32)> {
        let mut t_near: f32 = 0.0;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let (o, d) = (origin[axis], dir[axis]);
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() <= 1e-10 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let t0 = (lo - o) * inv;
            let t1 = (hi - o) * inv;
            t_near = t_near.max(t0.min(t1));
            t_far = t_far.min(t0.max(t1));
        }

        (t_near <= t_far).then_some((t_near, t_far))
    }

    /// Corner points, used for transforming the box
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }
}
