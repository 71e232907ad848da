//! Point and bounds helpers for scene space transforms

use super::Aabb;
use glam::{Quat, Vec3};

/// Wrap `p` into the cell of size `interval` centered on the origin.
///
/// Axes with a zero interval are left alone.
pub fn repeat_point(p: Vec3, interval: Vec3) -> Vec3 {
    let wrap = |v: f32, c: f32| {
        if c > 0.0 {
            (v + c * 0.5).rem_euclid(c) - c * 0.5
        } else {
            v
        }
    };
    Vec3::new(
        wrap(p.x, interval.x),
        wrap(p.y, interval.y),
        wrap(p.z, interval.z),
    )
}

/// AABB of a rotated box. Unbounded boxes stay unbounded.
pub fn rotate_bounds(b: &Aabb, rotation: Quat) -> Aabb {
    if !b.is_finite() {
        return Aabb::INFINITE;
    }

    let mut new_min = Vec3::splat(f32::MAX);
    let mut new_max = Vec3::splat(f32::MIN);

    for corner in b.corners() {
        let rotated = rotation * corner;
        new_min = new_min.min(rotated);
        new_max = new_max.max(rotated);
    }

    Aabb::new(new_min, new_max)
}
