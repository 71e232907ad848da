//! Scene descriptor: an ordered, configurable list of SDF entries
//!
//! Each [`SceneEntry`] holds one primitive, the space transforms applied to
//! the query point before evaluating it, the combinator that folds it into
//! everything before it, and an optional material color.
//!
//! Entries are folded strictly in configuration order. The first entry's
//! combinator is ignored since there is nothing to combine it with.

use crate::sdf::primitives::{Plane, RoundedBox, Sphere, Torus};
use crate::sdf::{Aabb, Sdf, operations, transforms};
use crate::{Error, Result};
use glam::{Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// A primitive shape from the fixed catalogue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Sphere {
        center: Vec3,
        radius: f32,
    },
    RoundedBox {
        center: Vec3,
        half_extents: Vec3,
        #[serde(default)]
        radius: f32,
    },
    Torus {
        center: Vec3,
        major_radius: f32,
        minor_radius: f32,
    },
    Plane {
        normal: Vec3,
        #[serde(default)]
        offset: f32,
    },
}

impl Shape {
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::Sphere { center, radius }
    }

    pub fn rounded_box(center: Vec3, half_extents: Vec3, radius: f32) -> Self {
        Self::RoundedBox {
            center,
            half_extents,
            radius,
        }
    }

    pub fn torus(center: Vec3, major_radius: f32, minor_radius: f32) -> Self {
        Self::Torus {
            center,
            major_radius,
            minor_radius,
        }
    }

    pub fn plane(normal: Vec3, offset: f32) -> Self {
        Self::Plane { normal, offset }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Shape::Sphere { radius, .. } => non_negative("sphere radius", radius),
            Shape::RoundedBox {
                half_extents,
                radius,
                ..
            } => {
                if !half_extents.is_finite() || half_extents.cmplt(Vec3::ZERO).any() {
                    return Err(Error::invalid(format!(
                        "box half extents must be >= 0, got {half_extents}"
                    )));
                }
                non_negative("box corner radius", radius)
            }
            Shape::Torus {
                major_radius,
                minor_radius,
                ..
            } => {
                non_negative("torus major radius", major_radius)?;
                non_negative("torus minor radius", minor_radius)
            }
            Shape::Plane { normal, offset } => {
                if normal.length_squared() <= f32::EPSILON || !offset.is_finite() {
                    return Err(Error::invalid("plane needs a non-zero normal"));
                }
                Ok(())
            }
        }
    }
}

impl Sdf for Shape {
    fn distance(&self, p: Vec3) -> f32 {
        match *self {
            Shape::Sphere { center, radius } => Sphere::new(center, radius).distance(p),
            Shape::RoundedBox {
                center,
                half_extents,
                radius,
            } => RoundedBox::new(center, half_extents, radius).distance(p),
            Shape::Torus {
                center,
                major_radius,
                minor_radius,
            } => Torus::new(center, major_radius, minor_radius).distance(p),
            Shape::Plane { normal, offset } => Plane::new(normal, offset).distance(p),
        }
    }

    fn bounds(&self) -> Aabb {
        match *self {
            Shape::Sphere { center, radius } => Sphere::new(center, radius).bounds(),
            Shape::RoundedBox {
                center,
                half_extents,
                radius,
            } => RoundedBox::new(center, half_extents, radius).bounds(),
            Shape::Torus {
                center,
                major_radius,
                minor_radius,
            } => Torus::new(center, major_radius, minor_radius).bounds(),
            Shape::Plane { .. } => Aabb::INFINITE,
        }
    }
}

/// Domain operation applied to the query point before a primitive is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpaceTransform {
    /// Move the primitive by `offset`
    Translate { offset: Vec3 },
    /// Rotate the primitive by `degrees` about `axis` through the origin
    Rotate { axis: Vec3, degrees: f32 },
    /// Tile space with cells of `interval` size (0 on an axis = no tiling)
    Repeat { interval: Vec3 },
}

impl SpaceTransform {
    /// Map a world-space point into the primitive's local space
    pub fn apply(&self, p: Vec3) -> Vec3 {
        match *self {
            SpaceTransform::Translate { offset } => p - offset,
            SpaceTransform::Rotate { .. } => self.rotation().inverse() * p,
            SpaceTransform::Repeat { interval } => transforms::repeat_point(p, interval),
        }
    }

    /// Map local-space bounds back into world space
    fn unapply_bounds(&self, b: &Aabb) -> Aabb {
        match *self {
            SpaceTransform::Translate { offset } => b.translate(offset),
            SpaceTransform::Rotate { .. } => transforms::rotate_bounds(b, self.rotation()),
            SpaceTransform::Repeat { interval } => {
                if interval.cmpgt(Vec3::ZERO).any() {
                    Aabb::INFINITE
                } else {
                    *b
                }
            }
        }
    }

    fn rotation(&self) -> Quat {
        match *self {
            SpaceTransform::Rotate { axis, degrees } => match axis.try_normalize() {
                Some(axis) => Quat::from_axis_angle(axis, degrees.to_radians()),
                None => Quat::IDENTITY,
            },
            _ => Quat::IDENTITY,
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            SpaceTransform::Translate { offset } if !offset.is_finite() => {
                Err(Error::invalid("translation must be finite"))
            }
            SpaceTransform::Rotate { axis, degrees } => {
                if axis.length_squared() <= f32::EPSILON || !degrees.is_finite() {
                    Err(Error::invalid("rotation needs a non-zero axis"))
                } else {
                    Ok(())
                }
            }
            SpaceTransform::Repeat { interval }
                if !interval.is_finite() || interval.cmplt(Vec3::ZERO).any() =>
            {
                Err(Error::invalid(format!(
                    "repeat interval must be >= 0, got {interval}"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// How an entry is folded into the entries before it
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Combine {
    #[default]
    Union,
    SmoothUnion {
        k: f32,
    },
    Intersect,
    SmoothIntersect {
        k: f32,
    },
    Subtract,
    SmoothSubtract {
        k: f32,
    },
}

impl Combine {
    /// Combine the accumulated distance `a` with a new distance `b`.
    ///
    /// Returns the distance and whether `a` is the dominant operand
    /// (used to pick the material at the result).
    pub fn apply(&self, a: f32, b: f32) -> (f32, bool) {
        let (d, h) = match *self {
            Combine::Union => operations::smooth_min_weighted(a, b, 0.0),
            Combine::SmoothUnion { k } => operations::smooth_min_weighted(a, b, k),
            Combine::Intersect => operations::smooth_max_weighted(a, b, 0.0),
            Combine::SmoothIntersect { k } => operations::smooth_max_weighted(a, b, k),
            Combine::Subtract => operations::smooth_max_weighted(a, -b, 0.0),
            Combine::SmoothSubtract { k } => operations::smooth_max_weighted(a, -b, k),
        };
        (d, h >= 0.5)
    }

    /// Smoothing factor, zero for hard combinators
    pub fn smoothing(&self) -> f32 {
        match *self {
            Combine::SmoothUnion { k }
            | Combine::SmoothIntersect { k }
            | Combine::SmoothSubtract { k } => k,
            _ => 0.0,
        }
    }

    fn combine_bounds(&self, acc: &Aabb, b: &Aabb) -> Aabb {
        match self {
            Combine::Union | Combine::SmoothUnion { .. } => {
                acc.union(b).expand(self.smoothing().max(0.0))
            }
            Combine::Intersect | Combine::SmoothIntersect { .. } => acc.intersection(b),
            Combine::Subtract | Combine::SmoothSubtract { .. } => *acc,
        }
    }
}

/// One primitive in the scene, with its transforms, combinator and material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<SpaceTransform>,
    #[serde(default)]
    pub combine: Combine,
    /// Material color, falls back to the scene's `main_color`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec4>,
}

impl SceneEntry {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            transforms: Vec::new(),
            combine: Combine::Union,
            color: None,
        }
    }

    /// Append a space transform (applied after the ones already present)
    pub fn transform(mut self, transform: SpaceTransform) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn combine(mut self, combine: Combine) -> Self {
        self.combine = combine;
        self
    }

    pub fn color(mut self, color: Vec4) -> Self {
        self.color = Some(color);
        self
    }

    /// Distance from a world-space point to this entry's primitive
    pub fn distance(&self, p: Vec3) -> f32 {
        let local = self
            .transforms
            .iter()
            .fold(p, |q, transform| transform.apply(q));
        self.shape.distance(local)
    }

    /// World-space bounds of this entry
    pub fn bounds(&self) -> Aabb {
        self.transforms
            .iter()
            .rev()
            .fold(self.shape.bounds(), |b, transform| {
                transform.unapply_bounds(&b)
            })
    }
}

/// Result of evaluating the scene at a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSample {
    /// Signed distance to the combined surface
    pub distance: f32,
    /// Index of the entry whose material wins at this point
    pub material: usize,
}

/// Ordered composition of SDF entries plus the default material color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub main_color: Vec4,
    pub entries: Vec<SceneEntry>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            main_color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            entries: Vec::new(),
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style entry append
    pub fn with(mut self, entry: SceneEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn push(&mut self, entry: SceneEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluate the combined distance field and winning material at `p`.
    ///
    /// An empty scene is infinitely far away everywhere.
    pub fn sample(&self, p: Vec3) -> SceneSample {
        let mut entries = self.entries.iter().enumerate();
        let Some((_, first)) = entries.next() else {
            return SceneSample {
                distance: f32::INFINITY,
                material: 0,
            };
        };

        let init = SceneSample {
            distance: first.distance(p),
            material: 0,
        };

        entries.fold(init, |acc, (index, entry)| {
            let (distance, keep) = entry.combine.apply(acc.distance, entry.distance(p));
            SceneSample {
                distance,
                material: if keep { acc.material } else { index },
            }
        })
    }

    /// Material color for an entry index
    pub fn color(&self, material: usize) -> Vec4 {
        self.entries
            .get(material)
            .and_then(|entry| entry.color)
            .unwrap_or(self.main_color)
    }

    /// Check smoothing factors, sizes and transforms for out-of-range values
    pub fn validate(&self) -> Result<()> {
        for (index, entry) in self.entries.iter().enumerate() {
            let context = |e: Error| match e {
                Error::InvalidParameter(msg) => {
                    Error::invalid(format!("scene entry {index}: {msg}"))
                }
                other => other,
            };
            entry.shape.validate().map_err(context)?;
            for transform in &entry.transforms {
                transform.validate().map_err(context)?;
            }
            let k = entry.combine.smoothing();
            if !(k >= 0.0 && k.is_finite()) {
                return Err(context(Error::invalid(format!(
                    "smoothing factor must be >= 0, got {k}"
                ))));
            }
        }
        Ok(())
    }
}

impl Sdf for Scene {
    fn distance(&self, p: Vec3) -> f32 {
        self.sample(p).distance
    }

    fn bounds(&self) -> Aabb {
        let mut entries = self.entries.iter();
        let Some(first) = entries.next() else {
            return Aabb::new(Vec3::ZERO, Vec3::ZERO);
        };
        entries.fold(first.bounds(), |acc, entry| {
            entry.combine.combine_bounds(&acc, &entry.bounds())
        })
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid(format!("{name} must be >= 0, got {value}")))
    }
}
