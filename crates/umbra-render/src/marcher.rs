//! Sphere tracing against a [`Scene`]
//!
//! The marcher steps along a ray by the scene's distance estimate until it
//! gets within `accuracy` of a surface (hit), travels past `max_distance`,
//! runs out of iterations, or sees a non-finite distance (all misses).

use crate::camera::Ray;
use crate::environment::{ShadowSettings, finite_or, in_range};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use umbra_core::scene::Scene;
use umbra_core::sdf::{Aabb, Sdf};
use umbra_core::{Error, Result};

/// Offset used for central-difference normals
pub const NORMAL_EPSILON: f32 = 0.001;

/// Hard upper bound on march iterations
pub const MAX_ITERATIONS: u32 = 300;

/// Sphere tracing limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarchSettings {
    /// Rays that travel further than this are misses
    pub max_distance: f32,
    /// Step budget per ray (1-300)
    pub max_iteration: u32,
    /// Distance below which a step counts as a hit (0.001-0.1)
    pub accuracy: f32,
}

impl Default for MarchSettings {
    fn default() -> Self {
        Self {
            max_distance: 100.0,
            max_iteration: 164,
            accuracy: 0.001,
        }
    }
}

impl MarchSettings {
    pub fn clamped(&self) -> Self {
        Self {
            max_distance: finite_or(self.max_distance, 100.0).max(0.0),
            max_iteration: self.max_iteration.clamp(1, MAX_ITERATIONS),
            accuracy: finite_or(self.accuracy, 0.001).clamp(0.001, 0.1),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.max_distance > 0.0 && self.max_distance.is_finite()) {
            return Err(Error::invalid(format!(
                "max distance must be > 0, got {}",
                self.max_distance
            )));
        }
        if !(1..=MAX_ITERATIONS).contains(&self.max_iteration) {
            return Err(Error::invalid(format!(
                "max iteration must be in 1..={MAX_ITERATIONS}, got {}",
                self.max_iteration
            )));
        }
        in_range("accuracy", self.accuracy, 0.001, 0.1)
    }

    /// Distance to step off a surface before tracing a secondary ray
    pub fn surface_offset(&self) -> f32 {
        (self.accuracy * 2.0).max(0.01)
    }
}

/// Outcome of marching one ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchResult {
    pub hit: bool,
    /// Distance traveled along the ray
    pub distance: f32,
    /// Where marching stopped
    pub point: Vec3,
    pub iterations: u32,
    /// Scene entry whose material wins at `point` (hits only)
    pub material: usize,
    /// Surface normal at `point`, zero on a miss
    pub normal: Vec3,
}

impl MarchResult {
    fn miss(ray: &Ray, distance: f32, iterations: u32) -> Self {
        Self {
            hit: false,
            distance,
            point: ray.at(distance),
            iterations,
            material: 0,
            normal: Vec3::ZERO,
        }
    }
}

/// Sphere tracer for one frame's scene
pub struct Marcher<'a> {
    scene: &'a Scene,
    settings: MarchSettings,
    bounds: Aabb,
}

impl<'a> Marcher<'a> {
    /// Settings are clamped into their valid ranges.
    pub fn new(scene: &'a Scene, settings: &MarchSettings) -> Self {
        let settings = settings.clamped();
        Self {
            scene,
            settings,
            // A ray within `accuracy` of a face already counts as a hit
            bounds: scene.bounds().expand(settings.accuracy),
        }
    }

    /// Same scene with the step budget and range halved once per bounce
    pub fn for_bounce(&self, bounce: u32) -> Self {
        let shift = bounce.min(8);
        Self {
            scene: self.scene,
            settings: MarchSettings {
                max_distance: self.settings.max_distance / (1u32 << shift) as f32,
                max_iteration: (self.settings.max_iteration >> shift).max(1),
                accuracy: self.settings.accuracy,
            },
            bounds: self.bounds,
        }
    }

    pub fn settings(&self) -> &MarchSettings {
        &self.settings
    }

    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// Trace `ray` until it hits the scene or gives up
    pub fn march(&self, ray: &Ray) -> MarchResult {
        self.march_traced(ray, |_, _| {})
    }

    /// Like [`march`](Self::march), calling `step(iteration, traveled)` before each step
    pub fn march_traced(&self, ray: &Ray, mut step: impl FnMut(u32, f32)) -> MarchResult {
        let MarchSettings {
            max_distance,
            max_iteration,
            accuracy,
        } = self.settings;

        if self.scene.is_empty() {
            return MarchResult::miss(ray, 0.0, 0);
        }

        // Skip empty space in front of a bounded scene
        let (mut traveled, limit) = if self.bounds.is_finite() {
            match self.bounds.ray_interval(ray.origin, ray.direction) {
                Some((near, far)) if near <= max_distance => (near, far.min(max_distance)),
                _ => return MarchResult::miss(ray, 0.0, 0),
            }
        } else {
            (0.0, max_distance)
        };

        for iteration in 0..max_iteration {
            step(iteration, traveled);

            let point = ray.at(traveled);
            let sample = self.scene.sample(point);
            if !sample.distance.is_finite() {
                return MarchResult::miss(ray, traveled, iteration + 1);
            }

            if sample.distance < accuracy {
                return MarchResult {
                    hit: true,
                    distance: traveled,
                    point,
                    iterations: iteration + 1,
                    material: sample.material,
                    normal: self.normal(point),
                };
            }

            traveled += sample.distance;
            if traveled > limit {
                return MarchResult::miss(ray, traveled, iteration + 1);
            }
        }

        MarchResult::miss(ray, traveled, max_iteration)
    }

    /// Surface normal from central differences (six evaluations)
    pub fn normal(&self, p: Vec3) -> Vec3 {
        let e = NORMAL_EPSILON;
        let d = |offset: Vec3| self.scene.distance(p + offset);
        let gradient = Vec3::new(
            d(Vec3::X * e) - d(Vec3::NEG_X * e),
            d(Vec3::Y * e) - d(Vec3::NEG_Y * e),
            d(Vec3::Z * e) - d(Vec3::NEG_Z * e),
        );
        gradient.try_normalize().unwrap_or(Vec3::Y)
    }

    /// Penumbra factor in `[0, 1]` for a shadow ray from `origin` along `to_light`.
    ///
    /// 0 is fully occluded, 1 fully lit.
    pub fn soft_shadow(&self, origin: Vec3, to_light: Vec3, shadow: &ShadowSettings) -> f32 {
        let mut result: f32 = 1.0;
        let mut t = shadow.min_distance;
        for _ in 0..MAX_ITERATIONS {
            if t >= shadow.max_distance {
                break;
            }
            let h = self.scene.distance(origin + to_light * t);
            if !h.is_finite() {
                break;
            }
            if h < self.settings.accuracy {
                return 0.0;
            }
            result = result.min(shadow.penumbra * h / t);
            t += h;
        }
        result.clamp(0.0, 1.0)
    }
}
