//! Surface shading: diffuse lighting, soft shadows and ambient occlusion

use crate::environment::{AoSettings, Environment};
use crate::marcher::{MarchResult, Marcher};
use glam::{Vec3, Vec4};
use umbra_core::sdf::Sdf;

/// Local shading for one frame. Every stage reads from the same clamped
/// environment snapshot.
pub struct Shading<'a> {
    marcher: &'a Marcher<'a>,
    environment: &'a Environment,
}

impl<'a> Shading<'a> {
    /// `environment` is expected to be clamped already (see [`Environment::clamped`]).
    pub fn new(marcher: &'a Marcher<'a>, environment: &'a Environment) -> Self {
        Self {
            marcher,
            environment,
        }
    }

    pub fn marcher(&self) -> &'a Marcher<'a> {
        self.marcher
    }

    pub fn environment(&self) -> &'a Environment {
        self.environment
    }

    /// Material color of the entry that was hit
    pub fn base_color(&self, hit: &MarchResult) -> Vec4 {
        self.marcher.scene().color(hit.material)
    }

    /// Lit surface color at a hit, without reflections
    pub fn shade(&self, hit: &MarchResult) -> Vec3 {
        let light = self.light(hit.point, hit.normal);
        let mut color = self.base_color(hit).truncate() * light;

        if let Some(ao) = &self.environment.ambient_occlusion {
            color *= ambient_occlusion(self.marcher.scene(), hit.point, hit.normal, ao);
        }
        color
    }

    /// Diffuse plus ambient light arriving at `p`, shadowed when enabled
    pub fn light(&self, p: Vec3, normal: Vec3) -> Vec3 {
        let light = &self.environment.light;
        let to_light = -light.direction();
        let mut diffuse = light.color * light.intensity * normal.dot(to_light).max(0.0);

        if let Some(shadow) = &self.environment.shadow {
            let origin = p + normal * self.marcher.settings().surface_offset();
            let penumbra = self.marcher.soft_shadow(origin, to_light, shadow);
            diffuse *= (1.0 - shadow.intensity * (1.0 - penumbra)).max(0.0);
        }

        diffuse + light.ambient
    }
}

/// Occlusion factor in `[0, 1]` (1 = unoccluded).
///
/// Samples the field at growing steps along the normal; each sample where the
/// surface is closer than the step darkens the result, nearer samples
/// weighted more.
pub fn ambient_occlusion<S: Sdf + ?Sized>(sdf: &S, p: Vec3, normal: Vec3, ao: &AoSettings) -> f32 {
    let mut occlusion = 0.0;
    let mut weight = 0.5;
    for i in 1..=ao.iterations {
        let step = i as f32 * ao.step_size;
        let d = sdf.distance(p + normal * step);
        if d.is_finite() {
            occlusion += weight * (step - d).max(0.0);
        }
        weight *= 0.5;
    }
    (1.0 - ao.intensity * occlusion).clamp(0.0, 1.0)
}
