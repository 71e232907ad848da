//! Bounded reflection bounces

use crate::camera::Ray;
use crate::environment::ReflectionSettings;
use crate::envmap::EnvironmentMap;
use crate::marcher::MarchResult;
use crate::shading::Shading;
use glam::Vec3;

/// Mirror `dir` about `normal`
pub fn reflect(dir: Vec3, normal: Vec3) -> Vec3 {
    dir - 2.0 * dir.dot(normal) * normal
}

/// Color added to a primary hit by up to `settings.count` reflection bounces.
///
/// Bounce `b` (starting at 1) contributes with weight `intensity^b`. A
/// bounce that escapes the scene samples the environment map instead,
/// scaled by `env_intensity`, and ends the chain. Each bounce marches with
/// half the previous step budget.
pub fn reflections(
    shading: &Shading<'_>,
    primary: &MarchResult,
    incoming: Vec3,
    settings: &ReflectionSettings,
    environment_map: &EnvironmentMap,
) -> Vec3 {
    let mut color = Vec3::ZERO;
    let mut surface = *primary;
    let mut dir = incoming;

    for bounce in 1..=settings.count.clamp(1, 2) {
        dir = reflect(dir, surface.normal);
        let marcher = shading.marcher().for_bounce(bounce);
        let origin = surface.point + surface.normal * marcher.settings().surface_offset();
        let next = marcher.march(&Ray::new(origin, dir));
        let weight = settings.intensity.powi(bounce as i32);

        if next.hit {
            color += shading.shade(&next) * weight;
            surface = next;
        } else {
            color += environment_map.sample(dir) * settings.env_intensity * weight;
            break;
        }
    }

    color
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::marcher::{MarchSettings, Marcher};
    use approx::assert_relative_eq;
    use umbra_core::scene::{Scene, SceneEntry, Shape};

    #[test]
    fn reflect_flips_normal_component() {
        let r = reflect(Vec3::new(1.0, -1.0, 0.0), Vec3::Y);
        assert_eq!(r, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn escaping_bounce_samples_environment() {
        let scene = Scene::new().with(SceneEntry::new(Shape::plane(Vec3::Y, 0.0)));
        let marcher = Marcher::new(&scene, &MarchSettings::default());
        let environment = Environment::default();
        let shading = Shading::new(&marcher, &environment);

        let incoming = Vec3::new(1.0, -1.0, 0.0).normalize();
        let hit = marcher.march(&Ray::new(Vec3::new(-2.0, 2.0, 0.0), incoming));
        assert!(hit.hit);

        let settings = ReflectionSettings {
            count: 2,
            intensity: 0.5,
            env_intensity: 1.0,
            ..ReflectionSettings::default()
        };
        let sky = EnvironmentMap::Solid(Vec3::ONE);
        let color = reflections(&shading, &hit, incoming, &settings, &sky);
        assert_relative_eq!(color.x, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn zero_intensity_adds_nothing() {
        let scene = Scene::new()
            .with(SceneEntry::new(Shape::plane(Vec3::Y, 0.0)))
            .with(SceneEntry::new(Shape::sphere(Vec3::new(0.0, 2.0, 0.0), 1.0)));
        let marcher = Marcher::new(&scene, &MarchSettings::default());
        let environment = Environment::default();
        let shading = Shading::new(&marcher, &environment);

        let hit = marcher.march(&Ray::new(Vec3::new(0.0, 0.5, -3.0), Vec3::new(0.0, -0.1, 1.0)));
        assert!(hit.hit);
        let settings = ReflectionSettings {
            intensity: 0.0,
            ..ReflectionSettings::default()
        };
        let env = EnvironmentMap::Solid(Vec3::ONE);
        let color = reflections(&shading, &hit, Vec3::Z, &settings, &env);
        assert_eq!(color, Vec3::ZERO);
    }
}
