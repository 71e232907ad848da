//! JSON render configuration
//!
//! A [`RenderConfig`] file holds the camera, march limits, scene, lighting
//! and compositing settings. Every section is optional and falls back to its
//! defaults, so `{}` is a valid (empty) configuration.

use crate::camera::Camera;
use crate::environment::{Environment, ReflectionSettings};
use crate::envmap::{EnvironmentMap, EnvironmentSource};
use crate::marcher::MarchSettings;
use crate::raymarcher::{CompositeSettings, FrameParams};
use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use umbra_core::scene::{Combine, Scene, SceneEntry, Shape, SpaceTransform};
use umbra_core::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub camera: Camera,
    pub march: MarchSettings,
    pub scene: Scene,
    pub environment: Environment,
    pub composite: CompositeSettings,
}

impl RenderConfig {
    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), text)?;
        Ok(())
    }

    /// Report the first out-of-range value
    pub fn validate(&self) -> Result<()> {
        let fov = self.camera.fov;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(Error::invalid(format!(
                "camera fov must be in (0, 180) degrees, got {fov}"
            )));
        }
        if !self.camera.position.is_finite() || !self.camera.target.is_finite() {
            return Err(Error::invalid("camera position and target must be finite"));
        }
        self.march.validate()?;
        self.scene.validate()?;
        self.environment.validate()?;

        let alpha = self.composite.alpha;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(Error::invalid(format!(
                "composite alpha must be in 0..=1, got {alpha}"
            )));
        }
        Ok(())
    }

    /// Snapshot for one frame at the given output size.
    ///
    /// Cube map faces are loaded relative to `base_dir`.
    pub fn frame_params(&self, width: u32, height: u32, base_dir: &Path) -> Result<FrameParams> {
        let camera = self.camera.clone().with_resolution(width, height);
        let environment_map = match &self.environment.reflection {
            Some(reflection) => EnvironmentMap::load(&reflection.environment_map, base_dir)?,
            None => EnvironmentMap::default(),
        };

        Ok(FrameParams {
            basis: camera.frustum_basis(),
            march: self.march,
            scene: self.scene.clone(),
            environment: self.environment.clone(),
            environment_map: Arc::new(environment_map),
            composite: self.composite.clone(),
        })
    }

    /// A small showcase scene: a blended sphere and box over a row of
    /// repeated tori on a floor, with every effect switched on
    pub fn demo() -> Self {
        let scene = Scene::new()
            .with(
                SceneEntry::new(Shape::plane(Vec3::Y, -1.0))
                    .color(Vec4::new(0.55, 0.55, 0.6, 1.0)),
            )
            .with(
                SceneEntry::new(Shape::sphere(Vec3::new(-0.4, 0.0, 0.0), 0.8))
                    .color(Vec4::new(0.9, 0.35, 0.25, 1.0)),
            )
            .with(
                SceneEntry::new(Shape::rounded_box(
                    Vec3::new(0.7, -0.2, 0.2),
                    Vec3::splat(0.55),
                    0.08,
                ))
                .transform(SpaceTransform::Rotate {
                    axis: Vec3::Y,
                    degrees: 30.0,
                })
                .combine(Combine::SmoothUnion { k: 0.4 })
                .color(Vec4::new(0.25, 0.45, 0.9, 1.0)),
            )
            .with(
                SceneEntry::new(Shape::torus(Vec3::ZERO, 0.35, 0.1))
                    .transform(SpaceTransform::Translate {
                        offset: Vec3::new(0.0, -0.6, 3.0),
                    })
                    .transform(SpaceTransform::Repeat {
                        interval: Vec3::new(1.5, 0.0, 0.0),
                    })
                    .color(Vec4::new(0.95, 0.8, 0.3, 1.0)),
            );

        let mut environment = Environment::with_shadow_and_ao();
        environment.light.direction = Vec3::new(-0.4, -1.0, 0.6);
        environment.reflection = Some(ReflectionSettings {
            count: 2,
            intensity: 0.3,
            env_intensity: 0.4,
            environment_map: EnvironmentSource::default(),
        });

        Self {
            camera: Camera::look_at(Vec3::new(0.0, 1.5, -5.0), Vec3::new(0.0, -0.2, 0.0)),
            march: MarchSettings::default(),
            scene,
            environment,
            composite: CompositeSettings::default(),
        }
    }
}
