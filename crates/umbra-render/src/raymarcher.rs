//! Full-screen raymarching pass over a source image
//!
//! Every output pixel gets its own camera ray. Rays that hit the scene are
//! shaded and blended over the source pixel; rays that miss leave the source
//! pixel untouched. Rows are rendered in parallel and share the frame's
//! parameters by reference.

use crate::camera::{Camera, FrustumBasis};
use crate::environment::Environment;
use crate::envmap::EnvironmentMap;
use crate::marcher::{MarchSettings, Marcher};
use crate::reflection;
use crate::shading::Shading;
use crate::uniforms::FrameUniforms;
use glam::{Vec3, Vec4};
use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use umbra_core::scene::Scene;

/// How shaded hits are laid over the source image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeSettings {
    /// Opacity of shaded hits over the source (1 replaces the source pixel)
    pub alpha: f32,
    /// Fill color when no source image is given
    pub background: Vec4,
}

impl Default for CompositeSettings {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            background: Vec4::new(0.05, 0.05, 0.08, 1.0),
        }
    }
}

/// Immutable snapshot of everything one frame needs
#[derive(Debug, Clone)]
pub struct FrameParams {
    pub basis: FrustumBasis,
    pub march: MarchSettings,
    pub scene: Scene,
    pub environment: Environment,
    pub environment_map: Arc<EnvironmentMap>,
    pub composite: CompositeSettings,
}

impl FrameParams {
    /// Frame with default settings looking at `scene` from `camera`
    pub fn new(camera: &Camera, scene: Scene) -> Self {
        Self {
            basis: camera.frustum_basis(),
            march: MarchSettings::default(),
            scene,
            environment: Environment::default(),
            environment_map: Arc::new(EnvironmentMap::default()),
            composite: CompositeSettings::default(),
        }
    }
}

/// CPU raymarching renderer
pub struct Raymarcher {
    params: FrameParams,
}

impl Raymarcher {
    /// Create a renderer; out-of-range settings are clamped with a warning.
    pub fn new(mut params: FrameParams) -> Self {
        let march = params.march.clamped();
        if march != params.march {
            tracing::warn!("March settings out of range, clamped to {:?}", march);
        }
        params.march = march;

        let environment = params.environment.clamped();
        let stages_clamped = environment.shadow != params.environment.shadow
            || environment.ambient_occlusion != params.environment.ambient_occlusion
            || environment.reflection != params.environment.reflection;
        if stages_clamped {
            tracing::warn!("Shadow, AO or reflection settings out of range, clamped");
        }
        params.environment = environment;

        let alpha = params.composite.alpha;
        params.composite.alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };

        Self { params }
    }

    pub fn params(&self) -> &FrameParams {
        &self.params
    }

    /// Recompute the frustum basis for a moved camera
    pub fn set_camera(&mut self, camera: &Camera) {
        self.params.basis = camera.frustum_basis();
    }

    /// Replace the scene (hot reload)
    pub fn set_scene(&mut self, scene: Scene) {
        self.params.scene = scene;
    }

    /// This frame's parameters as a uniform block
    pub fn uniforms(&self) -> FrameUniforms {
        FrameUniforms::new(
            &self.params.basis,
            &self.params.march,
            self.params.scene.main_color,
            &self.params.environment,
        )
    }

    /// Render over a background fill of the given size
    pub fn render_blank(&self, width: u32, height: u32) -> RgbaImage {
        let fill = Rgba(to_rgba8(self.params.composite.background));
        self.render(&RgbaImage::from_pixel(width, height, fill))
    }

    /// Render the scene over `source`, returning an image of the same size
    pub fn render(&self, source: &RgbaImage) -> RgbaImage {
        let start = Instant::now();
        let (width, height) = source.dimensions();
        let mut output = source.clone();
        if width == 0 || height == 0 {
            return output;
        }

        let marcher = Marcher::new(&self.params.scene, &self.params.march);
        let shading = Shading::new(&marcher, &self.params.environment);
        let row_len = width as usize * 4;

        let hits: usize = output
            .par_chunks_mut(row_len)
            .enumerate()
            .map(|(y, row)| {
                let mut row_hits = 0;
                for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                    let shaded = self.shade_pixel(&shading, x as u32, y as u32, width, height);
                    if let Some((color, alpha)) = shaded {
                        blend(pixel, color, alpha);
                        row_hits += 1;
                    }
                }
                row_hits
            })
            .sum();

        tracing::debug!(
            "Rendered {}x{} in {:.1?} ({} of {} pixels hit)",
            width,
            height,
            start.elapsed(),
            hits,
            width as usize * height as usize
        );
        output
    }

    /// Shaded color and blend alpha for one pixel, `None` on a miss
    fn shade_pixel(
        &self,
        shading: &Shading<'_>,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Option<(Vec3, f32)> {
        let ray = self.params.basis.pixel_ray(x, y, width, height);
        let hit = shading.marcher().march(&ray);
        if !hit.hit {
            return None;
        }

        let mut color = shading.shade(&hit);
        if let Some(settings) = &self.params.environment.reflection {
            color += reflection::reflections(
                shading,
                &hit,
                ray.direction,
                settings,
                &self.params.environment_map,
            );
        }

        let alpha = (self.params.composite.alpha * shading.base_color(&hit).w).clamp(0.0, 1.0);
        Some((color, alpha))
    }
}

/// Lay `color` over an RGBA8 pixel with opacity `alpha`
fn blend(pixel: &mut [u8], color: Vec3, alpha: f32) {
    let src = Vec4::new(
        pixel[0] as f32,
        pixel[1] as f32,
        pixel[2] as f32,
        pixel[3] as f32,
    ) / 255.0;
    let out = src * (1.0 - alpha) + color.clamp(Vec3::ZERO, Vec3::ONE).extend(1.0) * alpha;
    pixel.copy_from_slice(&to_rgba8(out));
}

fn to_rgba8(color: Vec4) -> [u8; 4] {
    let c = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8, c.w as u8]
}
