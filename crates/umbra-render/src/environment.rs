//! Lighting and effect settings
//!
//! Each optional effect stage (shadow, ambient occlusion, reflection) is an
//! `Option` on [`Environment`]: a stage runs only when its settings are
//! present. All settings are plain data, validated by the configuration
//! layer and clamped again when used.

use crate::envmap::EnvironmentSource;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use umbra_core::{Error, Result};

/// Directional light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Light {
    /// Direction the light travels (will be normalized)
    pub direction: Vec3,
    /// Light color (RGB, 0-1)
    pub color: Vec3,
    /// Light intensity multiplier
    pub intensity: f32,
    /// Constant ambient term added to the diffuse light
    pub ambient: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            // Straight down, as when no light source is configured
            direction: Vec3::NEG_Y,
            color: Vec3::new(1.0, 0.95, 0.85),
            intensity: 1.0,
            ambient: Vec3::new(0.15, 0.17, 0.2),
        }
    }
}

impl Light {
    /// Normalized light direction, straight down when degenerate
    pub fn direction(&self) -> Vec3 {
        self.direction.try_normalize().unwrap_or(Vec3::NEG_Y)
    }
}

/// Soft shadow settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    /// Distance along the shadow ray where marching starts
    pub min_distance: f32,
    /// Distance along the shadow ray where marching stops
    pub max_distance: f32,
    /// How dark a fully shadowed point gets (0-4)
    pub intensity: f32,
    /// Penumbra sharpness (1 = very soft, 128 = hard)
    pub penumbra: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            min_distance: 0.1,
            max_distance: 20.0,
            intensity: 0.8,
            penumbra: 8.0,
        }
    }
}

impl ShadowSettings {
    pub fn clamped(&self) -> Self {
        let min_distance = finite_or(self.min_distance, 0.1).max(1.0e-4);
        Self {
            min_distance,
            max_distance: finite_or(self.max_distance, 20.0).max(min_distance),
            intensity: finite_or(self.intensity, 0.8).clamp(0.0, 4.0),
            penumbra: finite_or(self.penumbra, 8.0).clamp(1.0, 128.0),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_distance > 0.0 && self.max_distance > 0.0) {
            return Err(Error::invalid("shadow distances must be > 0"));
        }
        if self.min_distance >= self.max_distance {
            return Err(Error::invalid(format!(
                "shadow min distance {} must be below max distance {}",
                self.min_distance, self.max_distance
            )));
        }
        in_range("shadow intensity", self.intensity, 0.0, 4.0)?;
        in_range("shadow penumbra", self.penumbra, 1.0, 128.0)
    }
}

/// Ambient occlusion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AoSettings {
    /// Distance between samples along the normal
    pub step_size: f32,
    /// Number of samples (1-5)
    pub iterations: u32,
    /// Occlusion strength (0-1)
    pub intensity: f32,
}

impl Default for AoSettings {
    fn default() -> Self {
        Self {
            step_size: 0.1,
            iterations: 3,
            intensity: 0.25,
        }
    }
}

impl AoSettings {
    pub fn clamped(&self) -> Self {
        Self {
            step_size: finite_or(self.step_size, 0.1).max(1.0e-4),
            iterations: self.iterations.clamp(1, 5),
            intensity: finite_or(self.intensity, 0.25).clamp(0.0, 1.0),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.step_size > 0.0 && self.step_size.is_finite()) {
            return Err(Error::invalid(format!(
                "AO step size must be > 0, got {}",
                self.step_size
            )));
        }
        if !(1..=5).contains(&self.iterations) {
            return Err(Error::invalid(format!(
                "AO iterations must be in 1..=5, got {}",
                self.iterations
            )));
        }
        in_range("AO intensity", self.intensity, 0.0, 1.0)
    }
}

/// Reflection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionSettings {
    /// Number of bounces (1-2)
    pub count: u32,
    /// Weight of reflected scene color per bounce (0-1)
    pub intensity: f32,
    /// Weight of the environment map when a bounce escapes (0-1)
    pub env_intensity: f32,
    /// Where escaped reflection rays sample their color
    pub environment_map: EnvironmentSource,
}

impl Default for ReflectionSettings {
    fn default() -> Self {
        Self {
            count: 1,
            intensity: 0.5,
            env_intensity: 0.5,
            environment_map: EnvironmentSource::default(),
        }
    }
}

impl ReflectionSettings {
    pub fn clamped(&self) -> Self {
        Self {
            count: self.count.clamp(1, 2),
            intensity: finite_or(self.intensity, 0.5).clamp(0.0, 1.0),
            env_intensity: finite_or(self.env_intensity, 0.5).clamp(0.0, 1.0),
            environment_map: self.environment_map.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=2).contains(&self.count) {
            return Err(Error::invalid(format!(
                "reflection count must be 1 or 2, got {}",
                self.count
            )));
        }
        in_range("reflection intensity", self.intensity, 0.0, 1.0)?;
        in_range("environment reflection intensity", self.env_intensity, 0.0, 1.0)
    }
}

/// Everything the shading pipeline needs besides the scene itself.
///
/// A missing stage is switched off, so `{}` is diffuse lighting only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub light: Light,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient_occlusion: Option<AoSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<ReflectionSettings>,
}

impl Environment {
    /// Default light with soft shadows and ambient occlusion switched on
    pub fn with_shadow_and_ao() -> Self {
        Self {
            light: Light::default(),
            shadow: Some(ShadowSettings::default()),
            ambient_occlusion: Some(AoSettings::default()),
            reflection: None,
        }
    }

    /// Copy with every present stage clamped into its valid range
    pub fn clamped(&self) -> Self {
        Self {
            light: Light {
                direction: self.light.direction(),
                ..self.light.clone()
            },
            shadow: self.shadow.as_ref().map(ShadowSettings::clamped),
            ambient_occlusion: self.ambient_occlusion.as_ref().map(AoSettings::clamped),
            reflection: self.reflection.as_ref().map(ReflectionSettings::clamped),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.light.intensity.is_finite() || self.light.intensity < 0.0 {
            return Err(Error::invalid("light intensity must be >= 0"));
        }
        if let Some(shadow) = &self.shadow {
            shadow.validate()?;
        }
        if let Some(ao) = &self.ambient_occlusion {
            ao.validate()?;
        }
        if let Some(reflection) = &self.reflection {
            reflection.validate()?;
        }
        Ok(())
    }
}

pub(crate) fn in_range(name: &str, value: f32, min: f32, max: f32) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "{name} must be in {min}..={max}, got {value}"
        )))
    }
}

pub(crate) fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}
