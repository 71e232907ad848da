//! Per-frame parameter block in a GPU-friendly layout
//!
//! [`FrameUniforms`] is the flat snapshot a shader-based host binds as a
//! uniform buffer: the same values the CPU renderer reads, clamped into
//! range and packed with 16-byte alignment.

use crate::camera::FrustumBasis;
use crate::environment::Environment;
use crate::marcher::MarchSettings;
use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// Shadow stage enabled
pub const FLAG_SHADOW: u32 = 1;
/// Ambient occlusion stage enabled
pub const FLAG_AMBIENT_OCCLUSION: u32 = 1 << 1;
/// Reflection stage enabled
pub const FLAG_REFLECTION: u32 = 1 << 2;

/// Uniform buffer data for one frame
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    /// One frustum corner per row: top-left, top-right, bottom-right, bottom-left
    pub cam_frustum: [[f32; 4]; 4],
    pub cam_to_world: [[f32; 4]; 4],
    pub main_color: [f32; 4],
    pub light_dir: [f32; 3],
    pub light_intensity: f32,
    pub light_color: [f32; 3],
    pub max_distance: f32,
    pub accuracy: f32,
    pub max_iteration: u32,
    pub ao_iteration: u32,
    pub ao_step_size: f32,
    pub ao_intensity: f32,
    pub shadow_intensity: f32,
    pub shadow_penumbra: f32,
    pub reflection_count: u32,
    /// Shadow ray min and max distance
    pub shadow_distance: [f32; 2],
    pub reflection_intensity: f32,
    pub env_reflection_intensity: f32,
    /// `FLAG_*` bits for the enabled stages
    pub flags: u32,
    pub _pad: [u32; 3],
}

impl FrameUniforms {
    /// Pack a frame. Disabled stages carry their default values with the flag bit clear.
    pub fn new(
        basis: &FrustumBasis,
        march: &MarchSettings,
        main_color: Vec4,
        environment: &Environment,
    ) -> Self {
        let march = march.clamped();
        let environment = environment.clamped();
        let shadow = environment.shadow.clone().unwrap_or_default();
        let ao = environment.ambient_occlusion.clone().unwrap_or_default();
        let reflection = environment.reflection.clone().unwrap_or_default();

        let mut flags = 0;
        if environment.shadow.is_some() {
            flags |= FLAG_SHADOW;
        }
        if environment.ambient_occlusion.is_some() {
            flags |= FLAG_AMBIENT_OCCLUSION;
        }
        if environment.reflection.is_some() {
            flags |= FLAG_REFLECTION;
        }

        let light = &environment.light;
        Self {
            cam_frustum: [
                basis.top_left.extend(0.0).to_array(),
                basis.top_right.extend(0.0).to_array(),
                basis.bottom_right.extend(0.0).to_array(),
                basis.bottom_left.extend(0.0).to_array(),
            ],
            cam_to_world: basis.camera_to_world.to_cols_array_2d(),
            main_color: main_color.to_array(),
            light_dir: light.direction().to_array(),
            light_intensity: light.intensity,
            light_color: light.color.to_array(),
            max_distance: march.max_distance,
            accuracy: march.accuracy,
            max_iteration: march.max_iteration,
            ao_iteration: ao.iterations,
            ao_step_size: ao.step_size,
            ao_intensity: ao.intensity,
            shadow_intensity: shadow.intensity,
            shadow_penumbra: shadow.penumbra,
            reflection_count: reflection.count,
            shadow_distance: [shadow.min_distance, shadow.max_distance],
            reflection_intensity: reflection.intensity,
            env_reflection_intensity: reflection.env_intensity,
            flags,
            _pad: [0; 3],
        }
    }

    /// Raw bytes for a uniform buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
