//! Umbra Render - CPU raymarching post-process for SDF scenes
//!
//! This crate turns a [`Scene`](umbra_core::scene::Scene) and a camera into
//! a full-screen raymarching pass over a source image.
//!
//! ## Features
//!
//! - Per-pixel camera rays from a four-corner frustum basis
//! - Sphere tracing with bounds early-out and central-difference normals
//! - Diffuse lighting, soft shadows, ambient occlusion
//! - Up to two reflection bounces with an environment map fallback
//! - Row-parallel rendering with rayon
//! - A `bytemuck` uniform block mirroring the frame parameters for GPU hosts
//! - JSON configuration
//!
//! ## Example
//!
//! ```rust
//! use umbra_render::{Camera, FrameParams, Raymarcher};
//! use umbra_core::prelude::*;
//!
//! let scene = Scene::new().with(SceneEntry::new(Shape::sphere(Vec3::ZERO, 1.0)));
//! let camera = Camera::look_at(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO).with_resolution(32, 32);
//!
//! let image = Raymarcher::new(FrameParams::new(&camera, scene)).render_blank(32, 32);
//! assert_eq!(image.dimensions(), (32, 32));
//! ```

pub mod camera;
pub mod config;
pub mod environment;
pub mod envmap;
pub mod marcher;
pub mod raymarcher;
pub mod reflection;
pub mod shading;
pub mod uniforms;

pub use camera::{Camera, FrustumBasis, Ray};
pub use config::RenderConfig;
pub use environment::{AoSettings, Environment, Light, ReflectionSettings, ShadowSettings};
pub use envmap::{EnvironmentMap, EnvironmentSource};
pub use marcher::{MarchResult, MarchSettings, Marcher};
pub use raymarcher::{CompositeSettings, FrameParams, Raymarcher};
pub use shading::Shading;
pub use uniforms::FrameUniforms;
