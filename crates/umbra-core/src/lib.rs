//! # Umbra Core
//!
//! Signed distance functions and scene descriptors for a full-screen
//! raymarching pass.
//!
//! A [`Scene`](scene::Scene) is an ordered list of primitives, each with its
//! own space transforms, folded together with union / intersection /
//! subtraction combinators (hard or smooth). The renderer in `umbra-render`
//! sphere-traces it once per output pixel.
//!
//! ## Quick Start
//!
//! ```rust
//! use umbra_core::prelude::*;
//!
//! let scene = Scene::new()
//!     .with(SceneEntry::new(Shape::sphere(Vec3::ZERO, 1.0)))
//!     .with(
//!         SceneEntry::new(Shape::rounded_box(Vec3::new(1.2, 0.0, 0.0), Vec3::splat(0.5), 0.1))
//!             .combine(Combine::SmoothUnion { k: 0.3 }),
//!     );
//!
//! let sample = scene.sample(Vec3::new(0.0, 0.0, -3.0));
//! assert!(sample.distance > 0.0);
//! ```
//!
//! ## Units and Conventions
//!
//! - **Distances**: Arbitrary world units
//! - **Angles**: Scene configuration uses **degrees**
//! - **Precision**: `f32` throughout, matching shader precision
//! - **Coordinate system**: Right-handed, Y-up, cameras look down -Z

pub mod scene;
pub mod sdf;

mod error;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    // SDF trait and building blocks
    pub use crate::sdf::{Aabb, Plane, RoundedBox, Sdf, Sphere, Torus};

    // Scene descriptor
    pub use crate::scene::{Combine, Scene, SceneEntry, SceneSample, Shape, SpaceTransform};

    // Math (re-export glam)
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

    // Error handling
    pub use crate::{Error, Result};
}
