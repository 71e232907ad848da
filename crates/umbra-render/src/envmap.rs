//! Environment maps sampled by reflection rays that escape the scene

use glam::Vec3;
use image::Rgb32FImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use umbra_core::{Error, Result};

/// Configured environment map source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvironmentSource {
    /// A single color in every direction
    Solid { color: Vec3 },
    /// Sky gradient: ground below the horizon, horizon to zenith above
    Gradient {
        horizon: Vec3,
        zenith: Vec3,
        ground: Vec3,
    },
    /// Six face images, resolved relative to the config file
    CubeMap {
        positive_x: PathBuf,
        negative_x: PathBuf,
        positive_y: PathBuf,
        negative_y: PathBuf,
        positive_z: PathBuf,
        negative_z: PathBuf,
    },
}

impl Default for EnvironmentSource {
    fn default() -> Self {
        Self::Gradient {
            horizon: Vec3::new(0.7, 0.8, 0.9),
            zenith: Vec3::new(0.3, 0.5, 0.8),
            ground: Vec3::new(0.6, 0.65, 0.7),
        }
    }
}

/// A loaded, ready-to-sample environment
#[derive(Debug, Clone)]
pub enum EnvironmentMap {
    Solid(Vec3),
    Gradient {
        horizon: Vec3,
        zenith: Vec3,
        ground: Vec3,
    },
    Cube(CubeMap),
}

impl Default for EnvironmentMap {
    fn default() -> Self {
        Self::Solid(Vec3::ZERO)
    }
}

impl EnvironmentMap {
    /// Load a configured source; relative cube face paths resolve against `base_dir`
    pub fn load(source: &EnvironmentSource, base_dir: &Path) -> Result<Self> {
        Ok(match source {
            EnvironmentSource::Solid { color } => Self::Solid(*color),
            EnvironmentSource::Gradient {
                horizon,
                zenith,
                ground,
            } => Self::Gradient {
                horizon: *horizon,
                zenith: *zenith,
                ground: *ground,
            },
            EnvironmentSource::CubeMap {
                positive_x,
                negative_x,
                positive_y,
                negative_y,
                positive_z,
                negative_z,
            } => {
                let paths = [
                    positive_x, negative_x, positive_y, negative_y, positive_z, negative_z,
                ];
                let mut faces = Vec::with_capacity(6);
                for path in paths {
                    let path = base_dir.join(path);
                    tracing::debug!("Loading cube map face {}", path.display());
                    faces.push(image::open(&path)?.into_rgb32f());
                }
                Self::Cube(CubeMap::from_faces(faces)?)
            }
        })
    }

    /// Color seen looking along `dir`
    pub fn sample(&self, dir: Vec3) -> Vec3 {
        match self {
            Self::Solid(color) => *color,
            Self::Gradient {
                horizon,
                zenith,
                ground,
            } => {
                let y = dir.normalize_or_zero().y;
                if y >= 0.0 {
                    horizon.lerp(*zenith, y)
                } else {
                    *ground
                }
            }
            Self::Cube(cube) => cube.sample(dir),
        }
    }
}

/// Six-face cube map in +X, -X, +Y, -Y, +Z, -Z order
#[derive(Debug, Clone)]
pub struct CubeMap {
    faces: Vec<Rgb32FImage>,
}

impl CubeMap {
    pub fn from_faces(faces: Vec<Rgb32FImage>) -> Result<Self> {
        if faces.len() != 6 {
            return Err(Error::invalid(format!(
                "cube map needs 6 faces, got {}",
                faces.len()
            )));
        }
        if faces.iter().any(|face| face.width() == 0 || face.height() == 0) {
            return Err(Error::invalid("cube map face is empty"));
        }
        Ok(Self { faces })
    }

    /// Nearest-texel lookup along `dir`
    pub fn sample(&self, dir: Vec3) -> Vec3 {
        let (face, u, v) = face_coords(dir);
        let image = &self.faces[face];
        let x = ((u * image.width() as f32) as u32).min(image.width() - 1);
        let y = ((v * image.height() as f32) as u32).min(image.height() - 1);
        Vec3::from_array(image.get_pixel(x, y).0)
    }
}

/// Face index and `[0, 1]` texture coordinates for a direction
/// (v runs top to bottom in the face image).
fn face_coords(dir: Vec3) -> (usize, f32, f32) {
    let a = dir.abs();
    let (face, ma, sc, tc) = if a.x >= a.y && a.x >= a.z {
        if dir.x > 0.0 {
            (0, a.x, -dir.z, -dir.y)
        } else {
            (1, a.x, dir.z, -dir.y)
        }
    } else if a.y >= a.z {
        if dir.y > 0.0 {
            (2, a.y, dir.x, dir.z)
        } else {
            (3, a.y, dir.x, -dir.z)
        }
    } else if dir.z > 0.0 {
        (4, a.z, dir.x, -dir.y)
    } else {
        (5, a.z, -dir.x, -dir.y)
    };

    if ma <= 0.0 || !ma.is_finite() {
        return (4, 0.5, 0.5);
    }
    let u = (0.5 * (sc / ma + 1.0)).clamp(0.0, 1.0);
    let v = (0.5 * (tc / ma + 1.0)).clamp(0.0, 1.0);
    (face, u, v)
}
