//! End-to-end tests for the raymarching pass

// Tests are allowed to use expect/unwrap for cleaner error messages
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use image::{Rgba, RgbaImage};
use umbra_core::prelude::*;
use umbra_render::shading::ambient_occlusion;
use umbra_render::{
    AoSettings, Camera, Environment, EnvironmentMap, FrameParams, MarchSettings, Marcher, Ray,
    Raymarcher, ReflectionSettings, RenderConfig,
};

fn unit_sphere() -> Scene {
    Scene::new().with(SceneEntry::new(Shape::sphere(Vec3::ZERO, 1.0)))
}

fn checker(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba([200, 30, 30, 255])
        } else {
            Rgba([30, 30, 200, 128])
        }
    })
}

#[test]
fn ray_toward_unit_sphere_hits_at_four() {
    let scene = unit_sphere();
    let marcher = Marcher::new(&scene, &MarchSettings::default());
    let result = marcher.march(&Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z));

    assert!(result.hit);
    assert_relative_eq!(result.distance, 4.0, epsilon = 2e-3);
    assert_relative_eq!(result.normal.x, 0.0, epsilon = 1e-3);
    assert_relative_eq!(result.normal.y, 0.0, epsilon = 1e-3);
    assert_relative_eq!(result.normal.z, -1.0, epsilon = 1e-3);
}

#[test]
fn traveled_distance_never_decreases() {
    let scene = Scene::new()
        .with(SceneEntry::new(Shape::plane(Vec3::Y, -1.0)))
        .with(
            SceneEntry::new(Shape::torus(Vec3::new(0.5, 0.0, 2.0), 1.0, 0.25))
                .combine(Combine::SmoothUnion { k: 0.3 }),
        );
    let settings = MarchSettings {
        max_iteration: 40,
        ..MarchSettings::default()
    };
    let marcher = Marcher::new(&scene, &settings);

    for dir in [
        Vec3::new(0.0, -0.1, 1.0),
        Vec3::new(0.3, 0.05, 1.0),
        Vec3::new(-1.0, 0.2, 0.1),
        Vec3::new(0.0, -0.001, 1.0),
    ] {
        let mut steps = Vec::new();
        let result = marcher.march_traced(&Ray::new(Vec3::new(0.0, 0.0, -4.0), dir), |_, t| {
            steps.push(t)
        });

        assert!(steps.len() <= 40);
        assert!(result.iterations <= 40);
        assert!(steps.windows(2).all(|w| w[1] >= w[0]));
        assert!(result.distance >= steps.last().copied().unwrap_or(0.0));
    }
}

#[test]
fn hard_combinators_are_idempotent() {
    let entry = SceneEntry::new(Shape::torus(Vec3::new(0.2, 0.1, 0.0), 1.2, 0.3));
    let single = Scene::new().with(entry.clone());

    for combine in [Combine::Union, Combine::Intersect] {
        let doubled = single.clone().with(entry.clone().combine(combine));
        for i in 0..50 {
            let p = Vec3::new(i as f32 * 0.13 - 3.0, (i % 7) as f32 * 0.3 - 1.0, 0.4);
            assert_eq!(doubled.distance(p), single.distance(p));
        }
    }
}

#[test]
fn smooth_union_without_smoothing_is_min() {
    let a = Shape::sphere(Vec3::ZERO, 1.0);
    let b = Shape::rounded_box(Vec3::new(1.0, 0.5, 0.0), Vec3::splat(0.6), 0.1);
    let scene = Scene::new()
        .with(SceneEntry::new(a))
        .with(SceneEntry::new(b).combine(Combine::SmoothUnion { k: 0.0 }));

    for i in 0..40 {
        let p = Vec3::new(i as f32 * 0.1 - 2.0, 0.25, -0.3);
        assert_eq!(scene.distance(p), a.distance(p).min(b.distance(p)));
    }
}

#[test]
fn smooth_union_dips_below_both_spheres_between_them() {
    let a = Shape::sphere(Vec3::new(-0.6, 0.0, 0.0), 1.0);
    let b = Shape::sphere(Vec3::new(0.6, 0.0, 0.0), 1.0);
    let scene = Scene::new()
        .with(SceneEntry::new(a))
        .with(SceneEntry::new(b).combine(Combine::SmoothUnion { k: 0.5 }));

    let mid = Vec3::ZERO;
    assert!(scene.distance(mid) < a.distance(mid).min(b.distance(mid)));
}

#[test]
fn sphere_normals_point_away_from_center() {
    let center = Vec3::new(1.0, 2.0, 3.0);
    let scene = Scene::new().with(SceneEntry::new(Shape::sphere(center, 1.5)));
    let marcher = Marcher::new(&scene, &MarchSettings::default());

    for origin in [
        Vec3::new(1.0, 2.0, -5.0),
        Vec3::new(8.0, 3.0, 3.5),
        Vec3::new(-2.0, 9.0, 1.0),
    ] {
        let aim = center + Vec3::new(0.3, -0.2, 0.1);
        let result = marcher.march(&Ray::new(origin, aim - origin));
        assert!(result.hit);

        let radial = (result.point - center).normalize();
        assert!(result.normal.cross(radial).length() < 1e-2);
        assert!(result.normal.dot(radial) > 0.99);
    }
}

#[test]
fn ambient_occlusion_darkens_with_intensity() {
    let scene = Scene::new()
        .with(SceneEntry::new(Shape::plane(Vec3::Y, 0.0)))
        .with(SceneEntry::new(Shape::sphere(Vec3::new(0.0, 0.35, 0.0), 0.3)));
    let p = Vec3::new(0.2, 0.0, 0.0);

    let mut previous = f32::INFINITY;
    for i in 0..=10 {
        let ao = AoSettings {
            step_size: 0.1,
            iterations: 5,
            intensity: i as f32 * 0.1,
        };
        let factor = ambient_occlusion(&scene, p, Vec3::Y, &ao);
        assert!((0.0..=1.0).contains(&factor));
        assert!(factor <= previous);
        previous = factor;
    }
    assert!(previous < 1.0);
}

#[test]
fn pixels_outside_scene_bounds_keep_source() {
    let scene = Scene::new().with(SceneEntry::new(Shape::sphere(Vec3::new(1.5, 0.0, 0.0), 0.5)));
    let bounds = scene.bounds();
    let camera = Camera::look_at(Vec3::new(0.0, 0.0, -6.0), Vec3::ZERO).with_resolution(40, 30);
    let params = FrameParams::new(&camera, scene);
    let basis = params.basis;

    let source = checker(40, 30);
    let output = Raymarcher::new(params).render(&source);

    let mut outside = 0;
    for (x, y, pixel) in output.enumerate_pixels() {
        let ray = basis.pixel_ray(x, y, 40, 30);
        if bounds.ray_interval(ray.origin, ray.direction).is_none() {
            assert_eq!(pixel, source.get_pixel(x, y));
            outside += 1;
        }
    }
    assert!(outside > 0);
}

#[test]
fn scene_behind_camera_leaves_image_unchanged() {
    let scene = unit_sphere();
    let camera = Camera::look_at(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -10.0))
        .with_resolution(24, 24);
    let mut params = FrameParams::new(&camera, scene);
    params.environment = Environment::with_shadow_and_ao();

    let source = checker(24, 24);
    let output = Raymarcher::new(params).render(&source);
    assert_eq!(output, source);
}

#[test]
fn empty_scene_leaves_image_unchanged() {
    let camera = Camera::default().with_resolution(12, 8);
    let source = checker(12, 8);
    let output = Raymarcher::new(FrameParams::new(&camera, Scene::new())).render(&source);
    assert_eq!(output, source);
}

#[test]
fn non_finite_scene_leaves_image_unchanged() {
    // Unvalidated input: every distance sample is NaN
    let scene = Scene::new().with(
        SceneEntry::new(Shape::sphere(Vec3::ZERO, 1.0)).transform(SpaceTransform::Translate {
            offset: Vec3::new(f32::NAN, 0.0, 0.0),
        }),
    );
    let camera = Camera::look_at(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO).with_resolution(16, 12);
    let mut params = FrameParams::new(&camera, scene);
    params.environment = Environment::with_shadow_and_ao();

    let source = checker(16, 12);
    let output = Raymarcher::new(params).render(&source);
    assert_eq!(output, source);
}

#[test]
fn ray_along_bounds_face_is_not_culled() {
    let scene = Scene::new().with(SceneEntry::new(Shape::rounded_box(
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::ONE,
        0.0,
    )));
    let bounded = Marcher::new(&scene, &MarchSettings::default());
    let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);

    // The same scene with a far-away plane has unbounded extent
    let unbounded_scene = scene
        .clone()
        .with(SceneEntry::new(Shape::plane(Vec3::Y, -1000.0)));
    let unbounded = Marcher::new(&unbounded_scene, &MarchSettings::default());

    let with_cull = bounded.march(&ray);
    let without_cull = unbounded.march(&ray);
    assert!(with_cull.hit);
    assert!(without_cull.hit);
    assert_relative_eq!(with_cull.distance, without_cull.distance, epsilon = 1e-2);
}

#[test]
fn reflections_pick_up_environment() {
    let scene = Scene::new().with(
        SceneEntry::new(Shape::plane(Vec3::Y, 0.0)).color(Vec4::new(0.0, 0.0, 0.0, 1.0)),
    );
    let camera = Camera::look_at(Vec3::new(0.0, 2.0, -4.0), Vec3::new(0.0, 0.0, 2.0))
        .with_resolution(8, 8);

    let mut params = FrameParams::new(&camera, scene);
    params.environment.light.ambient = Vec3::ZERO;
    let dark = Raymarcher::new(params.clone()).render_blank(8, 8);

    params.environment.reflection = Some(ReflectionSettings {
        count: 1,
        intensity: 1.0,
        env_intensity: 1.0,
        ..ReflectionSettings::default()
    });
    params.environment_map = std::sync::Arc::new(EnvironmentMap::Solid(Vec3::new(0.0, 1.0, 0.0)));
    let mirrored = Raymarcher::new(params).render_blank(8, 8);

    // Bottom row looks at the black floor
    assert_eq!(dark.get_pixel(4, 7).0[1], 0);
    assert_eq!(mirrored.get_pixel(4, 7).0[1], 255);
}

#[test]
fn uniforms_follow_camera_moves() {
    let config = RenderConfig::demo();
    let params = config
        .frame_params(64, 48, std::path::Path::new("."))
        .expect("demo frame");
    let mut raymarcher = Raymarcher::new(params);
    let before = raymarcher.uniforms();

    let mut camera = config.camera.clone().with_resolution(64, 48);
    camera.orbit(0.5, 0.0);
    raymarcher.set_camera(&camera);
    let after = raymarcher.uniforms();

    assert_eq!(before.cam_frustum, after.cam_frustum);
    assert_ne!(before.cam_to_world, after.cam_to_world);
    assert_eq!(after.max_iteration, config.march.max_iteration);
}

#[test]
fn demo_scene_renders_hits_and_misses() {
    let config = RenderConfig::demo();
    config.validate().expect("demo should validate");
    let params = config
        .frame_params(48, 32, std::path::Path::new("."))
        .expect("demo frame");
    let raymarcher = Raymarcher::new(params);

    let source = RgbaImage::from_pixel(48, 32, Rgba([1, 2, 3, 4]));
    let output = raymarcher.render(&source);

    let changed = output
        .pixels()
        .zip(source.pixels())
        .filter(|(a, b)| a != b)
        .count();
    assert!(changed > 0);
    // The top rows look over the floor into the sky
    assert_eq!(output.get_pixel(24, 0), source.get_pixel(24, 0));
}
