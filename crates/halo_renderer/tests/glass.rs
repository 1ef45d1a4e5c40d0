//! Refractive materials traced through whole scenes.

use halo_math::{Color, Ray, Vec3};
use halo_renderer::camera::Pinhole;
use halo_renderer::geometry::{Plane, Sphere};
use halo_renderer::light::PointLight;
use halo_renderer::material::{Dielectric, Matte, Phong, Transparent};
use halo_renderer::tracer::{PathTrace, Whitted};
use halo_renderer::{GeometricObject, Material, SampleKey, Sampler, Tracer, ViewPlane, World};
use std::sync::Arc;

fn black_phong() -> Phong {
    Phong::new(0.0, 0.0, 0.0, Color::ONE, 1.0).unwrap()
}

fn glasses() -> Vec<(&'static str, Arc<dyn Material>)> {
    let highlight = Phong::new(0.0, 0.0, 0.2, Color::ONE, 200.0).unwrap();
    vec![
        (
            "transparent",
            Arc::new(Transparent::new(highlight.clone(), 1.5, 0.1, 0.9).unwrap()),
        ),
        (
            "dielectric",
            Arc::new(
                Dielectric::new(highlight, 1.5, 1.0, Color::new(0.9, 0.95, 1.0), Color::ONE)
                    .unwrap(),
            ),
        ),
    ]
}

fn ball_in_sky(material: Arc<dyn Material>) -> World {
    let mut world = World::new().with_background(Color::ONE);
    world.set_tracer(Whitted);
    world.add_object(Sphere::new(Vec3::ZERO, 1.0).with_material(material));
    world
}

#[test]
fn tangent_ray_stays_finite() {
    // Skims the sphere's silhouette at (1, 0, 0)
    let ray = Ray::new(Vec3::new(1.0, 0.0, 5.0), -Vec3::Z);
    for (name, material) in glasses() {
        let world = ball_in_sky(material);
        let l = Whitted.trace_ray(&world, &ray, 0, SampleKey::new(1, 0));
        assert!(l.is_finite(), "{name}: {l:?}");
    }
}

#[test]
fn absorption_follows_path_length() {
    // Matched indices: no bending and no reflection, only the filter
    let clear = Dielectric::new(black_phong(), 1.0, 1.0, Color::splat(0.5), Color::ONE).unwrap();
    let world = ball_in_sky(Arc::new(clear));

    // Through the centre the path inside is the diameter, 2
    let centre = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
    let l = Whitted.trace_ray(&world, &centre, 0, SampleKey::new(1, 0));
    assert!((l.x - 0.25).abs() < 1e-4, "{l:?}");

    // Off-centre at height 0.6 the chord is 1.6
    let offset = Ray::new(Vec3::new(0.0, 0.6, 5.0), -Vec3::Z);
    let l = Whitted.trace_ray(&world, &offset, 0, SampleKey::new(1, 0));
    assert!((l.x - 0.5f32.powf(1.6)).abs() < 1e-3, "{l:?}");
}

fn glass_on_floor(material: Arc<dyn Material>, samples: usize) -> World {
    let mut world = World::new()
        .with_view_plane(
            ViewPlane::default()
                .with_resolution(32, 32)
                .with_samples(samples)
                .with_max_depth(6),
        )
        .with_background(Color::new(0.3, 0.4, 0.6))
        .with_seed(5);
    world.set_camera(
        Pinhole::new(Vec3::new(0.0, 1.0, 5.0), Vec3::new(0.0, 0.5, 0.0)).with_view_distance(30.0),
    );

    let sampler = Sampler::multi_jittered(samples, 5).unwrap();
    let floor = Matte::new(0.2, 0.7, Color::new(0.8, 0.7, 0.6)).with_sampler(sampler);
    world.add_object(Plane::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y).with_material(Arc::new(floor)));
    world.add_object(Sphere::new(Vec3::ZERO, 1.0).with_material(material));
    world.add_light(PointLight::new(2.0, Color::ONE, Vec3::new(2.0, 4.0, 3.0)));
    world
}

#[test]
fn glass_renders_have_finite_pixels() {
    for (name, material) in glasses() {
        let mut world = glass_on_floor(material.clone(), 4);
        world.set_tracer(Whitted);
        let image = world.render_scene().unwrap();
        assert!(image.pixels.iter().all(|c| c.is_finite()), "{name} under Whitted");

        let mut world = glass_on_floor(material, 4);
        world.set_tracer(PathTrace);
        let image = world.render_scene().unwrap();
        assert!(image.pixels.iter().all(|c| c.is_finite()), "{name} under path tracing");
    }
}
