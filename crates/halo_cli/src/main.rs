//! Render the bring-up scene to a PNG.
//!
//! Run `halo --help` for the flags.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use halo_math::{Color, Vec3};
use halo_renderer::camera::Pinhole;
use halo_renderer::geometry::{Plane, Rectangle, Sphere};
use halo_renderer::light::Ambient;
use halo_renderer::material::{Emissive, Matte, Phong, Reflective};
use halo_renderer::{GeometricObject, Sampler, ViewPlane, World};
use std::sync::Arc;
use std::time::Instant;

/// Two spheres on a ground plane under a square area light.
fn build_scene(args: &Args) -> Result<World> {
    let view_plane = ViewPlane::default()
        .with_resolution(args.width, args.height)
        .with_samples(args.samples)
        .with_max_depth(4)
        .with_gamma(2.2);

    let mut world = World::new()
        .with_view_plane(view_plane)
        .with_background(Color::new(0.05, 0.05, 0.08))
        .with_seed(args.seed);

    args.tracer.install(&mut world);

    let d = 1.5 * args.height as f32;
    world.set_camera(
        Pinhole::new(Vec3::new(0.0, 3.0, 10.0), Vec3::new(0.0, 1.0, 0.0)).with_view_distance(d),
    );
    world.set_ambient_light(Ambient::new(0.5, Color::ONE));

    let sampler = Sampler::multi_jittered(args.samples, args.seed)
        .context("Material sampler needs a square sample count")?;

    let ground = Matte::new(0.2, 0.6, Color::new(0.7, 0.7, 0.6)).with_sampler(sampler.fork(1));
    world.add_object(Plane::new(Vec3::ZERO, Vec3::Y).with_material(Arc::new(ground)));

    let red = Matte::new(0.2, 0.7, Color::new(0.8, 0.15, 0.1)).with_sampler(sampler.fork(2));
    world.add_object(Sphere::new(Vec3::new(-1.5, 1.0, 0.0), 1.0).with_material(Arc::new(red)));

    let chrome = Reflective::new(Phong::new(0.1, 0.2, 0.3, Color::ONE, 100.0)?, 0.75, Color::ONE);
    world.add_object(Sphere::new(Vec3::new(1.5, 1.0, 0.0), 1.0).with_material(Arc::new(chrome)));

    let panel = Rectangle::new(
        Vec3::new(-1.0, 5.0, -1.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 2.0),
    )
    .with_sampler(sampler.fork(3))
    .with_material(Arc::new(Emissive::new(20.0, Color::ONE)))
    .with_shadows(false);
    world.add_area_light(panel)?;

    Ok(world)
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    log::info!("Starting Halo ({:?} tracer)", args.tracer);

    let start = Instant::now();
    let world = build_scene(&args)?;
    log::info!("Scene built in {:?}", start.elapsed());

    let image = if args.serial {
        world.render_scene_serial()?
    } else {
        world.render_scene()?
    };

    let vp = world.view_plane();
    let rgba = image.to_rgba(vp.tone_map(), vp.gamma);
    let buffer = image::RgbaImage::from_raw(image.width, image.height, rgba)
        .context("Pixel buffer does not match the image size")?;
    buffer
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    log::info!("Saved {}", args.output.display());
    Ok(())
}
