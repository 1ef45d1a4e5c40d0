//! Integrators: what a traced ray returns.
//!
//! Every tracer stops past the view plane's `max_depth` with black and
//! returns the background on a miss. The shading variants then differ
//! only in which [`Material`] entry point they call.

use crate::geometry::{GeometricObject, HitRecord, Sphere};
use crate::sampler::SampleKey;
use crate::shade_rec::ShadeRec;
use crate::world::World;
use crate::Material;
use halo_math::{Color, Interval, Ray, K_EPSILON};

pub trait Tracer: Send + Sync {
    /// Radiance arriving along `ray`, plus the distance to the hit
    /// (`f32::INFINITY` when nothing is hit).
    fn trace_ray_t(&self, world: &World, ray: &Ray, depth: u32, key: SampleKey) -> (Color, f32);

    fn trace_ray(&self, world: &World, ray: &Ray, depth: u32, key: SampleKey) -> Color {
        self.trace_ray_t(world, ray, depth, key).0
    }

    /// False for tracers that never shade, so objects may lack materials.
    fn needs_materials(&self) -> bool {
        true
    }
}

/// Depth check, nearest hit, then `shade` on the hit's material.
fn trace_with(
    world: &World,
    ray: &Ray,
    depth: u32,
    key: SampleKey,
    shade: impl FnOnce(&dyn Material, &ShadeRec) -> Color,
) -> (Color, f32) {
    if depth > world.view_plane().max_depth {
        return (Color::ZERO, f32::INFINITY);
    }

    match world.hit_objects(ray, depth, key) {
        Some(sr) => {
            let color = sr.material().map_or(Color::ZERO, |m| shade(m, &sr));
            (color, sr.hit.t)
        }
        None => (world.background(), f32::INFINITY),
    }
}

/// Red where the ray meets one fixed sphere. No shading, no recursion.
#[derive(Clone)]
pub struct SingleSphere {
    sphere: Sphere,
    color: Color,
}

impl SingleSphere {
    pub fn new(sphere: Sphere) -> Self {
        Self {
            sphere,
            color: Color::new(1.0, 0.0, 0.0),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Tracer for SingleSphere {
    fn trace_ray_t(&self, world: &World, ray: &Ray, _depth: u32, _key: SampleKey) -> (Color, f32) {
        let mut rec = HitRecord::default();
        if self
            .sphere
            .hit(ray, Interval::new(K_EPSILON, f32::INFINITY), &mut rec)
        {
            (self.color, rec.t)
        } else {
            (world.background(), f32::INFINITY)
        }
    }

    fn needs_materials(&self) -> bool {
        false
    }
}

/// Flat colour wherever any object is hit.
#[derive(Debug, Clone, Copy)]
pub struct MultipleObjects {
    hit_color: Color,
}

impl MultipleObjects {
    pub fn new(hit_color: Color) -> Self {
        Self { hit_color }
    }
}

impl Default for MultipleObjects {
    fn default() -> Self {
        Self::new(Color::ONE)
    }
}

impl Tracer for MultipleObjects {
    fn trace_ray_t(&self, world: &World, ray: &Ray, _depth: u32, key: SampleKey) -> (Color, f32) {
        match world.hit_objects(ray, 0, key) {
            Some(sr) => (self.hit_color, sr.hit.t),
            None => (world.background(), f32::INFINITY),
        }
    }

    fn needs_materials(&self) -> bool {
        false
    }
}

/// Direct lighting only.
#[derive(Debug, Clone, Copy, Default)]
pub struct RayCast;

impl Tracer for RayCast {
    fn trace_ray_t(&self, world: &World, ray: &Ray, depth: u32, key: SampleKey) -> (Color, f32) {
        trace_with(world, ray, depth, key, |m, sr| m.shade(sr))
    }
}

/// Direct lighting from sampled area lights.
#[derive(Debug, Clone, Copy, Default)]
pub struct AreaLighting;

impl Tracer for AreaLighting {
    fn trace_ray_t(&self, world: &World, ray: &Ray, depth: u32, key: SampleKey) -> (Color, f32) {
        trace_with(world, ray, depth, key, |m, sr| m.area_light_shade(sr))
    }
}

/// Direct lighting plus recursive mirror and refraction rays.
#[derive(Debug, Clone, Copy, Default)]
pub struct Whitted;

impl Tracer for Whitted {
    fn trace_ray_t(&self, world: &World, ray: &Ray, depth: u32, key: SampleKey) -> (Color, f32) {
        trace_with(world, ray, depth, key, |m, sr| m.shade(sr))
    }
}

/// Pure path tracing: light arrives only by hitting emitters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathTrace;

impl Tracer for PathTrace {
    fn trace_ray_t(&self, world: &World, ray: &Ray, depth: u32, key: SampleKey) -> (Color, f32) {
        trace_with(world, ray, depth, key, |m, sr| m.path_shade(sr))
    }
}

/// Direct lighting at the first hit plus sampled indirect bounces.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalTrace;

impl Tracer for GlobalTrace {
    fn trace_ray_t(&self, world: &World, ray: &Ray, depth: u32, key: SampleKey) -> (Color, f32) {
        trace_with(world, ray, depth, key, |m, sr| m.global_shade(sr))
    }
}
