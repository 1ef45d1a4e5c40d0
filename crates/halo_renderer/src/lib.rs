//! Halo - an offline recursive ray tracer.
//!
//! A [`World`] holds the view plane, camera, lights and geometric objects.
//! Rendering walks the image in buckets, traces sample rays through the
//! selected [`Tracer`] and returns a linear [`ImageBuffer`]. Large or
//! dense scenes go through a uniform [`Grid`] built once up front.
//!
//! The world is read-only while rendering; buckets run on the rayon pool
//! and every random decision is keyed on the pixel and sample, so the
//! same scene and seed always give the same image.

mod bucket;
mod error;
mod renderer;
mod shade_rec;

pub mod brdf;
pub mod btdf;
pub mod camera;
pub mod geometry;
pub mod grid;
pub mod light;
pub mod material;
pub mod sampler;
pub mod texture;
pub mod tracer;
pub mod world;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult};
pub use camera::{Camera, CameraFrame, Orthographic, Pinhole, ThinLens};
pub use error::SceneError;
pub use geometry::{GeometricObject, HitRecord, LightSurface, ObjectRef};
pub use grid::{Grid, GridBuilder};
pub use light::{Light, LightSample};
pub use material::Material;
pub use renderer::{color_to_rgba, render_pixel, ImageBuffer, ToneMap};
pub use sampler::{SampleKey, Sampler, SamplerKind};
pub use shade_rec::ShadeRec;
pub use texture::{Pigment, Texture};
pub use tracer::Tracer;
pub use world::{ViewPlane, World, DEFAULT_BUCKET_SIZE};

/// Re-export Vec3 and common math types from halo_math
pub use halo_math::{Aabb, Color, Interval, Ray, Vec2, Vec3};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::geometry::HitRecord;
    use crate::sampler::SampleKey;
    use crate::shade_rec::ShadeRec;
    use crate::world::World;
    use halo_math::{Ray, Vec3};

    /// Run `f` on a hit at `point` in an empty world, seen head-on along
    /// `normal`.
    pub(crate) fn shade_rec_at<R>(point: Vec3, normal: Vec3, f: impl FnOnce(&ShadeRec) -> R) -> R {
        let world = World::new();
        shade_rec_in(&world, point, normal, f)
    }

    /// Same as [`shade_rec_at`] inside `world`.
    pub(crate) fn shade_rec_in<R>(
        world: &World,
        point: Vec3,
        normal: Vec3,
        f: impl FnOnce(&ShadeRec) -> R,
    ) -> R {
        let sr = ShadeRec {
            world,
            hit: HitRecord {
                t: 1.0,
                hit_point: point,
                local_hit_point: point,
                normal,
                ..Default::default()
            },
            ray: Ray::new(point + normal, -normal),
            depth: 0,
            key: SampleKey::new(7, 0),
        };
        f(&sr)
    }
}
