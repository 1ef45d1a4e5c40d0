//! Per-intersection state handed from hit testing to shading.

use crate::geometry::HitRecord;
use crate::sampler::SampleKey;
use crate::world::World;
use crate::Material;
use halo_math::{Color, Ray, Vec3};

/// Everything a material needs to shade one hit.
///
/// Built by [`World::hit_objects`] for the nearest hit of a traced ray and
/// dropped once the ray's radiance is known.
#[derive(Clone, Copy)]
pub struct ShadeRec<'w> {
    pub world: &'w World,
    pub hit: HitRecord<'w>,
    /// The ray that produced the hit
    pub ray: Ray,
    /// Recursion depth of `ray`, 0 for camera rays
    pub depth: u32,
    /// Sampler identity of `ray`'s lineage
    pub key: SampleKey,
}

impl<'w> ShadeRec<'w> {
    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.hit.normal
    }

    /// The normal turned toward the viewer.
    ///
    /// Reflection shades both sides of a surface with this normal.
    /// Emission and refraction keep the outward [`ShadeRec::normal`].
    #[inline]
    pub fn facing_normal(&self) -> Vec3 {
        let n = self.hit.normal;
        if n.dot(self.wo()) < 0.0 {
            -n
        } else {
            n
        }
    }

    #[inline]
    pub fn hit_point(&self) -> Vec3 {
        self.hit.hit_point
    }

    /// Direction back toward the ray origin.
    #[inline]
    pub fn wo(&self) -> Vec3 {
        -self.ray.direction
    }

    pub fn material(&self) -> Option<&'w dyn Material> {
        self.hit.material
    }

    /// Radiance of the world's ambient light at this hit.
    pub fn ambient_radiance(&self) -> Color {
        let ambient = self.world.ambient_light();
        ambient.radiance(self, &ambient.sample(self))
    }

    /// Trace the `branch`th child ray of this hit one level deeper.
    pub fn trace(&self, direction: Vec3, branch: u32) -> Color {
        self.trace_t(direction, branch).0
    }

    /// As [`ShadeRec::trace`], also returning the child's hit distance.
    pub fn trace_t(&self, direction: Vec3, branch: u32) -> (Color, f32) {
        self.trace_at_depth(direction, branch, self.depth + 1)
    }

    pub(crate) fn trace_at_depth(&self, direction: Vec3, branch: u32, depth: u32) -> (Color, f32) {
        let ray = Ray::new(self.hit.hit_point, direction);
        self.world
            .tracer()
            .trace_ray_t(self.world, &ray, depth, self.key.branch(branch))
    }
}

impl std::fmt::Debug for ShadeRec<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadeRec")
            .field("hit", &self.hit)
            .field("ray", &self.ray)
            .field("depth", &self.depth)
            .field("key", &self.key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::shade_rec_at;
    use halo_math::{Ray, Vec3};

    #[test]
    fn test_facing_normal_turns_toward_viewer() {
        shade_rec_at(Vec3::ZERO, Vec3::Y, |sr| {
            assert_eq!(sr.facing_normal(), Vec3::Y);

            let mut behind = *sr;
            behind.ray = Ray::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y);
            assert_eq!(behind.facing_normal(), -Vec3::Y);
            assert_eq!(behind.normal(), Vec3::Y);
        });
    }
}
