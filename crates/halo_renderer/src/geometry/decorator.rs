//! Wrappers that alter how another object's hits look or whether they count.

use super::{override_material, GeometricObject, HitRecord, ObjectAttrs, ObjectRef};
use crate::texture::{luminance, Texture};
use halo_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// Upper bound on how many masked-out hits a clipped object skips along one ray.
const MAX_CLIP_LAYERS: usize = 64;

/// Perturbs the wrapped object's normals with a texture.
///
/// The texture colour, remapped from `[0, 1]` to `[-1, 1]` and scaled by
/// `strength`, offsets the normal. The result is averaged with the
/// original normal.
#[derive(Clone)]
pub struct BumpMapped {
    object: ObjectRef,
    bump: Arc<dyn Texture>,
    strength: f32,
    attrs: ObjectAttrs,
}

impl BumpMapped {
    pub fn new(object: ObjectRef, bump: Arc<dyn Texture>, strength: f32) -> Self {
        Self {
            object,
            bump,
            strength,
            attrs: ObjectAttrs::default(),
        }
    }

    fn perturb(&self, rec: &HitRecord) -> Vec3 {
        let n = rec.normal;
        let offset = self.strength * (2.0 * self.bump.color(rec) - Vec3::ONE);
        let perturbed = (n + offset).try_normalize().unwrap_or(n);
        (n + perturbed).try_normalize().unwrap_or(n)
    }
}

impl GeometricObject for BumpMapped {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if !self.object.hit(ray, ray_t, rec) {
            return false;
        }
        rec.normal = self.perturb(rec);
        override_material(&self.attrs, rec);
        true
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        if !self.attrs.shadows {
            return None;
        }
        self.object.shadow_hit(ray, ray_t)
    }

    fn normal_at(&self, p: Vec3) -> Vec3 {
        self.object.normal_at(p)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.object.bounding_box()
    }

    fn clone_object(&self) -> ObjectRef {
        Arc::new(Self {
            object: self.object.clone_object(),
            ..self.clone()
        })
    }

    fn has_material(&self) -> bool {
        self.attrs.material.is_some() || self.object.has_material()
    }

    fn attrs(&self) -> &ObjectAttrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut ObjectAttrs {
        &mut self.attrs
    }
}

/// Cuts holes in the wrapped object where a mask texture is bright.
///
/// A candidate hit whose mask luminance exceeds `threshold` is rejected
/// and the search resumes just past it along the same ray.
#[derive(Clone)]
pub struct Clipped {
    object: ObjectRef,
    mask: Arc<dyn Texture>,
    threshold: f32,
    attrs: ObjectAttrs,
}

impl Clipped {
    pub fn new(object: ObjectRef, mask: Arc<dyn Texture>, threshold: f32) -> Self {
        Self {
            object,
            mask,
            threshold,
            attrs: ObjectAttrs::default(),
        }
    }
}

impl GeometricObject for Clipped {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let mut window = ray_t;

        for _ in 0..MAX_CLIP_LAYERS {
            let mut candidate = HitRecord::default();
            if !self.object.hit(ray, window, &mut candidate) {
                return false;
            }
            if luminance(self.mask.color(&candidate)) <= self.threshold {
                *rec = candidate;
                override_material(&self.attrs, rec);
                return true;
            }
            window.min = candidate.t;
        }

        false
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        if !self.attrs.shadows {
            return None;
        }
        // The mask needs full hit data, so occlusion re-derives the hit
        let mut rec = HitRecord::default();
        self.hit(ray, ray_t, &mut rec).then_some(rec.t)
    }

    fn normal_at(&self, p: Vec3) -> Vec3 {
        self.object.normal_at(p)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.object.bounding_box()
    }

    fn clone_object(&self) -> ObjectRef {
        Arc::new(Self {
            object: self.object.clone_object(),
            ..self.clone()
        })
    }

    fn has_material(&self) -> bool {
        self.attrs.material.is_some() || self.object.has_material()
    }

    fn attrs(&self) -> &ObjectAttrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut ObjectAttrs {
        &mut self.attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Plane, Sphere};
    use crate::texture::ConstantColor;
    use halo_math::{Color, K_EPSILON};

    /// White where x > 0, black elsewhere.
    struct HalfMask;

    impl Texture for HalfMask {
        fn color(&self, hit: &HitRecord) -> Color {
            if hit.hit_point.x > 0.0 {
                Color::ONE
            } else {
                Color::ZERO
            }
        }
    }

    fn forward() -> Interval {
        Interval::new(K_EPSILON, f32::INFINITY)
    }

    #[test]
    fn test_neutral_bump_keeps_normal() {
        let plane: ObjectRef = Arc::new(Plane::new(Vec3::ZERO, Vec3::Y));
        let bumped = BumpMapped::new(plane, Arc::new(ConstantColor::new(Color::splat(0.5))), 1.0);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y);
        let mut rec = HitRecord::default();

        assert!(bumped.hit(&ray, forward(), &mut rec));
        assert!((rec.normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_bump_tilts_normal() {
        let plane: ObjectRef = Arc::new(Plane::new(Vec3::ZERO, Vec3::Y));
        let tilt = ConstantColor::new(Color::new(1.0, 0.5, 0.5));
        let bumped = BumpMapped::new(plane, Arc::new(tilt), 1.0);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y);
        let mut rec = HitRecord::default();

        assert!(bumped.hit(&ray, forward(), &mut rec));
        assert!(rec.normal.x > 0.1);
        assert!((rec.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_clipped_skips_masked_front_face() {
        // Front face at x = 1 is cut away; the back face at x = -1 remains
        let sphere: ObjectRef = Arc::new(Sphere::new(Vec3::ZERO, 1.0));
        let clipped = Clipped::new(sphere, Arc::new(HalfMask), 0.5);
        let ray = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let mut rec = HitRecord::default();

        assert!(clipped.hit(&ray, forward(), &mut rec));
        assert!((rec.hit_point.x + 1.0).abs() < 1e-4);
        assert_eq!(clipped.shadow_hit(&ray, forward()), Some(rec.t));
    }

    #[test]
    fn test_fully_masked_object_is_invisible() {
        let sphere: ObjectRef = Arc::new(Sphere::new(Vec3::new(2.0, 0.0, 0.0), 0.5));
        let clipped = Clipped::new(sphere, Arc::new(HalfMask), 0.5);
        let ray = Ray::new(Vec3::new(2.0, 0.0, 5.0), -Vec3::Z);
        let mut rec = HitRecord::default();

        assert!(!clipped.hit(&ray, forward(), &mut rec));
        assert!(clipped.shadow_hit(&ray, forward()).is_none());
    }
}
