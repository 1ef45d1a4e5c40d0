//! Affine instancing of any geometric object.
//!
//! Instead of transforming the object, rays are moved into the object's
//! space with the inverse matrix. The object is tested there and the hit
//! is carried back: points by the forward matrix, normals by the inverse
//! transpose. The object-space direction is not renormalised, so `t` is
//! the same in both spaces.

use super::{override_material, Crossing, GeometricObject, HitRecord, ObjectAttrs, ObjectRef};
use halo_math::{Aabb, AffineTransform, Interval, Mat4, Ray, Vec3};
use std::sync::Arc;

/// A transformed reference to a shared object.
///
/// # Example
/// ```ignore
/// let ellipsoid = Instance::new(Arc::new(Sphere::new(Vec3::ZERO, 1.0)))
///     .scale(Vec3::new(2.0, 1.0, 1.0))
///     .rotate_y(0.5)
///     .translate(Vec3::new(0.0, 1.0, 0.0));
/// ```
#[derive(Clone)]
pub struct Instance {
    object: ObjectRef,
    transform: AffineTransform,
    bbox: Option<Aabb>,
    attrs: ObjectAttrs,
}

impl Instance {
    pub fn new(object: ObjectRef) -> Self {
        Self::with_transform(object, AffineTransform::IDENTITY)
    }

    pub fn with_transform(object: ObjectRef, transform: AffineTransform) -> Self {
        let bbox = object.bounding_box().map(|b| transform.transform_aabb(&b));
        Self {
            object,
            transform,
            bbox,
            attrs: ObjectAttrs::default(),
        }
    }

    /// Append `next` after the transforms already applied.
    pub fn then(self, next: &AffineTransform) -> Self {
        let transform = self.transform.then(next);
        Self {
            attrs: self.attrs,
            ..Self::with_transform(self.object, transform)
        }
    }

    pub fn translate(self, offset: Vec3) -> Self {
        self.then(&AffineTransform::translation(offset))
    }

    pub fn scale(self, factors: Vec3) -> Self {
        self.then(&AffineTransform::scaling(factors))
    }

    pub fn rotate_x(self, radians: f32) -> Self {
        self.then(&AffineTransform::rotation_x(radians))
    }

    pub fn rotate_y(self, radians: f32) -> Self {
        self.then(&AffineTransform::rotation_y(radians))
    }

    pub fn rotate_z(self, radians: f32) -> Self {
        self.then(&AffineTransform::rotation_z(radians))
    }

    /// Apply an arbitrary matrix such as a shear. Singular matrices are
    /// ignored with a warning.
    pub fn apply_matrix(self, matrix: Mat4) -> Self {
        match AffineTransform::from_matrix(matrix) {
            Some(t) => self.then(&t),
            None => {
                log::warn!("Ignoring singular instance matrix {:?}", matrix);
                self
            }
        }
    }

    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    fn object_ray(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.transform.inverse_point(ray.origin),
            self.transform.inverse_vector(ray.direction),
        )
    }

    fn to_world<'a>(&'a self, rec: &mut HitRecord<'a>) {
        rec.hit_point = self.transform.transform_point(rec.hit_point);
        rec.normal = self.transform.transform_normal(rec.normal).normalize_or_zero();
        override_material(&self.attrs, rec);
    }
}

impl GeometricObject for Instance {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if let Some(bbox) = &self.bbox {
            if !bbox.hit(ray, ray_t) {
                return false;
            }
        }

        if !self.object.hit(&self.object_ray(ray), ray_t, rec) {
            return false;
        }
        self.to_world(rec);
        true
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        if !self.attrs.shadows {
            return None;
        }
        self.object.shadow_hit(&self.object_ray(ray), ray_t)
    }

    fn intersections<'a>(&'a self, ray: &Ray) -> Vec<Crossing<'a>> {
        let mut crossings = self.object.intersections(&self.object_ray(ray));
        for crossing in &mut crossings {
            self.to_world(&mut crossing.hit);
        }
        crossings
    }

    fn is_solid(&self) -> bool {
        self.object.is_solid()
    }

    fn normal_at(&self, p: Vec3) -> Vec3 {
        let local = self.object.normal_at(self.transform.inverse_point(p));
        self.transform.transform_normal(local).normalize_or_zero()
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn clone_object(&self) -> ObjectRef {
        Arc::new(Self {
            object: self.object.clone_object(),
            transform: self.transform,
            bbox: self.bbox,
            attrs: self.attrs.clone(),
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
    use crate::geometry::Sphere;
    use halo_math::K_EPSILON;
    use std::f32::consts::FRAC_PI_2;

    fn forward() -> Interval {
        Interval::new(K_EPSILON, f32::INFINITY)
    }

    fn unit_sphere() -> ObjectRef {
        Arc::new(Sphere::new(Vec3::ZERO, 1.0))
    }

    #[test]
    fn test_translated_sphere() {
        let instance = Instance::new(unit_sphere()).translate(Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let mut rec = HitRecord::default();

        assert!(instance.hit(&ray, forward(), &mut rec));
        assert!((rec.t - 4.0).abs() < 1e-5);
        assert!((rec.hit_point - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
        // Object-space point stays on the unit sphere
        assert!((rec.local_hit_point - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_scaled_ray_keeps_t() {
        let instance = Instance::new(unit_sphere()).scale(Vec3::splat(2.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z);
        let mut rec = HitRecord::default();

        assert!(instance.hit(&ray, forward(), &mut rec));
        assert!((rec.t - 8.0).abs() < 1e-4);
        assert!((ray.at(rec.t) - rec.hit_point).length() < 1e-4);
    }

    #[test]
    fn test_rotation_moves_normal() {
        // Rotating a +x facing point by 90 degrees about z makes it face +y
        let instance = Instance::new(unit_sphere())
            .translate(Vec3::X)
            .rotate_z(FRAC_PI_2);
        let bbox = instance.bounding_box().unwrap();
        assert!((bbox.centroid() - Vec3::Y).length() < 1e-4);
    }

    #[test]
    fn test_singular_matrix_is_ignored() {
        let instance = Instance::new(unit_sphere()).apply_matrix(Mat4::ZERO);
        assert_eq!(*instance.transform(), AffineTransform::IDENTITY);
    }

    #[test]
    fn test_instance_of_solid_is_solid() {
        let instance = Instance::new(unit_sphere()).scale(Vec3::new(1.0, 3.0, 1.0));
        let ray = Ray::new(Vec3::new(0.0, -10.0, 0.0), Vec3::Y);
        let crossings = instance.intersections(&ray);

        assert!(instance.is_solid());
        assert_eq!(crossings.len(), 2);
        assert!((crossings[0].hit.t - 7.0).abs() < 1e-4);
        assert!((crossings[1].hit.t - 13.0).abs() < 1e-4);
    }
}
