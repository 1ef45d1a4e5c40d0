//! Infinite planes.

use super::{GeometricObject, HitRecord, ObjectAttrs, ObjectRef};
use halo_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// An infinite plane through `point` with unit `normal`.
#[derive(Clone)]
pub struct Plane {
    point: Vec3,
    normal: Vec3,
    attrs: ObjectAttrs,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize(),
            attrs: ObjectAttrs::default(),
        }
    }

    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let denom = ray.direction.dot(self.normal);
        if denom == 0.0 {
            return None;
        }
        let t = (self.point - ray.origin).dot(self.normal) / denom;
        ray_t.surrounds(t).then_some(t)
    }
}

impl GeometricObject for Plane {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let Some(t) = self.intersect(ray, ray_t) else {
            return false;
        };

        let hit_point = ray.at(t);
        *rec = HitRecord {
            t,
            hit_point,
            local_hit_point: hit_point,
            normal: self.normal,
            u: 0.0,
            v: 0.0,
            material: self.material(),
        };
        true
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        if !self.attrs.shadows {
            return None;
        }
        self.intersect(ray, ray_t)
    }

    fn normal_at(&self, _p: Vec3) -> Vec3 {
        self.normal
    }

    fn bounding_box(&self) -> Option<Aabb> {
        None
    }

    fn clone_object(&self) -> ObjectRef {
        Arc::new(self.clone())
    }

    fn attrs(&self) -> &ObjectAttrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut ObjectAttrs {
        &mut self.attrs
    }
}
