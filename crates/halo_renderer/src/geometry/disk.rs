//! Disks.

use super::{GeometricObject, HitRecord, LightSurface, ObjectAttrs, ObjectRef};
use crate::sampler::build_basis;
use crate::{SampleKey, Sampler};
use halo_math::{Aabb, Interval, Ray, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// Flat disk of `radius` around `center`.
#[derive(Clone)]
pub struct Disk {
    center: Vec3,
    normal: Vec3,
    radius: f32,
    attrs: ObjectAttrs,
    sampler: Option<Sampler>,
}

impl Disk {
    pub fn new(center: Vec3, normal: Vec3, radius: f32) -> Self {
        Self {
            center,
            normal: normal.normalize(),
            radius,
            attrs: ObjectAttrs::default(),
            sampler: None,
        }
    }

    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = Some(sampler);
        self
    }

    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let denom = ray.direction.dot(self.normal);
        if denom == 0.0 {
            return None;
        }
        let t = (self.center - ray.origin).dot(self.normal) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }
        let within = (ray.at(t) - self.center).length_squared() < self.radius * self.radius;
        within.then_some(t)
    }
}

impl GeometricObject for Disk {
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
        // Extent of a tilted disk along each axis is r * sqrt(1 - n_axis^2)
        let n = self.normal;
        let extent = |c: f32| self.radius * (1.0 - c * c).max(0.0).sqrt();
        let e = Vec3::new(extent(n.x), extent(n.y), extent(n.z));
        Some(Aabb::from_points(self.center - e, self.center + e))
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

impl LightSurface for Disk {
    fn sampler(&self) -> Option<&Sampler> {
        self.sampler.as_ref()
    }

    fn sample(&self, key: &SampleKey) -> Vec3 {
        let Some(sampler) = &self.sampler else {
            return self.center;
        };
        let dp = sampler.sample_unit_disk(key);
        let (u, v, _) = build_basis(self.normal);
        self.center + self.radius * (dp.x * u + dp.y * v)
    }

    fn pdf(&self, _hit: &HitRecord) -> f32 {
        1.0 / (PI * self.radius * self.radius)
    }
}
