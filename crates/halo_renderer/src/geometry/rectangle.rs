//! Parallelograms, also usable as sampled area light surfaces.

use super::{GeometricObject, HitRecord, LightSurface, ObjectAttrs, ObjectRef};
use crate::{SampleKey, Sampler};
use halo_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// Parallelogram `p0 + s a + t b` for `s, t` in `[0, 1]`.
#[derive(Clone)]
pub struct Rectangle {
    p0: Vec3,
    a: Vec3,
    b: Vec3,
    normal: Vec3,
    a_len_sq: f32,
    b_len_sq: f32,
    area: f32,
    attrs: ObjectAttrs,
    sampler: Option<Sampler>,
}

impl Rectangle {
    /// Normal is `a x b`.
    pub fn new(p0: Vec3, a: Vec3, b: Vec3) -> Self {
        let cross = a.cross(b);
        Self {
            p0,
            a,
            b,
            normal: cross.normalize_or_zero(),
            a_len_sq: a.length_squared(),
            b_len_sq: b.length_squared(),
            area: cross.length(),
            attrs: ObjectAttrs::default(),
            sampler: None,
        }
    }

    /// Attach a sampler for emitting from the surface.
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<(f32, f32, f32)> {
        let denom = ray.direction.dot(self.normal);
        if denom == 0.0 {
            return None;
        }
        let t = (self.p0 - ray.origin).dot(self.normal) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }

        let d = ray.at(t) - self.p0;
        let da = d.dot(self.a);
        if da < 0.0 || da > self.a_len_sq {
            return None;
        }
        let db = d.dot(self.b);
        if db < 0.0 || db > self.b_len_sq {
            return None;
        }
        Some((t, da / self.a_len_sq, db / self.b_len_sq))
    }
}

impl GeometricObject for Rectangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let Some((t, u, v)) = self.intersect(ray, ray_t) else {
            return false;
        };

        let hit_point = ray.at(t);
        *rec = HitRecord {
            t,
            hit_point,
            local_hit_point: hit_point,
            normal: self.normal,
            u,
            v,
            material: self.material(),
        };
        true
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        if !self.attrs.shadows {
            return None;
        }
        self.intersect(ray, ray_t).map(|(t, _, _)| t)
    }

    fn normal_at(&self, _p: Vec3) -> Vec3 {
        self.normal
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Aabb::enclosing(&[self.p0, self.p0 + self.a, self.p0 + self.b, self.p0 + self.a + self.b])
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

impl LightSurface for Rectangle {
    fn sampler(&self) -> Option<&Sampler> {
        self.sampler.as_ref()
    }

    fn sample(&self, key: &SampleKey) -> Vec3 {
        let sp = self
            .sampler
            .as_ref()
            .map_or(halo_math::Vec2::splat(0.5), |s| s.sample_unit_square(key));
        self.p0 + sp.x * self.a + sp.y * self.b
    }

    fn pdf(&self, _hit: &HitRecord) -> f32 {
        1.0 / self.area
    }
}
