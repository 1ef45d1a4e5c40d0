//! Sphere primitive.

use super::{Crossing, GeometricObject, HitRecord, LightSurface, ObjectAttrs, ObjectRef};
use crate::{SampleKey, Sampler};
use halo_math::{Aabb, Interval, Ray, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere. Also usable as a spherical area light.
#[derive(Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    attrs: ObjectAttrs,
    sampler: Option<Sampler>,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            attrs: ObjectAttrs::default(),
            sampler: None,
        }
    }

    /// Attach a sampler for emitting from the surface.
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = Some(sampler.with_sphere());
        self
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Both roots of the ray-sphere quadratic, smaller first.
    fn roots(&self, ray: &Ray) -> Option<(f32, f32)> {
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let b = 2.0 * oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let disc = b * b - 4.0 * a * c;

        if disc < 0.0 || a == 0.0 {
            return None;
        }
        let e = disc.sqrt();
        let denom = 2.0 * a;
        Some(((-b - e) / denom, (-b + e) / denom))
    }

    fn record<'a>(&'a self, ray: &Ray, t: f32) -> HitRecord<'a> {
        let hit_point = ray.at(t);
        let local = hit_point - self.center;
        let normal = local / self.radius;
        let (u, v) = sphere_uv(normal);
        HitRecord {
            t,
            hit_point,
            local_hit_point: hit_point,
            normal,
            u,
            v,
            material: self.material(),
        }
    }
}

/// Spherical `(u, v)` of a unit direction, `v = 0` at the bottom.
pub(crate) fn sphere_uv(n: Vec3) -> (f32, f32) {
    let theta = n.y.clamp(-1.0, 1.0).acos();
    let mut phi = n.x.atan2(n.z);
    if phi < 0.0 {
        phi += 2.0 * PI;
    }
    (phi / (2.0 * PI), 1.0 - theta / PI)
}

impl GeometricObject for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let Some((t0, t1)) = self.roots(ray) else {
            return false;
        };

        let t = if ray_t.surrounds(t0) {
            t0
        } else if ray_t.surrounds(t1) {
            t1
        } else {
            return false;
        };

        *rec = self.record(ray, t);
        true
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        if !self.attrs.shadows {
            return None;
        }
        let (t0, t1) = self.roots(ray)?;
        [t0, t1].into_iter().find(|&t| ray_t.surrounds(t))
    }

    fn intersections<'a>(&'a self, ray: &Ray) -> Vec<Crossing<'a>> {
        match self.roots(ray) {
            Some((t0, t1)) if t0 < t1 => vec![
                Crossing {
                    entering: true,
                    hit: self.record(ray, t0),
                },
                Crossing {
                    entering: false,
                    hit: self.record(ray, t1),
                },
            ],
            // Tangent rays graze without entering
            _ => Vec::new(),
        }
    }

    fn is_solid(&self) -> bool {
        true
    }

    fn normal_at(&self, p: Vec3) -> Vec3 {
        (p - self.center).normalize_or_zero()
    }

    fn bounding_box(&self) -> Option<Aabb> {
        let r = Vec3::splat(self.radius);
        Some(Aabb::from_points(self.center - r, self.center + r))
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

impl LightSurface for Sphere {
    fn sampler(&self) -> Option<&Sampler> {
        self.sampler.as_ref()
    }

    fn sample(&self, key: &SampleKey) -> Vec3 {
        let dir = self
            .sampler
            .as_ref()
            .map_or(Vec3::Y, |s| s.sample_sphere(key));
        self.center + self.radius * dir
    }

    fn pdf(&self, _hit: &HitRecord) -> f32 {
        1.0 / (4.0 * PI * self.radius * self.radius)
    }
}
