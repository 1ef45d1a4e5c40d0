//! Triangle primitive.
//!
//! Intersection solves the 3x3 system `o + t d = v0 + beta (v1 - v0) +
//! gamma (v2 - v0)` with Cramer's rule.

use super::{GeometricObject, HitRecord, ObjectAttrs, ObjectRef};
use halo_math::{Aabb, Interval, Ray, Vec3, K_EPSILON};
use std::sync::Arc;

/// Barycentric `(beta, gamma)` and `t` of a ray against a triangle.
///
/// Degenerate triangles and rays parallel to the plane miss.
pub(crate) fn intersect_triangle(
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    ray: &Ray,
    ray_t: Interval,
) -> Option<(f32, f32, f32)> {
    let (o, dir) = (ray.origin, ray.direction);

    let a = v0.x - v1.x;
    let b = v0.x - v2.x;
    let c = dir.x;
    let d = v0.x - o.x;
    let e = v0.y - v1.y;
    let f = v0.y - v2.y;
    let g = dir.y;
    let h = v0.y - o.y;
    let i = v0.z - v1.z;
    let j = v0.z - v2.z;
    let k = dir.z;
    let l = v0.z - o.z;

    let m = f * k - g * j;
    let n = h * k - g * l;
    let p = f * l - h * j;
    let q = g * i - e * k;
    let s = e * j - f * i;

    let denom = a * m + b * q + c * s;
    if denom.abs() < 1e-12 {
        return None;
    }
    let inv_denom = 1.0 / denom;

    let beta = (d * m - b * n - c * p) * inv_denom;
    if beta < 0.0 {
        return None;
    }

    let r = e * l - h * i;
    let gamma = (a * n + d * q + c * r) * inv_denom;
    if gamma < 0.0 || beta + gamma > 1.0 {
        return None;
    }

    let t = (a * p - b * r + d * s) * inv_denom;
    if t < K_EPSILON || !ray_t.surrounds(t) {
        return None;
    }

    Some((beta, gamma, t))
}

/// A free-standing triangle with a flat normal `(v1 - v0) x (v2 - v0)`.
#[derive(Clone)]
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    normal: Vec3,
    attrs: ObjectAttrs,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self {
            v0,
            v1,
            v2,
            normal: (v1 - v0).cross(v2 - v0).normalize_or_zero(),
            attrs: ObjectAttrs::default(),
        }
    }
}

impl GeometricObject for Triangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let Some((beta, gamma, t)) = intersect_triangle(self.v0, self.v1, self.v2, ray, ray_t)
        else {
            return false;
        };

        let hit_point = ray.at(t);
        *rec = HitRecord {
            t,
            hit_point,
            local_hit_point: hit_point,
            normal: self.normal,
            u: beta,
            v: gamma,
            material: self.material(),
        };
        true
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        if !self.attrs.shadows {
            return None;
        }
        intersect_triangle(self.v0, self.v1, self.v2, ray, ray_t).map(|(_, _, t)| t)
    }

    fn normal_at(&self, _p: Vec3) -> Vec3 {
        self.normal
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Aabb::enclosing(&[self.v0, self.v1, self.v2])
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
