//! Spherical patches bounded in azimuth and polar angle.

use super::{GeometricObject, HitRecord, ObjectAttrs, ObjectRef};
use halo_math::{Aabb, Interval, Ray, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere restricted to azimuth `phi` (measured from +z toward +x) and
/// polar angle `theta` (measured from +y) ranges, in radians.
///
/// Open, so the normal is flipped to face the incoming ray.
#[derive(Clone)]
pub struct PartSphere {
    center: Vec3,
    radius: f32,
    phi_min: f32,
    phi_max: f32,
    cos_theta_min: f32,
    cos_theta_max: f32,
    attrs: ObjectAttrs,
}

impl PartSphere {
    pub fn new(
        center: Vec3,
        radius: f32,
        phi_range: (f32, f32),
        theta_range: (f32, f32),
    ) -> Self {
        Self {
            center,
            radius,
            phi_min: phi_range.0,
            phi_max: phi_range.1,
            cos_theta_min: theta_range.0.cos(),
            cos_theta_max: theta_range.1.cos(),
            attrs: ObjectAttrs::default(),
        }
    }

    fn accepts(&self, local: Vec3) -> bool {
        let mut phi = local.x.atan2(local.z);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }
        let cos_theta = local.y / self.radius;
        phi >= self.phi_min
            && phi <= self.phi_max
            && cos_theta <= self.cos_theta_min
            && cos_theta >= self.cos_theta_max
    }

    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
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

        [(-b - e) / denom, (-b + e) / denom]
            .into_iter()
            .find(|&t| ray_t.surrounds(t) && self.accepts(oc + t * ray.direction))
    }
}

impl GeometricObject for PartSphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let Some(t) = self.intersect(ray, ray_t) else {
            return false;
        };

        let hit_point = ray.at(t);
        let mut normal = (hit_point - self.center) / self.radius;
        if normal.dot(ray.direction) > 0.0 {
            normal = -normal;
        }
        *rec = HitRecord {
            t,
            hit_point,
            local_hit_point: hit_point,
            normal,
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

#[cfg(test)]
mod tests {
    use super::*;
    use halo_math::K_EPSILON;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_upper_hemisphere_only() {
        let dome = PartSphere::new(Vec3::ZERO, 1.0, (0.0, 2.0 * PI), (0.0, FRAC_PI_2));
        let mut rec = HitRecord::default();

        let from_above = Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y);
        assert!(dome.hit(&from_above, Interval::new(K_EPSILON, f32::INFINITY), &mut rec));
        assert!((rec.t - 4.0).abs() < 1e-5);

        let from_below = Ray::new(Vec3::new(0.1, -5.0, 0.0), Vec3::Y);
        assert!(dome.hit(&from_below, Interval::new(K_EPSILON, f32::INFINITY), &mut rec));
        // Skips the missing lower half and hits the inside of the dome
        assert!(rec.hit_point.y > 0.0);
        assert!(rec.normal.y < 0.0);
    }
}
