//! Open quadrics around the y axis.
//!
//! Neither shape has caps, so both are seen from inside and out; the
//! normal is flipped to face the incoming ray.

use super::{GeometricObject, HitRecord, ObjectAttrs, ObjectRef};
use halo_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// Roots of `a t^2 + b t + c`, smaller first.
fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    if a == 0.0 {
        return None;
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let e = disc.sqrt();
    let denom = 2.0 * a;
    let (t0, t1) = ((-b - e) / denom, (-b + e) / denom);
    Some((t0.min(t1), t0.max(t1)))
}

fn facing(normal: Vec3, ray: &Ray) -> Vec3 {
    if normal.dot(ray.direction) > 0.0 {
        -normal
    } else {
        normal
    }
}

/// Cylinder of `radius` around the y axis between `y0` and `y1`.
#[derive(Clone)]
pub struct OpenCylinder {
    y0: f32,
    y1: f32,
    radius: f32,
    attrs: ObjectAttrs,
}

impl OpenCylinder {
    pub fn new(y0: f32, y1: f32, radius: f32) -> Self {
        Self {
            y0: y0.min(y1),
            y1: y0.max(y1),
            radius,
            attrs: ObjectAttrs::default(),
        }
    }

    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let (o, d) = (ray.origin, ray.direction);
        let a = d.x * d.x + d.z * d.z;
        let b = 2.0 * (o.x * d.x + o.z * d.z);
        let c = o.x * o.x + o.z * o.z - self.radius * self.radius;
        let (t0, t1) = solve_quadratic(a, b, c)?;

        [t0, t1].into_iter().find(|&t| {
            let y = o.y + t * d.y;
            ray_t.surrounds(t) && self.y0 < y && y < self.y1
        })
    }
}

impl GeometricObject for OpenCylinder {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let Some(t) = self.intersect(ray, ray_t) else {
            return false;
        };

        let hit_point = ray.at(t);
        let outward = Vec3::new(hit_point.x, 0.0, hit_point.z) / self.radius;
        *rec = HitRecord {
            t,
            hit_point,
            local_hit_point: hit_point,
            normal: facing(outward, ray),
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
        Vec3::new(p.x, 0.0, p.z).normalize_or_zero()
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(Aabb::from_points(
            Vec3::new(-self.radius, self.y0, -self.radius),
            Vec3::new(self.radius, self.y1, self.radius),
        ))
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

/// Cone with its base circle of `radius` at y = 0 and apex at y = `height`.
#[derive(Clone)]
pub struct OpenCone {
    height: f32,
    radius: f32,
    attrs: ObjectAttrs,
}

impl OpenCone {
    pub fn new(height: f32, radius: f32) -> Self {
        Self {
            height,
            radius,
            attrs: ObjectAttrs::default(),
        }
    }

    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        // x^2 + z^2 = k^2 (h - y)^2
        let k = self.radius / self.height;
        let k2 = k * k;
        let (o, d) = (ray.origin, ray.direction);
        let hy = self.height - o.y;

        let a = d.x * d.x + d.z * d.z - k2 * d.y * d.y;
        let b = 2.0 * (o.x * d.x + o.z * d.z + k2 * hy * d.y);
        let c = o.x * o.x + o.z * o.z - k2 * hy * hy;
        let (t0, t1) = solve_quadratic(a, b, c)?;

        [t0, t1].into_iter().find(|&t| {
            let y = o.y + t * d.y;
            ray_t.surrounds(t) && 0.0 < y && y < self.height
        })
    }

    fn outward_normal(&self, p: Vec3) -> Vec3 {
        let k = self.radius / self.height;
        let r = (p.x * p.x + p.z * p.z).sqrt();
        Vec3::new(p.x, k * r, p.z).normalize_or_zero()
    }
}

impl GeometricObject for OpenCone {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let Some(t) = self.intersect(ray, ray_t) else {
            return false;
        };

        let hit_point = ray.at(t);
        *rec = HitRecord {
            t,
            hit_point,
            local_hit_point: hit_point,
            normal: facing(self.outward_normal(hit_point), ray),
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
        self.outward_normal(p)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(Aabb::from_points(
            Vec3::new(-self.radius, 0.0, -self.radius),
            Vec3::new(self.radius, self.height, self.radius),
        ))
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

    fn forward() -> Interval {
        Interval::new(K_EPSILON, f32::INFINITY)
    }

    #[test]
    fn test_cylinder_outside_hit() {
        let cyl = OpenCylinder::new(-1.0, 1.0, 1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.5, 5.0), -Vec3::Z);
        let mut rec = HitRecord::default();

        assert!(cyl.hit(&ray, forward(), &mut rec));
        assert!((rec.t - 4.0).abs() < 1e-5);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_cylinder_inside_hit_faces_ray() {
        let cyl = OpenCylinder::new(-1.0, 1.0, 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let mut rec = HitRecord::default();

        assert!(cyl.hit(&ray, forward(), &mut rec));
        assert!((rec.normal + Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_cylinder_respects_height() {
        let cyl = OpenCylinder::new(-1.0, 1.0, 1.0);
        let ray = Ray::new(Vec3::new(0.0, 2.0, 5.0), -Vec3::Z);
        let mut rec = HitRecord::default();

        assert!(!cyl.hit(&ray, forward(), &mut rec));
    }

    #[test]
    fn test_cone_hit_halfway_up() {
        // Radius at y = 1 is 0.5
        let cone = OpenCone::new(2.0, 1.0);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 5.0), -Vec3::Z);
        let mut rec = HitRecord::default();

        assert!(cone.hit(&ray, forward(), &mut rec));
        assert!((rec.t - 4.5).abs() < 1e-4);
        assert!(rec.normal.z > 0.0 && rec.normal.y > 0.0);
    }
}
