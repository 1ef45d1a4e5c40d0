//! Axis-aligned boxes, intersected with the slab method.

use super::{Crossing, GeometricObject, HitRecord, ObjectAttrs, ObjectRef};
use halo_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// A solid box aligned with the coordinate axes.
#[derive(Clone)]
pub struct AxisAlignedBox {
    p0: Vec3,
    p1: Vec3,
    attrs: ObjectAttrs,
}

/// Entry and exit distances with the index of the face crossed at each.
struct SlabSpan {
    t0: f32,
    face_in: usize,
    t1: f32,
    face_out: usize,
}

impl AxisAlignedBox {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            p0: a.min(b),
            p1: a.max(b),
            attrs: ObjectAttrs::default(),
        }
    }

    /// Faces 0..3 are the -x, -y, -z sides, 3..6 the +x, +y, +z sides.
    fn face_normal(face: usize) -> Vec3 {
        match face {
            0 => -Vec3::X,
            1 => -Vec3::Y,
            2 => -Vec3::Z,
            3 => Vec3::X,
            4 => Vec3::Y,
            _ => Vec3::Z,
        }
    }

    fn span(&self, ray: &Ray) -> Option<SlabSpan> {
        let mut span = SlabSpan {
            t0: f32::NEG_INFINITY,
            face_in: 0,
            t1: f32::INFINITY,
            face_out: 0,
        };

        for axis in 0..3 {
            let inv = 1.0 / ray.direction[axis];
            let (near, far, near_face, far_face) = if inv >= 0.0 {
                (
                    (self.p0[axis] - ray.origin[axis]) * inv,
                    (self.p1[axis] - ray.origin[axis]) * inv,
                    axis,
                    axis + 3,
                )
            } else {
                (
                    (self.p1[axis] - ray.origin[axis]) * inv,
                    (self.p0[axis] - ray.origin[axis]) * inv,
                    axis + 3,
                    axis,
                )
            };

            if near > span.t0 {
                span.t0 = near;
                span.face_in = near_face;
            }
            if far < span.t1 {
                span.t1 = far;
                span.face_out = far_face;
            }
        }

        (span.t0 < span.t1).then_some(span)
    }

    fn record<'a>(&'a self, ray: &Ray, t: f32, face: usize) -> HitRecord<'a> {
        let hit_point = ray.at(t);
        HitRecord {
            t,
            hit_point,
            local_hit_point: hit_point,
            normal: Self::face_normal(face),
            u: 0.0,
            v: 0.0,
            material: self.material(),
        }
    }
}

impl GeometricObject for AxisAlignedBox {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let Some(span) = self.span(ray) else {
            return false;
        };

        if ray_t.surrounds(span.t0) {
            *rec = self.record(ray, span.t0, span.face_in);
            true
        } else if ray_t.surrounds(span.t1) {
            *rec = self.record(ray, span.t1, span.face_out);
            true
        } else {
            false
        }
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        if !self.attrs.shadows {
            return None;
        }
        let span = self.span(ray)?;
        [span.t0, span.t1].into_iter().find(|&t| ray_t.surrounds(t))
    }

    fn intersections<'a>(&'a self, ray: &Ray) -> Vec<Crossing<'a>> {
        match self.span(ray) {
            Some(span) => vec![
                Crossing {
                    entering: true,
                    hit: self.record(ray, span.t0, span.face_in),
                },
                Crossing {
                    entering: false,
                    hit: self.record(ray, span.t1, span.face_out),
                },
            ],
            None => Vec::new(),
        }
    }

    fn is_solid(&self) -> bool {
        true
    }

    fn normal_at(&self, p: Vec3) -> Vec3 {
        // Face whose plane is closest to the point
        let distances = [
            (p.x - self.p0.x).abs(),
            (p.y - self.p0.y).abs(),
            (p.z - self.p0.z).abs(),
            (p.x - self.p1.x).abs(),
            (p.y - self.p1.y).abs(),
            (p.z - self.p1.z).abs(),
        ];
        let face = distances
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map_or(0, |(i, _)| i);
        Self::face_normal(face)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(Aabb::from_points(self.p0, self.p1))
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
