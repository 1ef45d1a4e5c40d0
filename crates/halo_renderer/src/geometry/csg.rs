//! Constructive solid geometry over two solids.
//!
//! Each child reports every boundary crossing along the ray's full line.
//! The two lists are merged by `t` while tracking whether the ray is
//! inside each child; a crossing survives when it flips the combined
//! inside state.

use super::{Crossing, GeometricObject, HitRecord, ObjectAttrs, ObjectRef};
use crate::SceneError;
use halo_math::{Aabb, Interval, Ray, Vec3, K_EPSILON};
use std::sync::Arc;

/// Boolean combination applied to the two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsgOp {
    Union,
    Intersection,
    /// Left minus right
    Difference,
}

impl CsgOp {
    fn inside(self, in_left: bool, in_right: bool) -> bool {
        match self {
            CsgOp::Union => in_left || in_right,
            CsgOp::Intersection => in_left && in_right,
            CsgOp::Difference => in_left && !in_right,
        }
    }
}

/// Merge the crossings of two solids under `op`.
///
/// Both inputs must be sorted by `t`. Normals of the result are oriented
/// outward from the combined solid: against `ray` where it enters, along
/// `ray` where it leaves.
pub fn combine_crossings<'a>(
    op: CsgOp,
    ray: &Ray,
    left: Vec<Crossing<'a>>,
    right: Vec<Crossing<'a>>,
) -> Vec<Crossing<'a>> {
    let mut merged: Vec<(bool, Crossing<'a>)> = left
        .into_iter()
        .map(|c| (true, c))
        .chain(right.into_iter().map(|c| (false, c)))
        .collect();
    merged.sort_by(|a, b| a.1.hit.t.total_cmp(&b.1.hit.t));

    let mut in_left = false;
    let mut in_right = false;
    let mut result = Vec::new();

    for (from_left, mut crossing) in merged {
        let before = op.inside(in_left, in_right);
        if from_left {
            in_left = crossing.entering;
        } else {
            in_right = crossing.entering;
        }
        let after = op.inside(in_left, in_right);

        if before != after {
            crossing.entering = after;
            let faces_ray = crossing.hit.normal.dot(ray.direction) < 0.0;
            if faces_ray != after {
                crossing.hit.normal = -crossing.hit.normal;
            }
            result.push(crossing);
        }
    }

    result
}

/// `object`'s normal at `p`, when `p` lies on its surface.
fn surface_normal(object: &dyn GeometricObject, p: Vec3) -> Option<Vec3> {
    let n = object.normal_at(p);
    if n == Vec3::ZERO {
        return None;
    }
    // Step off along the normal and look back for the surface
    let back = Ray::new(p + n * K_EPSILON, -n);
    object
        .intersections(&back)
        .iter()
        .any(|c| (c.hit.t - K_EPSILON).abs() < 0.5 * K_EPSILON)
        .then_some(n)
}

/// Union, intersection or difference of two solids.
#[derive(Clone)]
pub struct Csg {
    op: CsgOp,
    left: ObjectRef,
    right: ObjectRef,
    bbox: Option<Aabb>,
    attrs: ObjectAttrs,
}

impl Csg {
    /// Fails unless both operands are solids.
    pub fn new(op: CsgOp, left: ObjectRef, right: ObjectRef) -> Result<Self, SceneError> {
        if !left.is_solid() || !right.is_solid() {
            return Err(SceneError::NotSolid);
        }

        let bbox = match (op, left.bounding_box(), right.bounding_box()) {
            (CsgOp::Union, Some(a), Some(b)) => Some(Aabb::surrounding(&a, &b)),
            (CsgOp::Union, _, _) => None,
            (CsgOp::Intersection, a, b) => a.or(b),
            (CsgOp::Difference, a, _) => a,
        };

        Ok(Self {
            op,
            left,
            right,
            bbox,
            attrs: ObjectAttrs::default(),
        })
    }

    pub fn union(left: ObjectRef, right: ObjectRef) -> Result<Self, SceneError> {
        Self::new(CsgOp::Union, left, right)
    }

    pub fn intersection(left: ObjectRef, right: ObjectRef) -> Result<Self, SceneError> {
        Self::new(CsgOp::Intersection, left, right)
    }

    pub fn difference(left: ObjectRef, right: ObjectRef) -> Result<Self, SceneError> {
        Self::new(CsgOp::Difference, left, right)
    }

    pub fn op(&self) -> CsgOp {
        self.op
    }
}

impl GeometricObject for Csg {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if let Some(bbox) = &self.bbox {
            if !bbox.hit(ray, ray_t) {
                return false;
            }
        }

        match self
            .intersections(ray)
            .into_iter()
            .find(|c| ray_t.surrounds(c.hit.t))
        {
            Some(crossing) => {
                *rec = crossing.hit;
                true
            }
            None => false,
        }
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        if !self.attrs.shadows {
            return None;
        }
        // Full interval evaluation, same as a shading hit
        let mut rec = HitRecord::default();
        self.hit(ray, ray_t, &mut rec).then_some(rec.t)
    }

    fn intersections<'a>(&'a self, ray: &Ray) -> Vec<Crossing<'a>> {
        let mut crossings = combine_crossings(
            self.op,
            ray,
            self.left.intersections(ray),
            self.right.intersections(ray),
        );
        if let Some(material) = self.attrs.material.as_deref() {
            for crossing in &mut crossings {
                crossing.hit.material = Some(material);
            }
        }
        crossings
    }

    fn is_solid(&self) -> bool {
        true
    }

    /// Normal of the operand whose surface holds `p`, facing out of the
    /// combined solid.
    fn normal_at(&self, p: Vec3) -> Vec3 {
        if let Some(n) = surface_normal(self.left.as_ref(), p) {
            return n;
        }
        match surface_normal(self.right.as_ref(), p) {
            // Right's surface bounds the carved cavity
            Some(n) if self.op == CsgOp::Difference => -n,
            Some(n) => n,
            None => Vec3::ZERO,
        }
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn clone_object(&self) -> ObjectRef {
        Arc::new(Self {
            op: self.op,
            left: self.left.clone_object(),
            right: self.right.clone_object(),
            bbox: self.bbox,
            attrs: self.attrs.clone(),
        })
    }

    fn has_material(&self) -> bool {
        self.attrs.material.is_some() || (self.left.has_material() && self.right.has_material())
    }

    fn attrs(&self) -> &ObjectAttrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut ObjectAttrs {
        &mut self.attrs
    }
}
