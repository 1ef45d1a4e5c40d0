//! Groups of objects treated as one.

use super::{
    hit_nearest, override_material, shadow_hit_nearest, union_bounds, GeometricObject, HitRecord,
    ObjectAttrs, ObjectRef,
};
use halo_math::{Aabb, Interval, Ray};
use std::sync::Arc;

/// A group of objects tested one after another.
///
/// A material set on the compound replaces the materials of its children.
#[derive(Clone, Default)]
pub struct Compound {
    objects: Vec<ObjectRef>,
    bbox: Option<Aabb>,
    attrs: ObjectAttrs,
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, object: ObjectRef) {
        self.objects.push(object);
        self.bbox = union_bounds(&self.objects);
    }

    pub fn with_object(mut self, object: ObjectRef) -> Self {
        self.add_object(object);
        self
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl GeometricObject for Compound {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if !hit_nearest(&self.objects, ray, ray_t, rec) {
            return false;
        }
        override_material(&self.attrs, rec);
        true
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        if !self.attrs.shadows {
            return None;
        }
        shadow_hit_nearest(&self.objects, ray, ray_t)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn clone_object(&self) -> ObjectRef {
        Arc::new(Self {
            objects: self.objects.iter().map(|o| o.clone_object()).collect(),
            bbox: self.bbox,
            attrs: self.attrs.clone(),
        })
    }

    fn has_material(&self) -> bool {
        self.attrs.material.is_some() || self.objects.iter().all(|o| o.has_material())
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
    use crate::geometry::{Plane, Sphere};
    use crate::material::Emissive;
    use halo_math::{Vec3, K_EPSILON};

    #[test]
    fn test_compound_returns_nearest_child() {
        let compound = Compound::new()
            .with_object(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0)))
            .with_object(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0)));
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let mut rec = HitRecord::default();

        assert!(compound.hit(&ray, Interval::new(K_EPSILON, f32::INFINITY), &mut rec));
        assert!((rec.t - 3.0).abs() < 1e-5);
        assert_eq!(compound.len(), 2);
    }

    #[test]
    fn test_unbounded_child_makes_compound_unbounded() {
        let mut compound = Compound::new();
        compound.add_object(Arc::new(Sphere::new(Vec3::ZERO, 1.0)));
        assert!(compound.bounding_box().is_some());

        compound.add_object(Arc::new(Plane::new(Vec3::ZERO, Vec3::Y)));
        assert!(compound.bounding_box().is_none());
    }

    #[test]
    fn test_material_override() {
        let child = Sphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0);
        let compound = Compound::new()
            .with_object(Arc::new(child))
            .with_material(Arc::new(Emissive::new(1.0, Vec3::ONE)));
        assert!(compound.has_material());

        let mut rec = HitRecord::default();
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        assert!(compound.hit(&ray, Interval::new(K_EPSILON, f32::INFINITY), &mut rec));
        assert!(rec.material.is_some());
    }
}
