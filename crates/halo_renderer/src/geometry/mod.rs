//! Geometric objects and the intersection contract they share.

mod aabox;
mod compound;
mod csg;
mod cylinder;
mod decorator;
mod disk;
mod instance;
mod mesh_triangle;
mod parametric;
mod part_sphere;
mod plane;
mod rectangle;
mod sphere;
mod triangle;

pub use aabox::AxisAlignedBox;
pub use compound::Compound;
pub use csg::{combine_crossings, Csg, CsgOp};
pub use cylinder::{OpenCone, OpenCylinder};
pub use decorator::{BumpMapped, Clipped};
pub use disk::Disk;
pub use instance::Instance;
pub use mesh_triangle::{mesh_triangles, MeshShading, MeshTriangle};
pub use parametric::ParametricSurface;
pub use part_sphere::PartSphere;
pub use plane::Plane;
pub use rectangle::Rectangle;
pub use sphere::Sphere;
pub use triangle::Triangle;

use crate::{Material, SampleKey, Sampler};
use halo_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// Shared handle to any geometric object.
pub type ObjectRef = Arc<dyn GeometricObject>;

/// Record of the nearest ray-object intersection found so far.
///
/// `normal` is the shape's outward normal; it is not flipped toward the
/// ray. Shapes that are two-sided by nature (open cylinders, part spheres)
/// flip it themselves.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Ray parameter of the hit
    pub t: f32,
    /// World-space hit point
    pub hit_point: Vec3,
    /// Hit point in the space of the innermost primitive (for textures)
    pub local_hit_point: Vec3,
    /// Unit surface normal
    pub normal: Vec3,
    pub u: f32,
    pub v: f32,
    /// Material of the object that was hit
    pub material: Option<&'a dyn Material>,
}

impl Default for HitRecord<'_> {
    fn default() -> Self {
        Self {
            t: f32::INFINITY,
            hit_point: Vec3::ZERO,
            local_hit_point: Vec3::ZERO,
            normal: Vec3::ZERO,
            u: 0.0,
            v: 0.0,
            material: None,
        }
    }
}

impl std::fmt::Debug for HitRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitRecord")
            .field("t", &self.t)
            .field("hit_point", &self.hit_point)
            .field("normal", &self.normal)
            .field("u", &self.u)
            .field("v", &self.v)
            .field("has_material", &self.material.is_some())
            .finish()
    }
}

/// One boundary of a solid along a ray, used by CSG.
#[derive(Clone, Copy, Debug)]
pub struct Crossing<'a> {
    /// True when the ray passes from outside to inside
    pub entering: bool,
    pub hit: HitRecord<'a>,
}

/// Settings every object carries.
#[derive(Clone)]
pub struct ObjectAttrs {
    /// `None` on containers that defer to their children
    pub material: Option<Arc<dyn Material>>,
    /// Whether the object occludes shadow rays
    pub shadows: bool,
}

impl Default for ObjectAttrs {
    fn default() -> Self {
        Self {
            material: None,
            shadows: true,
        }
    }
}

/// Trait for everything a ray can hit.
pub trait GeometricObject: Send + Sync {
    /// Nearest hit with `t` strictly inside `ray_t`. Fills `rec` only on
    /// success.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool;

    /// Occlusion test. Returns the hit distance, or `None` when there is no
    /// hit in `ray_t` or this object does not cast shadows.
    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32>;

    /// Every boundary crossing along the whole line, sorted by `t`
    /// (negative `t` included). Empty for objects that are not solids.
    fn intersections<'a>(&'a self, _ray: &Ray) -> Vec<Crossing<'a>> {
        Vec::new()
    }

    /// True when [`GeometricObject::intersections`] describes a closed volume.
    fn is_solid(&self) -> bool {
        false
    }

    /// Outward normal at a point on the surface, zero when the shape has no
    /// closed form.
    fn normal_at(&self, _p: Vec3) -> Vec3 {
        Vec3::ZERO
    }

    /// World-space bounds, `None` for unbounded shapes.
    fn bounding_box(&self) -> Option<Aabb>;

    /// Independent copy of this object.
    fn clone_object(&self) -> ObjectRef;

    fn attrs(&self) -> &ObjectAttrs;

    fn attrs_mut(&mut self) -> &mut ObjectAttrs;

    fn material(&self) -> Option<&dyn Material> {
        self.attrs().material.as_deref()
    }

    /// True when every hit this object can report carries a material.
    fn has_material(&self) -> bool {
        self.attrs().material.is_some()
    }

    fn casts_shadows(&self) -> bool {
        self.attrs().shadows
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.attrs_mut().material = Some(material);
    }

    fn set_shadows(&mut self, shadows: bool) {
        self.attrs_mut().shadows = shadows;
    }

    fn with_material(mut self, material: Arc<dyn Material>) -> Self
    where
        Self: Sized,
    {
        self.set_material(material);
        self
    }

    fn with_shadows(mut self, shadows: bool) -> Self
    where
        Self: Sized,
    {
        self.set_shadows(shadows);
        self
    }
}

/// A surface an area light can emit from.
pub trait LightSurface: GeometricObject {
    /// Sampler used to pick points on the surface.
    fn sampler(&self) -> Option<&Sampler>;

    /// A point on the surface for this query.
    fn sample(&self, key: &SampleKey) -> Vec3;

    /// Density of [`LightSurface::sample`] per unit area.
    fn pdf(&self, hit: &HitRecord) -> f32;
}

/// Keep the nearest hit of `objects` in `rec`.
pub(crate) fn hit_nearest<'a>(
    objects: &'a [ObjectRef],
    ray: &Ray,
    ray_t: Interval,
    rec: &mut HitRecord<'a>,
) -> bool {
    let mut hit_anything = false;
    let mut closest_so_far = ray_t.max;

    for object in objects {
        if object.hit(ray, ray_t.with_max(closest_so_far), rec) {
            hit_anything = true;
            closest_so_far = rec.t;
        }
    }

    hit_anything
}

/// Nearest occluder among `objects`.
pub(crate) fn shadow_hit_nearest(objects: &[ObjectRef], ray: &Ray, ray_t: Interval) -> Option<f32> {
    let mut closest: Option<f32> = None;
    for object in objects {
        let window = ray_t.with_max(closest.unwrap_or(ray_t.max));
        if let Some(t) = object.shadow_hit(ray, window) {
            closest = Some(t);
        }
    }
    closest
}

/// Union of child bounds, `None` if any child is unbounded.
pub(crate) fn union_bounds(objects: &[ObjectRef]) -> Option<Aabb> {
    let mut bounds: Option<Aabb> = None;
    for object in objects {
        let b = object.bounding_box()?;
        bounds = Some(match bounds {
            Some(acc) => Aabb::surrounding(&acc, &b),
            None => b,
        });
    }
    bounds
}

/// Replace the material of a hit when the container overrides it.
pub(crate) fn override_material<'a>(attrs: &'a ObjectAttrs, rec: &mut HitRecord<'a>) {
    if let Some(material) = attrs.material.as_deref() {
        rec.material = Some(material);
    }
}
