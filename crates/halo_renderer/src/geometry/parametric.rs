//! Surfaces given by a point/normal function of two parameters.
//!
//! The surface is sampled on a regular `(u, v)` lattice into a mesh of
//! smooth triangles that live in a [`Grid`].

use super::mesh_triangle::nearest_barycentrics;
use super::{mesh_triangles, GeometricObject, HitRecord, MeshShading, ObjectAttrs, ObjectRef};
use crate::grid::{Grid, GridBuilder};
use crate::SceneError;
use halo_core::Mesh;
use halo_math::{Aabb, Interval, Ray, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// Point and unit normal at parameters `(u, v)`.
pub type SurfaceFn = dyn Fn(f32, f32) -> (Vec3, Vec3) + Send + Sync;

/// A tessellated parametric surface.
#[derive(Clone)]
pub struct ParametricSurface {
    grid: Arc<Grid>,
    mesh: Arc<Mesh>,
    attrs: ObjectAttrs,
}

impl ParametricSurface {
    /// Tessellate `surface` over `u_range x v_range` with `nu x nv` patches.
    pub fn new(
        surface: &SurfaceFn,
        u_range: (f32, f32),
        v_range: (f32, f32),
        nu: u32,
        nv: u32,
    ) -> Result<Self, SceneError> {
        if nu == 0 || nv == 0 {
            return Err(SceneError::EmptyTessellation { nu, nv });
        }

        let mut positions = Vec::with_capacity(((nu + 1) * (nv + 1)) as usize);
        let mut normals = Vec::with_capacity(positions.capacity());
        let mut uvs = Vec::with_capacity(positions.capacity());

        for j in 0..=nv {
            let fv = j as f32 / nv as f32;
            let v = v_range.0 + fv * (v_range.1 - v_range.0);
            for i in 0..=nu {
                let fu = i as f32 / nu as f32;
                let u = u_range.0 + fu * (u_range.1 - u_range.0);
                let (p, n) = surface(u, v);
                positions.push(p);
                normals.push(n.normalize_or_zero());
                uvs.push([fu, fv]);
            }
        }

        let stride = nu + 1;
        let mut indices = Vec::with_capacity((nu * nv * 6) as usize);
        for j in 0..nv {
            for i in 0..nu {
                let a = j * stride + i;
                let b = a + 1;
                let c = a + stride + 1;
                let d = a + stride;
                indices.extend_from_slice(&[a, b, c, a, c, d]);
            }
        }

        let mesh = Arc::new(Mesh::new_with_uvs(positions, indices, Some(normals), Some(uvs))?);
        let triangles = mesh_triangles(mesh.clone(), MeshShading::Smooth, &ObjectAttrs::default())?;

        let mut builder = GridBuilder::new();
        for triangle in triangles {
            builder.add_object(triangle);
        }
        log::debug!(
            "Tessellated parametric surface into {} triangles",
            mesh.triangle_count()
        );

        Ok(Self {
            grid: Arc::new(builder.build()),
            mesh,
            attrs: ObjectAttrs::default(),
        })
    }

    /// Torus in the xz plane with sweep radius `a` and tube radius `b`.
    pub fn torus(a: f32, b: f32, nu: u32, nv: u32) -> Result<Self, SceneError> {
        let surface = move |u: f32, v: f32| {
            let (su, cu) = u.sin_cos();
            let (sv, cv) = v.sin_cos();
            let p = Vec3::new((a + b * cv) * cu, b * sv, (a + b * cv) * su);
            let n = Vec3::new(cv * cu, sv, cv * su);
            (p, n)
        };
        Self::new(&surface, (0.0, 2.0 * PI), (0.0, 2.0 * PI), nu, nv)
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }
}

impl GeometricObject for ParametricSurface {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if !self.grid.hit(ray, ray_t, rec) {
            return false;
        }
        // The triangles carry no material of their own
        rec.material = self.material();
        true
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        if !self.attrs.shadows {
            return None;
        }
        self.grid.shadow_hit(ray, ray_t)
    }

    /// Interpolated vertex normal of the face nearest `p`.
    fn normal_at(&self, p: Vec3) -> Vec3 {
        let Some(normals) = &self.mesh.normals else {
            return Vec3::ZERO;
        };
        let mut nearest = (f32::INFINITY, Vec3::ZERO);
        for face in 0..self.mesh.triangle_count() {
            let indices = self.mesh.triangle(face);
            let (beta, gamma, distance) =
                nearest_barycentrics(p, indices.map(|i| self.mesh.positions[i]));
            if distance < nearest.0 {
                let [n0, n1, n2] = indices.map(|i| normals[i]);
                nearest = (distance, (1.0 - beta - gamma) * n0 + beta * n1 + gamma * n2);
            }
        }
        nearest.1.normalize_or_zero()
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.grid.bounding_box()
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

    #[test]
    fn test_rejects_empty_tessellation() {
        assert!(matches!(
            ParametricSurface::torus(1.0, 0.25, 0, 8),
            Err(SceneError::EmptyTessellation { nu: 0, nv: 8 })
        ));
    }

    #[test]
    fn test_torus_hit_from_above() {
        let torus = ParametricSurface::torus(1.0, 0.25, 48, 24).unwrap();
        assert_eq!(torus.mesh().triangle_count(), 48 * 24 * 2);

        // Straight down onto the tube centre line at x = 1
        let ray = Ray::new(Vec3::new(1.0, 5.0, 0.0), -Vec3::Y);
        let mut rec = HitRecord::default();
        assert!(torus.hit(&ray, Interval::new(K_EPSILON, f32::INFINITY), &mut rec));
        assert!((rec.hit_point.y - 0.25).abs() < 0.01);
        assert!(rec.normal.y > 0.9);

        // The hole in the middle
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y);
        assert!(!torus.hit(&ray, Interval::new(K_EPSILON, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_torus_normal_at() {
        let torus = ParametricSurface::torus(1.0, 0.25, 48, 24).unwrap();

        // On a lattice vertex the stored normal comes back exactly
        assert!((torus.normal_at(Vec3::new(1.25, 0.0, 0.0)) - Vec3::X).length() < 1e-4);
        assert!(torus.normal_at(Vec3::new(1.0, 0.25, 0.0)).y > 0.99);

        // Between vertices the interpolation tracks the analytic normal
        let (u, v) = (0.3f32, 1.0f32);
        let (su, cu) = u.sin_cos();
        let (sv, cv) = v.sin_cos();
        let p = Vec3::new((1.0 + 0.25 * cv) * cu, 0.25 * sv, (1.0 + 0.25 * cv) * su);
        let expected = Vec3::new(cv * cu, sv, cv * su);
        assert!((torus.normal_at(p) - expected).length() < 0.05);
    }

    #[test]
    fn test_normal_at_agrees_with_hit() {
        let torus = ParametricSurface::torus(1.0, 0.25, 48, 24).unwrap();
        let ray = Ray::new(Vec3::new(0.9, 5.0, 0.2), -Vec3::Y);
        let mut rec = HitRecord::default();
        assert!(torus.hit(&ray, Interval::new(K_EPSILON, f32::INFINITY), &mut rec));
        assert!((torus.normal_at(rec.hit_point) - rec.normal).length() < 1e-3);
    }
}
