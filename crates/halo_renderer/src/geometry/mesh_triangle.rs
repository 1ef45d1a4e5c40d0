//! Triangles that index into a shared [`Mesh`].

use super::triangle::intersect_triangle;
use super::{GeometricObject, HitRecord, ObjectAttrs, ObjectRef};
use crate::SceneError;
use halo_core::Mesh;
use halo_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// How a mesh triangle's shading normal is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshShading {
    /// Face normal
    Flat,
    /// Vertex normals interpolated by barycentrics
    Smooth,
}

/// One face of a shared mesh.
#[derive(Clone)]
pub struct MeshTriangle {
    mesh: Arc<Mesh>,
    indices: [usize; 3],
    face_normal: Vec3,
    shading: MeshShading,
    attrs: ObjectAttrs,
}

impl MeshTriangle {
    /// Face `face` of `mesh`. Smooth shading needs vertex normals on the
    /// mesh.
    pub fn new(mesh: Arc<Mesh>, face: usize, shading: MeshShading) -> Result<Self, SceneError> {
        if shading == MeshShading::Smooth && !mesh.has_normals() {
            return Err(SceneError::MissingNormals);
        }
        let count = mesh.triangle_count();
        if face >= count {
            return Err(SceneError::FaceOutOfRange { face, count });
        }
        let indices = mesh.triangle(face);
        let [p0, p1, p2] = indices.map(|i| mesh.positions[i]);

        Ok(Self {
            face_normal: (p1 - p0).cross(p2 - p0).normalize_or_zero(),
            mesh,
            indices,
            shading,
            attrs: ObjectAttrs::default(),
        })
    }

    fn vertices(&self) -> [Vec3; 3] {
        self.indices.map(|i| self.mesh.positions[i])
    }

    fn shading_normal(&self, beta: f32, gamma: f32) -> Vec3 {
        match (self.shading, &self.mesh.normals) {
            (MeshShading::Smooth, Some(normals)) => {
                let [n0, n1, n2] = self.indices.map(|i| normals[i]);
                ((1.0 - beta - gamma) * n0 + beta * n1 + gamma * n2)
                    .try_normalize()
                    .unwrap_or(self.face_normal)
            }
            _ => self.face_normal,
        }
    }

    fn uv(&self, beta: f32, gamma: f32) -> (f32, f32) {
        match &self.mesh.uvs {
            Some(uvs) => {
                let [a, b, c] = self.indices.map(|i| uvs[i]);
                let alpha = 1.0 - beta - gamma;
                (
                    alpha * a[0] + beta * b[0] + gamma * c[0],
                    alpha * a[1] + beta * b[1] + gamma * c[1],
                )
            }
            None => (beta, gamma),
        }
    }
}

/// Barycentric `(beta, gamma)` of a point of triangle `v0 v1 v2` near `p`,
/// and the distance from `p` to it.
///
/// `p` is projected onto the triangle's plane and pulled back inside by
/// clamping negative weights, which is exact for points over the face.
pub(crate) fn nearest_barycentrics(p: Vec3, [v0, v1, v2]: [Vec3; 3]) -> (f32, f32, f32) {
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    let d = p - v0;
    let (d11, d12, d22) = (e1.dot(e1), e1.dot(e2), e2.dot(e2));
    let denom = d11 * d22 - d12 * d12;
    if denom.abs() < f32::EPSILON {
        return (0.0, 0.0, p.distance(v0));
    }

    let (dp1, dp2) = (d.dot(e1), d.dot(e2));
    let beta = ((d22 * dp1 - d12 * dp2) / denom).max(0.0);
    let gamma = ((d11 * dp2 - d12 * dp1) / denom).max(0.0);
    let alpha = (1.0 - beta - gamma).max(0.0);
    // The three weights sum to at least 1 after clamping
    let sum = alpha + beta + gamma;
    let (beta, gamma) = (beta / sum, gamma / sum);
    (beta, gamma, p.distance(v0 + beta * e1 + gamma * e2))
}

/// Every face of `mesh` as a separate object sharing `material`.
pub fn mesh_triangles(
    mesh: Arc<Mesh>,
    shading: MeshShading,
    attrs: &ObjectAttrs,
) -> Result<Vec<ObjectRef>, SceneError> {
    (0..mesh.triangle_count())
        .map(|face| {
            let mut triangle = MeshTriangle::new(mesh.clone(), face, shading)?;
            triangle.attrs = attrs.clone();
            Ok(Arc::new(triangle) as ObjectRef)
        })
        .collect()
}

impl GeometricObject for MeshTriangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let [v0, v1, v2] = self.vertices();
        let Some((beta, gamma, t)) = intersect_triangle(v0, v1, v2, ray, ray_t) else {
            return false;
        };

        let hit_point = ray.at(t);
        let (u, v) = self.uv(beta, gamma);
        *rec = HitRecord {
            t,
            hit_point,
            local_hit_point: hit_point,
            normal: self.shading_normal(beta, gamma),
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
        let [v0, v1, v2] = self.vertices();
        intersect_triangle(v0, v1, v2, ray, ray_t).map(|(_, _, t)| t)
    }

    fn normal_at(&self, p: Vec3) -> Vec3 {
        let (beta, gamma, _) = nearest_barycentrics(p, self.vertices());
        self.shading_normal(beta, gamma)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Aabb::enclosing(&self.vertices())
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
