//! Triangle mesh data for mesh-triangle geometry.
//!
//! A mesh is populated once (by a file loader or by tessellation) and then
//! shared read-only between all triangles that index into it.

use halo_math::{Aabb, Vec3};
use thiserror::Error;

/// Errors raised while assembling a mesh.
#[derive(Error, Debug, PartialEq)]
pub enum MeshError {
    #[error("Index count {0} is not a multiple of 3")]
    RaggedIndices(usize),

    #[error("Triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("{what} array has {len} entries, expected one per vertex ({vertex_count})")]
    AttributeLength {
        what: &'static str,
        len: usize,
        vertex_count: usize,
    },
}

/// A mesh consisting of vertex positions, optional normals, and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional - needed for smooth shading)
    pub normals: Option<Vec<Vec3>>,

    /// UV coordinates (optional - one [u, v] per vertex)
    pub uvs: Option<Vec<[f32; 2]>>,

    /// Triangle indices (every 3 indices form a triangle, counter-clockwise)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    pub fn new(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
    ) -> Result<Self, MeshError> {
        Self::new_with_uvs(positions, indices, normals, None)
    }

    /// Create a new mesh with UV coordinates.
    ///
    /// Every index and attribute array is checked here so triangles can
    /// index without bounds failures later.
    pub fn new_with_uvs(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<[f32; 2]>>,
    ) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::RaggedIndices(indices.len()));
        }

        let vertex_count = positions.len();
        if let Some((i, &index)) = indices
            .iter()
            .enumerate()
            .find(|(_, index)| **index as usize >= vertex_count)
        {
            return Err(MeshError::IndexOutOfRange {
                triangle: i / 3,
                index,
                vertex_count,
            });
        }

        if let Some(normals) = &normals {
            if normals.len() != vertex_count {
                return Err(MeshError::AttributeLength {
                    what: "normal",
                    len: normals.len(),
                    vertex_count,
                });
            }
        }
        if let Some(uvs) = &uvs {
            if uvs.len() != vertex_count {
                return Err(MeshError::AttributeLength {
                    what: "uv",
                    len: uvs.len(),
                    vertex_count,
                });
            }
        }

        let bounds = Aabb::enclosing(&positions).unwrap_or(Aabb::EMPTY);
        Ok(Self {
            positions,
            normals,
            uvs,
            indices,
            bounds,
        })
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Replaces existing normals. Each vertex normal is the normalized
    /// average of the (area-weighted) normals of the faces sharing it.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for face in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [face[0] as usize, face[1] as usize, face[2] as usize];
            let p0 = self.positions[i0];
            let face_normal = (self.positions[i1] - p0).cross(self.positions[i2] - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        let mut degenerate = 0usize;
        for normal in &mut normals {
            let len = normal.length();
            if len > 0.0 {
                *normal /= len;
            } else {
                *normal = Vec3::Y;
                degenerate += 1;
            }
        }
        if degenerate > 0 {
            log::debug!(
                "{} of {} vertices have no adjacent face area, defaulting their normals to +Y",
                degenerate,
                self.positions.len()
            );
        }

        self.normals = Some(normals);
    }

    /// Ensure the mesh has normals, computing them if necessary.
    pub fn ensure_normals(&mut self) {
        if self.normals.is_none() {
            self.compute_normals();
        }
    }

    /// Check if the mesh has normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Check if the mesh has UV coordinates.
    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Vertex indices of triangle `i`.
    pub fn triangle(&self, i: usize) -> [usize; 3] {
        let base = 3 * i;
        [
            self.indices[base] as usize,
            self.indices[base + 1] as usize,
            self.indices[base + 2] as usize,
        ]
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}
