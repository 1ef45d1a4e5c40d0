//! Scene construction errors.

use crate::sampler::SamplerKind;
use halo_core::MeshError;
use thiserror::Error;

/// Errors raised while assembling or validating a scene.
///
/// Everything here is caught before the first ray is traced; rendering
/// itself never fails.
#[derive(Error, Debug, PartialEq)]
pub enum SceneError {
    #[error("Sampler needs at least one sample and one set (got {samples} samples, {sets} sets)")]
    EmptySampler { samples: usize, sets: usize },

    #[error("{kind:?} sampling needs a perfect-square sample count, got {samples}")]
    NotSquare { kind: SamplerKind, samples: usize },

    #[error("Index of refraction must be positive, got {0}")]
    InvalidIor(f32),

    #[error("Glossy exponent must be non-negative, got {0}")]
    InvalidExponent(f32),

    #[error("CSG operands must both be closed solids")]
    NotSolid,

    #[error("Smooth shading needs vertex normals on the mesh")]
    MissingNormals,

    #[error("Face {face} is out of range for a mesh of {count} triangles")]
    FaceOutOfRange { face: usize, count: usize },

    #[error("Parametric surface needs at least one patch per direction, got {nu}x{nv}")]
    EmptyTessellation { nu: u32, nv: u32 },

    #[error("Area light surface has no sampler")]
    LightWithoutSampler,

    #[error("Area light surface has no material to emit with")]
    LightWithoutMaterial,

    #[error("No camera has been set")]
    MissingCamera,

    #[error("View plane resolution must be non-zero (got {hres}x{vres})")]
    EmptyViewPlane { hres: u32, vres: u32 },

    #[error("Object {0} has no material")]
    MissingMaterial(usize),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}
