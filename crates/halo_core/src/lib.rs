//! Halo Core - read-only scene data shared with external loaders.
//!
//! This crate provides:
//!
//! - **Mesh**: vertex positions, optional normals and UVs, triangle indices
//! - **Image**: linear RGB pixel buffers for image textures
//!
//! Loaders (PLY/OBJ readers, image decoders) live outside Halo; they fill
//! these types and hand them to the renderer, which only reads them.
//!
//! # Example
//!
//! ```
//! use halo_core::Mesh;
//! use halo_math::Vec3;
//!
//! let mesh = Mesh::new(
//!     vec![Vec3::ZERO, Vec3::X, Vec3::Y],
//!     vec![0, 1, 2],
//!     None,
//! ).unwrap();
//! assert_eq!(mesh.triangle_count(), 1);
//! ```

pub mod image;
pub mod mesh;

// Re-export commonly used types
pub use crate::image::{Image, ImageError};
pub use mesh::{Mesh, MeshError};
