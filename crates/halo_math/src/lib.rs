//! Vector math, rays and colour for the Halo renderer.
//!
//! Re-exports `glam` so dependent crates share one set of vector types.

pub use glam::*;

// Halo math types
mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::{AffineTransform, Mat4Ext};

/// Smallest ray parameter accepted as a hit.
///
/// Keeps secondary rays from re-hitting the surface they leave.
pub const K_EPSILON: f32 = 1.0e-3;

/// Linear RGB colour. Components are not clamped.
pub type Color = Vec3;
