//! Affine transforms for instancing.

// Transform utilities for Mat4
//
// Extends glam::Mat4 with the pieces instancing needs and adds an affine
// transform that carries its exact inverse alongside the forward matrix.

use crate::Aabb;
use glam::{Mat4, Vec3};

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform a surface normal, treating `self` as the *inverse* of the
    /// object's transform: `n' = (M^-1)^T n`.
    fn transform_normal3(&self, normal: Vec3) -> Vec3;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn transform_normal3(&self, normal: Vec3) -> Vec3 {
        self.transpose().transform_vector3(normal)
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let lo = aabb.min();
        let hi = aabb.max();

        let corners = [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
        .map(|corner| self.transform_point3(corner));

        // Eight corners, so enclosing() always has a box to return
        Aabb::enclosing(&corners).unwrap_or(Aabb::EMPTY)
    }
}

/// An affine transform stored with its exact inverse.
///
/// Elementary operations compose both matrices at once, so the inverse is
/// never recovered numerically. Later operations apply after earlier ones
/// (`scaling(..).then(translation(..))` scales first).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AffineTransform {
    forward: Mat4,
    inverse: Mat4,
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        forward: Mat4::IDENTITY,
        inverse: Mat4::IDENTITY,
    };

    pub fn translation(offset: Vec3) -> Self {
        Self {
            forward: Mat4::from_translation(offset),
            inverse: Mat4::from_translation(-offset),
        }
    }

    /// Non-uniform scale. Every component must be non-zero.
    pub fn scaling(scale: Vec3) -> Self {
        Self {
            forward: Mat4::from_scale(scale),
            inverse: Mat4::from_scale(scale.recip()),
        }
    }

    pub fn rotation_x(radians: f32) -> Self {
        Self {
            forward: Mat4::from_rotation_x(radians),
            inverse: Mat4::from_rotation_x(-radians),
        }
    }

    pub fn rotation_y(radians: f32) -> Self {
        Self {
            forward: Mat4::from_rotation_y(radians),
            inverse: Mat4::from_rotation_y(-radians),
        }
    }

    pub fn rotation_z(radians: f32) -> Self {
        Self {
            forward: Mat4::from_rotation_z(radians),
            inverse: Mat4::from_rotation_z(-radians),
        }
    }

    /// Wrap an arbitrary matrix (e.g. a shear). Returns `None` when it is
    /// singular.
    pub fn from_matrix(forward: Mat4) -> Option<Self> {
        if forward.determinant().abs() < 1.0e-8 {
            return None;
        }
        Some(Self {
            forward,
            inverse: forward.inverse(),
        })
    }

    /// Apply `self` first, then `next`.
    pub fn then(&self, next: &AffineTransform) -> AffineTransform {
        AffineTransform {
            forward: next.forward * self.forward,
            inverse: self.inverse * next.inverse,
        }
    }

    pub fn forward(&self) -> &Mat4 {
        &self.forward
    }

    pub fn inverse(&self) -> &Mat4 {
        &self.inverse
    }

    /// Object space to world space.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.forward.transform_point3(p)
    }

    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.forward.transform_vector3(v)
    }

    /// Object-space normal to world space by the inverse transpose.
    pub fn transform_normal(&self, n: Vec3) -> Vec3 {
        self.inverse.transform_normal3(n)
    }

    /// World space to object space.
    pub fn inverse_point(&self, p: Vec3) -> Vec3 {
        self.inverse.transform_point3(p)
    }

    pub fn inverse_vector(&self, v: Vec3) -> Vec3 {
        self.inverse.transform_vector3(v)
    }

    pub fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        self.forward.transform_aabb(aabb)
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn test_transform_aabb_translation() {
        let mat = Mat4::from_translation(Vec3::new(5.0, 5.0, 5.0));
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let transformed = mat.transform_aabb(&aabb);

        assert_close(transformed.min(), Vec3::splat(5.0));
        assert_close(transformed.max(), Vec3::splat(6.0));
    }

    #[test]
    fn test_transform_aabb_rotation_grows_box() {
        let mat = Mat4::from_rotation_z(PI / 4.0);
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::ONE);
        let transformed = mat.transform_aabb(&aabb);

        let half_diag = 2.0_f32.sqrt();
        assert!((transformed.x.max - half_diag).abs() < 1e-4);
        assert!((transformed.z.max - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_composed_inverse_round_trips() {
        let t = AffineTransform::scaling(Vec3::new(2.0, 0.5, 3.0))
            .then(&AffineTransform::rotation_y(PI / 3.0))
            .then(&AffineTransform::translation(Vec3::new(1.0, -2.0, 4.0)));

        let p = Vec3::new(0.3, -1.2, 2.5);
        assert_close(t.inverse_point(t.transform_point(p)), p);
        assert_close((*t.forward() * *t.inverse()).transform_point3(p), p);
    }

    #[test]
    fn test_then_applies_in_order() {
        let t = AffineTransform::scaling(Vec3::splat(2.0))
            .then(&AffineTransform::translation(Vec3::X));

        // Scale first, then translate
        assert_close(t.transform_point(Vec3::X), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_normal_uses_inverse_transpose() {
        // Plane x + y = 0 has normal (1, 1, 0). Stretch along x by 4.
        let t = AffineTransform::scaling(Vec3::new(4.0, 1.0, 1.0));
        let n = t.transform_normal(Vec3::new(1.0, 1.0, 0.0)).normalize();

        // A tangent of the stretched plane stays perpendicular to the normal
        let tangent = t.transform_vector(Vec3::new(1.0, -1.0, 0.0));
        assert!(n.dot(tangent).abs() < 1e-5);

        // The forward matrix gets this wrong
        let wrong = t.transform_vector(Vec3::new(1.0, 1.0, 0.0)).normalize();
        assert!(wrong.dot(tangent).abs() > 0.1);
    }

    #[test]
    fn test_from_matrix_rejects_singular() {
        assert!(AffineTransform::from_matrix(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0))).is_none());
        assert!(AffineTransform::from_matrix(Mat4::IDENTITY).is_some());
    }
}
