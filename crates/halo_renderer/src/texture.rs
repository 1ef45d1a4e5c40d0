//! Spatially varying colours.
//!
//! Pattern generators live outside the renderer; they only need to
//! implement [`Texture`]. Two textures ship here: a constant and an image
//! lookup.

use crate::geometry::HitRecord;
use halo_core::Image;
use halo_math::{Color, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// Colour as a function of the hit.
pub trait Texture: Send + Sync {
    fn color(&self, hit: &HitRecord) -> Color;
}

/// Rec. 709 luminance of a linear colour.
pub fn luminance(c: Color) -> f32 {
    c.dot(Vec3::new(0.2126, 0.7152, 0.0722))
}

/// The same colour everywhere.
#[derive(Debug, Clone, Copy)]
pub struct ConstantColor {
    color: Color,
}

impl ConstantColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Texture for ConstantColor {
    fn color(&self, _hit: &HitRecord) -> Color {
        self.color
    }
}

/// How a hit picks its image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureMapping {
    /// The `(u, v)` the object reported
    #[default]
    Uv,
    /// Direction of the object-space hit point from the origin
    Spherical,
}

/// Bilinear lookup into a shared image.
#[derive(Debug, Clone)]
pub struct ImageTexture {
    image: Arc<Image>,
    mapping: TextureMapping,
}

impl ImageTexture {
    pub fn new(image: Arc<Image>) -> Self {
        Self {
            image,
            mapping: TextureMapping::Uv,
        }
    }

    pub fn with_mapping(mut self, mapping: TextureMapping) -> Self {
        self.mapping = mapping;
        self
    }

    fn uv(&self, hit: &HitRecord) -> (f32, f32) {
        match self.mapping {
            TextureMapping::Uv => (hit.u, hit.v),
            TextureMapping::Spherical => {
                let p = hit.local_hit_point.normalize_or_zero();
                let theta = p.y.clamp(-1.0, 1.0).acos();
                let phi = p.x.atan2(p.z).rem_euclid(2.0 * PI);
                // Image lookups wrap, so keep the north pole off v = 1
                let v = (1.0 - theta / PI).min(1.0 - f32::EPSILON);
                (phi / (2.0 * PI), v)
            }
        }
    }
}

impl Texture for ImageTexture {
    fn color(&self, hit: &HitRecord) -> Color {
        let (u, v) = self.uv(hit);
        self.image.sample(u, v)
    }
}

/// A material colour: fixed, or looked up per hit.
#[derive(Clone)]
pub enum Pigment {
    Solid(Color),
    Texture(Arc<dyn Texture>),
}

impl Pigment {
    #[inline]
    pub fn color(&self, hit: &HitRecord) -> Color {
        match self {
            Pigment::Solid(c) => *c,
            Pigment::Texture(t) => t.color(hit),
        }
    }
}

impl Default for Pigment {
    fn default() -> Self {
        Pigment::Solid(Color::ONE)
    }
}

impl From<Color> for Pigment {
    fn from(color: Color) -> Self {
        Pigment::Solid(color)
    }
}

impl From<Arc<dyn Texture>> for Pigment {
    fn from(texture: Arc<dyn Texture>) -> Self {
        Pigment::Texture(texture)
    }
}

impl std::fmt::Debug for Pigment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pigment::Solid(c) => f.debug_tuple("Solid").field(c).finish(),
            Pigment::Texture(_) => f.write_str("Texture(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance_weights_sum_to_one() {
        assert!((luminance(Color::ONE) - 1.0).abs() < 1e-6);
        assert!(luminance(Color::new(0.0, 1.0, 0.0)) > luminance(Color::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_image_texture_uv_lookup() {
        // 2x1: left red, right blue
        let image = Image::new(2, 1, vec![Vec3::X, Vec3::Z]).unwrap();
        let texture = ImageTexture::new(Arc::new(image));
        let hit = HitRecord {
            u: 0.0,
            v: 0.5,
            ..HitRecord::default()
        };
        assert_eq!(texture.color(&hit), Vec3::X);

        let hit = HitRecord {
            u: 0.999,
            ..hit
        };
        assert!(texture.color(&hit).z > 0.99);
    }

    #[test]
    fn test_spherical_mapping_poles() {
        // 1x2: top row white, bottom row black
        let image = Image::new(1, 2, vec![Vec3::ONE, Vec3::ZERO]).unwrap();
        let texture = ImageTexture::new(Arc::new(image)).with_mapping(TextureMapping::Spherical);

        let north = HitRecord {
            local_hit_point: Vec3::Y,
            ..HitRecord::default()
        };
        let south = HitRecord {
            local_hit_point: -Vec3::Y,
            ..HitRecord::default()
        };
        assert!(texture.color(&north).x > 0.999);
        assert!(texture.color(&south).x < 1e-3);
    }

    #[test]
    fn test_pigment_dispatch() {
        let solid = Pigment::from(Color::new(0.1, 0.2, 0.3));
        let textured = Pigment::Texture(Arc::new(ConstantColor::new(Color::ONE)));
        let hit = HitRecord::default();

        assert_eq!(solid.color(&hit), Color::new(0.1, 0.2, 0.3));
        assert_eq!(textured.color(&hit), Color::ONE);
    }
}
