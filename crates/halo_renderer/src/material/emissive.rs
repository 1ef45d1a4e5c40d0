//! Self-luminous surfaces.

use super::Material;
use crate::shade_rec::ShadeRec;
use halo_math::Color;

/// Surface that only emits, from its front face.
#[derive(Debug, Clone, Copy)]
pub struct Emissive {
    ls: f32,
    ce: Color,
}

impl Emissive {
    pub fn new(ls: f32, ce: Color) -> Self {
        Self { ls, ce }
    }

    fn front_face(&self, sr: &ShadeRec) -> Color {
        if sr.normal().dot(sr.wo()) > 0.0 {
            self.ls * self.ce
        } else {
            Color::ZERO
        }
    }
}

impl Material for Emissive {
    fn shade(&self, sr: &ShadeRec) -> Color {
        self.front_face(sr)
    }

    fn path_shade(&self, sr: &ShadeRec) -> Color {
        self.front_face(sr)
    }

    fn global_shade(&self, sr: &ShadeRec) -> Color {
        // First bounces already count emitters through direct lighting
        if sr.depth == 1 {
            Color::ZERO
        } else {
            self.front_face(sr)
        }
    }

    fn emitted(&self, _sr: &ShadeRec) -> Color {
        self.ls * self.ce
    }
}
