//! Ambient light and ambient occlusion.
//!
//! The world always holds exactly one of these; it is added to every
//! material's ambient lobe rather than sampled like the other lights.

use super::{Light, LightSample};
use crate::sampler::{build_basis, Sampler};
use crate::shade_rec::ShadeRec;
use halo_math::{Color, Interval, Ray, Vec3, K_EPSILON};

/// Constant light arriving from everywhere.
#[derive(Debug, Clone, Copy)]
pub struct Ambient {
    ls: f32,
    color: Color,
}

impl Ambient {
    pub fn new(ls: f32, color: Color) -> Self {
        Self { ls, color }
    }
}

impl Default for Ambient {
    fn default() -> Self {
        Self::new(1.0, Color::ONE)
    }
}

impl Light for Ambient {
    fn sample(&self, sr: &ShadeRec) -> LightSample {
        LightSample::toward(sr.facing_normal())
    }

    fn radiance(&self, _sr: &ShadeRec, _sample: &LightSample) -> Color {
        self.ls * self.color
    }

    fn casts_shadows(&self) -> bool {
        false
    }

    fn in_shadow(&self, _sr: &ShadeRec, _ray: &Ray, _sample: &LightSample) -> bool {
        false
    }
}

/// Ambient light darkened where one cosine-weighted occlusion ray is blocked.
#[derive(Debug, Clone)]
pub struct AmbientOccluder {
    ls: f32,
    color: Color,
    /// Fraction of the light kept at fully occluded points
    min_amount: f32,
    sampler: Sampler,
}

impl AmbientOccluder {
    pub fn new(ls: f32, color: Color, min_amount: f32, sampler: Sampler) -> Self {
        Self {
            ls,
            color,
            min_amount,
            sampler: sampler.with_hemisphere(1.0),
        }
    }
}

impl Light for AmbientOccluder {
    fn sample(&self, sr: &ShadeRec) -> LightSample {
        let (u, v, w) = build_basis(sr.facing_normal());
        let sp = self.sampler.sample_hemisphere(&sr.key);
        LightSample::toward((sp.x * u + sp.y * v + sp.z * w).normalize_or_zero())
    }

    fn radiance(&self, sr: &ShadeRec, sample: &LightSample) -> Color {
        let ray = Ray::new(sr.hit_point(), sample.wi);
        if self.in_shadow(sr, &ray, sample) {
            self.min_amount * self.ls * self.color
        } else {
            self.ls * self.color
        }
    }

    fn casts_shadows(&self) -> bool {
        true
    }

    fn in_shadow(&self, sr: &ShadeRec, ray: &Ray, _sample: &LightSample) -> bool {
        sr.world
            .shadow_hit(ray, Interval::new(K_EPSILON, f32::INFINITY))
            .is_some()
    }
}
