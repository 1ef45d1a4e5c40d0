//! Point lights with optional distance falloff.

use super::{Light, LightSample};
use crate::shade_rec::ShadeRec;
use halo_math::{Color, Interval, Ray, Vec3, K_EPSILON};

/// Light radiating from a single point.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    ls: f32,
    color: Color,
    location: Vec3,
    /// Radiance falls off as `1 / d^falloff`; zero disables attenuation
    falloff: f32,
    shadows: bool,
}

impl PointLight {
    pub fn new(ls: f32, color: Color, location: Vec3) -> Self {
        Self {
            ls,
            color,
            location,
            falloff: 0.0,
            shadows: true,
        }
    }

    pub fn with_falloff(mut self, exponent: f32) -> Self {
        self.falloff = exponent.max(0.0);
        self
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }

    pub fn location(&self) -> Vec3 {
        self.location
    }
}

impl Light for PointLight {
    fn sample(&self, sr: &ShadeRec) -> LightSample {
        LightSample {
            wi: (self.location - sr.hit_point()).normalize_or_zero(),
            point: self.location,
            normal: Vec3::ZERO,
        }
    }

    fn radiance(&self, sr: &ShadeRec, _sample: &LightSample) -> Color {
        let l = self.ls * self.color;
        if self.falloff > 0.0 {
            let d = self.location.distance(sr.hit_point());
            l / d.powf(self.falloff)
        } else {
            l
        }
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }

    fn in_shadow(&self, sr: &ShadeRec, ray: &Ray, _sample: &LightSample) -> bool {
        let d = self.location.distance(ray.origin);
        sr.world
            .shadow_hit(ray, Interval::new(K_EPSILON, d))
            .is_some()
    }
}
