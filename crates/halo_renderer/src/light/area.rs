//! Area lights backed by a sampled surface.

use super::{Light, LightSample};
use crate::geometry::{GeometricObject, LightSurface};
use crate::shade_rec::ShadeRec;
use halo_math::{Color, Interval, Ray, K_EPSILON};
use std::sync::Arc;

/// Light emitted by a sampled surface.
///
/// The surface's material supplies the emitted radiance; the surface
/// itself supplies sample points and their density. The same surface is
/// usually also added to the world as an object so it can be seen.
#[derive(Clone)]
pub struct AreaLight {
    surface: Arc<dyn LightSurface>,
    shadows: bool,
}

impl AreaLight {
    pub fn new(surface: Arc<dyn LightSurface>) -> Self {
        Self {
            surface,
            shadows: true,
        }
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }

    pub fn surface(&self) -> &Arc<dyn LightSurface> {
        &self.surface
    }
}

impl Light for AreaLight {
    fn sample(&self, sr: &ShadeRec) -> LightSample {
        let point = self.surface.sample(&sr.key);
        LightSample {
            wi: (point - sr.hit_point()).normalize_or_zero(),
            point,
            normal: self.surface.normal_at(point),
        }
    }

    fn radiance(&self, sr: &ShadeRec, sample: &LightSample) -> Color {
        if -sample.normal.dot(sample.wi) > 0.0 {
            self.surface
                .material()
                .map_or(Color::ZERO, |m| m.emitted(sr))
        } else {
            Color::ZERO
        }
    }

    fn g(&self, sr: &ShadeRec, sample: &LightSample) -> f32 {
        let cos_light = -sample.normal.dot(sample.wi);
        let d2 = sample.point.distance_squared(sr.hit_point());
        if d2 > 0.0 {
            cos_light / d2
        } else {
            0.0
        }
    }

    fn pdf(&self, sr: &ShadeRec, _sample: &LightSample) -> f32 {
        self.surface.pdf(&sr.hit)
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }

    fn in_shadow(&self, sr: &ShadeRec, ray: &Ray, sample: &LightSample) -> bool {
        let ts = (sample.point - ray.origin).dot(ray.direction);
        // Stop short of the light surface itself
        sr.world
            .shadow_hit(ray, Interval::new(K_EPSILON, ts - K_EPSILON))
            .is_some()
    }
}
