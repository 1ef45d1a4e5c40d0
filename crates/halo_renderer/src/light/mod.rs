//! Light sources.
//!
//! A light is queried in three steps per shading point: [`Light::sample`]
//! picks the direction (and for area lights the point) toward the light,
//! [`Light::radiance`] gives the incident radiance along it, and
//! [`Light::in_shadow`] tests the shadow ray. Area lights also supply the
//! geometry term and the density of their point sampling.

mod ambient;
mod area;
mod directional;
mod environment;
mod point;

pub use ambient::{Ambient, AmbientOccluder};
pub use area::AreaLight;
pub use directional::Directional;
pub use environment::EnvironmentLight;
pub use point::PointLight;

use crate::shade_rec::ShadeRec;
use halo_math::{Color, Ray, Vec3};

/// Where a light was sampled from a shading point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    /// Unit direction from the hit toward the light
    pub wi: Vec3,
    /// Sampled point on the light; unused by lights at infinity
    pub point: Vec3,
    /// Light surface normal at `point`
    pub normal: Vec3,
}

impl LightSample {
    pub fn toward(wi: Vec3) -> Self {
        Self {
            wi,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
        }
    }
}

pub trait Light: Send + Sync {
    fn sample(&self, sr: &ShadeRec) -> LightSample;

    /// Incident radiance arriving along `sample.wi`.
    fn radiance(&self, sr: &ShadeRec, sample: &LightSample) -> Color;

    /// Geometry term between the hit and the sampled point.
    fn g(&self, _sr: &ShadeRec, _sample: &LightSample) -> f32 {
        1.0
    }

    /// Density of the sampled point.
    fn pdf(&self, _sr: &ShadeRec, _sample: &LightSample) -> f32 {
        1.0
    }

    fn casts_shadows(&self) -> bool;

    /// True when something blocks `ray` before it reaches the light.
    fn in_shadow(&self, sr: &ShadeRec, ray: &Ray, sample: &LightSample) -> bool;
}
