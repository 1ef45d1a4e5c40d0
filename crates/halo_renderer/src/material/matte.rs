//! Lambertian material.

use super::{direct_lighting, sampled_bounce, Material};
use crate::brdf::{Brdf, Lambertian};
use crate::sampler::Sampler;
use crate::shade_rec::ShadeRec;
use crate::texture::Pigment;
use halo_math::Color;

/// Diffuse surface.
///
/// Path tracing needs a sampler for the diffuse lobe; without one the
/// sampled bounce contributes nothing.
#[derive(Debug, Clone)]
pub struct Matte {
    ambient: Lambertian,
    diffuse: Lambertian,
}

impl Matte {
    /// `cd` is a colour or a texture.
    pub fn new(ka: f32, kd: f32, cd: impl Into<Pigment>) -> Self {
        let cd = cd.into();
        Self {
            ambient: Lambertian::new(ka, cd.clone()),
            diffuse: Lambertian::new(kd, cd),
        }
    }

    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.diffuse = self.diffuse.with_sampler(sampler);
        self
    }
}

impl Material for Matte {
    fn shade(&self, sr: &ShadeRec) -> Color {
        let wo = sr.wo();
        let ambient = self.ambient.rho(sr, wo) * sr.ambient_radiance();
        ambient + direct_lighting(sr, |wi| self.diffuse.f(sr, wo, wi))
    }

    fn path_shade(&self, sr: &ShadeRec) -> Color {
        sampled_bounce(sr, &self.diffuse, 0, sr.depth + 1)
    }
}
