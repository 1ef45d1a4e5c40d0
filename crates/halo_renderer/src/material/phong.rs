//! Phong shading: ambient and diffuse lobes plus a glossy highlight.

use super::{direct_lighting, sampled_bounce, Material};
use crate::brdf::{Brdf, GlossySpecular, Lambertian};
use crate::shade_rec::ShadeRec;
use crate::texture::Pigment;
use crate::SceneError;
use halo_math::Color;
use std::sync::Arc;

/// Diffuse plus a specular highlight.
///
/// The three lobes are arbitrary BRDFs; [`Phong::new`] fills them with the
/// classic Lambertian and glossy pair.
#[derive(Clone)]
pub struct Phong {
    ambient: Arc<dyn Brdf>,
    diffuse: Arc<dyn Brdf>,
    specular: Arc<dyn Brdf>,
}

/// Phong with caller-chosen lobes.
pub type Plastic = Phong;

impl Phong {
    /// White highlight of strength `ks` and sharpness `exp` over a
    /// diffuse `cd`.
    pub fn new(
        ka: f32,
        kd: f32,
        ks: f32,
        cd: impl Into<Pigment>,
        exp: f32,
    ) -> Result<Self, SceneError> {
        let cd = cd.into();
        Ok(Self {
            ambient: Arc::new(Lambertian::new(ka, cd.clone())),
            diffuse: Arc::new(Lambertian::new(kd, cd)),
            specular: Arc::new(GlossySpecular::new(ks, Color::ONE, exp)?),
        })
    }

    pub fn from_brdfs(
        ambient: Arc<dyn Brdf>,
        diffuse: Arc<dyn Brdf>,
        specular: Arc<dyn Brdf>,
    ) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
        }
    }
}

impl Material for Phong {
    fn shade(&self, sr: &ShadeRec) -> Color {
        let wo = sr.wo();
        let ambient = self.ambient.rho(sr, wo) * sr.ambient_radiance();
        ambient
            + direct_lighting(sr, |wi| {
                self.diffuse.f(sr, wo, wi) + self.specular.f(sr, wo, wi)
            })
    }

    fn path_shade(&self, sr: &ShadeRec) -> Color {
        sampled_bounce(sr, self.diffuse.as_ref(), 0, sr.depth + 1)
    }
}
