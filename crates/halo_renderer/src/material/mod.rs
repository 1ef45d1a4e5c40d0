//! Materials: how a hit turns incoming light into outgoing radiance.
//!
//! Each tracer calls one entry point:
//!
//! | tracer                    | entry point          |
//! |---------------------------|----------------------|
//! | `RayCast`, `Whitted`      | [`Material::shade`]  |
//! | `AreaLighting`            | [`Material::area_light_shade`] |
//! | `PathTrace`               | [`Material::path_shade`] |
//! | `GlobalTrace`             | [`Material::global_shade`] |
//!
//! Reflection is two-sided: lights and sampled bounces are weighed against
//! [`ShadeRec::facing_normal`], so a mirror or a wall seen from behind
//! shades like its front. Emission and refraction tell the sides apart.

mod dielectric;
mod emissive;
mod matte;
mod phong;
mod reflective;
mod transparent;

pub use dielectric::Dielectric;
pub use emissive::Emissive;
pub use matte::Matte;
pub use phong::{Phong, Plastic};
pub use reflective::{GlossyReflector, Reflective};
pub use transparent::Transparent;

use crate::brdf::Brdf;
use crate::shade_rec::ShadeRec;
use halo_math::{Color, Ray, Vec3};

pub trait Material: Send + Sync {
    /// Direct lighting plus any deterministic recursive lobes.
    fn shade(&self, sr: &ShadeRec) -> Color;

    /// Direct lighting with area-light sampling.
    fn area_light_shade(&self, sr: &ShadeRec) -> Color {
        self.shade(sr)
    }

    /// One sampled bounce and nothing else.
    fn path_shade(&self, _sr: &ShadeRec) -> Color {
        Color::ZERO
    }

    /// Direct lighting for camera rays plus one sampled bounce.
    fn global_shade(&self, sr: &ShadeRec) -> Color {
        if sr.depth == 0 {
            self.area_light_shade(sr) + self.path_shade(sr)
        } else {
            self.path_shade(sr)
        }
    }

    /// Radiance leaving the surface on its own.
    fn emitted(&self, _sr: &ShadeRec) -> Color {
        Color::ZERO
    }
}

/// Sum over the world's lights of `f(wi) * L * G * (n . wi) / pdf`.
///
/// Lights behind the surface are skipped. A shadow ray is cast when the
/// light casts shadows; objects opt out through their own shadow flag.
pub(crate) fn direct_lighting(sr: &ShadeRec, f: impl Fn(Vec3) -> Color) -> Color {
    let n = sr.facing_normal();
    let mut l = Color::ZERO;

    for light in sr.world.lights() {
        let sample = light.sample(sr);
        let n_dot_wi = n.dot(sample.wi);
        if n_dot_wi <= 0.0 {
            continue;
        }

        if light.casts_shadows() {
            let shadow_ray = Ray::new(sr.hit_point(), sample.wi);
            if light.in_shadow(sr, &shadow_ray, &sample) {
                continue;
            }
        }

        let pdf = light.pdf(sr, &sample);
        if pdf <= 0.0 {
            continue;
        }
        l += f(sample.wi) * light.radiance(sr, &sample) * light.g(sr, &sample) * n_dot_wi / pdf;
    }

    l
}

/// Follow one sampled direction of `brdf` and weight what comes back.
pub(crate) fn sampled_bounce(sr: &ShadeRec, brdf: &dyn Brdf, branch: u32, depth: u32) -> Color {
    let Some(sample) = brdf.sample_f(sr, sr.wo()) else {
        return Color::ZERO;
    };
    let n_dot_wi = sr.facing_normal().dot(sample.wi);
    if sample.pdf <= 0.0 || n_dot_wi <= 0.0 {
        return Color::ZERO;
    }
    let (l, _) = sr.trace_at_depth(sample.wi, branch, depth);
    sample.f * l * n_dot_wi / sample.pdf
}
