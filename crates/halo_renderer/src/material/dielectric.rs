//! Fresnel-weighted refraction with coloured media.

use super::{Material, Phong};
use crate::brdf::{Brdf, FresnelReflector};
use crate::btdf::{Btdf, FresnelTransmitter};
use crate::shade_rec::ShadeRec;
use crate::SceneError;
use halo_math::{Color, Vec3};

/// Glass-like interface between two media.
///
/// Reflection and transmission are weighted by the Fresnel equations.
/// Light travelling a distance `t` through a medium is filtered by
/// `cf^t`, using `cf_in` inside the object and `cf_out` outside.
#[derive(Clone)]
pub struct Dielectric {
    phong: Phong,
    reflector: FresnelReflector,
    transmitter: FresnelTransmitter,
    cf_in: Color,
    cf_out: Color,
}

impl Dielectric {
    pub fn new(
        phong: Phong,
        eta_in: f32,
        eta_out: f32,
        cf_in: Color,
        cf_out: Color,
    ) -> Result<Self, SceneError> {
        Ok(Self {
            phong,
            reflector: FresnelReflector::new(eta_in, eta_out, Color::ONE),
            transmitter: FresnelTransmitter::new(eta_in, eta_out)?,
            cf_in,
            cf_out,
        })
    }

    fn specular(&self, sr: &ShadeRec) -> Color {
        let wo = sr.wo();
        let n = sr.normal();
        // Filter of the medium a direction travels into
        let medium = |w: Vec3| if n.dot(w) < 0.0 { self.cf_in } else { self.cf_out };
        let transmitted = self.transmitter.sample_f(sr, wo);

        let mut l = Color::ZERO;
        if let Some(reflected) = self.reflector.sample_f(sr, wo) {
            let (lr, tr) = sr.trace_t(reflected.wi, 1);
            let lr = filter(medium(reflected.wi), tr) * lr;
            l += match transmitted {
                None => lr,
                Some(_) => reflected.f * lr * n.dot(reflected.wi).abs(),
            };
        }
        if let Some(transmitted) = transmitted {
            let (lt, tt) = sr.trace_t(transmitted.wt, 2);
            l += transmitted.f
                * filter(medium(transmitted.wt), tt)
                * lt
                * n.dot(transmitted.wt).abs();
        }
        l
    }
}

/// Beer-Lambert style attenuation over distance `t`.
fn filter(cf: Color, t: f32) -> Color {
    Color::new(cf.x.powf(t), cf.y.powf(t), cf.z.powf(t))
}

impl Material for Dielectric {
    fn shade(&self, sr: &ShadeRec) -> Color {
        self.phong.shade(sr) + self.specular(sr)
    }

    fn path_shade(&self, sr: &ShadeRec) -> Color {
        self.specular(sr)
    }

    fn global_shade(&self, sr: &ShadeRec) -> Color {
        if sr.depth == 0 {
            self.shade(sr)
        } else {
            self.specular(sr)
        }
    }
}
