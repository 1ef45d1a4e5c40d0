//! Glass with fixed reflection and transmission weights.

use super::{Material, Phong};
use crate::brdf::{Brdf, PerfectSpecular};
use crate::btdf::{Btdf, PerfectTransmitter};
use crate::shade_rec::ShadeRec;
use crate::SceneError;
use halo_math::Color;

/// Phong surface that also reflects and refracts with fixed weights.
///
/// Where refraction is impossible (total internal reflection) all light is
/// reflected.
#[derive(Clone)]
pub struct Transparent {
    phong: Phong,
    mirror: PerfectSpecular,
    transmitter: PerfectTransmitter,
}

impl Transparent {
    pub fn new(phong: Phong, ior: f32, kr: f32, kt: f32) -> Result<Self, SceneError> {
        Ok(Self {
            phong,
            mirror: PerfectSpecular::new(kr, Color::ONE),
            transmitter: PerfectTransmitter::new(kt, ior)?,
        })
    }

    fn specular(&self, sr: &ShadeRec) -> Color {
        let wo = sr.wo();
        let n = sr.normal();
        let transmitted = self.transmitter.sample_f(sr, wo);

        let mut l = Color::ZERO;
        if let Some(reflected) = self.mirror.sample_f(sr, wo) {
            let lr = sr.trace(reflected.wi, 1);
            l += match transmitted {
                // Total internal reflection keeps all the light
                None => lr,
                Some(_) => reflected.f * lr * n.dot(reflected.wi).abs(),
            };
        }
        if let Some(transmitted) = transmitted {
            l += transmitted.f * sr.trace(transmitted.wt, 2) * n.dot(transmitted.wt).abs();
        }
        l
    }
}

impl Material for Transparent {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::shade_rec_in;
    use crate::tracer::Whitted;
    use crate::world::World;
    use halo_math::{Ray, Vec3};

    fn thin_glass() -> Transparent {
        let black = Phong::new(0.0, 0.0, 0.0, Color::ONE, 1.0).unwrap();
        Transparent::new(black, 1.5, 0.1, 0.9).unwrap()
    }

    fn white_sky() -> World {
        let mut world = World::new().with_background(Color::ONE);
        world.set_tracer(Whitted);
        world
    }

    #[test]
    fn test_fixed_weights_head_on() {
        let world = white_sky();
        shade_rec_in(&world, Vec3::ZERO, Vec3::Y, |sr| {
            // kr + kt / eta^2
            let l = thin_glass().specular(sr);
            assert!((l.x - 0.5).abs() < 1e-5, "{l:?}");
        });
    }

    #[test]
    fn test_total_internal_reflection_keeps_everything() {
        let world = white_sky();
        shade_rec_in(&world, Vec3::ZERO, Vec3::Y, |sr| {
            let mut inside = *sr;
            inside.ray = Ray::new(
                Vec3::new(-0.9, -0.1, 0.0),
                Vec3::new(0.9, 0.1, 0.0).normalize(),
            );
            let glass = thin_glass();
            assert!(glass.transmitter.tir(&inside));
            assert!((glass.specular(&inside) - Color::ONE).length() < 1e-5);
        });
    }

    #[test]
    fn test_tangent_view_stays_finite() {
        let world = white_sky();
        shade_rec_in(&world, Vec3::ZERO, Vec3::Y, |sr| {
            let mut grazing = *sr;
            grazing.ray = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::X);
            let l = thin_glass().shade(&grazing);
            assert!(l.is_finite());
            // Only the refracted ray survives: kt / eta^2 of the sky
            assert!((l.x - 0.4).abs() < 1e-5, "{l:?}");
        });
    }
}
