//! Mirror and glossy reflectors layered over Phong shading.
//!
//! Both trace one reflected ray per hit, shaded with the viewer-facing
//! normal so either side of a surface reflects.

use super::{sampled_bounce, Material, Phong};
use crate::brdf::{GlossySpecular, Lambertian, PerfectSpecular};
use crate::sampler::Sampler;
use crate::shade_rec::ShadeRec;
use crate::texture::Pigment;
use crate::SceneError;
use halo_math::Color;
use std::sync::Arc;

/// Phong surface with a perfect mirror lobe.
#[derive(Clone)]
pub struct Reflective {
    phong: Phong,
    mirror: PerfectSpecular,
}

impl Reflective {
    pub fn new(phong: Phong, kr: f32, cr: impl Into<Pigment>) -> Self {
        Self {
            phong,
            mirror: PerfectSpecular::new(kr, cr),
        }
    }

    /// A mirror with no local shading at all.
    pub fn mirror(kr: f32, cr: impl Into<Pigment>) -> Self {
        let black = Arc::new(Lambertian::new(0.0, Color::ZERO));
        Self::new(Phong::from_brdfs(black.clone(), black.clone(), black), kr, cr)
    }
}

impl Material for Reflective {
    fn shade(&self, sr: &ShadeRec) -> Color {
        self.phong.shade(sr) + sampled_bounce(sr, &self.mirror, 1, sr.depth + 1)
    }

    fn path_shade(&self, sr: &ShadeRec) -> Color {
        sampled_bounce(sr, &self.mirror, 1, sr.depth + 1)
    }

    fn global_shade(&self, sr: &ShadeRec) -> Color {
        // Skip a level for camera rays so an emitter seen in the mirror
        // is not suppressed as a first bounce
        let depth = if sr.depth == 0 { sr.depth + 2 } else { sr.depth + 1 };
        sampled_bounce(sr, &self.mirror, 1, depth)
    }
}

/// Phong surface with a sampled glossy reflection lobe.
#[derive(Clone)]
pub struct GlossyReflector {
    phong: Phong,
    glossy: GlossySpecular,
}

impl GlossyReflector {
    pub fn new(
        phong: Phong,
        kr: f32,
        cr: impl Into<Pigment>,
        exp: f32,
        sampler: Sampler,
    ) -> Result<Self, SceneError> {
        Ok(Self {
            phong,
            glossy: GlossySpecular::new(kr, cr, exp)?.with_sampler(sampler),
        })
    }
}

impl Material for GlossyReflector {
    fn shade(&self, sr: &ShadeRec) -> Color {
        self.phong.shade(sr) + sampled_bounce(sr, &self.glossy, 1, sr.depth + 1)
    }

    fn path_shade(&self, sr: &ShadeRec) -> Color {
        sampled_bounce(sr, &self.glossy, 1, sr.depth + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::SampleKey;
    use crate::test_support::shade_rec_in;
    use crate::tracer::Whitted;
    use crate::world::World;
    use halo_math::{Ray, Vec3};

    fn white_sky() -> World {
        let mut world = World::new().with_background(Color::ONE);
        world.set_tracer(Whitted);
        world
    }

    #[test]
    fn test_mirror_reflects_the_sky() {
        let world = white_sky();
        let mirror = Reflective::mirror(0.5, Color::ONE);
        shade_rec_in(&world, Vec3::ZERO, Vec3::Y, |sr| {
            assert!((mirror.shade(sr).x - 0.5).abs() < 1e-5);
        });
    }

    #[test]
    fn test_mirror_seen_from_behind() {
        let world = white_sky();
        let mirror = Reflective::mirror(0.5, Color::ONE);
        shade_rec_in(&world, Vec3::ZERO, Vec3::Y, |sr| {
            let mut behind = *sr;
            behind.ray = Ray::new(
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0).normalize(),
            );
            assert!((mirror.shade(&behind).x - 0.5).abs() < 1e-5);
        });
    }

    #[test]
    fn test_glossy_bounce_weight_is_kr() {
        let world = white_sky();
        let black = Phong::new(0.0, 0.0, 0.0, Color::ONE, 1.0).unwrap();
        let sampler = Sampler::multi_jittered(16, 4).unwrap();
        let glossy = GlossyReflector::new(black, 0.8, Color::ONE, 1.0, sampler).unwrap();

        shade_rec_in(&world, Vec3::ZERO, Vec3::Y, |sr| {
            // Every direction sees the same sky, so f cos / pdf is all that
            // is left
            for s in 0..16 {
                let mut sample = *sr;
                sample.key = SampleKey::new(3, s);
                let l = glossy.shade(&sample);
                assert!((l.x - 0.8).abs() < 1e-4, "sample {s}: {l:?}");
            }
        });
    }

    #[test]
    fn test_glossy_rejects_negative_exponent() {
        let black = Phong::new(0.0, 0.0, 0.0, Color::ONE, 1.0).unwrap();
        let sampler = Sampler::multi_jittered(4, 1).unwrap();
        assert!(GlossyReflector::new(black, 0.8, Color::ONE, -2.0, sampler).is_err());
    }
}
