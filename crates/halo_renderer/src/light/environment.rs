//! Sky light from an emissive material at infinity.

use super::{Light, LightSample};
use crate::sampler::{build_basis, Sampler};
use crate::shade_rec::ShadeRec;
use crate::Material;
use halo_math::{Color, Interval, Ray, K_EPSILON};
use std::f32::consts::FRAC_1_PI;
use std::sync::Arc;

/// Emitter surrounding the whole scene, sampled with a cosine lobe.
#[derive(Clone)]
pub struct EnvironmentLight {
    material: Arc<dyn Material>,
    sampler: Sampler,
    shadows: bool,
}

impl EnvironmentLight {
    /// `material` is usually emissive; its `emitted` radiance arrives from
    /// every direction.
    pub fn new(material: Arc<dyn Material>, sampler: Sampler) -> Self {
        Self {
            material,
            sampler: sampler.with_hemisphere(1.0),
            shadows: true,
        }
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }
}

impl Light for EnvironmentLight {
    fn sample(&self, sr: &ShadeRec) -> LightSample {
        let (u, v, w) = build_basis(sr.facing_normal());
        let sp = self.sampler.sample_hemisphere(&sr.key);
        LightSample::toward((sp.x * u + sp.y * v + sp.z * w).normalize_or_zero())
    }

    fn radiance(&self, sr: &ShadeRec, _sample: &LightSample) -> Color {
        self.material.emitted(sr)
    }

    fn pdf(&self, sr: &ShadeRec, sample: &LightSample) -> f32 {
        sr.facing_normal().dot(sample.wi) * FRAC_1_PI
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }

    fn in_shadow(&self, sr: &ShadeRec, ray: &Ray, _sample: &LightSample) -> bool {
        sr.world
            .shadow_hit(ray, Interval::new(K_EPSILON, f32::INFINITY))
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GeometricObject, Sphere};
    use crate::light::Ambient;
    use crate::material::{Emissive, Matte};
    use crate::sampler::SampleKey;
    use crate::test_support::shade_rec_in;
    use crate::world::World;
    use halo_math::Vec3;

    fn sky_world() -> World {
        let mut world = World::new();
        world.set_ambient_light(Ambient::new(0.0, Color::ONE));
        let sky = Arc::new(Emissive::new(2.0, Color::ONE));
        world.add_light(EnvironmentLight::new(sky, Sampler::multi_jittered(16, 2).unwrap()));
        world
    }

    #[test]
    fn test_samples_the_visible_hemisphere() {
        let world = sky_world();
        let light = &world.lights()[0];
        shade_rec_in(&world, Vec3::ZERO, Vec3::Y, |sr| {
            for s in 0..16 {
                let mut keyed = *sr;
                keyed.key = SampleKey::new(5, s);
                let sample = light.sample(&keyed);
                assert!(sample.wi.y >= 0.0);
                assert!((light.pdf(&keyed, &sample) - sample.wi.y * FRAC_1_PI).abs() < 1e-6);
                assert_eq!(light.radiance(&keyed, &sample), Color::splat(2.0));
            }
        });
    }

    #[test]
    fn test_matte_under_open_sky() {
        // kd / pi * L * cos / (cos / pi) = kd * L for every sample
        let world = sky_world();
        let matte = Matte::new(0.0, 0.5, Color::ONE);
        shade_rec_in(&world, Vec3::ZERO, Vec3::Y, |sr| {
            for s in 0..16 {
                let mut keyed = *sr;
                keyed.key = SampleKey::new(8, s);
                assert!((matte.shade(&keyed).x - 1.0).abs() < 1e-4);
            }
        });
    }

    #[test]
    fn test_enclosed_point_sees_no_sky() {
        let mut world = sky_world();
        world.add_object(
            Sphere::new(Vec3::ZERO, 10.0).with_material(Arc::new(Matte::new(0.0, 1.0, Color::ONE))),
        );
        let matte = Matte::new(0.0, 0.5, Color::ONE);
        shade_rec_in(&world, Vec3::ZERO, Vec3::Y, |sr| {
            assert_eq!(matte.shade(sr), Color::ZERO);
        });
    }
}
