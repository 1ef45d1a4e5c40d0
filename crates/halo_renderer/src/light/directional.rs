//! Directional lights.

use super::{Light, LightSample};
use crate::shade_rec::ShadeRec;
use halo_math::{Color, Interval, Ray, Vec3, K_EPSILON};

/// Parallel light from infinitely far away.
#[derive(Debug, Clone, Copy)]
pub struct Directional {
    ls: f32,
    color: Color,
    /// Unit direction toward the light
    direction: Vec3,
    shadows: bool,
}

impl Directional {
    /// `direction` points from the scene toward the light.
    pub fn new(ls: f32, color: Color, direction: Vec3) -> Self {
        Self {
            ls,
            color,
            direction: direction.normalize_or_zero(),
            shadows: true,
        }
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }
}

impl Light for Directional {
    fn sample(&self, _sr: &ShadeRec) -> LightSample {
        LightSample::toward(self.direction)
    }

    fn radiance(&self, _sr: &ShadeRec, _sample: &LightSample) -> Color {
        self.ls * self.color
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
    use crate::geometry::Sphere;
    use crate::test_support::{shade_rec_at, shade_rec_in};
    use crate::world::World;

    #[test]
    fn test_same_direction_everywhere() {
        let light = Directional::new(2.0, Color::new(1.0, 0.5, 0.0), Vec3::new(0.0, 3.0, 0.0));
        for point in [Vec3::ZERO, Vec3::new(10.0, -4.0, 2.0)] {
            shade_rec_at(point, Vec3::Y, |sr| {
                let s = light.sample(sr);
                assert_eq!(s.wi, Vec3::Y);
                assert_eq!(light.radiance(sr, &s), Color::new(2.0, 1.0, 0.0));
            });
        }
    }

    #[test]
    fn test_blocked_only_along_its_direction() {
        let mut world = World::new();
        world.add_object(Sphere::new(Vec3::new(0.0, 50.0, 0.0), 1.0));

        let overhead = Directional::new(1.0, Color::ONE, Vec3::Y);
        let sideways = Directional::new(1.0, Color::ONE, Vec3::new(1.0, 1.0, 0.0));
        shade_rec_in(&world, Vec3::ZERO, Vec3::Y, |sr| {
            let s = overhead.sample(sr);
            assert!(overhead.in_shadow(sr, &Ray::new(sr.hit_point(), s.wi), &s));

            let s = sideways.sample(sr);
            assert!(!sideways.in_shadow(sr, &Ray::new(sr.hit_point(), s.wi), &s));
        });
    }
}
