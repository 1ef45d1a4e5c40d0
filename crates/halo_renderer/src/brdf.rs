//! Reflectance functions.
//!
//! `wo` points from the hit back toward the viewer and `wi` toward the
//! light; both are unit vectors. Sampled BRDFs return the density of the
//! direction they chose, and callers weight by `f * (n . wi) / pdf`.
//! Delta lobes fold their `1 / (n . wi)` into `f` and report a pdf of one.
//! A delta direction within [`GRAZING_COS`] of the tangent plane is not
//! sampled, so the fold never divides by zero.

use crate::sampler::{build_basis, Sampler};
use crate::shade_rec::ShadeRec;
use crate::texture::Pigment;
use crate::SceneError;
use halo_math::{Color, Vec3};
use std::f32::consts::FRAC_1_PI;

/// Smallest `|n . w|` a delta lobe still samples.
pub const GRAZING_COS: f32 = 1.0e-6;

/// Result of sampling a BRDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrdfSample {
    pub wi: Vec3,
    pub f: Color,
    pub pdf: f32,
}

pub trait Brdf: Send + Sync {
    /// Reflected fraction for the pair of directions.
    fn f(&self, sr: &ShadeRec, wo: Vec3, wi: Vec3) -> Color;

    /// Pick an incoming direction. `None` when this BRDF cannot be sampled.
    fn sample_f(&self, sr: &ShadeRec, wo: Vec3) -> Option<BrdfSample>;

    /// Hemispherical-directional reflectance.
    fn rho(&self, sr: &ShadeRec, wo: Vec3) -> Color;
}

/// Mirror `wo` about `n`.
#[inline]
pub fn reflect(wo: Vec3, n: Vec3) -> Vec3 {
    -wo + 2.0 * n.dot(wo) * n
}

/// Perfectly diffuse reflection.
#[derive(Debug, Clone)]
pub struct Lambertian {
    kd: f32,
    cd: Pigment,
    sampler: Option<Sampler>,
}

impl Lambertian {
    pub fn new(kd: f32, cd: impl Into<Pigment>) -> Self {
        Self {
            kd,
            cd: cd.into(),
            sampler: None,
        }
    }

    /// Enable cosine-weighted sampling.
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = Some(sampler.with_hemisphere(1.0));
        self
    }

    pub fn kd(&self) -> f32 {
        self.kd
    }
}

impl Brdf for Lambertian {
    fn f(&self, sr: &ShadeRec, _wo: Vec3, _wi: Vec3) -> Color {
        self.kd * self.cd.color(&sr.hit) * FRAC_1_PI
    }

    fn sample_f(&self, sr: &ShadeRec, _wo: Vec3) -> Option<BrdfSample> {
        let sampler = self.sampler.as_ref()?;
        let n = sr.facing_normal();
        let (u, v, w) = build_basis(n);
        let sp = sampler.sample_hemisphere(&sr.key);
        let wi = (sp.x * u + sp.y * v + sp.z * w).normalize_or_zero();

        Some(BrdfSample {
            wi,
            f: self.kd * self.cd.color(&sr.hit) * FRAC_1_PI,
            pdf: n.dot(wi) * FRAC_1_PI,
        })
    }

    fn rho(&self, sr: &ShadeRec, _wo: Vec3) -> Color {
        self.kd * self.cd.color(&sr.hit)
    }
}

/// Phong-style specular lobe around the mirror direction.
#[derive(Debug, Clone)]
pub struct GlossySpecular {
    ks: f32,
    cs: Pigment,
    exp: f32,
    sampler: Option<Sampler>,
}

impl GlossySpecular {
    pub fn new(ks: f32, cs: impl Into<Pigment>, exp: f32) -> Result<Self, SceneError> {
        if !(exp >= 0.0) {
            return Err(SceneError::InvalidExponent(exp));
        }
        Ok(Self {
            ks,
            cs: cs.into(),
            exp,
            sampler: None,
        })
    }

    /// Enable lobe sampling with `sampler` mapped to `cos^exp`.
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = Some(sampler.with_hemisphere(self.exp));
        self
    }

    pub fn exp(&self) -> f32 {
        self.exp
    }
}

impl Brdf for GlossySpecular {
    fn f(&self, sr: &ShadeRec, wo: Vec3, wi: Vec3) -> Color {
        let r = reflect(wi, sr.normal());
        let r_dot_wo = r.dot(wo);
        if r_dot_wo > 0.0 {
            self.ks * self.cs.color(&sr.hit) * r_dot_wo.powf(self.exp)
        } else {
            Color::ZERO
        }
    }

    fn sample_f(&self, sr: &ShadeRec, wo: Vec3) -> Option<BrdfSample> {
        let sampler = self.sampler.as_ref()?;
        let n = sr.facing_normal();
        let r = reflect(wo, n);
        let (u, v, w) = build_basis(r);
        let sp = sampler.sample_hemisphere(&sr.key);

        let mut wi = sp.x * u + sp.y * v + sp.z * w;
        if n.dot(wi) < 0.0 {
            // Reflect the sample back above the surface
            wi = -sp.x * u - sp.y * v + sp.z * w;
        }
        let wi = wi.normalize_or_zero();

        let lobe = r.dot(wi).max(0.0).powf(self.exp);
        Some(BrdfSample {
            wi,
            f: self.ks * self.cs.color(&sr.hit) * lobe,
            pdf: lobe * n.dot(wi),
        })
    }

    fn rho(&self, _sr: &ShadeRec, _wo: Vec3) -> Color {
        Color::ZERO
    }
}

/// Ideal mirror.
#[derive(Debug, Clone)]
pub struct PerfectSpecular {
    kr: f32,
    cr: Pigment,
}

impl PerfectSpecular {
    pub fn new(kr: f32, cr: impl Into<Pigment>) -> Self {
        Self { kr, cr: cr.into() }
    }
}

impl Brdf for PerfectSpecular {
    fn f(&self, _sr: &ShadeRec, _wo: Vec3, _wi: Vec3) -> Color {
        Color::ZERO
    }

    fn sample_f(&self, sr: &ShadeRec, wo: Vec3) -> Option<BrdfSample> {
        let wi = reflect(wo, sr.normal());
        let cos = sr.normal().dot(wi).abs();
        if cos < GRAZING_COS {
            return None;
        }
        Some(BrdfSample {
            wi,
            f: self.kr * self.cr.color(&sr.hit) / cos,
            pdf: 1.0,
        })
    }

    fn rho(&self, _sr: &ShadeRec, _wo: Vec3) -> Color {
        Color::ZERO
    }
}

/// Mirror weighted by the dielectric Fresnel reflectance.
#[derive(Debug, Clone)]
pub struct FresnelReflector {
    eta_in: f32,
    eta_out: f32,
    cr: Color,
}

impl FresnelReflector {
    pub fn new(eta_in: f32, eta_out: f32, cr: Color) -> Self {
        Self {
            eta_in,
            eta_out,
            cr,
        }
    }
}

impl Brdf for FresnelReflector {
    fn f(&self, _sr: &ShadeRec, _wo: Vec3, _wi: Vec3) -> Color {
        Color::ZERO
    }

    fn sample_f(&self, sr: &ShadeRec, wo: Vec3) -> Option<BrdfSample> {
        let n = sr.normal();
        let wi = reflect(wo, n);
        let cos = n.dot(wi).abs();
        if cos < GRAZING_COS {
            return None;
        }
        let kr = crate::btdf::fresnel(n, wo, self.eta_in, self.eta_out);
        Some(BrdfSample {
            wi,
            f: kr * self.cr / cos,
            pdf: 1.0,
        })
    }

    fn rho(&self, _sr: &ShadeRec, _wo: Vec3) -> Color {
        Color::ZERO
    }
}
