//! Transmission functions.
//!
//! The hit normal points out of the medium. `n . wo > 0` means the ray
//! arrived from outside and is entering.

use crate::brdf::GRAZING_COS;
use crate::shade_rec::ShadeRec;
use crate::SceneError;
use halo_math::{Color, Vec3};

/// Result of sampling a BTDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BtdfSample {
    pub wt: Vec3,
    pub f: Color,
}

pub trait Btdf: Send + Sync {
    fn f(&self, sr: &ShadeRec, wo: Vec3, wi: Vec3) -> Color;

    /// Transmitted direction, `None` under total internal reflection.
    fn sample_f(&self, sr: &ShadeRec, wo: Vec3) -> Option<BtdfSample>;

    fn rho(&self, sr: &ShadeRec, wo: Vec3) -> Color;

    /// True when no light is transmitted for this hit.
    fn tir(&self, sr: &ShadeRec) -> bool;
}

/// Refraction geometry for a relative index `eta = n_inside / n_outside`.
struct Refraction {
    /// Normal on the incident side
    n: Vec3,
    /// Index ratio across the boundary in the direction of travel
    eta: f32,
    cos_i: f32,
    /// `cos^2` of the transmitted angle, negative under TIR
    cos2_t: f32,
}

impl Refraction {
    fn new(normal: Vec3, wo: Vec3, eta: f32) -> Self {
        let mut n = normal;
        let mut cos_i = n.dot(wo);
        let mut eta = eta;
        if cos_i < 0.0 {
            cos_i = -cos_i;
            n = -n;
            eta = 1.0 / eta;
        }
        let cos2_t = 1.0 - (1.0 - cos_i * cos_i) / (eta * eta);
        Self {
            n,
            eta,
            cos_i,
            cos2_t,
        }
    }

    fn direction(&self, wo: Vec3) -> Option<(Vec3, f32)> {
        if self.cos2_t < 0.0 {
            return None;
        }
        let cos_t = self.cos2_t.sqrt();
        let wt = -wo / self.eta - (cos_t - self.cos_i / self.eta) * self.n;
        Some((wt.normalize_or_zero(), cos_t))
    }
}

/// Unpolarised Fresnel reflectance for a hit with outward normal `n`.
///
/// Returns 1 under total internal reflection and at tangent incidence.
pub fn fresnel(n: Vec3, wo: Vec3, eta_in: f32, eta_out: f32) -> f32 {
    let r = Refraction::new(n, wo, eta_in / eta_out);
    if r.cos2_t < 0.0 {
        return 1.0;
    }
    let cos_t = r.cos2_t.sqrt();
    if r.cos_i < GRAZING_COS || cos_t < GRAZING_COS {
        return 1.0;
    }
    let eta = r.eta;
    let r_parallel = (eta * r.cos_i - cos_t) / (eta * r.cos_i + cos_t);
    let r_perpendicular = (r.cos_i - eta * cos_t) / (r.cos_i + eta * cos_t);
    0.5 * (r_parallel * r_parallel + r_perpendicular * r_perpendicular)
}

fn check_ior(ior: f32) -> Result<f32, SceneError> {
    if ior > 0.0 && ior.is_finite() {
        Ok(ior)
    } else {
        Err(SceneError::InvalidIor(ior))
    }
}

/// Constant transmission through an ideal interface.
#[derive(Debug, Clone)]
pub struct PerfectTransmitter {
    kt: f32,
    ior: f32,
}

impl PerfectTransmitter {
    pub fn new(kt: f32, ior: f32) -> Result<Self, SceneError> {
        Ok(Self {
            kt,
            ior: check_ior(ior)?,
        })
    }
}

impl Btdf for PerfectTransmitter {
    fn f(&self, _sr: &ShadeRec, _wo: Vec3, _wi: Vec3) -> Color {
        Color::ZERO
    }

    fn sample_f(&self, sr: &ShadeRec, wo: Vec3) -> Option<BtdfSample> {
        let r = Refraction::new(sr.normal(), wo, self.ior);
        let (wt, _) = r.direction(wo)?;
        let cos = sr.normal().dot(wt).abs();
        if cos < GRAZING_COS {
            return None;
        }
        let f = self.kt / (r.eta * r.eta) / cos;
        Some(BtdfSample {
            wt,
            f: Color::splat(f),
        })
    }

    fn rho(&self, _sr: &ShadeRec, _wo: Vec3) -> Color {
        Color::ZERO
    }

    fn tir(&self, sr: &ShadeRec) -> bool {
        Refraction::new(sr.normal(), sr.wo(), self.ior).cos2_t < 0.0
    }
}

/// Transmission weighted by `1 - fresnel`.
#[derive(Debug, Clone)]
pub struct FresnelTransmitter {
    eta_in: f32,
    eta_out: f32,
}

impl FresnelTransmitter {
    pub fn new(eta_in: f32, eta_out: f32) -> Result<Self, SceneError> {
        Ok(Self {
            eta_in: check_ior(eta_in)?,
            eta_out: check_ior(eta_out)?,
        })
    }
}

impl Btdf for FresnelTransmitter {
    fn f(&self, _sr: &ShadeRec, _wo: Vec3, _wi: Vec3) -> Color {
        Color::ZERO
    }

    fn sample_f(&self, sr: &ShadeRec, wo: Vec3) -> Option<BtdfSample> {
        let n = sr.normal();
        let r = Refraction::new(n, wo, self.eta_in / self.eta_out);
        let (wt, _) = r.direction(wo)?;
        let cos = n.dot(wt).abs();
        if cos < GRAZING_COS {
            return None;
        }
        let kt = 1.0 - fresnel(n, wo, self.eta_in, self.eta_out);
        let f = kt / (r.eta * r.eta) / cos;
        Some(BtdfSample {
            wt,
            f: Color::splat(f),
        })
    }

    fn rho(&self, _sr: &ShadeRec, _wo: Vec3) -> Color {
        Color::ZERO
    }

    fn tir(&self, sr: &ShadeRec) -> bool {
        Refraction::new(sr.normal(), sr.wo(), self.eta_in / self.eta_out).cos2_t < 0.0
    }
}
