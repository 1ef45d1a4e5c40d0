//! Stratified sample patterns on the unit square, disk, hemisphere and sphere.
//!
//! A [`Sampler`] is generated once and never mutated. Rendering threads
//! read it through two front ends:
//!
//! - keyed queries (`sample_unit_square(&key)` and friends) pick a set from
//!   a hash of the sampler's salt, the pixel seed and the ray-tree stream,
//!   then use the pixel sample index to walk a shuffled permutation of it.
//!   Every sample of a pixel therefore lands in a different stratum.
//! - [`SampleCursor`] reproduces the classic rotating `count`/`jump`
//!   cursor, but is owned by a single pixel loop instead of being shared.

use crate::SceneError;
use halo_math::{Vec2, Vec3};
use rand::rngs::{SmallRng, StdRng};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;
use std::sync::Arc;

/// Number of sets generated when the caller has no preference.
pub const DEFAULT_NUM_SETS: usize = 83;

/// Point distribution used to fill the unit square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerKind {
    /// Cell centres of a `sqrt(n) x sqrt(n)` grid
    Regular,
    /// Uniform random points
    PureRandom,
    /// One random point per cell of a `sqrt(n) x sqrt(n)` grid
    Jittered,
    /// One point per row and per column of an `n x n` grid
    NRooks,
    /// Jittered and n-rooks at the same time
    MultiJittered,
    /// Low-discrepancy `(i/n, radical_inverse_2(i))`
    Hammersley,
}

impl SamplerKind {
    fn needs_square(self) -> bool {
        matches!(
            self,
            SamplerKind::Regular | SamplerKind::Jittered | SamplerKind::MultiJittered
        )
    }
}

/// Identity of one sampler query: which pixel, which pixel sample, and
/// which branch of that sample's ray tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SampleKey {
    pub pixel_seed: u64,
    pub sample: u32,
    pub stream: u64,
}

impl SampleKey {
    /// Key of a primary ray.
    pub fn new(pixel_seed: u64, sample: u32) -> Self {
        Self {
            pixel_seed,
            sample,
            stream: 0,
        }
    }

    /// Key for the `n`th child ray spawned from this one.
    pub fn branch(&self, n: u32) -> Self {
        Self {
            stream: mix64(self.stream ^ (n as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)),
            ..*self
        }
    }
}

/// SplitMix64 finaliser.
pub fn mix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for pixel `(x, y)` of a render seeded with `seed`.
pub fn pixel_seed(seed: u64, x: u32, y: u32) -> u64 {
    mix64(seed ^ mix64(((y as u64) << 32) | x as u64))
}

/// Orthonormal frame `(u, v, w)` around `w`.
pub fn build_basis(w: Vec3) -> (Vec3, Vec3, Vec3) {
    let v = w
        .cross(Vec3::new(0.0034, 1.0, 0.0071))
        .try_normalize()
        .unwrap_or_else(|| w.any_orthonormal_vector());
    let u = v.cross(w);
    (u, v, w)
}

/// Immutable bank of sample sets plus their mapped forms.
#[derive(Debug, Clone)]
pub struct Sampler {
    kind: SamplerKind,
    num_samples: usize,
    num_sets: usize,
    samples: Arc<[Vec2]>,
    shuffled_indices: Arc<[u32]>,
    disk_samples: Arc<[Vec2]>,
    hemisphere_samples: Arc<[Vec3]>,
    sphere_samples: Arc<[Vec3]>,
    salt: u64,
}

impl Sampler {
    /// Generate `num_sets` sets of `num_samples` points each.
    ///
    /// Regular, jittered and multi-jittered patterns stratify a
    /// `sqrt(n) x sqrt(n)` grid and need a perfect-square sample count.
    pub fn new(
        kind: SamplerKind,
        num_samples: usize,
        num_sets: usize,
        seed: u64,
    ) -> Result<Self, SceneError> {
        if num_samples == 0 || num_sets == 0 {
            return Err(SceneError::EmptySampler {
                samples: num_samples,
                sets: num_sets,
            });
        }
        if kind.needs_square() {
            let k = grid_side(num_samples);
            if k * k != num_samples {
                return Err(SceneError::NotSquare {
                    kind,
                    samples: num_samples,
                });
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);

        let mut samples = Vec::with_capacity(num_samples * num_sets);
        for _ in 0..num_sets {
            let set = match kind {
                SamplerKind::Regular => regular(num_samples),
                SamplerKind::PureRandom => pure_random(num_samples, &mut rng),
                SamplerKind::Jittered => jittered(num_samples, &mut rng),
                SamplerKind::NRooks => n_rooks(num_samples, &mut rng),
                SamplerKind::MultiJittered => multi_jittered(num_samples, &mut rng),
                SamplerKind::Hammersley => hammersley(num_samples),
            };
            samples.extend(set);
        }

        let mut shuffled_indices = Vec::with_capacity(num_samples * num_sets);
        let mut order: Vec<u32> = (0..num_samples as u32).collect();
        for _ in 0..num_sets {
            order.shuffle(&mut rng);
            shuffled_indices.extend_from_slice(&order);
        }

        let disk_samples: Vec<Vec2> = samples.iter().map(|&p| concentric_disk(p)).collect();

        Ok(Self {
            kind,
            num_samples,
            num_sets,
            samples: samples.into(),
            shuffled_indices: shuffled_indices.into(),
            disk_samples: disk_samples.into(),
            hemisphere_samples: Arc::from(Vec::new()),
            sphere_samples: Arc::from(Vec::new()),
            salt: mix64(seed),
        })
    }

    /// Multi-jittered sampler with [`DEFAULT_NUM_SETS`] sets.
    pub fn multi_jittered(num_samples: usize, seed: u64) -> Result<Self, SceneError> {
        Self::new(SamplerKind::MultiJittered, num_samples, DEFAULT_NUM_SETS, seed)
    }

    /// Add a `cos^e` weighted hemisphere mapping around +Z.
    pub fn with_hemisphere(mut self, e: f32) -> Self {
        let mapped: Vec<Vec3> = self.samples.iter().map(|&p| hemisphere_point(p, e)).collect();
        self.hemisphere_samples = mapped.into();
        self
    }

    /// Add a uniform mapping onto the unit sphere.
    pub fn with_sphere(mut self) -> Self {
        let mapped: Vec<Vec3> = self.samples.iter().map(|&p| sphere_point(p)).collect();
        self.sphere_samples = mapped.into();
        self
    }

    /// Same point sets under a different salt, so two users of one
    /// pattern do not pick the same set for the same key.
    pub fn fork(&self, stream: u64) -> Self {
        Self {
            salt: mix64(self.salt ^ mix64(stream)),
            ..self.clone()
        }
    }

    pub fn kind(&self) -> SamplerKind {
        self.kind
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// All unit-square points, set after set.
    pub fn points(&self) -> &[Vec2] {
        &self.samples
    }

    pub fn disk_points(&self) -> &[Vec2] {
        &self.disk_samples
    }

    /// Empty until [`Sampler::with_hemisphere`] has been applied.
    pub fn hemisphere_points(&self) -> &[Vec3] {
        &self.hemisphere_samples
    }

    /// Empty until [`Sampler::with_sphere`] has been applied.
    pub fn sphere_points(&self) -> &[Vec3] {
        &self.sphere_samples
    }

    fn index(&self, key: &SampleKey) -> usize {
        let pattern = mix64(self.salt ^ mix64(key.pixel_seed ^ mix64(key.stream)));
        let base = (pattern % self.num_sets as u64) as usize * self.num_samples;
        base + self.shuffled_indices[base + key.sample as usize % self.num_samples] as usize
    }

    pub fn sample_unit_square(&self, key: &SampleKey) -> Vec2 {
        self.samples[self.index(key)]
    }

    pub fn sample_unit_disk(&self, key: &SampleKey) -> Vec2 {
        self.disk_samples[self.index(key)]
    }

    /// Hemisphere direction around +Z, or +Z itself when no hemisphere
    /// mapping was requested.
    pub fn sample_hemisphere(&self, key: &SampleKey) -> Vec3 {
        self.hemisphere_samples
            .get(self.index(key))
            .copied()
            .unwrap_or(Vec3::Z)
    }

    pub fn sample_sphere(&self, key: &SampleKey) -> Vec3 {
        self.sphere_samples
            .get(self.index(key))
            .copied()
            .unwrap_or(Vec3::Z)
    }

    /// Rotating cursor for one pixel loop.
    pub fn cursor(&self, seed: u64) -> SampleCursor<'_> {
        SampleCursor {
            sampler: self,
            rng: SmallRng::seed_from_u64(seed ^ self.salt),
            count: 0,
            jump: 0,
        }
    }
}

/// Sequential reader over a [`Sampler`], confined to one thread.
///
/// Every `num_samples` draws it jumps to a randomly chosen set and walks
/// that set's permutation.
pub struct SampleCursor<'s> {
    sampler: &'s Sampler,
    rng: SmallRng,
    count: usize,
    jump: usize,
}

impl SampleCursor<'_> {
    fn next_index(&mut self) -> usize {
        let n = self.sampler.num_samples;
        if self.count % n == 0 {
            self.jump = self.rng.gen_range(0..self.sampler.num_sets) * n;
        }
        let index =
            self.jump + self.sampler.shuffled_indices[self.jump + self.count % n] as usize;
        self.count += 1;
        index
    }

    pub fn next_square(&mut self) -> Vec2 {
        let i = self.next_index();
        self.sampler.samples[i]
    }

    pub fn next_disk(&mut self) -> Vec2 {
        let i = self.next_index();
        self.sampler.disk_samples[i]
    }
}

fn grid_side(n: usize) -> usize {
    (n as f64).sqrt().round() as usize
}

fn regular(n: usize) -> Vec<Vec2> {
    let k = grid_side(n);
    let mut pts = Vec::with_capacity(n);
    for j in 0..k {
        for i in 0..k {
            pts.push(Vec2::new(
                (i as f32 + 0.5) / k as f32,
                (j as f32 + 0.5) / k as f32,
            ));
        }
    }
    pts
}

fn pure_random(n: usize, rng: &mut StdRng) -> Vec<Vec2> {
    (0..n).map(|_| Vec2::new(rng.gen(), rng.gen())).collect()
}

fn jittered(n: usize, rng: &mut StdRng) -> Vec<Vec2> {
    let k = grid_side(n);
    let mut pts = Vec::with_capacity(n);
    for j in 0..k {
        for i in 0..k {
            pts.push(Vec2::new(
                (i as f32 + rng.gen::<f32>()) / k as f32,
                (j as f32 + rng.gen::<f32>()) / k as f32,
            ));
        }
    }
    pts
}

fn n_rooks(n: usize, rng: &mut StdRng) -> Vec<Vec2> {
    let mut xs: Vec<f32> = (0..n)
        .map(|i| (i as f32 + rng.gen::<f32>()) / n as f32)
        .collect();
    let mut ys: Vec<f32> = (0..n)
        .map(|i| (i as f32 + rng.gen::<f32>()) / n as f32)
        .collect();
    xs.shuffle(rng);
    ys.shuffle(rng);
    xs.into_iter().zip(ys).map(|(x, y)| Vec2::new(x, y)).collect()
}

fn multi_jittered(n: usize, rng: &mut StdRng) -> Vec<Vec2> {
    let k = grid_side(n);
    let sub = 1.0 / n as f32;
    let mut pts = vec![Vec2::ZERO; n];

    // Canonical arrangement: point (i, j) sits in coarse column i, coarse
    // row j, sub-column j and sub-row i.
    for i in 0..k {
        for j in 0..k {
            pts[i * k + j] = Vec2::new(
                ((i * k + j) as f32 + rng.gen::<f32>()) * sub,
                ((j * k + i) as f32 + rng.gen::<f32>()) * sub,
            );
        }
    }

    // Swap x among points of one coarse column, y among points of one
    // coarse row. Both keep the jittered and n-rooks conditions.
    for i in 0..k {
        for j in 0..k {
            let m = rng.gen_range(j..k);
            let (a, b) = (i * k + j, i * k + m);
            let x = pts[a].x;
            pts[a].x = pts[b].x;
            pts[b].x = x;
        }
    }
    for j in 0..k {
        for i in 0..k {
            let m = rng.gen_range(i..k);
            let (a, b) = (i * k + j, m * k + j);
            let y = pts[a].y;
            pts[a].y = pts[b].y;
            pts[b].y = y;
        }
    }

    pts
}

fn hammersley(n: usize) -> Vec<Vec2> {
    (0..n)
        .map(|i| Vec2::new(i as f32 / n as f32, radical_inverse(i as u32)))
        .collect()
}

fn radical_inverse(mut j: u32) -> f32 {
    let mut x = 0.0f64;
    let mut f = 0.5f64;
    while j > 0 {
        x += f * (j & 1) as f64;
        j >>= 1;
        f *= 0.5;
    }
    x as f32
}

/// Shirley-Chiu concentric map from `[0,1]^2` to the unit disk.
fn concentric_disk(p: Vec2) -> Vec2 {
    let sp = 2.0 * p - Vec2::ONE;

    let (r, phi) = if sp.x > -sp.y {
        if sp.x > sp.y {
            (sp.x, sp.y / sp.x)
        } else {
            (sp.y, 2.0 - sp.x / sp.y)
        }
    } else if sp.x < sp.y {
        (-sp.x, 4.0 + sp.y / sp.x)
    } else if sp.y != 0.0 {
        (-sp.y, 6.0 - sp.x / sp.y)
    } else {
        (-sp.y, 0.0)
    };

    let (sin_phi, cos_phi) = (phi * PI / 4.0).sin_cos();
    Vec2::new(r * cos_phi, r * sin_phi)
}

fn hemisphere_point(p: Vec2, e: f32) -> Vec3 {
    let (sin_phi, cos_phi) = (2.0 * PI * p.x).sin_cos();
    let cos_theta = (1.0 - p.y).powf(1.0 / (e + 1.0));
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    Vec3::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

fn sphere_point(p: Vec2) -> Vec3 {
    let z = 1.0 - 2.0 * p.x;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let (sin_phi, cos_phi) = (2.0 * PI * p.y).sin_cos();
    Vec3::new(r * cos_phi, r * sin_phi, z)
}
