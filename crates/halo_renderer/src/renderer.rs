//! Pixel loop and the finished linear image.
//!
//! Every pixel draws its antialiasing offsets from its own cursor, seeded
//! from the world seed and the pixel coordinates, so the image does not
//! depend on which thread renders which bucket.

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::camera::Camera;
use crate::sampler::{pixel_seed, SampleKey, Sampler};
use crate::world::World;
use crate::SceneError;
use halo_math::Color;
use rayon::prelude::*;
use std::time::Instant;

/// Sample-averaged radiance of pixel `(x, y)`.
pub fn render_pixel(world: &World, camera: &dyn Camera, sampler: &Sampler, x: u32, y: u32) -> Color {
    let vp = world.view_plane();
    let seed = pixel_seed(world.seed(), x, y);
    let mut cursor = sampler.cursor(seed);
    let mut pixel_color = Color::ZERO;

    for s in 0..vp.num_samples {
        let offset = cursor.next_square();
        let key = SampleKey::new(seed, s as u32);
        let ray = camera.generate_ray(vp, x, y, offset, &key);
        pixel_color += world.tracer().trace_ray(world, &ray, 0, key);
    }

    pixel_color / vp.num_samples as f32
}

/// Render the whole view plane.
pub fn render(world: &World, parallel: bool) -> Result<ImageBuffer, SceneError> {
    world.validate()?;
    let camera = world.camera().ok_or(SceneError::MissingCamera)?;
    let vp = world.view_plane();
    let sampler = vp.sampler(world.seed())?;
    let buckets = generate_buckets(vp.hres, vp.vres, vp.bucket_size);

    log::info!(
        "Rendering {}x{} at {} spp, {} objects, {} lights, {} buckets{}",
        vp.hres,
        vp.vres,
        vp.num_samples,
        world.objects().len(),
        world.lights().len(),
        buckets.len(),
        if parallel { "" } else { " (serial)" }
    );
    let start = Instant::now();

    let results: Vec<BucketResult> = if parallel {
        buckets
            .par_iter()
            .map(|bucket| render_bucket(bucket, world, camera, &sampler))
            .collect()
    } else {
        buckets
            .iter()
            .map(|bucket| render_bucket(bucket, world, camera, &sampler))
            .collect()
    };

    let mut image = ImageBuffer::new(vp.hres, vp.vres);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    Ok(image)
}

/// How out-of-range colours are brought into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToneMap {
    /// Clamp each channel
    Clamp,
    /// Divide by the largest channel when it exceeds one
    #[default]
    MaxToOne,
    /// Paint any over-bright pixel pure red
    OutOfGamutRed,
}

impl ToneMap {
    pub fn apply(self, c: Color) -> Color {
        let c = c.max(Color::ZERO);
        match self {
            ToneMap::Clamp => c.min(Color::ONE),
            ToneMap::MaxToOne => {
                let max = c.max_element();
                if max > 1.0 {
                    c / max
                } else {
                    c
                }
            }
            ToneMap::OutOfGamutRed => {
                if c.max_element() > 1.0 {
                    Color::new(1.0, 0.0, 0.0)
                } else {
                    c
                }
            }
        }
    }
}

/// Convert a linear colour to 8-bit RGBA.
pub fn color_to_rgba(color: Color, tone: ToneMap, gamma: f32) -> [u8; 4] {
    let mut c = tone.apply(color);
    if gamma > 0.0 && gamma != 1.0 {
        c = c.powf(1.0 / gamma);
    }
    let to_byte = |x: f32| (255.0 * x.clamp(0.0, 1.0) + 0.5) as u8;
    [to_byte(c.x), to_byte(c.y), to_byte(c.z), 255]
}

/// Linear, unclamped render output. Row 0 is the top of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    fn write_bucket(&mut self, result: &BucketResult) {
        for ((x, y), &color) in result.bucket.pixels().zip(&result.pixels) {
            self.set(x, y, color);
        }
    }

    /// Tone-mapped, gamma-corrected RGBA bytes, row by row.
    pub fn to_rgba(&self, tone: ToneMap, gamma: f32) -> Vec<u8> {
        let rgba: Vec<[u8; 4]> = self
            .pixels
            .iter()
            .map(|&c| color_to_rgba(c, tone, gamma))
            .collect();
        bytemuck::cast_slice(&rgba).to_vec()
    }
}
