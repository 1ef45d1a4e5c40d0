//! Linear RGB pixel buffers consumed by image textures.
//!
//! Decoding files is a loader concern; this module only adapts already
//! decoded pixels (`image::RgbImage` or raw floats) into the linear form
//! the renderer samples.

use halo_math::Vec3;
use thiserror::Error;

/// Errors that can occur while wrapping pixel data.
#[derive(Error, Debug, PartialEq)]
pub enum ImageError {
    #[error("Image has zero width or height ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("Expected {expected} pixels for a {width}x{height} image, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A loaded image with linear RGB pixel data.
///
/// Rows are stored top to bottom. Texture lookups use `v = 0` at the
/// bottom row.
#[derive(Clone, Debug)]
pub struct Image {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Pixel data, row-major, linear RGB
    pub pixels: Vec<Vec3>,
}

impl Image {
    /// Create a new image from linear pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<Vec3>) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::Empty { width, height });
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(ImageError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a solid color image (1x1).
    pub fn solid_color(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
        }
    }

    /// Convert decoded 8-bit sRGB pixels to linear floats.
    pub fn from_rgb8(rgb: &image::RgbImage) -> Result<Self, ImageError> {
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|p| {
                Vec3::new(
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                )
            })
            .collect();
        Self::new(width, height, pixels)
    }

    /// Nearest-pixel lookup at integer coordinates (row 0 is the top).
    pub fn pixel(&self, x: u32, y: u32) -> Vec3 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.pixels[(y * self.width + x) as usize]
    }

    /// Sample the image at UV coordinates (bilinear filtering).
    ///
    /// UV coordinates wrap; (0, 0) is the bottom-left corner.
    pub fn sample(&self, u: f32, v: f32) -> Vec3 {
        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);

        // Convert to pixel coordinates
        let x = u * (self.width as f32 - 1.0);
        let y = (1.0 - v) * (self.height as f32 - 1.0); // Flip V for image coordinates

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x.fract();
        let fy = y.fract();

        let top = self.pixel(x0, y0).lerp(self.pixel(x1, y0), fx);
        let bottom = self.pixel(x0, y1).lerp(self.pixel(x1, y1), fx);
        top.lerp(bottom, fy)
    }
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
