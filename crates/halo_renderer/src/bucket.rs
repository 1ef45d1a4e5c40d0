//! Square tiles of the view plane, the unit of parallel work.
//!
//! Tiles are handed out nearest-the-centre first. Ties keep scanline order
//! so the sequence is the same on every run.

use crate::camera::Camera;
use crate::renderer::render_pixel;
use crate::sampler::Sampler;
use crate::world::World;
use halo_math::Color;

/// A tile of the view plane, clipped to the image edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// Column of the top-left pixel
    pub x: u32,
    /// Row of the top-left pixel
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position in the render order
    pub order: usize,
}

impl Bucket {
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// View plane coordinates of every pixel, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| (x, y)))
    }

    /// Squared distance from the image centre to this tile's centre, in
    /// half pixels so it stays integral.
    fn centre_distance(&self, hres: u32, vres: u32) -> i64 {
        let dx = (2 * self.x + self.width) as i64 - hres as i64;
        let dy = (2 * self.y + self.height) as i64 - vres as i64;
        dx * dx + dy * dy
    }
}

/// Tile an `hres x vres` view plane with `size x size` buckets, centre
/// first. A `size` of zero is treated as one.
pub fn generate_buckets(hres: u32, vres: u32, size: u32) -> Vec<Bucket> {
    let size = size.max(1);
    let mut buckets: Vec<Bucket> = (0..vres)
        .step_by(size as usize)
        .flat_map(|y| {
            (0..hres).step_by(size as usize).map(move |x| Bucket {
                x,
                y,
                width: size.min(hres - x),
                height: size.min(vres - y),
                order: 0,
            })
        })
        .collect();

    buckets.sort_by_key(|b| b.centre_distance(hres, vres));
    for (order, bucket) in buckets.iter_mut().enumerate() {
        bucket.order = order;
    }
    buckets
}

/// Radiance of every pixel in `bucket`, row by row.
pub fn render_bucket(
    bucket: &Bucket,
    world: &World,
    camera: &dyn Camera,
    sampler: &Sampler,
) -> BucketResult {
    let pixels: Vec<Color> = bucket
        .pixels()
        .map(|(x, y)| render_pixel(world, camera, sampler, x, y))
        .collect();

    log::debug!(
        "Bucket {} done ({}x{} at {},{})",
        bucket.order,
        bucket.width,
        bucket.height,
        bucket.x,
        bucket.y
    );
    BucketResult {
        bucket: *bucket,
        pixels,
    }
}

/// A rendered bucket, in the pixel order of [`Bucket::pixels`].
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    pub pixels: Vec<Color>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn covers_once(buckets: &[Bucket], hres: u32, vres: u32) -> bool {
        let mut seen = HashSet::new();
        let all_new = buckets.iter().flat_map(|b| b.pixels()).all(|p| seen.insert(p));
        all_new && seen.len() == (hres * vres) as usize
    }

    #[test]
    fn test_even_tiling() {
        let buckets = generate_buckets(64, 32, 16);
        assert_eq!(buckets.len(), 8);
        assert!(buckets.iter().all(|b| b.pixel_count() == 256));
        assert!(covers_once(&buckets, 64, 32));
    }

    #[test]
    fn test_edge_tiles_are_clipped() {
        let buckets = generate_buckets(101, 70, 32);
        assert_eq!(buckets.len(), 4 * 3);
        assert!(buckets.iter().any(|b| b.width == 5 && b.height == 6));
        assert!(covers_once(&buckets, 101, 70));
    }

    #[test]
    fn test_centre_first() {
        let buckets = generate_buckets(48, 48, 16);
        assert_eq!((buckets[0].x, buckets[0].y), (16, 16));
        // The four corners come last
        assert!(buckets[5..].iter().all(|b| b.x != 16 && b.y != 16));
        assert!(buckets.iter().enumerate().all(|(i, b)| b.order == i));
    }

    #[test]
    fn test_equal_distances_keep_scan_order() {
        // Four tiles, all the same distance from the centre
        let buckets = generate_buckets(4, 4, 2);
        let corners: Vec<_> = buckets.iter().map(|b| (b.x, b.y)).collect();
        assert_eq!(corners, [(0, 0), (2, 0), (0, 2), (2, 2)]);
    }

    #[test]
    fn test_zero_size_means_single_pixels() {
        let buckets = generate_buckets(3, 2, 0);
        assert_eq!(buckets.len(), 6);
        assert!(covers_once(&buckets, 3, 2));
    }

    #[test]
    fn test_pixels_are_row_major() {
        let bucket = Bucket {
            x: 4,
            y: 2,
            width: 2,
            height: 2,
            order: 0,
        };
        let pixels: Vec<_> = bucket.pixels().collect();
        assert_eq!(pixels, [(4, 2), (5, 2), (4, 3), (5, 3)]);
    }
}
