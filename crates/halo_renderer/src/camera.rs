//! Cameras turn a pixel sample into a primary ray.
//!
//! All cameras share an orthonormal frame built from eye, look-at and up
//! vectors. Pixel `(col, row)` has row 0 at the top of the image; the view
//! plane is centred on the optical axis with `pixel_size` world units per
//! pixel.

use crate::sampler::{SampleKey, Sampler};
use crate::world::ViewPlane;
use halo_math::{Ray, Vec2, Vec3};

/// Source of primary rays.
pub trait Camera: Send + Sync {
    /// Ray through pixel `(col, row)` at `offset` within the pixel, with
    /// `offset` in `[0, 1)^2`.
    fn generate_ray(
        &self,
        vp: &ViewPlane,
        col: u32,
        row: u32,
        offset: Vec2,
        key: &SampleKey,
    ) -> Ray;
}

/// Eye position and orientation shared by every camera.
#[derive(Debug, Clone, Copy)]
pub struct CameraFrame {
    eye: Vec3,
    look_at: Vec3,
    up: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl CameraFrame {
    pub fn new(eye: Vec3, look_at: Vec3, up: Vec3) -> Self {
        let mut frame = Self {
            eye,
            look_at,
            up,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
        };
        frame.compute_uvw();
        frame
    }

    fn compute_uvw(&mut self) {
        self.w = (self.eye - self.look_at).normalize_or_zero();

        // Looking straight up or down leaves `up x w` undefined
        if self.eye.x == self.look_at.x && self.eye.z == self.look_at.z {
            if self.eye.y > self.look_at.y {
                self.u = Vec3::Z;
                self.v = Vec3::X;
                self.w = Vec3::Y;
                return;
            }
            if self.eye.y < self.look_at.y {
                self.u = Vec3::X;
                self.v = Vec3::Z;
                self.w = -Vec3::Y;
                return;
            }
        }

        self.u = self.up.cross(self.w).normalize_or_zero();
        self.v = self.w.cross(self.u);
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// The `(u, v, w)` basis, with `w` pointing back toward the eye.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }
}

impl Default for CameraFrame {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 500.0), Vec3::ZERO, Vec3::Y)
    }
}

/// Point on the view plane, relative to its centre, for a pixel sample.
fn view_plane_point(vp: &ViewPlane, col: u32, row: u32, offset: Vec2, zoom: f32) -> Vec2 {
    let s = vp.pixel_size / zoom;
    let r = vp.vres as f32 - 1.0 - row as f32;
    Vec2::new(
        s * (col as f32 - 0.5 * vp.hres as f32 + offset.x),
        s * (r - 0.5 * vp.vres as f32 + offset.y),
    )
}

/// Perspective camera with a point aperture.
#[derive(Debug, Clone, Copy)]
pub struct Pinhole {
    frame: CameraFrame,
    /// Distance from the eye to the view plane
    d: f32,
    zoom: f32,
}

impl Pinhole {
    pub fn new(eye: Vec3, look_at: Vec3) -> Self {
        Self {
            frame: CameraFrame::new(eye, look_at, Vec3::Y),
            d: 500.0,
            zoom: 1.0,
        }
    }

    pub fn with_up(mut self, up: Vec3) -> Self {
        self.frame = CameraFrame::new(self.frame.eye, self.frame.look_at, up);
        self
    }

    pub fn with_view_distance(mut self, d: f32) -> Self {
        self.d = d;
        self
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn frame(&self) -> &CameraFrame {
        &self.frame
    }

    fn direction(&self, p: Vec2) -> Vec3 {
        let (u, v, w) = self.frame.basis();
        (p.x * u + p.y * v - self.d * w).normalize_or_zero()
    }
}

impl Default for Pinhole {
    fn default() -> Self {
        Self {
            frame: CameraFrame::default(),
            d: 500.0,
            zoom: 1.0,
        }
    }
}

impl Camera for Pinhole {
    fn generate_ray(
        &self,
        vp: &ViewPlane,
        col: u32,
        row: u32,
        offset: Vec2,
        _key: &SampleKey,
    ) -> Ray {
        let p = view_plane_point(vp, col, row, offset, self.zoom);
        Ray::new(self.frame.eye, self.direction(p))
    }
}

/// Perspective camera with a finite lens, giving depth of field.
///
/// Points at distance `focal_distance` along the view direction are in
/// sharp focus.
#[derive(Debug, Clone)]
pub struct ThinLens {
    frame: CameraFrame,
    d: f32,
    zoom: f32,
    lens_radius: f32,
    focal_distance: f32,
    sampler: Sampler,
}

impl ThinLens {
    pub fn new(eye: Vec3, look_at: Vec3, lens_radius: f32, focal_distance: f32, sampler: Sampler) -> Self {
        Self {
            frame: CameraFrame::new(eye, look_at, Vec3::Y),
            d: 500.0,
            zoom: 1.0,
            lens_radius,
            focal_distance,
            sampler,
        }
    }

    pub fn with_up(mut self, up: Vec3) -> Self {
        self.frame = CameraFrame::new(self.frame.eye, self.frame.look_at, up);
        self
    }

    pub fn with_view_distance(mut self, d: f32) -> Self {
        self.d = d;
        self
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }
}

impl Camera for ThinLens {
    fn generate_ray(
        &self,
        vp: &ViewPlane,
        col: u32,
        row: u32,
        offset: Vec2,
        key: &SampleKey,
    ) -> Ray {
        let p = view_plane_point(vp, col, row, offset, self.zoom);
        let lens = self.sampler.sample_unit_disk(key) * self.lens_radius;
        let (u, v, w) = self.frame.basis();

        // Where the pinhole ray through `p` meets the focal plane
        let focus = p * self.focal_distance / self.d;
        let direction =
            ((focus.x - lens.x) * u + (focus.y - lens.y) * v - self.focal_distance * w)
                .normalize_or_zero();

        Ray::new(self.frame.eye + lens.x * u + lens.y * v, direction)
    }
}

/// Parallel projection along `-w`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Orthographic {
    frame: CameraFrame,
    zoom: f32,
}

impl Orthographic {
    pub fn new(eye: Vec3, look_at: Vec3) -> Self {
        Self {
            frame: CameraFrame::new(eye, look_at, Vec3::Y),
            zoom: 1.0,
        }
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }
}

impl Camera for Orthographic {
    fn generate_ray(
        &self,
        vp: &ViewPlane,
        col: u32,
        row: u32,
        offset: Vec2,
        _key: &SampleKey,
    ) -> Ray {
        let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        let p = view_plane_point(vp, col, row, offset, zoom);
        let (u, v, w) = self.frame.basis();
        Ray::new(self.frame.eye + p.x * u + p.y * v, -w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_plane() -> ViewPlane {
        ViewPlane::default().with_resolution(101, 101)
    }

    #[test]
    fn test_frame_basis() {
        let frame = CameraFrame::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let (u, v, w) = frame.basis();
        assert!((u - Vec3::X).length() < 1e-6);
        assert!((v - Vec3::Y).length() < 1e-6);
        assert!((w - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_looking_straight_down() {
        let frame = CameraFrame::new(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, Vec3::Y);
        let (u, v, w) = frame.basis();
        assert_eq!(w, Vec3::Y);
        assert!(u.dot(v).abs() < 1e-6);
    }

    #[test]
    fn test_pinhole_centre_ray_along_axis() {
        let camera = Pinhole::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO).with_view_distance(100.0);
        let ray = camera.generate_ray(&view_plane(), 50, 50, Vec2::splat(0.5), &SampleKey::default());

        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 5.0));
        assert!((ray.direction - (-Vec3::Z)).length() < 1e-6);
    }

    #[test]
    fn test_row_zero_is_top() {
        let camera = Pinhole::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO).with_view_distance(100.0);
        let key = SampleKey::default();
        let top = camera.generate_ray(&view_plane(), 50, 0, Vec2::splat(0.5), &key);
        let left = camera.generate_ray(&view_plane(), 0, 50, Vec2::splat(0.5), &key);

        assert!(top.direction.y > 0.0);
        assert!(left.direction.x < 0.0);
    }

    #[test]
    fn test_thin_lens_focuses_on_focal_plane() {
        let sampler = Sampler::multi_jittered(16, 9).unwrap();
        let camera = ThinLens::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 0.5, 5.0, sampler)
            .with_view_distance(100.0);
        let vp = view_plane();

        // Every lens sample for one pixel passes through the same focal point
        let points: Vec<Vec3> = (0..4)
            .map(|s| {
                let ray = camera.generate_ray(&vp, 70, 30, Vec2::splat(0.5), &SampleKey::new(1, s));
                let t = 5.0 / -ray.direction.z;
                ray.at(t)
            })
            .collect();
        for p in &points[1..] {
            assert!((*p - points[0]).length() < 1e-4);
        }
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let camera = Orthographic::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let key = SampleKey::default();
        let a = camera.generate_ray(&view_plane(), 0, 0, Vec2::splat(0.5), &key);
        let b = camera.generate_ray(&view_plane(), 100, 100, Vec2::splat(0.5), &key);

        assert_eq!(a.direction, b.direction);
        assert!(a.origin.x < b.origin.x);
    }
}
