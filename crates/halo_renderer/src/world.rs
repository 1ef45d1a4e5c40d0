//! The scene and its render settings.

use crate::camera::Camera;
use crate::geometry::{hit_nearest, GeometricObject, HitRecord, LightSurface, ObjectRef};
use crate::light::{Ambient, AreaLight, Light};
use crate::renderer::{self, ImageBuffer, ToneMap};
use crate::sampler::{SampleKey, Sampler, SamplerKind, DEFAULT_NUM_SETS};
use crate::shade_rec::ShadeRec;
use crate::tracer::{RayCast, Tracer};
use crate::SceneError;
use halo_math::{Color, Interval, Ray, K_EPSILON};
use std::sync::Arc;

/// Default bucket edge in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// Image resolution and sampling settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPlane {
    pub hres: u32,
    pub vres: u32,
    /// World units per pixel on the view plane
    pub pixel_size: f32,
    /// Samples per pixel
    pub num_samples: usize,
    pub sampler_kind: SamplerKind,
    /// Sets generated for the pixel sampler
    pub num_sets: usize,
    /// Deepest recursion level that is still traced
    pub max_depth: u32,
    pub gamma: f32,
    /// Show over-bright pixels as red instead of scaling them
    pub show_out_of_gamut: bool,
    pub bucket_size: u32,
}

impl Default for ViewPlane {
    fn default() -> Self {
        Self {
            hres: 200,
            vres: 200,
            pixel_size: 1.0,
            num_samples: 1,
            sampler_kind: SamplerKind::MultiJittered,
            num_sets: DEFAULT_NUM_SETS,
            max_depth: 5,
            gamma: 1.0,
            show_out_of_gamut: false,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

impl ViewPlane {
    pub fn with_resolution(mut self, hres: u32, vres: u32) -> Self {
        self.hres = hres;
        self.vres = vres;
        self
    }

    pub fn with_pixel_size(mut self, pixel_size: f32) -> Self {
        self.pixel_size = pixel_size;
        self
    }

    pub fn with_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }

    pub fn with_sampler_kind(mut self, kind: SamplerKind) -> Self {
        self.sampler_kind = kind;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_out_of_gamut(mut self, show: bool) -> Self {
        self.show_out_of_gamut = show;
        self
    }

    pub fn with_bucket_size(mut self, bucket_size: u32) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    /// Pixel sampler for these settings. One sample per pixel always goes
    /// through the pixel centre.
    pub fn sampler(&self, seed: u64) -> Result<Sampler, SceneError> {
        if self.num_samples == 1 {
            Sampler::new(SamplerKind::Regular, 1, 1, seed)
        } else {
            Sampler::new(self.sampler_kind, self.num_samples, self.num_sets, seed)
        }
    }

    /// Tone mapping matching `show_out_of_gamut`.
    pub fn tone_map(&self) -> ToneMap {
        if self.show_out_of_gamut {
            ToneMap::OutOfGamutRed
        } else {
            ToneMap::MaxToOne
        }
    }
}

/// Everything that is rendered, plus how.
///
/// Built up front and only read while rendering.
pub struct World {
    view_plane: ViewPlane,
    background: Color,
    seed: u64,
    tracer: Box<dyn Tracer>,
    camera: Option<Box<dyn Camera>>,
    ambient: Box<dyn Light>,
    objects: Vec<ObjectRef>,
    lights: Vec<Arc<dyn Light>>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Empty scene: black background, white ambient light, ray casting.
    pub fn new() -> Self {
        Self {
            view_plane: ViewPlane::default(),
            background: Color::ZERO,
            seed: 0,
            tracer: Box::new(RayCast),
            camera: None,
            ambient: Box::new(Ambient::default()),
            objects: Vec::new(),
            lights: Vec::new(),
        }
    }

    pub fn with_view_plane(mut self, view_plane: ViewPlane) -> Self {
        self.view_plane = view_plane;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn set_view_plane(&mut self, view_plane: ViewPlane) {
        self.view_plane = view_plane;
    }

    /// Add an object and return its index.
    pub fn add_object<O: GeometricObject + 'static>(&mut self, object: O) -> usize {
        self.add_shared(Arc::new(object))
    }

    pub fn add_shared(&mut self, object: ObjectRef) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn add_light<L: Light + 'static>(&mut self, light: L) {
        self.lights.push(Arc::new(light));
    }

    /// Add `surface` as a visible object and as a light sampling it.
    ///
    /// The surface needs a sampler for its points and a material for its
    /// emitted radiance.
    pub fn add_area_light<S: LightSurface + 'static>(&mut self, surface: S) -> Result<(), SceneError> {
        if surface.sampler().is_none() {
            return Err(SceneError::LightWithoutSampler);
        }
        if surface.material().is_none() {
            return Err(SceneError::LightWithoutMaterial);
        }
        if surface.casts_shadows() {
            log::warn!("Area light surface casts shadows; points behind it will be dark");
        }

        let surface = Arc::new(surface);
        self.objects.push(surface.clone());
        self.lights.push(Arc::new(AreaLight::new(surface)));
        Ok(())
    }

    pub fn set_ambient_light<L: Light + 'static>(&mut self, light: L) {
        self.ambient = Box::new(light);
    }

    pub fn set_camera<C: Camera + 'static>(&mut self, camera: C) {
        self.camera = Some(Box::new(camera));
    }

    pub fn set_tracer<T: Tracer + 'static>(&mut self, tracer: T) {
        self.tracer = Box::new(tracer);
    }

    pub fn view_plane(&self) -> &ViewPlane {
        &self.view_plane
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tracer(&self) -> &dyn Tracer {
        self.tracer.as_ref()
    }

    pub fn camera(&self) -> Option<&dyn Camera> {
        self.camera.as_deref()
    }

    pub fn ambient_light(&self) -> &dyn Light {
        self.ambient.as_ref()
    }

    pub fn lights(&self) -> &[Arc<dyn Light>] {
        &self.lights
    }

    pub fn objects(&self) -> &[ObjectRef] {
        &self.objects
    }

    /// Nearest hit of a ray leaving at depth `depth`.
    pub fn hit_objects(&self, ray: &Ray, depth: u32, key: SampleKey) -> Option<ShadeRec<'_>> {
        let mut rec = HitRecord::default();
        if !hit_nearest(
            &self.objects,
            ray,
            Interval::new(K_EPSILON, f32::INFINITY),
            &mut rec,
        ) {
            return None;
        }
        Some(ShadeRec {
            world: self,
            hit: rec,
            ray: *ray,
            depth,
            key,
        })
    }

    /// Distance to the first occluder found in `ray_t`, if any.
    pub fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        self.objects.iter().find_map(|o| o.shadow_hit(ray, ray_t))
    }

    /// Check the scene is complete enough to render.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.camera.is_none() {
            return Err(SceneError::MissingCamera);
        }
        let vp = &self.view_plane;
        if vp.hres == 0 || vp.vres == 0 {
            return Err(SceneError::EmptyViewPlane {
                hres: vp.hres,
                vres: vp.vres,
            });
        }
        if self.tracer.needs_materials() {
            if let Some(i) = self.objects.iter().position(|o| !o.has_material()) {
                return Err(SceneError::MissingMaterial(i));
            }
        }
        vp.sampler(self.seed).map(|_| ())
    }

    /// Render every pixel, buckets in parallel.
    pub fn render_scene(&self) -> Result<ImageBuffer, SceneError> {
        renderer::render(self, true)
    }

    /// Same image as [`World::render_scene`], on the calling thread.
    pub fn render_scene_serial(&self) -> Result<ImageBuffer, SceneError> {
        renderer::render(self, false)
    }

    /// Averaged radiance of one pixel, `(0, 0)` being top left.
    pub fn render_pixel(&self, x: u32, y: u32) -> Result<Color, SceneError> {
        self.validate()?;
        let camera = self.camera().ok_or(SceneError::MissingCamera)?;
        let sampler = self.view_plane.sampler(self.seed)?;
        Ok(renderer::render_pixel(self, camera, &sampler, x, y))
    }
}
