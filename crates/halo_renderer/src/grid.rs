//! Uniform grid acceleration structure.
//!
//! Objects are bucketed into the cells their bounding boxes overlap, and
//! rays walk the cells they pierce in order (3D DDA). A hit found in a cell
//! is only final once it lies before the cell's far boundary; otherwise the
//! object may be hidden behind something in a later cell.
//!
//! Construction goes through [`GridBuilder`], so a grid is always built
//! before it is queried.

use crate::geometry::{
    mesh_triangles, override_material, GeometricObject, HitRecord, MeshShading, ObjectAttrs,
    ObjectRef,
};
use crate::SceneError;
use halo_core::Mesh;
use halo_math::{Aabb, Interval, Ray, Vec3, K_EPSILON};
use std::sync::Arc;

/// Default ratio of cells per axis to the cube root of the object count.
pub const DEFAULT_MULTIPLIER: f32 = 2.0;

/// Collects objects for a [`Grid`].
pub struct GridBuilder {
    objects: Vec<ObjectRef>,
    multiplier: f32,
    attrs: ObjectAttrs,
}

impl Default for GridBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GridBuilder {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            multiplier: DEFAULT_MULTIPLIER,
            attrs: ObjectAttrs::default(),
        }
    }

    pub fn with_multiplier(mut self, multiplier: f32) -> Self {
        self.multiplier = multiplier.max(f32::MIN_POSITIVE);
        self
    }

    pub fn add_object(&mut self, object: ObjectRef) {
        self.objects.push(object);
    }

    /// Add every face of `mesh`, sharing `material`.
    pub fn add_mesh(
        &mut self,
        mesh: Arc<Mesh>,
        shading: MeshShading,
        material: Option<Arc<dyn crate::Material>>,
    ) -> Result<(), SceneError> {
        let attrs = ObjectAttrs {
            material,
            ..ObjectAttrs::default()
        };
        self.objects.extend(mesh_triangles(mesh, shading, &attrs)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Bucket the objects into cells.
    pub fn build(self) -> Grid {
        let mut unbounded = Vec::new();
        let mut bounded: Vec<(u32, Aabb)> = Vec::new();
        for (i, object) in self.objects.iter().enumerate() {
            match object.bounding_box() {
                Some(b) => bounded.push((i as u32, b)),
                None => unbounded.push(i as u32),
            }
        }

        let bounds = bounded
            .iter()
            .map(|(_, b)| *b)
            .reduce(|a, b| Aabb::surrounding(&a, &b))
            .map(|b| b.padded(K_EPSILON));

        let Some(bounds) = bounds else {
            log::info!(
                "Built grid with no bounded objects ({} unbounded)",
                unbounded.len()
            );
            return Grid {
                objects: self.objects,
                cells: Vec::new(),
                counts: [0; 3],
                bounds: None,
                unbounded,
                attrs: self.attrs,
            };
        };

        let counts = cell_counts(&bounds, bounded.len(), self.multiplier);
        let [nx, ny, nz] = counts;
        let mut cells: Vec<Vec<u32>> = vec![Vec::new(); nx * ny * nz];

        for (index, b) in &bounded {
            let lo = cell_coords(&bounds, counts, b.min());
            let hi = cell_coords(&bounds, counts, b.max());
            for iz in lo[2]..=hi[2] {
                for iy in lo[1]..=hi[1] {
                    for ix in lo[0]..=hi[0] {
                        cells[ix + nx * iy + nx * ny * iz].push(*index);
                    }
                }
            }
        }

        let occupied = cells.iter().filter(|c| !c.is_empty()).count();
        let references: usize = cells.iter().map(Vec::len).sum();
        log::info!(
            "Built {}x{}x{} grid: {} objects ({} unbounded), {} of {} cells occupied, {:.2} refs per occupied cell",
            nx,
            ny,
            nz,
            self.objects.len(),
            unbounded.len(),
            occupied,
            cells.len(),
            references as f32 / occupied.max(1) as f32
        );

        Grid {
            objects: self.objects,
            cells,
            counts,
            bounds: Some(bounds),
            unbounded,
            attrs: self.attrs,
        }
    }
}

/// `n = floor(m * w / s) + 1` with `s` the edge of a cube holding one object.
fn cell_counts(bounds: &Aabb, num_objects: usize, multiplier: f32) -> [usize; 3] {
    let w = bounds.extent();
    let s = (w.x * w.y * w.z / num_objects.max(1) as f32).cbrt();
    let n = |extent: f32| {
        if s > 0.0 && s.is_finite() {
            (multiplier * extent / s) as usize + 1
        } else {
            1
        }
    };
    [n(w.x), n(w.y), n(w.z)]
}

fn cell_coords(bounds: &Aabb, counts: [usize; 3], p: Vec3) -> [usize; 3] {
    let rel = (p - bounds.min()) / bounds.extent();
    let coord = |axis: usize| {
        let c = (rel[axis] * counts[axis] as f32).floor();
        (c.max(0.0) as usize).min(counts[axis] - 1)
    };
    [coord(0), coord(1), coord(2)]
}

/// Objects bucketed into a regular lattice of cells.
#[derive(Clone)]
pub struct Grid {
    objects: Vec<ObjectRef>,
    cells: Vec<Vec<u32>>,
    counts: [usize; 3],
    bounds: Option<Aabb>,
    unbounded: Vec<u32>,
    attrs: ObjectAttrs,
}

/// One step of a grid walk: the cell and the `t` where the ray leaves it.
struct CellVisit {
    cell: usize,
    t_enter: f32,
    t_exit: f32,
}

/// DDA state for one ray.
struct CellWalk {
    index: [i64; 3],
    step: [i64; 3],
    stop: [i64; 3],
    t_next: [f32; 3],
    dt: [f32; 3],
    t_enter: f32,
    t_max: f32,
    counts: [usize; 3],
    done: bool,
}

impl CellWalk {
    fn new(bounds: &Aabb, counts: [usize; 3], ray: &Ray, ray_t: Interval) -> Option<Self> {
        let span = bounds.clip(ray, ray_t)?;
        let start = cell_coords(bounds, counts, ray.at(span.min));
        let lo = bounds.min();
        let hi = bounds.max();

        let mut walk = CellWalk {
            index: [0; 3],
            step: [0; 3],
            stop: [0; 3],
            t_next: [f32::INFINITY; 3],
            dt: [f32::INFINITY; 3],
            t_enter: span.min,
            t_max: span.max,
            counts,
            done: false,
        };

        for axis in 0..3 {
            let n = counts[axis] as i64;
            let d = ray.direction[axis];
            walk.index[axis] = start[axis] as i64;

            if d == 0.0 {
                walk.step[axis] = -1;
                walk.stop[axis] = -1;
                continue;
            }

            let inv = 1.0 / d;
            let (t_lo, t_hi) = {
                let a = (lo[axis] - ray.origin[axis]) * inv;
                let b = (hi[axis] - ray.origin[axis]) * inv;
                (a.min(b), a.max(b))
            };
            walk.dt[axis] = (t_hi - t_lo) / n as f32;

            if d > 0.0 {
                walk.t_next[axis] = t_lo + (walk.index[axis] + 1) as f32 * walk.dt[axis];
                walk.step[axis] = 1;
                walk.stop[axis] = n;
            } else {
                walk.t_next[axis] = t_lo + (n - walk.index[axis]) as f32 * walk.dt[axis];
                walk.step[axis] = -1;
                walk.stop[axis] = -1;
            }
        }

        Some(walk)
    }
}

impl Iterator for CellWalk {
    type Item = CellVisit;

    fn next(&mut self) -> Option<CellVisit> {
        if self.done || self.t_enter > self.t_max {
            return None;
        }

        let axis = if self.t_next[0] < self.t_next[1] && self.t_next[0] < self.t_next[2] {
            0
        } else if self.t_next[1] < self.t_next[2] {
            1
        } else {
            2
        };

        let [nx, ny, _] = self.counts;
        let cell = self.index[0] as usize
            + nx * self.index[1] as usize
            + nx * ny * self.index[2] as usize;
        let t_exit = self.t_next[axis].min(self.t_max);
        let visit = CellVisit {
            cell,
            t_enter: self.t_enter,
            t_exit,
        };

        self.t_enter = self.t_next[axis];
        self.t_next[axis] += self.dt[axis];
        self.index[axis] += self.step[axis];
        if self.index[axis] == self.stop[axis] || !self.t_enter.is_finite() {
            self.done = true;
        }

        Some(visit)
    }
}

impl Grid {
    /// Cells per axis.
    pub fn counts(&self) -> [usize; 3] {
        self.counts
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn walk(&self, ray: &Ray, ray_t: Interval) -> Option<CellWalk> {
        CellWalk::new(self.bounds.as_ref()?, self.counts, ray, ray_t)
    }
}

impl GeometricObject for Grid {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let mut hit_anything = false;
        let mut closest = ray_t.max;

        for &i in &self.unbounded {
            if self.objects[i as usize].hit(ray, ray_t.with_max(closest), rec) {
                hit_anything = true;
                closest = rec.t;
            }
        }

        if let Some(walk) = self.walk(ray, ray_t.with_max(closest)) {
            for visit in walk {
                if hit_anything && closest < visit.t_enter {
                    break;
                }
                for &i in &self.cells[visit.cell] {
                    if self.objects[i as usize].hit(ray, ray_t.with_max(closest), rec) {
                        hit_anything = true;
                        closest = rec.t;
                    }
                }
                if hit_anything && closest < visit.t_exit {
                    break;
                }
            }
        }

        if hit_anything {
            override_material(&self.attrs, rec);
        }
        hit_anything
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        if !self.attrs.shadows {
            return None;
        }

        let mut closest: Option<f32> = None;
        let window = |closest: Option<f32>| ray_t.with_max(closest.unwrap_or(ray_t.max));

        for &i in &self.unbounded {
            if let Some(t) = self.objects[i as usize].shadow_hit(ray, window(closest)) {
                closest = Some(t);
            }
        }

        if let Some(walk) = self.walk(ray, window(closest)) {
            for visit in walk {
                if closest.is_some_and(|t| t < visit.t_enter) {
                    break;
                }
                for &i in &self.cells[visit.cell] {
                    if let Some(t) = self.objects[i as usize].shadow_hit(ray, window(closest)) {
                        closest = Some(t);
                    }
                }
                if closest.is_some_and(|t| t < visit.t_exit) {
                    break;
                }
            }
        }

        closest
    }

    fn bounding_box(&self) -> Option<Aabb> {
        if self.unbounded.is_empty() {
            self.bounds
        } else {
            None
        }
    }

    fn clone_object(&self) -> ObjectRef {
        Arc::new(Self {
            objects: self.objects.iter().map(|o| o.clone_object()).collect(),
            ..self.clone()
        })
    }

    fn has_material(&self) -> bool {
        self.attrs.material.is_some() || self.objects.iter().all(|o| o.has_material())
    }

    fn attrs(&self) -> &ObjectAttrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut ObjectAttrs {
        &mut self.attrs
    }
}
